//! Resource limits for the in-memory stub.
//!
//! A runaway test (an endless write loop, a recursive mkdirs on a generated
//! path) should fail fast with a readable error instead of eating memory.

use std::fmt;

/// Default maximum total bytes across all stub files: 100MB
pub const DEFAULT_MAX_TOTAL_BYTES: u64 = 100_000_000;

/// Default maximum single file size: 10MB
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10_000_000;

/// Default maximum number of files with content: 10,000
pub const DEFAULT_MAX_FILE_COUNT: u64 = 10_000;

/// Default maximum path depth (directory nesting): 100
pub const DEFAULT_MAX_PATH_DEPTH: usize = 100;

/// Default maximum total path length: 4096 bytes
pub const DEFAULT_MAX_PATH_LENGTH: usize = 4096;

/// Stub filesystem resource limits.
///
/// # Example
///
/// ```rust
/// use fakefs::{FsLimits, StubFileSystem};
///
/// let limits = FsLimits::new()
///     .max_file_size(1024)
///     .max_file_count(10);
///
/// let fs = StubFileSystem::builder().limits(limits).build();
/// assert_eq!(fs.limits().max_file_size, 1024);
/// ```
///
/// # Default Limits
///
/// | Limit | Default |
/// |-------|---------|
/// | `max_total_bytes` | 100MB |
/// | `max_file_size` | 10MB |
/// | `max_file_count` | 10,000 |
/// | `max_path_depth` | 100 |
/// | `max_path_length` | 4096 |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FsLimits {
    /// Maximum total content bytes across all files.
    pub max_total_bytes: u64,

    /// Maximum content size of a single file.
    pub max_file_size: u64,

    /// Maximum number of files carrying content.
    pub max_file_count: u64,

    /// Maximum number of path segments.
    pub max_path_depth: usize,

    /// Maximum path length in bytes.
    pub max_path_length: usize,
}

impl Default for FsLimits {
    fn default() -> Self {
        Self {
            max_total_bytes: DEFAULT_MAX_TOTAL_BYTES,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            max_file_count: DEFAULT_MAX_FILE_COUNT,
            max_path_depth: DEFAULT_MAX_PATH_DEPTH,
            max_path_length: DEFAULT_MAX_PATH_LENGTH,
        }
    }
}

impl FsLimits {
    /// Create new limits with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create unlimited limits (no restrictions).
    ///
    /// ```rust
    /// use fakefs::FsLimits;
    ///
    /// let limits = FsLimits::unlimited();
    /// assert_eq!(limits.max_total_bytes, u64::MAX);
    /// ```
    pub fn unlimited() -> Self {
        Self {
            max_total_bytes: u64::MAX,
            max_file_size: u64::MAX,
            max_file_count: u64::MAX,
            max_path_depth: usize::MAX,
            max_path_length: usize::MAX,
        }
    }

    pub fn max_total_bytes(mut self, bytes: u64) -> Self {
        self.max_total_bytes = bytes;
        self
    }

    pub fn max_file_size(mut self, bytes: u64) -> Self {
        self.max_file_size = bytes;
        self
    }

    pub fn max_file_count(mut self, count: u64) -> Self {
        self.max_file_count = count;
        self
    }

    pub fn max_path_depth(mut self, depth: usize) -> Self {
        self.max_path_depth = depth;
        self
    }

    pub fn max_path_length(mut self, len: usize) -> Self {
        self.max_path_length = len;
        self
    }

    /// Validate a path against the depth and length limits.
    ///
    /// `.` segments are ignored and `..` pops one level, so depth is measured
    /// on the resolved path.
    pub fn validate_path(&self, path: &str) -> Result<(), FsLimitExceeded> {
        if path.len() > self.max_path_length {
            return Err(FsLimitExceeded::PathTooLong {
                length: path.len(),
                limit: self.max_path_length,
            });
        }

        let mut depth: usize = 0;
        for segment in path.split('/') {
            match segment {
                "" | "." => {}
                ".." => depth = depth.saturating_sub(1),
                _ => depth += 1,
            }
        }

        if depth > self.max_path_depth {
            return Err(FsLimitExceeded::PathTooDeep {
                depth,
                limit: self.max_path_depth,
            });
        }

        Ok(())
    }

    /// Check if adding bytes would exceed the total limit.
    pub fn check_total_bytes(&self, current: u64, additional: u64) -> Result<(), FsLimitExceeded> {
        let new_total = current.saturating_add(additional);
        if new_total > self.max_total_bytes {
            return Err(FsLimitExceeded::TotalBytes {
                current,
                additional,
                limit: self.max_total_bytes,
            });
        }
        Ok(())
    }

    /// Check if a file size exceeds the limit.
    pub fn check_file_size(&self, size: u64) -> Result<(), FsLimitExceeded> {
        if size > self.max_file_size {
            return Err(FsLimitExceeded::FileSize {
                size,
                limit: self.max_file_size,
            });
        }
        Ok(())
    }

    /// Check if adding a file would exceed the count limit.
    pub fn check_file_count(&self, current: u64) -> Result<(), FsLimitExceeded> {
        if current >= self.max_file_count {
            return Err(FsLimitExceeded::FileCount {
                current,
                limit: self.max_file_count,
            });
        }
        Ok(())
    }
}

/// Error returned when a stub limit is exceeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FsLimitExceeded {
    /// Total content size would exceed limit.
    TotalBytes {
        current: u64,
        additional: u64,
        limit: u64,
    },
    /// Single file size exceeds limit.
    FileSize { size: u64, limit: u64 },
    /// File count would exceed limit.
    FileCount { current: u64, limit: u64 },
    /// Path nesting exceeds limit.
    PathTooDeep { depth: usize, limit: usize },
    /// Path exceeds length limit.
    PathTooLong { length: usize, limit: usize },
}

impl fmt::Display for FsLimitExceeded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FsLimitExceeded::TotalBytes {
                current,
                additional,
                limit,
            } => write!(
                f,
                "filesystem full: {} + {} bytes exceeds {} byte limit",
                current, additional, limit
            ),
            FsLimitExceeded::FileSize { size, limit } => write!(
                f,
                "file too large: {} bytes exceeds {} byte limit",
                size, limit
            ),
            FsLimitExceeded::FileCount { current, limit } => write!(
                f,
                "too many files: {} files at {} file limit",
                current, limit
            ),
            FsLimitExceeded::PathTooDeep { depth, limit } => write!(
                f,
                "path too deep: {} levels exceeds {} level limit",
                depth, limit
            ),
            FsLimitExceeded::PathTooLong { length, limit } => write!(
                f,
                "path too long: {} bytes exceeds {} byte limit",
                length, limit
            ),
        }
    }
}

impl std::error::Error for FsLimitExceeded {}

/// Stub storage usage statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FsUsage {
    /// Total content bytes.
    pub total_bytes: u64,
    /// Number of existing files with content.
    pub file_count: u64,
    /// Number of existing directories.
    pub dir_count: u64,
}

impl FsUsage {
    pub fn new(total_bytes: u64, file_count: u64, dir_count: u64) -> Self {
        Self {
            total_bytes,
            file_count,
            dir_count,
        }
    }
}
