//! Logging configuration for fakefs
//!
//! Events are emitted through `tracing` when the `logging` feature is on:
//!
//! - **DEBUG** (`fakefs::stub`): every stub operation, with the path and
//!   whether a test override handled it
//! - **TRACE** (`fakefs::stub`, `fakefs::real`): stream traffic and
//!   pass-through calls
//!
//! File contents are not logged unless [`LogConfig::log_file_contents`] is
//! enabled. Logged values are sanitized against log injection and truncated.

use std::borrow::Cow;

/// Configuration for logging behavior.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Whether to include file contents in logs (default: false)
    pub log_file_contents: bool,

    /// Maximum length of logged values before truncation (default: 200)
    pub max_value_length: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_file_contents: false,
            max_value_length: 200,
        }
    }
}

impl LogConfig {
    /// Create a new log configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable logging of file contents
    pub fn log_file_contents(mut self, enabled: bool) -> Self {
        self.log_file_contents = enabled;
        self
    }

    /// Set maximum length for logged values
    pub fn max_value_length(mut self, len: usize) -> Self {
        self.max_value_length = len;
        self
    }

    /// Render file content for a log line.
    ///
    /// Without `log_file_contents` only the size is shown.
    pub fn format_content_for_log(&self, content: &[u8]) -> String {
        if !self.log_file_contents {
            return format!("[{} bytes]", content.len());
        }

        let text = String::from_utf8_lossy(content);
        let sanitized = sanitize_for_log(&text);
        self.truncate(&sanitized).into_owned()
    }

    /// Truncate value if it exceeds max length
    ///
    /// Handles UTF-8 char boundaries properly to avoid panics on multi-byte chars.
    fn truncate<'a>(&self, value: &'a str) -> Cow<'a, str> {
        if value.len() <= self.max_value_length {
            Cow::Borrowed(value)
        } else {
            let mut end = self.max_value_length;
            while end > 0 && !value.is_char_boundary(end) {
                end -= 1;
            }
            Cow::Owned(format!(
                "{}...[truncated {} bytes]",
                &value[..end],
                value.len() - end
            ))
        }
    }
}

/// Escape characters that could forge extra log lines.
pub fn sanitize_for_log(input: &str) -> String {
    input
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t")
        .chars()
        .filter(|c| !c.is_control() || *c == ' ')
        .collect()
}
