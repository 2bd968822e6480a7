//! Filesystem trait definitions

use std::io::{BufReader, BufWriter, Read, Write};

use super::file::FakeFile;
use crate::error::Result;

/// Byte source returned by [`FileSystem::get_input_stream`].
pub type InputStream = Box<dyn Read>;

/// Byte sink returned by [`FileSystem::get_output_stream`].
pub type OutputStream = Box<dyn Write>;

/// UTF-8 text reader layered over an [`InputStream`].
pub type TextReader = BufReader<InputStream>;

/// UTF-8 text writer layered over an [`OutputStream`].
///
/// Buffered: call `flush()` to observe write errors, dropping flushes
/// silently.
pub type TextWriter = BufWriter<OutputStream>;

/// Filesystem capability interface.
///
/// Application code is written against this trait. Production wires in
/// [`DefaultFileSystem`](super::DefaultFileSystem); tests substitute a
/// [`StubFileSystem`](super::StubFileSystem) or their own implementation.
///
/// Every operation either succeeds or surfaces an [`Error`](crate::Error) to
/// the caller. Implementations perform no retries.
pub trait FileSystem {
    /// Get a handle for `path`. The same path yields an equal handle.
    fn file(&self, path: &str) -> FakeFile;

    /// Check if the file exists.
    fn exists(&self, file: &FakeFile) -> Result<bool>;

    /// Check if the file exists and is a directory.
    fn is_directory(&self, file: &FakeFile) -> Result<bool>;

    /// Delete a file or an empty directory.
    ///
    /// Returns `false` if nothing was deleted.
    fn delete(&self, file: &FakeFile) -> Result<bool>;

    /// Create a directory and any missing parents.
    ///
    /// Returns `false` if the directory already exists or cannot be created.
    fn mkdirs(&self, file: &FakeFile) -> Result<bool>;

    /// Children of a directory. Empty if `file` is not a directory.
    fn list(&self, file: &FakeFile) -> Result<Vec<FakeFile>>;

    /// Open the file for reading.
    ///
    /// # Errors
    /// - `NotFound` if the file has no readable content
    fn get_input_stream(&self, file: &FakeFile) -> Result<InputStream>;

    /// Open the file for writing. With `append` the existing content is
    /// extended, otherwise it is replaced.
    fn get_output_stream(&self, file: &FakeFile, append: bool) -> Result<OutputStream>;

    /// Open the file for reading text.
    fn reader(&self, file: &FakeFile) -> Result<TextReader> {
        Ok(BufReader::new(self.get_input_stream(file)?))
    }

    /// Open the file for writing text, replacing existing content.
    fn writer(&self, file: &FakeFile) -> Result<TextWriter> {
        Ok(BufWriter::new(self.get_output_stream(file, false)?))
    }

    /// Rename `from` to `to`, replacing an existing `to` the way the host
    /// filesystem does.
    ///
    /// Returns `false` if `from` does not exist.
    ///
    /// # Errors
    /// - `InvalidInput` when moving a directory into its own subtree
    /// - `IsADirectory` / `NotADirectory` when `to` exists with the other kind
    /// - `DirectoryNotEmpty` when `to` is a directory with children
    fn rename(&self, from: &FakeFile, to: &FakeFile) -> Result<bool>;

    /// Read the whole file as UTF-8 text.
    fn read_to_string(&self, file: &FakeFile) -> Result<String> {
        let mut text = String::new();
        self.reader(file)?.read_to_string(&mut text)?;
        Ok(text)
    }

    /// Replace the file's content with `text`.
    fn write_string(&self, file: &FakeFile, text: &str) -> Result<()> {
        let mut writer = self.writer(file)?;
        writer.write_all(text.as_bytes())?;
        writer.flush()?;
        Ok(())
    }
}

/// Constructors for the errors a real filesystem would report.
pub(crate) mod fs_errors {
    use std::io::{Error as IoError, ErrorKind};

    use crate::error::Error;

    pub(crate) fn not_found(path: &str) -> Error {
        IoError::new(ErrorKind::NotFound, format!("{}: file not found", path)).into()
    }

    pub(crate) fn is_a_directory(path: &str) -> Error {
        IoError::new(ErrorKind::IsADirectory, format!("{}: is a directory", path)).into()
    }

    pub(crate) fn not_a_directory(path: &str) -> Error {
        IoError::new(ErrorKind::NotADirectory, format!("{}: not a directory", path)).into()
    }

    pub(crate) fn directory_not_empty(path: &str) -> Error {
        IoError::new(
            ErrorKind::DirectoryNotEmpty,
            format!("{}: directory not empty", path),
        )
        .into()
    }

    pub(crate) fn invalid_input(path: &str, reason: &str) -> Error {
        IoError::new(ErrorKind::InvalidInput, format!("{}: {}", path, reason)).into()
    }

    pub(crate) fn permission_denied(path: &str) -> Error {
        IoError::new(
            ErrorKind::PermissionDenied,
            format!("{}: permission denied", path),
        )
        .into()
    }
}
