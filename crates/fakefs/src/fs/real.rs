//! Pass-through filesystem backed by the host operating system.
//!
//! [`DefaultFileSystem`] is what production code wires in. Every operation
//! forwards to `std::fs` and reports native errors unchanged.
//!
//! # Fail Points (enabled with `failpoints` feature)
//!
//! - `real::delete` - Fail `delete` with an injected I/O error
//! - `real::rename` - Fail `rename` with an injected I/O error
//! - `real::input_stream` - Fail `get_input_stream` with an injected I/O error
//! - `real::output_stream` - Fail `get_output_stream` with an injected I/O error

use std::fs::{self, File, OpenOptions};
use std::io::ErrorKind;
use std::path::Path;

#[cfg(feature = "failpoints")]
use fail::fail_point;

use super::file::FakeFile;
use super::traits::{FileSystem, InputStream, OutputStream};
use crate::error::Result;

/// Host filesystem.
///
/// [`FakeFile`] handles from this filesystem are plain paths: properties
/// attached to them are ignored.
///
/// # Example
///
/// ```rust,no_run
/// use fakefs::{DefaultFileSystem, FileSystem};
///
/// let fs = DefaultFileSystem::new();
/// let config = fs.file("/etc/hostname");
/// if fs.exists(&config)? {
///     println!("{}", fs.read_to_string(&config)?);
/// }
/// # Ok::<(), fakefs::Error>(())
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultFileSystem;

impl DefaultFileSystem {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(feature = "failpoints")]
fn injected(op: &str, action: Option<String>) -> crate::Error {
    let kind = match action.as_deref() {
        Some("not_found") => ErrorKind::NotFound,
        Some("permission_denied") => ErrorKind::PermissionDenied,
        _ => ErrorKind::Other,
    };
    std::io::Error::new(kind, format!("injected {} failure", op)).into()
}

impl FileSystem for DefaultFileSystem {
    fn file(&self, path: &str) -> FakeFile {
        FakeFile::new(path)
    }

    fn exists(&self, file: &FakeFile) -> Result<bool> {
        Ok(Path::new(file.path()).try_exists()?)
    }

    fn is_directory(&self, file: &FakeFile) -> Result<bool> {
        Ok(Path::new(file.path()).is_dir())
    }

    fn delete(&self, file: &FakeFile) -> Result<bool> {
        #[cfg(feature = "failpoints")]
        fail_point!("real::delete", |action| Err(injected("delete", action)));

        #[cfg(feature = "logging")]
        tracing::trace!(target: "fakefs::real", path = %file.path(), "delete");

        let path = Path::new(file.path());
        let meta = match fs::symlink_metadata(path) {
            Ok(meta) => meta,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(e.into()),
        };

        let removed = if meta.is_dir() {
            fs::remove_dir(path)
        } else {
            fs::remove_file(path)
        };

        match removed {
            Ok(()) => Ok(true),
            Err(e) if meta.is_dir() && e.kind() == ErrorKind::DirectoryNotEmpty => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn mkdirs(&self, file: &FakeFile) -> Result<bool> {
        #[cfg(feature = "logging")]
        tracing::trace!(target: "fakefs::real", path = %file.path(), "mkdirs");

        let path = Path::new(file.path());
        match path.try_exists() {
            Ok(false) => {}
            Ok(true) => return Ok(false),
            Err(e) if e.kind() == ErrorKind::NotADirectory => return Ok(false),
            Err(e) => return Err(e.into()),
        }
        match fs::create_dir_all(path) {
            Ok(()) => Ok(true),
            // A regular file somewhere on the way
            Err(e) if matches!(e.kind(), ErrorKind::AlreadyExists | ErrorKind::NotADirectory) => {
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn list(&self, file: &FakeFile) -> Result<Vec<FakeFile>> {
        let path = Path::new(file.path());
        if !path.is_dir() {
            return Ok(Vec::new());
        }

        let mut children = Vec::new();
        for entry in fs::read_dir(path)? {
            let entry = entry?;
            children.push(FakeFile::new(entry.path().to_string_lossy()));
        }
        children.sort_by(|a, b| a.path().cmp(b.path()));
        Ok(children)
    }

    fn get_input_stream(&self, file: &FakeFile) -> Result<InputStream> {
        #[cfg(feature = "failpoints")]
        fail_point!("real::input_stream", |action| Err(injected(
            "input stream",
            action
        )));

        #[cfg(feature = "logging")]
        tracing::trace!(target: "fakefs::real", path = %file.path(), "open for read");

        Ok(Box::new(File::open(file.path())?))
    }

    fn get_output_stream(&self, file: &FakeFile, append: bool) -> Result<OutputStream> {
        #[cfg(feature = "failpoints")]
        fail_point!("real::output_stream", |action| Err(injected(
            "output stream",
            action
        )));

        #[cfg(feature = "logging")]
        tracing::trace!(target: "fakefs::real", path = %file.path(), append, "open for write");

        let handle = OpenOptions::new()
            .create(true)
            .write(true)
            .append(append)
            .truncate(!append)
            .open(file.path())?;
        Ok(Box::new(handle))
    }

    fn rename(&self, from: &FakeFile, to: &FakeFile) -> Result<bool> {
        #[cfg(feature = "failpoints")]
        fail_point!("real::rename", |action| Err(injected("rename", action)));

        #[cfg(feature = "logging")]
        tracing::trace!(target: "fakefs::real", from = %from.path(), to = %to.path(), "rename");

        if !Path::new(from.path()).try_exists()? {
            return Ok(false);
        }
        fs::rename(from.path(), to.path())?;
        Ok(true)
    }
}
