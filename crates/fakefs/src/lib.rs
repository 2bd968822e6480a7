//! fakefs - Filesystem seam with an in-memory test double
//!
//! Application code is written against the [`FileSystem`] trait. Production
//! wires in [`DefaultFileSystem`], which forwards to the host filesystem.
//! Tests wire in a [`StubFileSystem`], which keeps everything in memory and
//! lets a test replace any single operation while keeping the rest.
//!
//! # Example
//!
//! ```rust
//! use fakefs::{Content, Error, FileSystem, StubFileSystem};
//!
//! /// Code under test: archive a report, then remove the original.
//! fn archive(fs: &dyn FileSystem, path: &str) -> fakefs::Result<()> {
//!     let source = fs.file(path);
//!     let text = fs.read_to_string(&source)?;
//!     fs.write_string(&fs.file(&format!("{}.bak", path)), &text)?;
//!     fs.delete(&source)?;
//!     Ok(())
//! }
//!
//! // Forbid deletes, keep everything else in memory.
//! let fs = StubFileSystem::builder()
//!     .on_delete(|_, file| Err(Error::forbidden(file.path())))
//!     .build();
//! fs.file("/reports/q3.csv").set_property(Content::text("revenue,42"));
//!
//! let err = archive(&fs, "/reports/q3.csv").unwrap_err();
//! assert!(err.is_forbidden());
//! assert_eq!(fs.read_to_string(&fs.file("/reports/q3.csv.bak"))?, "revenue,42");
//! assert!(fs.exists(&fs.file("/reports/q3.csv"))?);
//! # Ok::<(), fakefs::Error>(())
//! ```
//!
//! # Features
//!
//! - `logging`: emit `tracing` events for every stub operation
//! - `failpoints`: fault injection in [`DefaultFileSystem`] via `fail`

mod digest;
mod error;
mod fs;
mod logging_impl;

pub use digest::{
    Digest, DigestHandle, DigestReader, DigestWriter, Md5, Sha1, Sha256, hex_digest,
};
pub use error::{Error, Result};
pub use fs::{
    Content, DefaultFileSystem, Defaults, Directory, Exists, FakeFile, FileProperty, FileSystem,
    FsLimitExceeded, FsLimits, FsUsage, InputStream, OutputStream, Permissions, StubFileSystem,
    StubFileSystemBuilder, TextReader, TextWriter,
};
pub use logging_impl::{LogConfig, sanitize_for_log};
