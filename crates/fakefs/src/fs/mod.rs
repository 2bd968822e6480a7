//! Filesystem seam for fakefs
//!
//! Provides the synchronous filesystem trait and implementations:
//! - `StubFileSystem`: In-memory test double with per-operation overrides
//! - `DefaultFileSystem`: Pass-through to the host filesystem

mod file;
mod limits;
mod property;
mod real;
mod stream;
mod stub;
mod traits;

pub use file::FakeFile;
pub use limits::{FsLimitExceeded, FsLimits, FsUsage};
pub use property::{Content, Directory, Exists, FileProperty, Permissions};
pub use real::DefaultFileSystem;
pub use stub::{Defaults, StubFileSystem, StubFileSystemBuilder};
pub use traits::{FileSystem, InputStream, OutputStream, TextReader, TextWriter};
