//! Digest-computing stream adapters.
//!
//! [`DigestWriter`] and [`DigestReader`] pass bytes through to an inner
//! stream while feeding them to a hasher. Tests use them to verify what went
//! through a [`FileSystem`](crate::FileSystem) stream without capturing the
//! bytes themselves.
//!
//! The hasher state is shared with a [`DigestHandle`], so the digest stays
//! observable after the stream has been boxed and handed to code under test:
//!
//! ```rust
//! use fakefs::{DigestWriter, FileSystem, Sha256, StubFileSystem, hex_digest};
//! use std::io::Write;
//!
//! let fs = StubFileSystem::new();
//! let file = fs.file("/tmp/upload.bin");
//!
//! let writer = DigestWriter::<_, Sha256>::new(fs.get_output_stream(&file, false)?);
//! let handle = writer.handle();
//! let mut stream: Box<dyn Write> = Box::new(writer);
//! stream.write_all(b"payload")?;
//! drop(stream);
//!
//! assert_eq!(handle.hex_digest(), hex_digest::<Sha256>(b"payload"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::cell::RefCell;
use std::io::{self, Read, Write};
use std::rc::Rc;

pub use md5::Md5;
pub use sha1::Sha1;
pub use sha2::{Digest, Sha256};

/// Lowercase hex digest of `data`.
pub fn hex_digest<D: Digest>(data: &[u8]) -> String {
    let result = D::digest(data);
    result.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Shared view of a running digest.
pub struct DigestHandle<D> {
    hasher: Rc<RefCell<D>>,
}

impl<D> Clone for DigestHandle<D> {
    fn clone(&self) -> Self {
        Self {
            hasher: Rc::clone(&self.hasher),
        }
    }
}

impl<D: Digest + Clone> DigestHandle<D> {
    /// Digest of every byte seen so far. Does not reset the hasher.
    pub fn hex_digest(&self) -> String {
        let result = self.hasher.borrow().clone().finalize();
        result.iter().map(|b| format!("{:02x}", b)).collect()
    }
}

/// Writer that hashes everything written through it.
pub struct DigestWriter<W, D> {
    inner: W,
    hasher: Rc<RefCell<D>>,
}

impl<W: Write, D: Digest + Clone> DigestWriter<W, D> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            hasher: Rc::new(RefCell::new(D::new())),
        }
    }

    /// Handle that keeps reporting the digest after this writer is moved.
    pub fn handle(&self) -> DigestHandle<D> {
        DigestHandle {
            hasher: Rc::clone(&self.hasher),
        }
    }

    pub fn hex_digest(&self) -> String {
        self.handle().hex_digest()
    }

    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    /// Unwrap into the inner writer and the final digest.
    pub fn finish(self) -> (W, String) {
        let digest = self.hex_digest();
        (self.inner, digest)
    }
}

impl<W: Write, D: Digest> Write for DigestWriter<W, D> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let written = self.inner.write(buf)?;
        self.hasher.borrow_mut().update(&buf[..written]);
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Reader that hashes everything read through it.
pub struct DigestReader<R, D> {
    inner: R,
    hasher: Rc<RefCell<D>>,
}

impl<R: Read, D: Digest + Clone> DigestReader<R, D> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            hasher: Rc::new(RefCell::new(D::new())),
        }
    }

    pub fn handle(&self) -> DigestHandle<D> {
        DigestHandle {
            hasher: Rc::clone(&self.hasher),
        }
    }

    pub fn hex_digest(&self) -> String {
        self.handle().hex_digest()
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read, D: Digest> Read for DigestReader<R, D> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let read = self.inner.read(buf)?;
        self.hasher.borrow_mut().update(&buf[..read]);
        Ok(read)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_digests() {
        // md5("hello\n") = b1946ac92492d2347c6235b4d2611184
        assert_eq!(
            hex_digest::<Md5>(b"hello\n"),
            "b1946ac92492d2347c6235b4d2611184"
        );
        assert_eq!(
            hex_digest::<Sha1>(b"hello\n"),
            "f572d396fae9206628714fb2ce00f72e94f2258f"
        );
        assert_eq!(
            hex_digest::<Sha256>(b"hello\n"),
            "5891b5b522d5df086d0ff0b110fbd9d21bb4fc7163af34d08286a2e846f6be03"
        );
        assert_eq!(hex_digest::<Md5>(b""), "d41d8cd98f00b204e9800998ecf8427e");
    }

    #[test]
    fn writer_passes_bytes_through() {
        let mut writer = DigestWriter::<_, Md5>::new(Vec::new());
        writer.write_all(b"hel").unwrap();
        writer.write_all(b"lo\n").unwrap();
        let (inner, digest) = writer.finish();
        assert_eq!(inner, b"hello\n");
        assert_eq!(digest, "b1946ac92492d2347c6235b4d2611184");
    }

    #[test]
    fn handle_outlives_writer() {
        let writer = DigestWriter::<_, Sha1>::new(io::sink());
        let handle = writer.handle();
        let mut boxed: Box<dyn Write> = Box::new(writer);
        boxed.write_all(b"hello\n").unwrap();
        drop(boxed);
        assert_eq!(handle.hex_digest(), "f572d396fae9206628714fb2ce00f72e94f2258f");
    }

    #[test]
    fn reader_hashes_what_was_read() {
        let mut reader = DigestReader::<_, Sha256>::new(&b"hello\n"[..]);
        let mut out = String::new();
        reader.read_to_string(&mut out).unwrap();
        assert_eq!(out, "hello\n");
        assert_eq!(
            reader.hex_digest(),
            "5891b5b522d5df086d0ff0b110fbd9d21bb4fc7163af34d08286a2e846f6be03"
        );
        assert_eq!(reader.into_inner().len(), 0);
    }
}
