//! In-memory output stream backing [`StubFileSystem::get_output_stream`].
//!
//! [`StubFileSystem::get_output_stream`]: super::StubFileSystem

use std::io::{self, ErrorKind, Write};

use super::file::FakeFile;
use super::limits::FsLimits;
use super::property::Content;
use super::stub::{Registry, usage_of};
use crate::logging_impl::LogConfig;

/// Write-through sink into a file's [`Content`] property.
///
/// Every `write` lands in the property immediately, so content is visible to
/// readers before the stream is dropped.
pub(crate) struct ContentWriter {
    file: FakeFile,
    registry: Registry,
    limits: FsLimits,
    #[cfg_attr(not(feature = "logging"), allow(dead_code))]
    log_config: LogConfig,
}

impl ContentWriter {
    pub(crate) fn new(
        file: FakeFile,
        registry: Registry,
        limits: FsLimits,
        log_config: LogConfig,
    ) -> Self {
        Self {
            file,
            registry,
            limits,
            log_config,
        }
    }
}

impl Write for ContentWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        let current = self
            .file
            .inspect_property(|content: &Content| content.len() as u64)
            .ok_or_else(|| {
                io::Error::new(
                    ErrorKind::NotFound,
                    format!("{}: deleted or renamed while open", self.file.path()),
                )
            })?;

        let additional = buf.len() as u64;
        self.limits
            .check_file_size(current.saturating_add(additional))
            .map_err(io::Error::other)?;
        let total = usage_of(&self.registry.borrow()).total_bytes;
        self.limits
            .check_total_bytes(total, additional)
            .map_err(io::Error::other)?;

        #[cfg(feature = "logging")]
        tracing::trace!(
            target: "fakefs::stub",
            path = %self.file.path(),
            content = %self.log_config.format_content_for_log(buf),
            "write"
        );

        self.file
            .update_property(|content: &mut Content| content.0.extend_from_slice(buf));
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
