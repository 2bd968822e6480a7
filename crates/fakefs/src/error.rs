//! Error types for fakefs
//!
//! Failures fall into the categories callers need to tell apart:
//! - Native I/O failures, including "not found", reported as [`std::io::Error`]
//!   so the in-memory stub fails exactly like the real filesystem would
//! - Operations a test double deliberately rejects ([`Error::Forbidden`])
//! - Operations a test asserts must never happen ([`Error::Unsupported`])

use std::io;

use thiserror::Error;

use crate::fs::FsLimitExceeded;

/// Result type alias using fakefs's Error.
pub type Result<T> = std::result::Result<T, Error>;

/// fakefs error types.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error from a filesystem operation.
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    /// A test override rejected the operation.
    #[error("operation forbidden: {0}")]
    Forbidden(String),

    /// A test override asserts the operation must not occur.
    #[error("unsupported operation: {0}")]
    Unsupported(String),

    /// In-memory resource limit exceeded.
    #[error("resource limit exceeded: {0}")]
    ResourceLimit(#[from] FsLimitExceeded),
}

impl Error {
    /// Create a [`Error::Forbidden`] error.
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    /// Create a [`Error::Unsupported`] error.
    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::Unsupported(message.into())
    }

    /// True if this is a "not found" condition.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Io(e) if e.kind() == io::ErrorKind::NotFound)
    }

    /// True if a test override rejected the operation.
    pub fn is_forbidden(&self) -> bool {
        matches!(self, Error::Forbidden(_))
    }

    /// True if a test override asserted the operation must not occur.
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Error::Unsupported(_))
    }
}
