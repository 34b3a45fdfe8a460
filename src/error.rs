//! Error types for registry file import operations.
//!
//! Only run-level failures live here: I/O problems, an unusable header and
//! the dialects whose write path is not available. Problems confined to a
//! single line are recovered by the parser and surface as
//! [`Diagnostic`](crate::report::Diagnostic)s instead.

use crate::header::Dialect;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for import operations.
pub type Result<T> = std::result::Result<T, ImportError>;

/// Errors that abort an import run.
#[derive(Error, Debug)]
pub enum ImportError {
    /// I/O error occurred while reading the registry file.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The registry file could not be found.
    #[error("Unable to find the specified file: {}", path.display())]
    FileNotFound {
        /// Path that was requested.
        path: PathBuf,
    },

    /// The stream ended before the encoding could be detected.
    #[error("Input too short: {size} bytes (minimum: 2 bytes)")]
    InputTooShort {
        /// Number of bytes available.
        size: usize,
    },

    /// The first line is not a registry file header.
    #[error("Invalid registry file header: {found:?}")]
    InvalidHeader {
        /// The header line as read (after leading blanks were trimmed).
        found: String,
    },

    /// The header starts with `REGEDIT` but names no supported version.
    #[error("Unsupported registry file header: {found:?}")]
    UnsupportedHeader {
        /// The header line as read (after leading blanks were trimmed).
        found: String,
    },

    /// The dialect was parsed but its write path is not implemented.
    #[error("Import of {dialect} files is not yet implemented")]
    NotImplemented {
        /// Dialect of the file.
        dialect: Dialect,
    },
}

impl ImportError {
    /// Creates an invalid header error from the classified line.
    pub fn invalid_header(found: &str) -> Self {
        Self::InvalidHeader {
            found: found.to_string(),
        }
    }

    /// Creates an unsupported header error from the classified line.
    pub fn unsupported_header(found: &str) -> Self {
        Self::UnsupportedHeader {
            found: found.to_string(),
        }
    }

    /// Returns true when the error was caused by the file header.
    pub fn is_header_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidHeader { .. } | Self::UnsupportedHeader { .. }
        )
    }
}

/// Errors reported by a [`RegistryStore`](crate::store::RegistryStore) backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The path does not start with a known root key.
    #[error("Unknown root key in path '{path}'")]
    UnknownRootKey {
        /// Full key path as written in the file.
        path: String,
    },

    /// The handle does not refer to an open key.
    #[error("Key handle is not open")]
    KeyNotOpen,

    /// Backend specific failure.
    #[error("Store error: {0}")]
    Backend(String),
}
