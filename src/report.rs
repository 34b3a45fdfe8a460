//! Per-run accounting of what the importer did and what it skipped.

use crate::encoding::TextEncoding;
use crate::header::Dialect;
use std::fmt;

/// A recoverable problem met while importing.
///
/// Line-local problems discard the rest of the offending line; operational
/// ones (a key that cannot be opened, a rejected write) leave parsing
/// untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum DiagnosticKind {
    /// `[` without a closing `]`, or a key name starting with a blank.
    MalformedKey,
    /// The store refused to open or create the key.
    KeyOpenFailed {
        /// Key path as written in the file.
        path: String,
        /// Reason given by the store.
        reason: String,
    },
    /// `[-path]` was found; key deletion is not supported.
    KeyDeletionUnsupported {
        /// Key path following the `-`.
        path: String,
    },
    /// A quoted value name has no closing quote.
    InvalidValueName,
    /// A value name is not followed by `=`.
    MissingAssignment,
    /// `=-` was found; value deletion is not supported.
    ValueDeletionUnsupported,
    /// The data does not start with a known type tag.
    UnknownDataType,
    /// A backslash escape that is not `\n`, `\r`, `\0`, `\\` or `\"`.
    UnknownEscape {
        /// The escaped character, kept literally.
        escape: char,
    },
    /// String data is unterminated or followed by something other than a
    /// comment.
    InvalidStringData,
    /// `dword:` data is not up to eight hex digits.
    InvalidDwordData,
    /// A hex byte list is malformed or ends inside a continuation.
    InvalidHexData,
    /// The store rejected a value write.
    SetValueFailed {
        /// Reason given by the store.
        reason: String,
    },
}

/// A [`DiagnosticKind`] with the line it was found on.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Diagnostic {
    /// 1-based line number.
    pub line: usize,
    /// What happened.
    pub kind: DiagnosticKind,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: ", self.line)?;
        match &self.kind {
            DiagnosticKind::MalformedKey => f.write_str("malformed key name"),
            DiagnosticKind::KeyOpenFailed { path, reason } => {
                write!(f, "unable to open the registry key '{}': {}", path, reason)
            }
            DiagnosticKind::KeyDeletionUnsupported { path } => {
                write!(f, "key deletion is not implemented ('{}')", path)
            }
            DiagnosticKind::InvalidValueName => f.write_str("unterminated value name"),
            DiagnosticKind::MissingAssignment => f.write_str("value name without '='"),
            DiagnosticKind::ValueDeletionUnsupported => {
                f.write_str("value deletion is not implemented")
            }
            DiagnosticKind::UnknownDataType => f.write_str("unrecognized data type"),
            DiagnosticKind::UnknownEscape { escape } => {
                write!(f, "unrecognized escape sequence '\\{}'", escape)
            }
            DiagnosticKind::InvalidStringData => f.write_str("invalid string data"),
            DiagnosticKind::InvalidDwordData => f.write_str("invalid dword data"),
            DiagnosticKind::InvalidHexData => f.write_str("invalid hex data"),
            DiagnosticKind::SetValueFailed { reason } => {
                write!(f, "unable to set the value: {}", reason)
            }
        }
    }
}

/// Summary of an import run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ImportReport {
    /// Detected input encoding, once known.
    pub encoding: Option<TextEncoding>,
    /// Dialect named by the header, once classified.
    pub dialect: Option<Dialect>,
    /// Logical lines read, header included.
    pub lines: usize,
    /// Keys successfully opened.
    pub keys_opened: usize,
    /// Values successfully written.
    pub values_written: usize,
    /// Recoverable problems, in input order.
    pub diagnostics: Vec<Diagnostic>,
}

impl ImportReport {
    /// Returns true if nothing had to be skipped.
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Iterates over diagnostics of kinds matching `predicate`.
    pub fn diagnostics_matching<'a, F>(&'a self, predicate: F) -> impl Iterator<Item = &'a Diagnostic>
    where
        F: Fn(&DiagnosticKind) -> bool + 'a,
    {
        self.diagnostics.iter().filter(move |d| predicate(&d.kind))
    }
}
