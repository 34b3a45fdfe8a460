//! # Windows Registry File Importer
//!
//! Imports textual registry files (`.reg`) by replaying them as key and
//! value operations against a hierarchical key/value store.
//!
//! ## Features
//!
//! - **All historical dialects**: `REGEDIT` (Windows 3.1), `REGEDIT4` and
//!   `Windows Registry Editor Version 5.00`
//! - **Both encodings**: UTF-16LE (with BOM) and narrow code page text, decoded
//!   line by line without an external decoder
//! - **Streaming**: lines of any length from any [`std::io::Read`], read once
//! - **Typed values**: escaped strings, `dword:`, `hex:` and `hex(N):` data
//! - **Forgiving**: malformed lines are skipped and reported, never fatal
//!
//! ## Architecture
//!
//! ```text
//! bytes ─► encoding ─► reader (lines) ─► header (dialect)
//!                                           │
//!                                           ▼
//!                        parser (state machine) ─► codec (typed data)
//!                                           │
//!                                           ▼
//!                               store (RegistryStore trait)
//! ```
//!
//! ## File format
//!
//! ```text
//! Windows Registry Editor Version 5.00
//!
//! [HKEY_CURRENT_USER\Software\Example]
//! @="default value"
//! "Name"="escaped \"string\""
//! "Count"=dword:0000002a
//! "Blob"=hex:de,ad,be,ef
//! "Paths"=hex(7):41,00,00,00,\
//!   42,00,00,00,00,00
//! ```
//!
//! ## Examples
//!
//! ```rust
//! use reg_import::{import, ImportError, ImportOptions, MemoryStore, ValueData};
//!
//! let file = "REGEDIT4\r\n[HKEY_CURRENT_USER\\Foo]\r\n\"Answer\"=dword:0000002A\r\n";
//! let mut store = MemoryStore::new();
//!
//! // The structured dialects are replayed in full, then reported as not
//! // yet supported end to end.
//! let result = import(file.as_bytes(), &mut store, &ImportOptions::default());
//! assert!(matches!(result, Err(ImportError::NotImplemented { .. })));
//!
//! let value = store.value("HKCU\\Foo", Some("Answer")).unwrap();
//! assert_eq!(value.data(), ValueData::Dword(42));
//! ```
//!
//! ## Known limitations
//!
//! - Key deletion (`[-key]`) and value deletion (`"name"=-`) are recognized
//!   and reported but not executed.
//! - Runs of `REGEDIT4` and version 5.00 files end with
//!   [`ImportError::NotImplemented`] after their values have been written.
//! - Headers starting with `REGEDIT` but naming no known version are
//!   recognized and refused.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod codec;
pub mod encoding;
pub mod error;
pub mod header;
pub mod memory;
pub mod options;
pub mod parser;
pub mod reader;
pub mod report;
pub mod store;
pub mod value;

// Re-export main types for convenience
pub use codec::{ParseType, TypeTag};
pub use encoding::TextEncoding;
pub use error::{ImportError, Result, StoreError};
pub use header::{classify_header, Dialect};
pub use memory::{MemoryKey, MemoryStore, StoreOp, StoredKey, StoredValue};
pub use options::ImportOptions;
pub use parser::{import, import_file, Importer, ParserState};
pub use reader::LineReader;
pub use report::{Diagnostic, DiagnosticKind, ImportReport};
pub use store::{RegistryStore, RootKey};
pub use value::{ValueData, ValueType};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
