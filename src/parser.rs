//! The import state machine.
//!
//! [`Importer`] walks the file one line at a time. Each [`ParserState`] has
//! a handler that receives a byte cursor into the current line and either
//! returns a new cursor (to be handled by the next state on the same line)
//! or fetches a fresh line itself. The run ends when the line source is
//! exhausted or the header turns out to be unusable.
//!
//! ```text
//! Header ──► ParseLegacyLine ──► SetValue ──► ParseLegacyLine ...
//!    │
//!    └─────► LineStart ─┬─► KeyName ──────────────────────────► LineStart
//!                       ├─► DefaultValueName ─┐
//!                       └─► QuotedValueName ──┴─► DataStart ─► DataType
//!
//! DataType ─┬─► StringData ─┐
//!           ├─► DwordData ──┼─► SetValue ─► LineStart
//!           └─► HexData ────┘
//! ```
//!
//! Any handler that meets malformed syntax records a
//! [`Diagnostic`](crate::report::Diagnostic), drops whatever it staged and
//! goes back to `LineStart`, which discards the rest of the line.

use crate::codec::{
    is_blank, is_blank_or_comment, parse_data_type, parse_dword, parse_hex_bytes, skip_blanks,
    trim_trailing_blanks, unescape, HexLine, ParseType,
};
use crate::encoding::{encode_reg_sz, TextEncoding};
use crate::error::{ImportError, Result, StoreError};
use crate::header::{classify_header, trim_header, Dialect};
use crate::options::ImportOptions;
use crate::reader::LineReader;
use crate::report::{Diagnostic, DiagnosticKind, ImportReport};
use crate::store::RegistryStore;
use crate::value::ValueType;
use byteorder::{ByteOrder, LittleEndian};
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;
use tracing::{debug, info, instrument, trace, warn};

/// Root token every line of a `REGEDIT` (3.1) file must start with.
pub const CLASSES_ROOT_TOKEN: &str = "HKEY_CLASSES_ROOT";

/// States of the import automaton.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParserState {
    /// Reading and classifying the header line.
    Header,
    /// Reading a `REGEDIT` (3.1) assignment line.
    ParseLegacyLine,
    /// At the beginning of a line.
    LineStart,
    /// After `[`.
    KeyName,
    /// At `@`.
    DefaultValueName,
    /// After the opening quote of a value name.
    QuotedValueName,
    /// After a value name, expecting `=`.
    DataStart,
    /// At the data type tag.
    DataType,
    /// Inside an escaped string payload.
    StringData,
    /// Inside a `dword:` payload.
    DwordData,
    /// Inside a `hex:` or `hex(N):` payload.
    HexData,
    /// Writing the staged value.
    SetValue,
}

/// The key currently open in the store.
struct OpenKey<K> {
    handle: K,
    path: String,
}

/// Replays a registry file against a [`RegistryStore`].
///
/// # Examples
///
/// ```rust
/// use reg_import::{Importer, ImportOptions, MemoryStore, ValueData};
///
/// let input = "REGEDIT\r\nHKEY_CLASSES_ROOT\\.txt = txtfile\r\n";
/// let mut store = MemoryStore::new();
/// let mut importer = Importer::new(input.as_bytes(), &mut store, &ImportOptions::default())?;
/// importer.run()?;
/// assert_eq!(importer.report().values_written, 1);
/// drop(importer);
///
/// let value = store.value("HKCR\\.txt", None).unwrap();
/// assert_eq!(value.data(), ValueData::String("txtfile".to_string()));
/// # Ok::<(), reg_import::ImportError>(())
/// ```
pub struct Importer<R: Read, S: RegistryStore> {
    reader: LineReader<R>,
    store: S,
    line: String,
    dialect: Option<Dialect>,
    state: ParserState,
    key: Option<OpenKey<S::Key>>,
    value_name: Option<String>,
    data_type: ValueType,
    parse_type: ParseType,
    data: Option<Vec<u8>>,
    report: ImportReport,
}

impl<R: Read, S: RegistryStore> Importer<R, S> {
    /// Reads the first two bytes of `input` to detect its encoding and
    /// prepares a run against `store`.
    ///
    /// # Errors
    ///
    /// Returns [`ImportError::InputTooShort`] if fewer than two bytes are
    /// available, or the read error.
    pub fn new(mut input: R, store: S, options: &ImportOptions) -> Result<Self> {
        let mut first_two = [0u8; 2];
        let mut filled = 0;
        while filled < first_two.len() {
            match input.read(&mut first_two[filled..]) {
                Ok(0) => break,
                Ok(count) => filled += count,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        if filled < first_two.len() {
            return Err(ImportError::InputTooShort { size: filled });
        }

        let encoding = TextEncoding::detect(first_two);
        debug!(?encoding, "Detected input encoding");

        let reader = LineReader::with_options(input, encoding, options);
        let reader = match encoding {
            // Not a BOM: the two bytes are the start of the header.
            TextEncoding::Narrow => reader.with_prefix(&first_two),
            TextEncoding::Wide => reader,
        };

        Ok(Self {
            reader,
            store,
            line: String::new(),
            dialect: None,
            state: ParserState::Header,
            key: None,
            value_name: None,
            data_type: ValueType::None,
            parse_type: ParseType::Binary,
            data: None,
            report: ImportReport {
                encoding: Some(encoding),
                ..Default::default()
            },
        })
    }

    /// Runs the state machine to the end of the input.
    ///
    /// Values are written to the store as they are parsed. Afterwards the
    /// open key is closed and the line source released, whatever the
    /// outcome.
    ///
    /// # Errors
    ///
    /// - [`ImportError::InvalidHeader`] / [`ImportError::UnsupportedHeader`]
    ///   when the header rules the file out; nothing is written.
    /// - [`ImportError::NotImplemented`] after replaying a `REGEDIT4` or
    ///   version 5.00 file, whose write path is not complete.
    /// - [`ImportError::Io`] when reading fails.
    pub fn run(&mut self) -> Result<()> {
        let mut pos = 0;
        let outcome = loop {
            match self.step(pos) {
                Ok(Some(next)) => pos = next,
                Ok(None) => break Ok(()),
                Err(e) => break Err(e),
            }
        };
        self.finish();
        outcome?;

        match self.dialect {
            Some(dialect) if dialect.is_structured() => {
                warn!(%dialect, "Import operation not yet implemented");
                Err(ImportError::NotImplemented { dialect })
            }
            _ => {
                info!(
                    keys = self.report.keys_opened,
                    values = self.report.values_written,
                    diagnostics = self.report.diagnostics.len(),
                    "Import finished"
                );
                Ok(())
            }
        }
    }

    /// The current state.
    pub fn state(&self) -> ParserState {
        self.state
    }

    /// The dialect, once the header has been read.
    pub fn dialect(&self) -> Option<Dialect> {
        self.dialect
    }

    /// What has been done so far.
    pub fn report(&self) -> &ImportReport {
        &self.report
    }

    /// The store being written to.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Consumes the importer, returning the store and the report.
    pub fn into_parts(self) -> (S, ImportReport) {
        (self.store, self.report)
    }

    /// Runs the handler of the current state.
    ///
    /// Returns the cursor for the next handler, or `None` once the input is
    /// exhausted.
    fn step(&mut self, pos: usize) -> Result<Option<usize>> {
        let next = match self.state {
            ParserState::Header => return self.header_state(),
            ParserState::ParseLegacyLine => return self.parse_legacy_line_state(),
            ParserState::LineStart => return self.line_start_state(),
            ParserState::HexData => return self.hex_data_state(pos),
            ParserState::KeyName => self.key_name_state(pos),
            ParserState::DefaultValueName => self.default_value_name_state(pos),
            ParserState::QuotedValueName => self.quoted_value_name_state(pos),
            ParserState::DataStart => self.data_start_state(pos),
            ParserState::DataType => self.data_type_state(pos),
            ParserState::StringData => self.string_data_state(pos),
            ParserState::DwordData => self.dword_data_state(pos),
            ParserState::SetValue => self.set_value_state(pos),
        };
        Ok(Some(next))
    }

    fn set_state(&mut self, state: ParserState) {
        trace!(from = ?self.state, to = ?state, "State transition");
        self.state = state;
    }

    /// Replaces the current line with the next one from the source.
    fn fetch_line(&mut self) -> Result<bool> {
        match self.reader.next_line()? {
            Some(line) => {
                self.line = line;
                self.report.lines = self.reader.line_number();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn diagnose(&mut self, kind: DiagnosticKind) {
        let diagnostic = Diagnostic {
            line: self.reader.line_number(),
            kind,
        };
        warn!("{}", diagnostic);
        self.report.diagnostics.push(diagnostic);
    }

    fn diagnose_escapes(&mut self, escapes: Vec<char>) {
        for escape in escapes {
            self.diagnose(DiagnosticKind::UnknownEscape { escape });
        }
    }

    /// Closes the open key, if any, and forgets its value name.
    fn close_key(&mut self) {
        if let Some(key) = self.key.take() {
            debug!(path = %key.path, "Closing key");
            self.store.close_key(key.handle);
        }
        self.value_name = None;
    }

    /// Opens `path`, closing the previous key first. Failures are reported
    /// and leave no key open.
    fn open_key(&mut self, path: &str) -> bool {
        self.close_key();

        let result = match self.store.resolve_root(path) {
            Some((root, sub_path)) => self.store.open_or_create_key(root, sub_path),
            None => Err(StoreError::UnknownRootKey {
                path: path.to_string(),
            }),
        };

        match result {
            Ok(handle) => {
                debug!(path, "Opened key");
                self.key = Some(OpenKey {
                    handle,
                    path: path.to_string(),
                });
                self.report.keys_opened += 1;
                true
            }
            Err(e) => {
                self.diagnose(DiagnosticKind::KeyOpenFailed {
                    path: path.to_string(),
                    reason: e.to_string(),
                });
                false
            }
        }
    }

    /// Drops staged data and resumes at the next line.
    fn abandon_value(&mut self, kind: DiagnosticKind) {
        self.data = None;
        self.diagnose(kind);
        self.set_state(ParserState::LineStart);
    }

    /// Releases everything the run holds.
    fn finish(&mut self) {
        self.close_key();
        self.data = None;
        self.line = String::new();
        self.reader.reset();
    }

    fn header_state(&mut self) -> Result<Option<usize>> {
        if !self.fetch_line()? {
            self.line.clear();
        }

        let dialect = classify_header(&self.line);
        info!(%dialect, "Classified registry file header");
        self.dialect = Some(dialect);
        self.report.dialect = Some(dialect);

        if !dialect.is_importable() {
            let found = trim_header(&self.line);
            return Err(match dialect {
                Dialect::FuzzyHeader => ImportError::unsupported_header(found),
                _ => ImportError::invalid_header(found),
            });
        }

        if dialect.is_structured() {
            self.set_state(ParserState::LineStart);
        } else {
            self.set_state(ParserState::ParseLegacyLine);
        }
        Ok(Some(0))
    }

    fn parse_legacy_line_state(&mut self) -> Result<Option<usize>> {
        if !self.fetch_line()? {
            return Ok(None);
        }

        if !self.line.starts_with(CLASSES_ROOT_TOKEN) {
            return Ok(Some(0));
        }

        let key_end = self
            .line
            .find(char::is_whitespace)
            .unwrap_or(self.line.len());

        let value = skip_blanks(&self.line[key_end..]);
        let value = value.strip_prefix('=').unwrap_or(value);
        // At most one space is skipped after the '='.
        let value = value.strip_prefix(' ').unwrap_or(value);
        let value_pos = self.line.len() - value.len();

        let path = self.line[..key_end].to_string();
        if !self.open_key(&path) {
            return Ok(Some(key_end));
        }

        self.value_name = None;
        self.data_type = ValueType::String;
        self.parse_type = ParseType::String;
        self.data = Some(encode_reg_sz(&self.line[value_pos..]));

        self.set_state(ParserState::SetValue);
        Ok(Some(value_pos))
    }

    fn line_start_state(&mut self) -> Result<Option<usize>> {
        if !self.fetch_line()? {
            return Ok(None);
        }

        let first = self.line.char_indices().find(|(_, c)| !is_blank(*c));
        let pos = match first {
            Some((i, '[')) => {
                self.set_state(ParserState::KeyName);
                i + 1
            }
            Some((i, '@')) => {
                self.set_state(ParserState::DefaultValueName);
                i
            }
            Some((i, '"')) => {
                self.set_state(ParserState::QuotedValueName);
                i + 1
            }
            // Anything else, comments included, is skipped.
            Some((i, _)) => i,
            None => self.line.len(),
        };

        Ok(Some(pos))
    }

    fn key_name_state(&mut self, pos: usize) -> usize {
        let rest = &self.line[pos..];
        let key_end = match rest.rfind(']') {
            Some(end) if !rest.starts_with(is_blank) => end,
            _ => {
                self.diagnose(DiagnosticKind::MalformedKey);
                self.set_state(ParserState::LineStart);
                return pos;
            }
        };

        let name = rest[..key_end].to_string();
        if let Some(path) = name.strip_prefix('-') {
            warn!(path, "Key deletion not yet implemented");
            self.diagnose(DiagnosticKind::KeyDeletionUnsupported {
                path: path.to_string(),
            });
        } else {
            self.open_key(&name);
        }

        self.set_state(ParserState::LineStart);
        pos
    }

    fn default_value_name_state(&mut self, pos: usize) -> usize {
        self.value_name = None;
        self.set_state(ParserState::DataStart);
        pos + '@'.len_utf8()
    }

    fn quoted_value_name_state(&mut self, pos: usize) -> usize {
        self.value_name = None;

        let line_len = self.line.len();
        let parsed = unescape(&self.line[pos..])
            .map(|name| (name.text, line_len - name.rest.len(), name.unknown_escapes));

        match parsed {
            Some((name, next, escapes)) => {
                self.diagnose_escapes(escapes);
                self.value_name = Some(name);
                self.set_state(ParserState::DataStart);
                next
            }
            None => {
                self.diagnose(DiagnosticKind::InvalidValueName);
                self.set_state(ParserState::LineStart);
                pos
            }
        }
    }

    fn data_start_state(&mut self, pos: usize) -> usize {
        let rest = skip_blanks(&self.line[pos..]);
        let Some(data) = rest.strip_prefix('=') else {
            self.diagnose(DiagnosticKind::MissingAssignment);
            self.set_state(ParserState::LineStart);
            return pos;
        };

        let data = skip_blanks(data);
        let start = self.line.len() - data.len();
        let end = start + trim_trailing_blanks(data).len();
        self.line.truncate(end);

        if self.line[start..].starts_with('-') {
            warn!(name = ?self.value_name, "Value deletion not yet implemented");
            self.diagnose(DiagnosticKind::ValueDeletionUnsupported);
            self.set_state(ParserState::LineStart);
            return start;
        }

        self.set_state(ParserState::DataType);
        start
    }

    fn data_type_state(&mut self, pos: usize) -> usize {
        let line_len = self.line.len();
        let parsed = parse_data_type(&self.line[pos..]).map(|(tag, rest)| (tag, line_len - rest.len()));

        let Some((tag, next)) = parsed else {
            self.diagnose(DiagnosticKind::UnknownDataType);
            self.set_state(ParserState::LineStart);
            return pos;
        };

        self.data_type = tag.declared;
        self.parse_type = tag.parse;
        self.set_state(match tag.parse {
            ParseType::String => ParserState::StringData,
            ParseType::Dword => ParserState::DwordData,
            ParseType::Binary => ParserState::HexData,
        });
        next
    }

    fn string_data_state(&mut self, pos: usize) -> usize {
        let line_len = self.line.len();
        let parsed = unescape(&self.line[pos..]).map(|s| {
            let valid = is_blank_or_comment(skip_blanks(s.rest));
            (s.text, line_len - s.rest.len(), s.unknown_escapes, valid)
        });

        match parsed {
            Some((text, next, escapes, true)) => {
                self.diagnose_escapes(escapes);
                self.data = Some(encode_reg_sz(&text));
                self.set_state(ParserState::SetValue);
                next
            }
            Some((_, next, escapes, false)) => {
                self.diagnose_escapes(escapes);
                self.abandon_value(DiagnosticKind::InvalidStringData);
                next
            }
            None => {
                self.abandon_value(DiagnosticKind::InvalidStringData);
                pos
            }
        }
    }

    fn dword_data_state(&mut self, pos: usize) -> usize {
        let Some(value) = parse_dword(&self.line[pos..]) else {
            self.abandon_value(DiagnosticKind::InvalidDwordData);
            return pos;
        };

        let mut bytes = vec![0u8; 4];
        LittleEndian::write_u32(&mut bytes, value);
        self.data = Some(bytes);

        self.set_state(ParserState::SetValue);
        pos
    }

    fn hex_data_state(&mut self, pos: usize) -> Result<Option<usize>> {
        let mut bytes = Vec::new();
        let mut outcome = parse_hex_bytes(&self.line[pos..], &mut bytes);

        while outcome == Some(HexLine::Continued) {
            if !self.fetch_line()? {
                self.abandon_value(DiagnosticKind::InvalidHexData);
                return Ok(None);
            }
            let next = skip_blanks(&self.line);
            outcome = if next.starts_with(';') {
                Some(HexLine::Continued)
            } else {
                parse_hex_bytes(next, &mut bytes)
            };
        }

        if outcome.is_none() {
            self.abandon_value(DiagnosticKind::InvalidHexData);
            return Ok(Some(0));
        }

        self.data = Some(bytes);
        self.set_state(ParserState::SetValue);
        Ok(Some(self.line.len()))
    }

    fn set_value_state(&mut self, pos: usize) -> usize {
        let data = self.data.take().unwrap_or_default();

        let result = match &self.key {
            Some(key) => Some(self.store.set_value(
                &key.handle,
                self.value_name.as_deref(),
                self.data_type,
                &data,
            )),
            None => None,
        };

        match result {
            Some(Ok(())) => {
                debug!(
                    name = ?self.value_name,
                    value_type = %self.data_type,
                    parse_type = ?self.parse_type,
                    size = data.len(),
                    "Set value"
                );
                self.report.values_written += 1;
            }
            Some(Err(e)) => self.diagnose(DiagnosticKind::SetValueFailed {
                reason: e.to_string(),
            }),
            None => debug!(name = ?self.value_name, "No open key, value dropped"),
        }

        if self.dialect == Some(Dialect::Legacy31) {
            self.set_state(ParserState::ParseLegacyLine);
        } else {
            self.set_state(ParserState::LineStart);
        }
        pos
    }
}

/// Imports a registry file from a stream into `store`.
///
/// Returns the run's report on success. Use [`Importer`] directly to keep
/// the report of a failed run.
pub fn import<R: Read, S: RegistryStore>(
    input: R,
    store: S,
    options: &ImportOptions,
) -> Result<ImportReport> {
    let mut importer = Importer::new(input, store, options)?;
    importer.run()?;
    let (_, report) = importer.into_parts();
    Ok(report)
}

/// Imports the registry file at `path` into `store`.
///
/// # Errors
///
/// Returns [`ImportError::FileNotFound`] if the file does not exist, and
/// otherwise the errors of [`Importer::run`].
#[instrument(skip(path, store, options), fields(path = %path.as_ref().display()))]
pub fn import_file<P: AsRef<Path>, S: RegistryStore>(
    path: P,
    store: S,
    options: &ImportOptions,
) -> Result<ImportReport> {
    info!("Importing registry file");
    let file = File::open(&path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => ImportError::FileNotFound {
            path: path.as_ref().to_path_buf(),
        },
        _ => ImportError::Io(e),
    })?;
    import(file, store, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MemoryStore, StoreOp};
    use crate::value::ValueData;

    fn run(input: &str) -> (MemoryStore, ImportReport, Result<()>) {
        let mut store = MemoryStore::new();
        let (report, outcome) = {
            let mut importer =
                Importer::new(input.as_bytes(), &mut store, &ImportOptions::default()).unwrap();
            let outcome = importer.run();
            (importer.report().clone(), outcome)
        };
        (store, report, outcome)
    }

    #[test]
    fn test_initial_state() {
        let mut store = MemoryStore::new();
        let importer = Importer::new(&b"REGEDIT4\r\n"[..], &mut store, &ImportOptions::default())
            .unwrap();
        assert_eq!(importer.state(), ParserState::Header);
        assert_eq!(importer.dialect(), None);
        assert_eq!(importer.report().encoding, Some(TextEncoding::Narrow));
    }

    #[test]
    fn test_input_too_short() {
        let mut store = MemoryStore::new();
        let result = Importer::new(&b"R"[..], &mut store, &ImportOptions::default());
        assert!(matches!(result, Err(ImportError::InputTooShort { size: 1 })));
    }

    #[test]
    fn test_legacy_line_ignores_other_roots() {
        let (store, report, outcome) = run("REGEDIT\r\nHKEY_CURRENT_USER\\x = y\r\n\r\n");
        assert!(outcome.is_ok());
        assert_eq!(report.keys_opened, 0);
        assert_eq!(store.operations().len(), 0);
    }

    #[test]
    fn test_legacy_value_keeps_extra_space() {
        let (store, _, outcome) = run("REGEDIT\nHKEY_CLASSES_ROOT\\.a =  two spaces\n");
        assert!(outcome.is_ok());
        assert_eq!(
            store.value("HKCR\\.a", None).unwrap().data(),
            ValueData::String(" two spaces".to_string())
        );
    }

    #[test]
    fn test_legacy_without_equals() {
        let (store, _, outcome) = run("REGEDIT\nHKEY_CLASSES_ROOT\\.b\tplain\n");
        assert!(outcome.is_ok());
        assert_eq!(
            store.value("HKCR\\.b", None).unwrap().data(),
            ValueData::String("plain".to_string())
        );
    }

    #[test]
    fn test_key_switch_closes_previous() {
        let (store, _, _) = run("REGEDIT4\n[HKCU\\A]\n[HKCU\\B]\n");
        let ops = store.operations();
        assert_eq!(
            ops,
            &[
                StoreOp::OpenKey {
                    path: "HKEY_CURRENT_USER\\A".to_string()
                },
                StoreOp::CloseKey {
                    path: "HKEY_CURRENT_USER\\A".to_string()
                },
                StoreOp::OpenKey {
                    path: "HKEY_CURRENT_USER\\B".to_string()
                },
                StoreOp::CloseKey {
                    path: "HKEY_CURRENT_USER\\B".to_string()
                },
            ]
        );
        assert_eq!(store.open_handles(), 0);
    }

    #[test]
    fn test_key_name_rejections() {
        let (store, report, _) = run("REGEDIT4\n[ HKCU\\A]\n[HKCU\\B\n");
        assert_eq!(report.keys_opened, 0);
        assert_eq!(store.operations().len(), 0);
        assert_eq!(report.diagnostics.len(), 2);
        assert!(report
            .diagnostics
            .iter()
            .all(|d| d.kind == DiagnosticKind::MalformedKey));
    }

    #[test]
    fn test_key_deletion_keeps_previous_key_open() {
        let (store, report, _) =
            run("REGEDIT4\n[HKEY_CURRENT_USER\\A]\n[-HKEY_CURRENT_USER\\B]\n\"x\"=dword:1\n");
        assert_eq!(
            store.value("HKCU\\A", Some("x")).unwrap().data(),
            ValueData::Dword(1)
        );
        assert!(store.key("HKCU\\B").is_none());
        assert_eq!(store.open_handles(), 0);
        assert_eq!(
            report.diagnostics[0].kind,
            DiagnosticKind::KeyDeletionUnsupported {
                path: "HKEY_CURRENT_USER\\B".to_string()
            }
        );
    }

    #[test]
    fn test_value_deletion_is_reported() {
        let (store, report, _) = run("REGEDIT4\n[HKCU\\A]\n\"x\"=-\n");
        assert_eq!(store.value_count(), 0);
        assert_eq!(report.diagnostics[0].kind, DiagnosticKind::ValueDeletionUnsupported);
        assert_eq!(report.diagnostics[0].line, 3);
    }

    #[test]
    fn test_blanks_around_equals() {
        let (store, _, _) = run("REGEDIT4\n[HKCU\\A]\n  \"x\" \t= \"y\"  \t\n");
        assert_eq!(
            store.value("HKCU\\A", Some("x")).unwrap().data(),
            ValueData::String("y".to_string())
        );
    }

    #[test]
    fn test_missing_equals_is_reported() {
        let (store, report, _) = run("REGEDIT4\n[HKCU\\A]\n\"x\" \"y\"\n@\n\"z\"=\"ok\"\n");
        assert_eq!(store.value_count(), 1);
        let lines: Vec<usize> = report
            .diagnostics_matching(|k| *k == DiagnosticKind::MissingAssignment)
            .map(|d| d.line)
            .collect();
        assert_eq!(lines, vec![3, 4]);
    }

    #[test]
    fn test_string_with_trailing_garbage() {
        let (store, report, _) =
            run("REGEDIT4\n[HKCU\\A]\n\"x\"=\"y\" z\n\"ok\"=\"v\" ; fine\n");
        assert!(store.value("HKCU\\A", Some("x")).is_none());
        assert!(store.value("HKCU\\A", Some("ok")).is_some());
        assert_eq!(report.diagnostics[0].kind, DiagnosticKind::InvalidStringData);
    }

    #[test]
    fn test_value_without_key_is_dropped() {
        let (store, report, _) = run("REGEDIT4\n\"x\"=\"y\"\n");
        assert_eq!(store.value_count(), 0);
        assert_eq!(report.values_written, 0);
    }

    #[test]
    fn test_hex_continuation_with_comment_line() {
        let input = "REGEDIT4\n[HKCU\\A]\n\"b\"=hex:01,02,\\\n  ; interleaved\n  03\n";
        let (store, _, _) = run(input);
        assert_eq!(store.value("HKCU\\A", Some("b")).unwrap().data, vec![1, 2, 3]);
    }

    #[test]
    fn test_hex_continuation_at_end_of_stream() {
        let (store, report, _) = run("REGEDIT4\n[HKCU\\A]\n\"b\"=hex:01,\\\n");
        assert_eq!(store.value_count(), 0);
        assert_eq!(report.diagnostics[0].kind, DiagnosticKind::InvalidHexData);
    }

    #[test]
    fn test_state_after_run_releases_everything() {
        let mut store = MemoryStore::new();
        let mut importer = Importer::new(
            &b"REGEDIT4\n[HKCU\\A]\n\"x\"=\"y\"\n"[..],
            &mut store,
            &ImportOptions::default(),
        )
        .unwrap();
        let _ = importer.run();
        assert_eq!(importer.state(), ParserState::LineStart);
        assert!(importer.key.is_none());
        assert!(importer.value_name.is_none());
        assert!(importer.data.is_none());
        assert!(importer.reader.is_closed());
    }
}
