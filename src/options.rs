//! Import configuration.

use encoding_rs::{Encoding, WINDOWS_1252};

/// Initial capacity of the line buffer, in code units.
pub const DEFAULT_BUFFER_UNITS: usize = 4096;

/// Smallest accepted line buffer capacity, in code units.
pub const MIN_BUFFER_UNITS: usize = 4;

/// Options controlling an import run.
///
/// # Examples
///
/// ```rust
/// use reg_import::ImportOptions;
///
/// let options = ImportOptions::default()
///     .with_code_page_label("iso-8859-2")
///     .unwrap()
///     .with_initial_buffer_units(256);
/// assert_eq!(options.code_page().name(), "ISO-8859-2");
/// assert_eq!(options.initial_buffer_units(), 256);
/// ```
#[derive(Debug, Clone)]
pub struct ImportOptions {
    code_page: &'static Encoding,
    initial_buffer_units: usize,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            code_page: WINDOWS_1252,
            initial_buffer_units: DEFAULT_BUFFER_UNITS,
        }
    }
}

impl ImportOptions {
    /// Creates the default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the code page used to decode narrow (non-BOM) files.
    pub fn with_code_page(mut self, code_page: &'static Encoding) -> Self {
        self.code_page = code_page;
        self
    }

    /// Sets the narrow code page from a WHATWG encoding label such as
    /// `"windows-1251"`. Returns `None` for unknown labels.
    pub fn with_code_page_label(self, label: &str) -> Option<Self> {
        Encoding::for_label(label.trim().as_bytes()).map(|code_page| self.with_code_page(code_page))
    }

    /// Sets the initial line buffer capacity, in code units.
    ///
    /// Values below [`MIN_BUFFER_UNITS`] are raised to it.
    pub fn with_initial_buffer_units(mut self, units: usize) -> Self {
        self.initial_buffer_units = units.max(MIN_BUFFER_UNITS);
        self
    }

    /// Code page used for narrow files.
    pub fn code_page(&self) -> &'static Encoding {
        self.code_page
    }

    /// Initial line buffer capacity, in code units.
    pub fn initial_buffer_units(&self) -> usize {
        self.initial_buffer_units
    }
}
