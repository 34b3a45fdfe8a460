//! Registry file header classification.
//!
//! The first line of a `.reg` file names its dialect. Three headers are
//! known exactly; any other line beginning with `REGEDIT` is accepted as a
//! registry file whose contents are never imported, which is how the
//! platform's own editor treats headers like `REGEDIT 4` or `REGEDIT4FOO`.

use std::fmt;

/// Header of the flat Windows 3.1 dialect.
pub const HEADER_31: &str = "REGEDIT";

/// Header of the version 4 dialect.
pub const HEADER_40: &str = "REGEDIT4";

/// Header of the version 5 dialect.
pub const HEADER_50: &str = "Windows Registry Editor Version 5.00";

/// Registry file dialect selected by the header line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Dialect {
    /// `REGEDIT`: one `HKEY_CLASSES_ROOT` assignment per line.
    Legacy31,

    /// `REGEDIT4`: structured key/value grammar.
    V40,

    /// `Windows Registry Editor Version 5.00`: structured key/value grammar.
    V50,

    /// Starts with `REGEDIT` but is not a supported version.
    FuzzyHeader,

    /// Not a registry file.
    Invalid,
}

impl Dialect {
    /// Returns true if the body uses the bracketed key / quoted value grammar.
    pub fn is_structured(&self) -> bool {
        matches!(self, Dialect::V40 | Dialect::V50)
    }

    /// Returns true if the body of a file with this header is parsed at all.
    pub fn is_importable(&self) -> bool {
        matches!(self, Dialect::Legacy31 | Dialect::V40 | Dialect::V50)
    }

    /// Returns the canonical header line, if the dialect has one.
    pub fn header(&self) -> Option<&'static str> {
        match self {
            Dialect::Legacy31 => Some(HEADER_31),
            Dialect::V40 => Some(HEADER_40),
            Dialect::V50 => Some(HEADER_50),
            Dialect::FuzzyHeader | Dialect::Invalid => None,
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Dialect::Legacy31 => "REGEDIT (Windows 3.1)",
            Dialect::V40 => "REGEDIT4",
            Dialect::V50 => "version 5.00",
            Dialect::FuzzyHeader => "unsupported REGEDIT",
            Dialect::Invalid => "invalid",
        };
        f.write_str(name)
    }
}

/// Strips the spaces and tabs allowed in front of a header.
pub fn trim_header(line: &str) -> &str {
    line.trim_start_matches([' ', '\t'])
}

/// Classifies a header line.
///
/// Leading spaces and tabs are ignored; the comparison is case-sensitive and
/// trailing characters are significant.
///
/// # Examples
///
/// ```rust
/// use reg_import::header::{classify_header, Dialect};
///
/// assert_eq!(classify_header("REGEDIT4"), Dialect::V40);
/// assert_eq!(classify_header("\tREGEDIT"), Dialect::Legacy31);
/// assert_eq!(classify_header("REGEDIT 4"), Dialect::FuzzyHeader);
/// assert_eq!(classify_header("regedit4"), Dialect::Invalid);
/// ```
pub fn classify_header(line: &str) -> Dialect {
    let s = trim_header(line);

    match s {
        HEADER_31 => Dialect::Legacy31,
        HEADER_40 => Dialect::V40,
        HEADER_50 => Dialect::V50,
        _ if s.starts_with(HEADER_31) => Dialect::FuzzyHeader,
        _ => Dialect::Invalid,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_headers() {
        assert_eq!(classify_header("REGEDIT"), Dialect::Legacy31);
        assert_eq!(classify_header("REGEDIT4"), Dialect::V40);
        assert_eq!(
            classify_header("Windows Registry Editor Version 5.00"),
            Dialect::V50
        );
    }

    #[test]
    fn test_leading_blanks_are_ignored() {
        assert_eq!(classify_header("  \t REGEDIT4"), Dialect::V40);
        assert_eq!(
            classify_header(" Windows Registry Editor Version 5.00"),
            Dialect::V50
        );
    }

    #[test]
    fn test_trailing_text_is_significant() {
        assert_eq!(classify_header("REGEDIT4 "), Dialect::FuzzyHeader);
        assert_eq!(classify_header("REGEDIT9"), Dialect::FuzzyHeader);
        assert_eq!(classify_header("REGEDIT4FOO"), Dialect::FuzzyHeader);
        assert_eq!(
            classify_header("Windows Registry Editor Version 5.00 "),
            Dialect::Invalid
        );
    }

    #[test]
    fn test_invalid_headers() {
        assert_eq!(classify_header(""), Dialect::Invalid);
        assert_eq!(classify_header("NOTAHEADER"), Dialect::Invalid);
        assert_eq!(classify_header("REGEDI"), Dialect::Invalid);
        assert_eq!(classify_header("regedit"), Dialect::Invalid);
        assert_eq!(
            classify_header("Windows Registry Editor Version 4.00"),
            Dialect::Invalid
        );
    }

    #[test]
    fn test_dialect_properties() {
        assert!(Dialect::V40.is_structured());
        assert!(Dialect::V50.is_structured());
        assert!(!Dialect::Legacy31.is_structured());
        assert!(Dialect::Legacy31.is_importable());
        assert!(!Dialect::FuzzyHeader.is_importable());
        assert!(!Dialect::Invalid.is_importable());
        assert_eq!(Dialect::V40.header(), Some(HEADER_40));
        assert_eq!(Dialect::Invalid.header(), None);
    }
}
