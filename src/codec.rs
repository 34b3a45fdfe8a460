//! Value syntax decoding: data type tags, escaped strings, DWORDs and hex
//! byte lists.
//!
//! All functions work on the text that follows the `=` of a value line and
//! return the unparsed remainder where the caller needs it.

use crate::value::ValueType;

/// How the payload after a type tag is decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParseType {
    /// Escaped, double-quoted string.
    String,

    /// Up to eight hex digits.
    Dword,

    /// Comma-separated hex bytes.
    Binary,
}

/// A recognized data type tag.
///
/// `declared` is the type recorded with the value, `parse` the payload
/// syntax. They only disagree for `hex(N):`, whose payload is raw bytes
/// whatever `N` says.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeTag {
    /// Type written to the store.
    pub declared: ValueType,
    /// Syntax of the payload.
    pub parse: ParseType,
}

impl TypeTag {
    const fn new(declared: ValueType, parse: ParseType) -> Self {
        Self { declared, parse }
    }
}

/// Tags with a fixed type, in match order.
const FIXED_TAGS: [(&str, TypeTag); 3] = [
    ("\"", TypeTag::new(ValueType::String, ParseType::String)),
    ("hex:", TypeTag::new(ValueType::Binary, ParseType::Binary)),
    ("dword:", TypeTag::new(ValueType::Dword, ParseType::Dword)),
];

/// Prefix of the generic `hex(N):` tag.
const HEX_TYPED_PREFIX: &str = "hex(";

/// Returns true for the blanks the grammar skips.
#[inline]
pub fn is_blank(c: char) -> bool {
    c == ' ' || c == '\t'
}

/// Skips leading spaces and tabs.
#[inline]
pub fn skip_blanks(s: &str) -> &str {
    s.trim_start_matches(is_blank)
}

/// Trims trailing spaces and tabs.
#[inline]
pub fn trim_trailing_blanks(s: &str) -> &str {
    s.trim_end_matches(is_blank)
}

/// Returns true if `s` is empty or a `;` comment.
#[inline]
pub fn is_blank_or_comment(s: &str) -> bool {
    s.is_empty() || s.starts_with(';')
}

/// Recognizes the data type tag at the start of `data`.
///
/// Returns the tag and the payload following it. For the string form the
/// opening quote is consumed, so the payload is ready for [`unescape`].
///
/// # Examples
///
/// ```rust
/// use reg_import::codec::{parse_data_type, ParseType};
/// use reg_import::ValueType;
///
/// let (tag, rest) = parse_data_type("hex(7):41,00").unwrap();
/// assert_eq!(tag.declared, ValueType::MultiString);
/// assert_eq!(tag.parse, ParseType::Binary);
/// assert_eq!(rest, "41,00");
///
/// assert!(parse_data_type("qword:1").is_none());
/// ```
pub fn parse_data_type(data: &str) -> Option<(TypeTag, &str)> {
    for (prefix, tag) in FIXED_TAGS {
        if let Some(rest) = data.strip_prefix(prefix) {
            return Some((tag, rest));
        }
    }

    let rest = data.strip_prefix(HEX_TYPED_PREFIX)?;
    let digits_end = rest
        .find(|c: char| !c.is_ascii_hexdigit())
        .unwrap_or(rest.len());
    // An empty code is not a type; `hex():` is rejected rather than read as 0.
    if digits_end == 0 {
        return None;
    }

    let payload = rest[digits_end..].strip_prefix("):")?;
    // Overflow of the 32-bit range is rejected here.
    let code = u32::from_str_radix(&rest[..digits_end], 16).ok()?;

    Some((TypeTag::new(ValueType::from(code), ParseType::Binary), payload))
}

/// Result of unescaping a double-quoted string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unescaped<'a> {
    /// The decoded text, without quotes.
    pub text: String,
    /// Input following the closing quote.
    pub rest: &'a str,
    /// Characters that followed a backslash without forming a known escape.
    /// They are kept in `text` without the backslash.
    pub unknown_escapes: Vec<char>,
}

/// Decodes an escaped string whose opening quote was already consumed.
///
/// `\n`, `\r` and `\0` become newline, carriage return and NUL; `\\` and
/// `\"` become a backslash and a quote; any other escaped character is kept
/// as is and recorded in [`Unescaped::unknown_escapes`]. The first
/// unescaped `"` ends the string.
///
/// Returns `None` if there is no closing quote or the input ends in a lone
/// backslash.
///
/// # Examples
///
/// ```rust
/// use reg_import::codec::unescape;
///
/// let s = unescape(r#"a\n\r\\\"" ; trailing"#).unwrap();
/// assert_eq!(s.text, "a\n\r\\\"");
/// assert_eq!(s.rest, " ; trailing");
///
/// assert!(unescape("no closing quote").is_none());
/// ```
pub fn unescape(input: &str) -> Option<Unescaped<'_>> {
    let mut text = String::with_capacity(input.len());
    let mut unknown_escapes = Vec::new();
    let mut chars = input.char_indices();

    while let Some((_, c)) = chars.next() {
        match c {
            '\\' => {
                let (_, escaped) = chars.next()?;
                match escaped {
                    'n' => text.push('\n'),
                    'r' => text.push('\r'),
                    '0' => text.push('\0'),
                    '\\' | '"' => text.push(escaped),
                    other => {
                        unknown_escapes.push(other);
                        text.push(other);
                    }
                }
            }
            '"' => {
                let rest = chars.as_str();
                return Some(Unescaped {
                    text,
                    rest,
                    unknown_escapes,
                });
            }
            other => text.push(other),
        }
    }

    None
}

/// Converts the payload of a `dword:` value.
///
/// Leading blanks are skipped, at most eight hex digits are read and the
/// remainder must be blank or a comment. A payload with no digits is zero
/// only when a comment follows; an entirely blank payload is rejected.
///
/// # Examples
///
/// ```rust
/// use reg_import::codec::parse_dword;
///
/// assert_eq!(parse_dword("0000002A"), Some(42));
/// assert_eq!(parse_dword(" ff ; comment"), Some(255));
/// assert_eq!(parse_dword("123456789"), None);
/// assert_eq!(parse_dword("12 34"), None);
/// ```
pub fn parse_dword(input: &str) -> Option<u32> {
    let s = skip_blanks(input);
    if s.is_empty() {
        return None;
    }

    let digits_end = s.find(|c: char| !c.is_ascii_hexdigit()).unwrap_or(s.len());
    if digits_end > 8 {
        return None;
    }

    if !is_blank_or_comment(skip_blanks(&s[digits_end..])) {
        return None;
    }

    if digits_end == 0 {
        return Some(0);
    }
    u32::from_str_radix(&s[..digits_end], 16).ok()
}

/// Outcome of decoding one line of a hex byte list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HexLine {
    /// The list ends on this line.
    Complete,
    /// The line ended with `\`; the list continues on the next line.
    Continued,
}

/// Decodes one line of a `hex:` / `hex(N):` byte list into `out`.
///
/// Bytes are one or two hex digits separated by commas, with optional
/// blanks around them. A trailing comma is allowed, a `;` starts a comment
/// and a final `\` continues the list on the next line.
///
/// Returns `None` on a malformed token; bytes decoded before it are left in
/// `out` for the caller to discard.
///
/// # Examples
///
/// ```rust
/// use reg_import::codec::{parse_hex_bytes, HexLine};
///
/// let mut bytes = Vec::new();
/// assert_eq!(parse_hex_bytes("41,00,\\", &mut bytes), Some(HexLine::Continued));
/// assert_eq!(parse_hex_bytes("  42,00", &mut bytes), Some(HexLine::Complete));
/// assert_eq!(bytes, vec![0x41, 0x00, 0x42, 0x00]);
///
/// assert_eq!(parse_hex_bytes("4g", &mut bytes), None);
/// ```
pub fn parse_hex_bytes(input: &str, out: &mut Vec<u8>) -> Option<HexLine> {
    let mut s = input;

    loop {
        s = skip_blanks(s);
        if is_blank_or_comment(s) {
            return Some(HexLine::Complete);
        }
        if let Some(after) = s.strip_prefix('\\') {
            let after = skip_blanks(after);
            return is_blank_or_comment(after).then_some(HexLine::Continued);
        }

        let digits_end = s
            .char_indices()
            .take(2)
            .take_while(|(_, c)| c.is_ascii_hexdigit())
            .count();
        if digits_end == 0 {
            return None;
        }
        out.push(u8::from_str_radix(&s[..digits_end], 16).ok()?);

        s = skip_blanks(&s[digits_end..]);
        if is_blank_or_comment(s) {
            return Some(HexLine::Complete);
        }
        s = s.strip_prefix(',')?;
    }
}
