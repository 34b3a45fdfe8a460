//! Input encoding detection and line decoding.
//!
//! A registry file is either UTF-16LE, announced by the byte order mark
//! `FF FE`, or narrow text in the local code page. Nothing else is sniffed:
//! when the first two bytes are not a BOM they are ordinary content.

use encoding_rs::{Encoding, UTF_16LE};

/// UTF-16LE byte order mark.
pub const UTF16LE_BOM: [u8; 2] = [0xFF, 0xFE];

/// Encoding of the text following the first two bytes of the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum TextEncoding {
    /// Single-byte code page text.
    Narrow,

    /// UTF-16LE text.
    Wide,
}

impl TextEncoding {
    /// Decides the encoding from the first two bytes of the stream.
    pub fn detect(first_two: [u8; 2]) -> Self {
        if first_two == UTF16LE_BOM {
            TextEncoding::Wide
        } else {
            TextEncoding::Narrow
        }
    }

    /// Size of one code unit in bytes.
    pub fn unit_size(&self) -> usize {
        match self {
            TextEncoding::Narrow => 1,
            TextEncoding::Wide => 2,
        }
    }

    /// Returns the code unit starting at `index` (in units).
    #[inline]
    pub(crate) fn unit_at(&self, bytes: &[u8], index: usize) -> u16 {
        match self {
            TextEncoding::Narrow => bytes[index] as u16,
            TextEncoding::Wide => u16::from_le_bytes([bytes[index * 2], bytes[index * 2 + 1]]),
        }
    }

    /// Decodes one line worth of raw bytes.
    ///
    /// Narrow text goes through `code_page`; malformed sequences are replaced
    /// rather than rejected, since a line that fails to decode is still
    /// parsed (and most likely skipped) by the grammar.
    pub fn decode(&self, bytes: &[u8], code_page: &'static Encoding) -> String {
        let encoding = match self {
            TextEncoding::Narrow => code_page,
            TextEncoding::Wide => UTF_16LE,
        };
        let (decoded, _had_errors) = encoding.decode_without_bom_handling(bytes);
        decoded.into_owned()
    }
}

/// Encodes a string the way a native store keeps `REG_SZ` data:
/// UTF-16LE code units followed by a terminating NUL.
pub fn encode_reg_sz(text: &str) -> Vec<u8> {
    let mut bytes = Vec::with_capacity((text.len() + 1) * 2);
    for unit in text.encode_utf16().chain(std::iter::once(0)) {
        bytes.extend_from_slice(&unit.to_le_bytes());
    }
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;
    use encoding_rs::WINDOWS_1252;

    #[test]
    fn test_detect() {
        assert_eq!(TextEncoding::detect([0xFF, 0xFE]), TextEncoding::Wide);
        assert_eq!(TextEncoding::detect([0xFE, 0xFF]), TextEncoding::Narrow);
        assert_eq!(TextEncoding::detect(*b"RE"), TextEncoding::Narrow);
    }

    #[test]
    fn test_decode_narrow_code_page() {
        let text = TextEncoding::Narrow.decode(b"caf\xe9", WINDOWS_1252);
        assert_eq!(text, "caf\u{e9}");
    }

    #[test]
    fn test_decode_wide() {
        let bytes = [b'H', 0, b'i', 0];
        assert_eq!(TextEncoding::Wide.decode(&bytes, WINDOWS_1252), "Hi");
    }

    #[test]
    fn test_unit_at() {
        let bytes = [0x0D, 0x00, 0x41, 0x00];
        assert_eq!(TextEncoding::Wide.unit_at(&bytes, 0), 0x0D);
        assert_eq!(TextEncoding::Wide.unit_at(&bytes, 1), 0x41);
        assert_eq!(TextEncoding::Narrow.unit_at(&bytes, 2), 0x41);
    }

    #[test]
    fn test_encode_reg_sz() {
        assert_eq!(encode_reg_sz(""), vec![0, 0]);
        assert_eq!(encode_reg_sz("Baz"), vec![b'B', 0, b'a', 0, b'z', 0, 0, 0]);
    }
}
