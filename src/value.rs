//! Registry value types and typed views of value data.

use byteorder::{BigEndian, LittleEndian, ReadBytesExt};
use encoding_rs::UTF_16LE;
use std::fmt;
use std::io::Cursor;

/// Registry value data types.
///
/// Any 32-bit code is a valid type (`hex(N):` may declare arbitrary ones);
/// codes without a name are kept as [`ValueType::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    /// No value type.
    None,

    /// String (null-terminated).
    String,

    /// String with environment variables.
    ExpandString,

    /// Binary data.
    Binary,

    /// 32-bit little-endian integer.
    Dword,

    /// 32-bit big-endian integer.
    DwordBigEndian,

    /// Symbolic link (Unicode).
    Link,

    /// Multiple strings.
    MultiString,

    /// Resource list.
    ResourceList,

    /// Full resource descriptor.
    FullResourceDescriptor,

    /// Resource requirements list.
    ResourceRequirementsList,

    /// 64-bit little-endian integer.
    Qword,

    /// Non-standard value type, holding the raw code.
    Unknown(u32),
}

impl ValueType {
    /// Returns the numeric type code.
    pub fn as_u32(&self) -> u32 {
        match self {
            ValueType::None => 0,
            ValueType::String => 1,
            ValueType::ExpandString => 2,
            ValueType::Binary => 3,
            ValueType::Dword => 4,
            ValueType::DwordBigEndian => 5,
            ValueType::Link => 6,
            ValueType::MultiString => 7,
            ValueType::ResourceList => 8,
            ValueType::FullResourceDescriptor => 9,
            ValueType::ResourceRequirementsList => 10,
            ValueType::Qword => 11,
            ValueType::Unknown(code) => *code,
        }
    }

    /// Returns the name of this value type.
    pub fn name(&self) -> String {
        match self {
            ValueType::None => "REG_NONE".to_string(),
            ValueType::String => "REG_SZ".to_string(),
            ValueType::ExpandString => "REG_EXPAND_SZ".to_string(),
            ValueType::Binary => "REG_BINARY".to_string(),
            ValueType::Dword => "REG_DWORD".to_string(),
            ValueType::DwordBigEndian => "REG_DWORD_BIG_ENDIAN".to_string(),
            ValueType::Link => "REG_LINK".to_string(),
            ValueType::MultiString => "REG_MULTI_SZ".to_string(),
            ValueType::ResourceList => "REG_RESOURCE_LIST".to_string(),
            ValueType::FullResourceDescriptor => "REG_FULL_RESOURCE_DESCRIPTOR".to_string(),
            ValueType::ResourceRequirementsList => "REG_RESOURCE_REQUIREMENTS_LIST".to_string(),
            ValueType::Qword => "REG_QWORD".to_string(),
            ValueType::Unknown(value) => format!("REG_UNKNOWN_{:#010x}", value),
        }
    }
}

impl From<u32> for ValueType {
    fn from(value: u32) -> Self {
        match value {
            0 => ValueType::None,
            1 => ValueType::String,
            2 => ValueType::ExpandString,
            3 => ValueType::Binary,
            4 => ValueType::Dword,
            5 => ValueType::DwordBigEndian,
            6 => ValueType::Link,
            7 => ValueType::MultiString,
            8 => ValueType::ResourceList,
            9 => ValueType::FullResourceDescriptor,
            10 => ValueType::ResourceRequirementsList,
            11 => ValueType::Qword,
            _ => ValueType::Unknown(value),
        }
    }
}

impl From<ValueType> for u32 {
    fn from(value: ValueType) -> Self {
        value.as_u32()
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for ValueType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.name())
    }
}

/// Typed view of stored value data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueData {
    /// No data.
    None,

    /// String value.
    String(String),

    /// Expandable string value.
    ExpandString(String),

    /// Binary data.
    Binary(Vec<u8>),

    /// 32-bit integer.
    Dword(u32),

    /// 32-bit big-endian integer.
    DwordBigEndian(u32),

    /// Multiple strings.
    MultiString(Vec<String>),

    /// 64-bit integer.
    Qword(u64),

    /// Data of a type without a typed view, or too short for its type.
    Unknown(Vec<u8>),
}

impl ValueData {
    /// Interprets raw value bytes according to `value_type`.
    ///
    /// Strings are decoded from UTF-16LE with trailing NULs trimmed. Data
    /// that is too short for a fixed-size type is returned as
    /// [`ValueData::Unknown`].
    pub fn parse(data: &[u8], value_type: ValueType) -> Self {
        if data.is_empty() {
            return ValueData::None;
        }

        match value_type {
            ValueType::None => ValueData::Binary(data.to_vec()),

            ValueType::String => ValueData::String(read_utf16_string(data)),

            ValueType::ExpandString => ValueData::ExpandString(read_utf16_string(data)),

            ValueType::Binary => ValueData::Binary(data.to_vec()),

            ValueType::Dword => Cursor::new(data)
                .read_u32::<LittleEndian>()
                .map(ValueData::Dword)
                .unwrap_or_else(|_| ValueData::Unknown(data.to_vec())),

            ValueType::DwordBigEndian => Cursor::new(data)
                .read_u32::<BigEndian>()
                .map(ValueData::DwordBigEndian)
                .unwrap_or_else(|_| ValueData::Unknown(data.to_vec())),

            ValueType::Qword => Cursor::new(data)
                .read_u64::<LittleEndian>()
                .map(ValueData::Qword)
                .unwrap_or_else(|_| ValueData::Unknown(data.to_vec())),

            ValueType::MultiString => {
                let strings = read_utf16_string(data)
                    .split('\0')
                    .filter(|s| !s.is_empty())
                    .map(|s| s.to_string())
                    .collect();
                ValueData::MultiString(strings)
            }

            _ => ValueData::Unknown(data.to_vec()),
        }
    }
}

impl fmt::Display for ValueData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueData::None => f.write_str("(none)"),
            ValueData::String(s) | ValueData::ExpandString(s) => f.write_str(s),
            ValueData::Binary(b) | ValueData::Unknown(b) => f.write_str(&format_hex_bytes(b)),
            ValueData::Dword(d) | ValueData::DwordBigEndian(d) => write!(f, "{} (0x{:08X})", d, d),
            ValueData::Qword(q) => write!(f, "{} (0x{:016X})", q, q),
            ValueData::MultiString(strings) => f.write_str(&strings.join(", ")),
        }
    }
}

/// Formats bytes the way `.reg` files spell them: `41,00,42,00`.
pub fn format_hex_bytes(data: &[u8]) -> String {
    data.iter()
        .map(|b| hex::encode([*b]))
        .collect::<Vec<_>>()
        .join(",")
}

/// Decodes UTF-16LE data, trimming NUL terminators. An odd trailing byte is
/// ignored.
fn read_utf16_string(data: &[u8]) -> String {
    let even = &data[..data.len() & !1];
    let (decoded, _had_errors) = UTF_16LE.decode_without_bom_handling(even);
    decoded.trim_end_matches('\0').to_string()
}
