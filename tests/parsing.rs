//! Unit tests for the syntax building blocks.

use reg_import::codec::{parse_data_type, parse_dword, parse_hex_bytes, unescape, HexLine};
use reg_import::encoding::{encode_reg_sz, UTF16LE_BOM};
use reg_import::header::{HEADER_31, HEADER_40, HEADER_50};
use reg_import::*;

#[test]
fn test_header_constants() {
    assert_eq!(HEADER_31, "REGEDIT");
    assert_eq!(HEADER_40, "REGEDIT4");
    assert_eq!(HEADER_50, "Windows Registry Editor Version 5.00");
    assert_eq!(UTF16LE_BOM, [0xFF, 0xFE]);
}

#[test]
fn test_dialect_headers() {
    for dialect in [Dialect::Legacy31, Dialect::V40, Dialect::V50] {
        let header = dialect.header().unwrap();
        assert_eq!(classify_header(header), dialect);
        assert!(dialect.is_importable());
    }
    assert!(Dialect::FuzzyHeader.header().is_none());
    assert!(!Dialect::Invalid.is_importable());
    assert!(!Dialect::Legacy31.is_structured());
}

#[test]
fn test_header_classification() {
    assert_eq!(classify_header("\t REGEDIT4"), Dialect::V40);
    assert_eq!(classify_header("REGEDIT5"), Dialect::FuzzyHeader);
    assert_eq!(classify_header("regedit4"), Dialect::Invalid);
    assert_eq!(classify_header("Windows Registry Editor Version 5.0"), Dialect::Invalid);
    assert_eq!(classify_header(""), Dialect::Invalid);
}

#[test]
fn test_encoding_detection() {
    assert_eq!(TextEncoding::detect([0xFF, 0xFE]), TextEncoding::Wide);
    assert_eq!(TextEncoding::detect([0xFE, 0xFF]), TextEncoding::Narrow);
    assert_eq!(TextEncoding::detect(*b"RE"), TextEncoding::Narrow);
    assert_eq!(TextEncoding::Wide.unit_size(), 2);
    assert_eq!(TextEncoding::Narrow.unit_size(), 1);
}

#[test]
fn test_reg_sz_staging() {
    assert_eq!(encode_reg_sz(""), vec![0, 0]);
    assert_eq!(encode_reg_sz("A"), vec![0x41, 0, 0, 0]);
    assert_eq!(encode_reg_sz("\u{e9}"), vec![0xe9, 0, 0, 0]);
}

#[test]
fn test_value_type_names() {
    assert_eq!(ValueType::None.name(), "REG_NONE");
    assert_eq!(ValueType::String.name(), "REG_SZ");
    assert_eq!(ValueType::ExpandString.name(), "REG_EXPAND_SZ");
    assert_eq!(ValueType::Binary.name(), "REG_BINARY");
    assert_eq!(ValueType::Dword.name(), "REG_DWORD");
    assert_eq!(ValueType::MultiString.name(), "REG_MULTI_SZ");
    assert_eq!(ValueType::Qword.name(), "REG_QWORD");
}

#[test]
fn test_value_type_from_u32() {
    assert_eq!(ValueType::from(0), ValueType::None);
    assert_eq!(ValueType::from(1), ValueType::String);
    assert_eq!(ValueType::from(4), ValueType::Dword);
    assert_eq!(ValueType::from(11), ValueType::Qword);
    assert_eq!(ValueType::from(12), ValueType::Unknown(12));
}

#[test]
fn test_data_type_tags() {
    let (tag, rest) = parse_data_type("\"text\"").unwrap();
    assert_eq!(tag.declared, ValueType::String);
    assert_eq!(tag.parse, ParseType::String);
    assert_eq!(rest, "text\"");

    let (tag, rest) = parse_data_type("dword:ff").unwrap();
    assert_eq!(tag.declared, ValueType::Dword);
    assert_eq!(rest, "ff");

    let (tag, _) = parse_data_type("hex:00").unwrap();
    assert_eq!(tag.declared, ValueType::Binary);

    let (tag, _) = parse_data_type("hex(2):00").unwrap();
    assert_eq!(tag.declared, ValueType::ExpandString);
    assert_eq!(tag.parse, ParseType::Binary);

    let (tag, _) = parse_data_type("hex(FFFFFFFF):").unwrap();
    assert_eq!(tag.declared, ValueType::Unknown(0xFFFF_FFFF));
}

#[test]
fn test_data_type_rejections() {
    assert!(parse_data_type("hex():00").is_none());
    assert!(parse_data_type("hex(100000000):00").is_none());
    assert!(parse_data_type("hex(7)00").is_none());
    assert!(parse_data_type("hex(7x):00").is_none());
    assert!(parse_data_type("DWORD:1").is_none());
    assert!(parse_data_type("").is_none());
}

#[test]
fn test_unescape() {
    let s = unescape(r#"say \"hi\"" rest"#).unwrap();
    assert_eq!(s.text, "say \"hi\"");
    assert_eq!(s.rest, " rest");
    assert!(s.unknown_escapes.is_empty());

    let s = unescape(r#"\q\0""#).unwrap();
    assert_eq!(s.text, "q\0");
    assert_eq!(s.unknown_escapes, vec!['q']);

    assert!(unescape(r"trailing\").is_none());
    assert!(unescape(r#"escaped quote\""#).is_none());
}

#[test]
fn test_dword() {
    assert_eq!(parse_dword("0"), Some(0));
    assert_eq!(parse_dword("FFFFFFFF"), Some(u32::MAX));
    assert_eq!(parse_dword("\t1a2B"), Some(0x1a2b));
    assert_eq!(parse_dword("; only a comment"), Some(0));
    assert_eq!(parse_dword(""), None);
    assert_eq!(parse_dword("0x10"), None);
    assert_eq!(parse_dword("-1"), None);
}

#[test]
fn test_hex_bytes() {
    let mut bytes = Vec::new();
    assert_eq!(
        parse_hex_bytes("0, a ,ff, ; comment", &mut bytes),
        Some(HexLine::Complete)
    );
    assert_eq!(bytes, vec![0x00, 0x0a, 0xff]);

    let mut bytes = Vec::new();
    assert_eq!(parse_hex_bytes("", &mut bytes), Some(HexLine::Complete));
    assert!(bytes.is_empty());

    let mut bytes = Vec::new();
    assert_eq!(parse_hex_bytes("01 02", &mut bytes), None);
    assert_eq!(parse_hex_bytes("100", &mut bytes), None);
    assert_eq!(parse_hex_bytes("01,,02", &mut bytes), None);
}

#[test]
fn test_root_keys() {
    for root in RootKey::ALL {
        assert_eq!(RootKey::split_path(root.name()), Some((root, "")));
        assert_eq!(
            RootKey::split_path(&format!("{}\\Sub", root.short_name())),
            Some((root, "Sub"))
        );
    }
    assert_eq!(RootKey::split_path("HKEY_DYN_DATA\\x"), None);
    assert_eq!(RootKey::split_path(""), None);
}

#[test]
fn test_value_data_views() {
    assert_eq!(
        ValueData::parse(&encode_reg_sz("text"), ValueType::String),
        ValueData::String("text".to_string())
    );
    assert_eq!(
        ValueData::parse(&7u32.to_le_bytes(), ValueType::Dword),
        ValueData::Dword(7)
    );
    assert_eq!(
        ValueData::parse(&[1, 2], ValueType::Dword),
        ValueData::Unknown(vec![1, 2])
    );
    assert_eq!(ValueData::parse(&[], ValueType::Binary), ValueData::None);
}

#[test]
fn test_options() {
    let options = ImportOptions::default();
    assert_eq!(options.code_page(), encoding_rs::WINDOWS_1252);
    assert_eq!(options.initial_buffer_units(), 4096);

    let options = ImportOptions::new().with_initial_buffer_units(1);
    assert_eq!(options.initial_buffer_units(), 4);

    assert!(ImportOptions::new().with_code_page_label("no-such-page").is_none());
}
