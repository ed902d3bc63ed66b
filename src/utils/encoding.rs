// Encoding utilities

use encoding_rs::{UTF_16BE, UTF_16LE, UTF_8};

/// Text encoding types
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TextEncoding {
    Iso8859_1 = 0,
    Utf16 = 1,
    Utf16BE = 2,
    Utf8 = 3,
}

impl TextEncoding {
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            0 => TextEncoding::Iso8859_1,
            1 => TextEncoding::Utf16,
            2 => TextEncoding::Utf16BE,
            3 => TextEncoding::Utf8,
            _ => TextEncoding::Iso8859_1,
        }
    }

    /// Width of the string terminator
    pub fn terminator_len(self) -> usize {
        match self {
            TextEncoding::Utf16 | TextEncoding::Utf16BE => 2,
            TextEncoding::Iso8859_1 | TextEncoding::Utf8 => 1,
        }
    }
}

/// Decode text with specified encoding
pub fn decode_text(data: &[u8], encoding: TextEncoding) -> String {
    match encoding {
        TextEncoding::Iso8859_1 => decode_latin1(data),
        TextEncoding::Utf16 => {
            // Detect BOM
            if data.len() >= 2 {
                if data[0..2] == [0xFF, 0xFE] {
                    UTF_16LE.decode_without_bom_handling(&data[2..]).0.into_owned()
                } else if data[0..2] == [0xFE, 0xFF] {
                    UTF_16BE.decode_without_bom_handling(&data[2..]).0.into_owned()
                } else {
                    UTF_16LE.decode_without_bom_handling(data).0.into_owned()
                }
            } else {
                String::new()
            }
        }
        TextEncoding::Utf16BE => UTF_16BE.decode_without_bom_handling(data).0.into_owned(),
        TextEncoding::Utf8 => UTF_8.decode_without_bom_handling(data).0.into_owned(),
    }
}

/// Encode text with specified encoding, without terminator
pub fn encode_text(text: &str, encoding: TextEncoding) -> Vec<u8> {
    match encoding {
        TextEncoding::Iso8859_1 => encode_latin1(text),
        TextEncoding::Utf16 => {
            let mut bom = vec![0xFF, 0xFE];
            bom.extend(text.encode_utf16().flat_map(|unit| unit.to_le_bytes()));
            bom
        }
        // encoding 2 carries no BOM
        TextEncoding::Utf16BE => text.encode_utf16().flat_map(|unit| unit.to_be_bytes()).collect(),
        TextEncoding::Utf8 => text.as_bytes().to_vec(),
    }
}

/// ISO-8859-1: every byte maps to the code point of the same value
pub fn decode_latin1(data: &[u8]) -> String {
    encoding_rs::mem::decode_latin1(data).into_owned()
}

/// ISO-8859-1 encoding; code points above U+00FF become `?`
pub fn encode_latin1(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .collect()
}

/// Split `data` at the first terminator for `encoding`.
///
/// Returns the string bytes and whatever follows the terminator, or `None`
/// if no terminator exists. UTF-16 terminators must sit on an even offset.
pub fn split_terminated(data: &[u8], encoding: TextEncoding) -> Option<(&[u8], &[u8])> {
    match encoding.terminator_len() {
        1 => {
            let end = data.iter().position(|&b| b == 0)?;
            Some((&data[..end], &data[end + 1..]))
        }
        _ => {
            let end = data
                .chunks_exact(2)
                .position(|unit| unit == [0, 0])?
                * 2;
            Some((&data[..end], &data[end + 2..]))
        }
    }
}

/// Decode a terminated string and return it with the bytes after it
pub fn decode_terminated(data: &[u8], encoding: TextEncoding) -> Option<(String, &[u8])> {
    let (text, rest) = split_terminated(data, encoding)?;
    Some((decode_text(text, encoding), rest))
}

/// Encode `text` followed by the terminator for `encoding`
pub fn encode_terminated(text: &str, encoding: TextEncoding) -> Vec<u8> {
    let mut out = encode_text(text, encoding);
    out.resize(out.len() + encoding.terminator_len(), 0);
    out
}
