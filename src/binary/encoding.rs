//! Text encodings understood by the string codec.
//!
//! An encoding only needs to turn text into bytes, bytes back into text, and
//! report how wide its null terminator is. Decoding is lossy: malformed input
//! becomes U+FFFD rather than an error, matching how the rest of the crate
//! treats arbitrary binary content as displayable text.

use bstr::ByteSlice;
use std::fmt;

/// A text encoding usable by the string helpers in [`codec`](crate::binary::codec)
pub trait TextEncoding: fmt::Debug + Send + Sync {
    /// Canonical lower-case label
    fn name(&self) -> &'static str;

    fn encode(&self, text: &str) -> Vec<u8>;

    /// Decode `bytes`, replacing malformed sequences with U+FFFD
    fn decode(&self, bytes: &[u8]) -> String;

    /// Width in bytes of one zero code unit (1 for byte encodings, 2 for UTF-16)
    fn null_len(&self) -> usize;
}

/// UTF-8
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Utf8;

/// UTF-16 little-endian, the "unicode string" format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Utf16Le;

/// UTF-16 big-endian
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Utf16Be;

/// ISO-8859-1; characters outside U+0000..=U+00FF encode as `?`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Latin1;

impl TextEncoding for Utf8 {
    fn name(&self) -> &'static str {
        "utf-8"
    }

    fn encode(&self, text: &str) -> Vec<u8> {
        text.as_bytes().to_vec()
    }

    fn decode(&self, bytes: &[u8]) -> String {
        bytes.to_str_lossy().into_owned()
    }

    fn null_len(&self) -> usize {
        1
    }
}

fn decode_utf16(bytes: &[u8], unit: fn([u8; 2]) -> u16) -> String {
    let units = bytes.chunks_exact(2).map(|pair| unit([pair[0], pair[1]]));
    let mut text: String = char::decode_utf16(units)
        .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect();

    // Dangling half code unit
    if bytes.len() % 2 == 1 {
        text.push(char::REPLACEMENT_CHARACTER);
    }
    text
}

impl TextEncoding for Utf16Le {
    fn name(&self) -> &'static str {
        "utf-16le"
    }

    fn encode(&self, text: &str) -> Vec<u8> {
        text.encode_utf16().flat_map(u16::to_le_bytes).collect()
    }

    fn decode(&self, bytes: &[u8]) -> String {
        decode_utf16(bytes, u16::from_le_bytes)
    }

    fn null_len(&self) -> usize {
        2
    }
}

impl TextEncoding for Utf16Be {
    fn name(&self) -> &'static str {
        "utf-16be"
    }

    fn encode(&self, text: &str) -> Vec<u8> {
        text.encode_utf16().flat_map(u16::to_be_bytes).collect()
    }

    fn decode(&self, bytes: &[u8]) -> String {
        decode_utf16(bytes, u16::from_be_bytes)
    }

    fn null_len(&self) -> usize {
        2
    }
}

impl TextEncoding for Latin1 {
    fn name(&self) -> &'static str {
        "iso-8859-1"
    }

    fn encode(&self, text: &str) -> Vec<u8> {
        text.chars()
            .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
            .collect()
    }

    fn decode(&self, bytes: &[u8]) -> String {
        bytes.iter().map(|b| char::from(*b)).collect()
    }

    fn null_len(&self) -> usize {
        1
    }
}

/// Look up an encoding by a user-facing label such as `utf8` or `utf-16le`
///
/// Matching ignores ASCII case. `unicode` and `utf16` mean UTF-16LE.
pub fn encoding_for_label(label: &str) -> Option<&'static dyn TextEncoding> {
    let label = label.trim().to_ascii_lowercase();
    match label.as_str() {
        "utf8" | "utf-8" => Some(&Utf8),
        "utf16" | "utf-16" | "utf16le" | "utf-16le" | "unicode" => Some(&Utf16Le),
        "utf16be" | "utf-16be" => Some(&Utf16Be),
        "latin1" | "latin-1" | "iso-8859-1" | "iso8859-1" => Some(&Latin1),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utf16_byte_order() {
        assert_eq!(Utf16Le.encode("AB"), vec![0x41, 0x00, 0x42, 0x00]);
        assert_eq!(Utf16Be.encode("AB"), vec![0x00, 0x41, 0x00, 0x42]);
        assert_eq!(Utf16Le.decode(&[0x41, 0x00, 0x42, 0x00]), "AB");
        assert_eq!(Utf16Be.decode(&[0x00, 0x41, 0x00, 0x42]), "AB");
    }

    #[test]
    fn test_utf16_surrogate_pairs() {
        let encoded = Utf16Le.encode("😀");
        assert_eq!(encoded.len(), 4);
        assert_eq!(Utf16Le.decode(&encoded), "😀");
    }

    #[test]
    fn test_malformed_input_is_replaced() {
        assert_eq!(Utf8.decode(b"ok\xff"), "ok\u{FFFD}");
        assert_eq!(Utf16Le.decode(&[0x41, 0x00, 0x42]), "A\u{FFFD}");
        // Lone high surrogate
        assert_eq!(Utf16Le.decode(&[0x3D, 0xD8]), "\u{FFFD}");
    }

    #[test]
    fn test_latin1() {
        assert_eq!(Latin1.encode("café"), vec![b'c', b'a', b'f', 0xE9]);
        assert_eq!(Latin1.encode("€"), vec![b'?']);
        assert_eq!(Latin1.decode(&[0xE9]), "é");
    }

    #[test]
    fn test_null_widths() {
        assert_eq!(Utf8.null_len(), 1);
        assert_eq!(Latin1.null_len(), 1);
        assert_eq!(Utf16Le.null_len(), 2);
        assert_eq!(Utf16Be.null_len(), 2);
    }

    #[test]
    fn test_encoding_for_label() {
        assert_eq!(encoding_for_label("UTF8").map(|e| e.name()), Some("utf-8"));
        assert_eq!(encoding_for_label("unicode").map(|e| e.name()), Some("utf-16le"));
        assert_eq!(encoding_for_label("utf16be").map(|e| e.name()), Some("utf-16be"));
        assert_eq!(encoding_for_label("latin1").map(|e| e.name()), Some("iso-8859-1"));
        assert!(encoding_for_label("ebcdic").is_none());
    }
}
