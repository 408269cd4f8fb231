//! Character encoding support for IRBIS text.
//!
//! The server speaks two textual channels:
//! - **ANSI**: the single-byte Windows-1251 codepage
//! - **UTF-8**: used for record bodies, search expressions, and formats
//!
//! Inside the crate all text is a Rust [`String`]. This module converts in
//! both directions and provides length-only helpers, so callers can size
//! length-prefixed payloads before encoding them.
//!
//! The UTF-8 decoder is deliberately permissive: continuation bytes are masked
//! and combined without validation, and a byte-order mark is dropped only when
//! it is the very first decoded character.

use crate::error::{IrbisError, Result};
use crate::navigator::ByteNavigator;
use encoding_rs::{EncoderResult, Encoding, WINDOWS_1251};

/// The national codepage used on the ANSI channel.
pub static ANSI: &Encoding = WINDOWS_1251;

const BYTE_ORDER_MARK: char = '\u{FEFF}';

/// Character encoding for record data.
///
/// Indicates the character set used to encode field data in an ISO 2709 record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextEncoding {
    /// Windows-1251 codepage
    #[default]
    Ansi,
    /// UTF-8
    Utf8,
}

impl TextEncoding {
    /// Detect encoding from the leader character coding position (9).
    ///
    /// ' ' (space) = codepage, 'a' = UTF-8
    ///
    /// # Errors
    ///
    /// Returns `IrbisError::EncodingError` if the character is not a valid encoding indicator.
    pub fn from_leader_char(c: char) -> Result<Self> {
        match c {
            ' ' => Ok(TextEncoding::Ansi),
            'a' => Ok(TextEncoding::Utf8),
            _ => Err(IrbisError::EncodingError(format!(
                "Unknown character encoding: {c}"
            ))),
        }
    }

    /// Get the leader character for this encoding
    #[must_use]
    pub fn as_leader_char(&self) -> char {
        match self {
            TextEncoding::Ansi => ' ',
            TextEncoding::Utf8 => 'a',
        }
    }

    /// The leader character as the byte written at leader position 9
    #[must_use]
    pub fn as_leader_byte(&self) -> u8 {
        match self {
            TextEncoding::Ansi => b' ',
            TextEncoding::Utf8 => b'a',
        }
    }
}

/// Decode bytes using the specified encoding
#[must_use]
pub fn decode_bytes(bytes: &[u8], encoding: TextEncoding) -> String {
    match encoding {
        TextEncoding::Ansi => decode_ansi(bytes),
        TextEncoding::Utf8 => decode_utf8(bytes),
    }
}

/// Encode a string using the specified encoding
#[must_use]
pub fn encode_string(text: &str, encoding: TextEncoding) -> Vec<u8> {
    match encoding {
        TextEncoding::Ansi => encode_ansi(text),
        TextEncoding::Utf8 => encode_utf8(text),
    }
}

/// Number of bytes `text` occupies in the given encoding.
#[must_use]
pub fn encoded_length(text: &str, encoding: TextEncoding) -> usize {
    match encoding {
        TextEncoding::Ansi => count_ansi_bytes(text),
        TextEncoding::Utf8 => count_utf8_bytes(text),
    }
}

/// Decode codepage bytes. Every byte maps to exactly one character.
#[must_use]
pub fn decode_ansi(bytes: &[u8]) -> String {
    let (text, _) = ANSI.decode_without_bom_handling(bytes);
    text.into_owned()
}

/// Encode text into the codepage. Characters the codepage cannot represent
/// become `?`.
#[must_use]
pub fn encode_ansi(text: &str) -> Vec<u8> {
    let mut encoder = ANSI.new_encoder();
    let mut result = Vec::with_capacity(count_ansi_bytes(text));
    let mut chunk = [0u8; 512];
    let mut source = text;

    loop {
        let (outcome, read, written) =
            encoder.encode_from_utf8_without_replacement(source, &mut chunk, true);
        result.extend_from_slice(&chunk[..written]);
        source = &source[read..];
        match outcome {
            EncoderResult::InputEmpty => break,
            EncoderResult::OutputFull => {},
            EncoderResult::Unmappable(_) => result.push(b'?'),
        }
    }

    result
}

/// Number of bytes `text` occupies once encoded into the codepage.
#[must_use]
pub fn count_ansi_bytes(text: &str) -> usize {
    text.chars().count()
}

/// Decode UTF-8 bytes, best effort.
///
/// A leading byte-order mark is dropped. Malformed sequences never fail:
/// stray bytes become U+FFFD and a truncated trailing sequence is dropped.
///
/// # Examples
///
/// ```
/// use irbis::encoding::decode_utf8;
///
/// assert_eq!(decode_utf8(b"\xEF\xBB\xBFabc"), "abc");
/// assert_eq!(decode_utf8("Тест".as_bytes()), "Тест");
/// ```
#[must_use]
pub fn decode_utf8(bytes: &[u8]) -> String {
    let mut result = String::with_capacity(bytes.len());
    result.extend(Utf8Chars::new(bytes));
    result
}

/// Encode text as UTF-8 bytes.
#[must_use]
pub fn encode_utf8(text: &str) -> Vec<u8> {
    text.as_bytes().to_vec()
}

/// Number of bytes `text` occupies once encoded as UTF-8.
#[must_use]
pub fn count_utf8_bytes(text: &str) -> usize {
    text.chars().map(char::len_utf8).sum()
}

/// Number of characters [`decode_utf8`] produces for `bytes`, without allocating.
#[must_use]
pub fn count_utf8_chars(bytes: &[u8]) -> usize {
    Utf8Chars::new(bytes).count()
}

/// Permissive UTF-8 decoding iterator shared by [`decode_utf8`] and
/// [`count_utf8_chars`].
#[derive(Debug, Clone)]
struct Utf8Chars<'a> {
    navigator: ByteNavigator<'a>,
    first: bool,
}

impl<'a> Utf8Chars<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Utf8Chars {
            navigator: ByteNavigator::new(bytes),
            first: true,
        }
    }

    fn decode_one(&mut self) -> Option<char> {
        let lead = self.navigator.read()?;
        let (mut code, extra) = match lead {
            0x00..=0x7F => return Some(char::from(lead)),
            0xC0..=0xDF => (u32::from(lead & 0x1F), 1),
            0xE0..=0xEF => (u32::from(lead & 0x0F), 2),
            0xF0..=0xF7 => (u32::from(lead & 0x07), 3),
            _ => return Some(char::REPLACEMENT_CHARACTER),
        };

        for _ in 0..extra {
            let next = self.navigator.read()?;
            code = (code << 6) | u32::from(next & 0x3F);
        }

        Some(char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER))
    }
}

impl Iterator for Utf8Chars<'_> {
    type Item = char;

    fn next(&mut self) -> Option<char> {
        let c = self.decode_one()?;
        if std::mem::take(&mut self.first) && c == BYTE_ORDER_MARK {
            return self.decode_one();
        }
        Some(c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoding_from_leader_char() {
        assert_eq!(
            TextEncoding::from_leader_char(' ').unwrap(),
            TextEncoding::Ansi
        );
        assert_eq!(
            TextEncoding::from_leader_char('a').unwrap(),
            TextEncoding::Utf8
        );
        assert!(TextEncoding::from_leader_char('x').is_err());
    }

    #[test]
    fn test_encoding_as_leader_char() {
        assert_eq!(TextEncoding::Ansi.as_leader_char(), ' ');
        assert_eq!(TextEncoding::Utf8.as_leader_char(), 'a');
        for encoding in [TextEncoding::Ansi, TextEncoding::Utf8] {
            assert_eq!(char::from(encoding.as_leader_byte()), encoding.as_leader_char());
        }
    }

    #[test]
    fn test_ansi_roundtrip_cyrillic() {
        let text = "Привет, мир";
        let encoded = encode_ansi(text);
        assert_eq!(encoded.len(), count_ansi_bytes(text));
        assert_eq!(encoded[0], 0xCF); // 'П' in Windows-1251
        assert_eq!(decode_ansi(&encoded), text);
    }

    #[test]
    fn test_ansi_unmappable_becomes_question_mark() {
        let encoded = encode_ansi("a世b");
        assert_eq!(encoded, b"a?b");
        assert_eq!(encoded.len(), count_ansi_bytes("a世b"));
    }

    #[test]
    fn test_ansi_long_text_crosses_chunks() {
        let text = "Ж".repeat(2000);
        let encoded = encode_ansi(&text);
        assert_eq!(encoded.len(), 2000);
        assert_eq!(decode_ansi(&encoded), text);
    }

    #[test]
    fn test_utf8_decode() {
        let bytes = "Hello, 世界".as_bytes();
        assert_eq!(decode_utf8(bytes), "Hello, 世界");
    }

    #[test]
    fn test_utf8_leading_bom_dropped() {
        assert_eq!(decode_utf8(b"\xEF\xBB\xBFHi"), "Hi");
    }

    #[test]
    fn test_utf8_inner_bom_kept() {
        let decoded = decode_utf8(b"A\xEF\xBB\xBFB");
        assert_eq!(decoded, "A\u{FEFF}B");
    }

    #[test]
    fn test_utf8_truncated_tail_dropped() {
        // 'Ж' is D0 96; the final D0 has no continuation byte
        assert_eq!(decode_utf8(b"\xD0\x96\xD0"), "Ж");
    }

    #[test]
    fn test_utf8_bad_continuation_is_masked() {
        // 0xC3 with a non-continuation byte still combines the low six bits
        let decoded = decode_utf8(b"\xC3\x29");
        assert_eq!(decoded.chars().count(), 1);
        assert_eq!(decoded, "\u{e9}");
    }

    #[test]
    fn test_utf8_stray_continuation() {
        assert_eq!(decode_utf8(b"a\x80b"), "a\u{FFFD}b");
    }

    #[test]
    fn test_count_utf8_chars_matches_decode() {
        let samples: [&[u8]; 4] = [
            b"\xEF\xBB\xBFabc",
            "Тест тест".as_bytes(),
            b"\xD0\x96\xD0",
            b"a\x80\xF0\x9F\x98\x80",
        ];
        for sample in samples {
            assert_eq!(count_utf8_chars(sample), decode_utf8(sample).chars().count());
        }
    }

    #[test]
    fn test_count_utf8_bytes() {
        assert_eq!(count_utf8_bytes("abc"), 3);
        assert_eq!(count_utf8_bytes("Жук"), 6);
        assert_eq!(count_utf8_bytes(""), 0);
    }

    #[test]
    fn test_encode_string_dispatch() {
        assert_eq!(encode_string("Ё", TextEncoding::Utf8), "Ё".as_bytes());
        assert_eq!(encode_string("Ё", TextEncoding::Ansi), vec![0xA8]);
        assert_eq!(encoded_length("Ёж", TextEncoding::Utf8), 4);
        assert_eq!(encoded_length("Ёж", TextEncoding::Ansi), 2);
        assert_eq!(decode_bytes(&[0xA8], TextEncoding::Ansi), "Ё");
    }
}
