//! ISO 2709 layout constants and fixed-width number helpers.
//!
//! A record in the interchange format is laid out as:
//!
//! ```text
//! +--------+----------------------+---+--------------------+---+
//! | leader | directory (12 bytes  | FT| field data, each   | RT|
//! | 24 B   | per field)           |   | ending with FT     |   |
//! +--------+----------------------+---+--------------------+---+
//! ```
//!
//! Directory entries hold a 3-digit tag, a 4-digit field length, and a
//! 5-digit offset relative to the base address stored in the leader.
//! See [`crate::reader`] and [`crate::writer`] for the codec itself.

use crate::error::{IrbisError, Result};

/// Terminates every record.
pub const RECORD_TERMINATOR: u8 = 0x1D;
/// Terminates the directory and every field.
pub const FIELD_TERMINATOR: u8 = 0x1E;
/// Introduces a subfield inside a data field.
pub const SUBFIELD_DELIMITER: u8 = 0x1F;

/// Length of the leader.
pub const LEADER_LENGTH: usize = 24;
/// Length of one directory entry.
pub const DIRECTORY_ENTRY_LENGTH: usize = 12;

/// Exclusive upper bound for tags.
pub const MAX_TAG: u32 = 1000;
/// Tags below this carry a value only.
pub const FIRST_DATA_TAG: u32 = 10;
/// Exclusive upper bound for one field's length (4 digits).
pub const MAX_FIELD_LENGTH: usize = 10_000;
/// Exclusive upper bound for a record's length (5 digits).
pub const MAX_RECORD_LENGTH: usize = 100_000;

/// Parse an ASCII decimal number of exactly `bytes.len()` digits.
///
/// # Errors
///
/// Returns `IrbisError::InvalidRecord` if any byte is not a digit.
pub fn parse_digits(bytes: &[u8]) -> Result<usize> {
    if bytes.is_empty() {
        return Err(IrbisError::InvalidRecord(
            "Expected digits, got nothing".to_string(),
        ));
    }

    // Parse ASCII digits directly without string allocation
    let mut result = 0usize;
    for &byte in bytes {
        if byte.is_ascii_digit() {
            result = result * 10 + usize::from(byte - b'0');
        } else {
            return Err(IrbisError::InvalidRecord(format!(
                "Invalid numeric field: expected digits, got byte {}",
                byte as char
            )));
        }
    }
    Ok(result)
}

/// Append `value` as `width` zero-padded ASCII digits.
///
/// # Errors
///
/// Returns `IrbisError::InvalidRecord` if `value` needs more than `width` digits.
pub fn write_digits(output: &mut Vec<u8>, value: usize, width: usize) -> Result<()> {
    let text = format!("{value:0width$}");
    if text.len() != width {
        return Err(IrbisError::InvalidRecord(format!(
            "{value} does not fit in {width} digits"
        )));
    }
    output.extend_from_slice(text.as_bytes());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_digits() {
        assert_eq!(parse_digits(b"00123").unwrap(), 123);
        assert_eq!(parse_digits(b"9").unwrap(), 9);
        assert!(parse_digits(b"12a").is_err());
        assert!(parse_digits(b"").is_err());
    }

    #[test]
    fn test_write_digits() {
        let mut output = Vec::new();
        write_digits(&mut output, 42, 5).unwrap();
        write_digits(&mut output, 7, 1).unwrap();
        assert_eq!(output, b"000427");
        assert!(write_digits(&mut output, 10_000, 4).is_err());
    }
}
