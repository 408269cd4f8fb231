//! ISO 2709 record leader parsing and serialization.
//!
//! The leader is a 24-byte fixed-length header at the start of every record.
//!
//! # Structure
//!
//! - Positions 0-4: Record length (5 digits)
//! - Position 5: Record status
//! - Position 6: Record type
//! - Position 7: Bibliographic level
//! - Position 8: Control record type
//! - Position 9: Character coding (space = codepage, a = UTF-8)
//! - Position 10: Indicator count (usually 2)
//! - Position 11: Subfield code count (usually 2)
//! - Positions 12-16: Base address of data (5 digits)
//! - Positions 17-19: Encoding level, cataloging form, multipart level
//! - Positions 20-23: Entry map (`"450 "`)

use crate::error::{IrbisError, Result};
use crate::iso2709::{parse_digits, write_digits, LEADER_LENGTH};

/// Leader - 24 bytes at the start of every ISO 2709 record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Leader {
    /// Record length (5 digits) - positions 0-4
    pub record_length: usize,
    /// Record status (1 char) - position 5
    pub record_status: u8,
    /// Type of record (1 char) - position 6
    pub record_type: u8,
    /// Bibliographic level (1 char) - position 7
    pub bibliographic_level: u8,
    /// Type of control record (1 char) - position 8
    pub control_record_type: u8,
    /// Character coding scheme (1 char) - position 9
    pub character_coding: u8,
    /// Indicator count (1 digit) - position 10
    pub indicator_count: usize,
    /// Subfield code count (raw byte, not validated) - position 11
    pub subfield_code_count: u8,
    /// Base address of data (5 digits) - positions 12-16
    pub data_base_address: usize,
    /// Encoding level, cataloging form, multipart level - positions 17-19
    pub implementation: [u8; 3],
    /// Entry map - positions 20-23
    pub entry_map: [u8; 4],
}

impl Default for Leader {
    fn default() -> Self {
        Leader {
            record_length: 0,
            record_status: b'n',
            record_type: b'a',
            bibliographic_level: b'm',
            control_record_type: b' ',
            character_coding: b' ',
            indicator_count: 2,
            subfield_code_count: b'2',
            data_base_address: 0,
            implementation: *b"   ",
            entry_map: *b"450 ",
        }
    }
}

impl Leader {
    /// Parse a leader from 24 bytes
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are too short or a numeric position is not numeric.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < LEADER_LENGTH {
            return Err(IrbisError::InvalidRecord(format!(
                "Leader must be at least 24 bytes, got {}",
                bytes.len()
            )));
        }

        Ok(Leader {
            record_length: parse_digits(&bytes[0..5])?,
            record_status: bytes[5],
            record_type: bytes[6],
            bibliographic_level: bytes[7],
            control_record_type: bytes[8],
            character_coding: bytes[9],
            indicator_count: parse_digits(&bytes[10..11])?,
            subfield_code_count: bytes[11],
            data_base_address: parse_digits(&bytes[12..17])?,
            implementation: [bytes[17], bytes[18], bytes[19]],
            entry_map: [bytes[20], bytes[21], bytes[22], bytes[23]],
        })
    }

    /// Validate that the leader is suitable for binary record reading.
    ///
    /// The base address must point past the leader and inside the record.
    ///
    /// # Errors
    ///
    /// Returns an error if `record_length` or `data_base_address` is out of range.
    pub fn validate_for_reading(&self) -> Result<()> {
        if self.record_length < LEADER_LENGTH + 2 {
            return Err(IrbisError::InvalidRecord(format!(
                "Record length must be at least 26, got {}",
                self.record_length
            )));
        }
        if self.data_base_address <= LEADER_LENGTH || self.data_base_address > self.record_length
        {
            return Err(IrbisError::InvalidRecord(format!(
                "Base address of data out of range: {}",
                self.data_base_address
            )));
        }
        Ok(())
    }

    /// Serialize leader to 24 bytes
    ///
    /// # Errors
    ///
    /// Returns an error if a numeric value does not fit its fixed width.
    pub fn as_bytes(&self) -> Result<Vec<u8>> {
        let mut bytes = Vec::with_capacity(LEADER_LENGTH);
        write_digits(&mut bytes, self.record_length, 5)?;
        bytes.push(self.record_status);
        bytes.push(self.record_type);
        bytes.push(self.bibliographic_level);
        bytes.push(self.control_record_type);
        bytes.push(self.character_coding);
        write_digits(&mut bytes, self.indicator_count, 1)?;
        bytes.push(self.subfield_code_count);
        write_digits(&mut bytes, self.data_base_address, 5)?;
        bytes.extend_from_slice(&self.implementation);
        bytes.extend_from_slice(&self.entry_map);
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leader_from_bytes() {
        let bytes = b"00123nam a2200049   450 ";
        let leader = Leader::from_bytes(bytes).unwrap();

        assert_eq!(leader.record_length, 123);
        assert_eq!(leader.record_status, b'n');
        assert_eq!(leader.record_type, b'a');
        assert_eq!(leader.bibliographic_level, b'm');
        assert_eq!(leader.character_coding, b'a');
        assert_eq!(leader.indicator_count, 2);
        assert_eq!(leader.subfield_code_count, b'2');
        assert_eq!(leader.data_base_address, 49);
        assert_eq!(&leader.entry_map, b"450 ");
    }

    #[test]
    fn test_leader_roundtrip() {
        let original = Leader {
            record_length: 2048,
            data_base_address: 256,
            ..Leader::default()
        };

        let bytes = original.as_bytes().unwrap();
        assert_eq!(bytes.len(), LEADER_LENGTH);
        let parsed = Leader::from_bytes(&bytes).unwrap();

        assert_eq!(original, parsed);
    }

    #[test]
    fn test_leader_too_short() {
        let result = Leader::from_bytes(b"0123456789012");
        assert!(result.is_err());
    }

    #[test]
    fn test_leader_invalid_indicator_count() {
        let result = Leader::from_bytes(b"00123nam aX200049   450 ");
        assert!(result.is_err());
    }

    #[test]
    fn test_leader_subfield_code_count_is_not_validated() {
        let leader = Leader::from_bytes(b"00123nam a2 00049   450 ").unwrap();
        assert_eq!(leader.subfield_code_count, b' ');
        assert_eq!(leader.data_base_address, 49);
    }

    #[test]
    fn test_leader_oversize_length() {
        let leader = Leader {
            record_length: 100_000,
            ..Leader::default()
        };
        assert!(leader.as_bytes().is_err());
    }

    #[test]
    fn test_validate_for_reading_rejects_small_record_length() {
        let leader = Leader::from_bytes(b"00010nam a2200025   450 ").unwrap();
        let err = leader.validate_for_reading().unwrap_err().to_string();
        assert!(err.contains("Record length must be at least 26"), "got: {err}");
    }

    #[test]
    fn test_validate_for_reading_rejects_bad_base_address() {
        let leader = Leader::from_bytes(b"00050nam a2200010   450 ").unwrap();
        assert!(leader.validate_for_reading().is_err());

        let leader = Leader::from_bytes(b"00050nam a2200090   450 ").unwrap();
        assert!(leader.validate_for_reading().is_err());
    }
}
