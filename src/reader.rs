//! Reading ISO 2709 records.
//!
//! This module provides [`decode`] for a single in-memory record and
//! [`Iso2709Reader`] for reading records one at a time from any source that
//! implements [`std::io::Read`].
//!
//! Decoding is all-or-nothing: a missing record terminator, a truncated
//! buffer, or an inconsistent directory fails the whole record and no
//! partial [`Record`] is returned.
//!
//! # Examples
//!
//! Reading records from a file:
//!
//! ```no_run
//! use irbis::{Iso2709Reader, TextEncoding};
//! use std::fs::File;
//!
//! let file = File::open("records.iso")?;
//! let mut reader = Iso2709Reader::new(file, TextEncoding::Ansi);
//!
//! while let Some(record) = reader.read_record()? {
//!     println!("{} fields", record.fields.len());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use crate::encoding::{decode_bytes, TextEncoding};
use crate::error::{IrbisError, Result};
use crate::iso2709::{
    parse_digits, DIRECTORY_ENTRY_LENGTH, FIELD_TERMINATOR, FIRST_DATA_TAG, LEADER_LENGTH,
    RECORD_TERMINATOR, SUBFIELD_DELIMITER,
};
use crate::leader::Leader;
use crate::navigator::ByteNavigator;
use crate::record::{Field, Record, Subfield};
use std::io::Read;

/// Decode one ISO 2709 record from the start of `bytes`.
///
/// The first five bytes give the total record length; anything after that
/// length is ignored.
///
/// # Errors
///
/// Returns an error if:
/// - The buffer is shorter than the declared record length
/// - The last byte of the record is not the record terminator
/// - The leader or a directory entry is malformed
/// - A field lies outside the data area
pub fn decode(bytes: &[u8], encoding: TextEncoding) -> Result<Record> {
    if bytes.len() < 5 {
        return Err(IrbisError::TruncatedRecord(format!(
            "need 5 bytes for the record length, got {}",
            bytes.len()
        )));
    }

    let record_length = parse_digits(&bytes[0..5])?;
    if bytes.len() < record_length {
        return Err(IrbisError::TruncatedRecord(format!(
            "record declares {record_length} bytes, got {}",
            bytes.len()
        )));
    }

    let data = &bytes[..record_length];
    if data.last() != Some(&RECORD_TERMINATOR) {
        return Err(IrbisError::InvalidRecord(
            "Record does not end with the record terminator".to_string(),
        ));
    }

    let leader = Leader::from_bytes(data)?;
    leader.validate_for_reading()?;

    let base_address = leader.data_base_address;
    // Field data never includes the record terminator
    let data_end = record_length - 1;
    let mut record = Record::new();

    // Parse directory entries (12 bytes each: tag(3) + length(4) + start position(5))
    let mut directory = ByteNavigator::at(data, LEADER_LENGTH);
    while directory.peek() != Some(FIELD_TERMINATOR) {
        let entry_start = directory.position();
        if entry_start + DIRECTORY_ENTRY_LENGTH > base_address {
            return Err(IrbisError::InvalidRecord(
                "Directory is not terminated before the base address".to_string(),
            ));
        }

        let entry = directory.slice(entry_start, DIRECTORY_ENTRY_LENGTH);
        let tag = parse_digits(&entry[0..3])?;
        let field_length = parse_digits(&entry[3..7])?;
        let start_position = base_address + parse_digits(&entry[7..12])?;
        let end_position = start_position + field_length;
        directory = ByteNavigator::at(data, entry_start + DIRECTORY_ENTRY_LENGTH);

        log::trace!("directory entry: tag {tag}, length {field_length}, start {start_position}");

        if end_position > data_end {
            return Err(IrbisError::InvalidRecord(format!(
                "Field {tag} exceeds data area"
            )));
        }

        let mut field_data = &data[start_position..end_position];
        if let Some((&FIELD_TERMINATOR, body)) = field_data.split_last() {
            field_data = body;
        }

        let tag = u32::try_from(tag)
            .ok()
            .filter(|&tag| tag > 0)
            .ok_or_else(|| IrbisError::InvalidField(format!("Invalid tag {tag}")))?;

        let field = if tag < FIRST_DATA_TAG {
            Field::with_value(tag, &decode_bytes(field_data, encoding))
        } else {
            parse_data_field(tag, field_data, leader.indicator_count, encoding)?
        };
        record.add_field(field);
    }

    Ok(record)
}

/// Parse a data field: indicators, optional leading value, then subfields.
fn parse_data_field(
    tag: u32,
    data: &[u8],
    indicator_count: usize,
    encoding: TextEncoding,
) -> Result<Field> {
    if data.len() < indicator_count {
        return Err(IrbisError::InvalidField(format!(
            "Field {tag} too short (needs {indicator_count} indicators)"
        )));
    }

    let mut field = Field::new(tag);
    let mut navigator = ByteNavigator::at(data, indicator_count);
    field.value = decode_bytes(navigator.read_until(SUBFIELD_DELIMITER), encoding);

    while navigator.read() == Some(SUBFIELD_DELIMITER) {
        let Some(code) = navigator.read() else {
            break;
        };
        let value = navigator.read_until(SUBFIELD_DELIMITER);
        field.subfields.push(Subfield {
            code: char::from(code),
            value: decode_bytes(value, encoding),
        });
    }

    Ok(field)
}

/// Reader for ISO 2709 records.
///
/// `Iso2709Reader` reads one record at a time from any source implementing
/// [`std::io::Read`].
///
/// # Examples
///
/// ```
/// use irbis::{Iso2709Reader, TextEncoding};
/// use std::io::Cursor;
///
/// let mut reader = Iso2709Reader::new(Cursor::new(Vec::new()), TextEncoding::Utf8);
/// assert!(reader.read_record()?.is_none());
/// # Ok::<(), irbis::IrbisError>(())
/// ```
#[derive(Debug)]
pub struct Iso2709Reader<R: Read> {
    reader: R,
    encoding: TextEncoding,
    records_read: usize,
}

impl<R: Read> Iso2709Reader<R> {
    /// Create a new reader decoding field data with `encoding`.
    pub fn new(reader: R, encoding: TextEncoding) -> Self {
        Iso2709Reader {
            reader,
            encoding,
            records_read: 0,
        }
    }

    /// Read a single record.
    ///
    /// Returns `Ok(Some(record))` if a record was read, `Ok(None)` at a clean
    /// end of input, or `Err` if the record is malformed or truncated.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The binary data is malformed
    /// - The input ends in the middle of a record
    /// - An I/O error occurs
    pub fn read_record(&mut self) -> Result<Option<Record>> {
        let mut length_bytes = [0u8; 5];
        let mut filled = 0;
        while filled < length_bytes.len() {
            match self.reader.read(&mut length_bytes[filled..]) {
                Ok(0) if filled == 0 => return Ok(None),
                Ok(0) => {
                    return Err(IrbisError::TruncatedRecord(
                        "Unexpected end of input while reading record length".to_string(),
                    ))
                },
                Ok(count) => filled += count,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {},
                Err(e) => return Err(IrbisError::IoError(e)),
            }
        }

        let record_length = parse_digits(&length_bytes)?;
        if record_length < LEADER_LENGTH + 2 {
            return Err(IrbisError::InvalidRecord(format!(
                "Record length too small: {record_length}"
            )));
        }

        let mut buffer = vec![0u8; record_length];
        buffer[..5].copy_from_slice(&length_bytes);
        match self.reader.read_exact(&mut buffer[5..]) {
            Ok(()) => {},
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                return Err(IrbisError::TruncatedRecord(
                    "Unexpected end of input while reading record data".to_string(),
                ));
            },
            Err(e) => return Err(IrbisError::IoError(e)),
        }

        let record = decode(&buffer, self.encoding)?;
        self.records_read += 1;
        Ok(Some(record))
    }

    /// Returns the number of records read so far.
    #[must_use]
    pub fn records_read(&self) -> usize {
        self.records_read
    }
}

impl<R: Read> Iterator for Iso2709Reader<R> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_record().transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    /// Manually build a valid record: a control field 001 and a data field 200.
    fn build_record_bytes() -> Vec<u8> {
        let mut field_001 = Vec::new();
        field_001.extend_from_slice(b"RU/IBIS/123");
        field_001.push(FIELD_TERMINATOR);

        let mut field_200 = Vec::new();
        field_200.extend_from_slice(b"  "); // Indicators
        field_200.push(SUBFIELD_DELIMITER);
        field_200.push(b'a');
        field_200.extend_from_slice(b"Test title");
        field_200.push(SUBFIELD_DELIMITER);
        field_200.push(b'e');
        field_200.extend_from_slice(b"Novel");
        field_200.push(FIELD_TERMINATOR);

        let mut directory = Vec::new();
        directory.extend_from_slice(b"001");
        directory.extend_from_slice(format!("{:04}", field_001.len()).as_bytes());
        directory.extend_from_slice(b"00000");
        directory.extend_from_slice(b"200");
        directory.extend_from_slice(format!("{:04}", field_200.len()).as_bytes());
        directory.extend_from_slice(format!("{:05}", field_001.len()).as_bytes());
        directory.push(FIELD_TERMINATOR);

        let base_address = 24 + directory.len();
        let record_length = base_address + field_001.len() + field_200.len() + 1;

        let mut record_bytes = Vec::new();
        record_bytes.extend_from_slice(format!("{record_length:05}").as_bytes());
        record_bytes.extend_from_slice(b"nam  22");
        record_bytes.extend_from_slice(format!("{base_address:05}").as_bytes());
        record_bytes.extend_from_slice(b"   450 ");
        record_bytes.extend_from_slice(&directory);
        record_bytes.extend_from_slice(&field_001);
        record_bytes.extend_from_slice(&field_200);
        record_bytes.push(RECORD_TERMINATOR);
        record_bytes
    }

    #[test]
    fn test_decode_simple_record() {
        let record = decode(&build_record_bytes(), TextEncoding::Ansi).unwrap();

        assert_eq!(record.mfn, 0);
        assert_eq!(record.fields.len(), 2);
        assert_eq!(record.first_field_value(1), Some("RU/IBIS/123"));
        assert!(record.first_field(1).unwrap().subfields.is_empty());

        let title = record.first_field(200).unwrap();
        assert!(title.value.is_empty());
        assert_eq!(title.first_subfield_value('a'), Some("Test title"));
        assert_eq!(title.first_subfield_value('e'), Some("Novel"));
    }

    #[test]
    fn test_missing_record_terminator_fails() {
        let mut bytes = build_record_bytes();
        let last = bytes.len() - 1;
        bytes[last] = b'X';
        let result = decode(&bytes, TextEncoding::Ansi);
        assert!(matches!(result, Err(IrbisError::InvalidRecord(_))));
    }

    #[test]
    fn test_truncated_buffer_fails() {
        let bytes = build_record_bytes();
        let result = decode(&bytes[..bytes.len() - 3], TextEncoding::Ansi);
        assert!(matches!(result, Err(IrbisError::TruncatedRecord(_))));
        assert!(decode(b"001", TextEncoding::Ansi).is_err());
    }

    #[test]
    fn test_field_outside_data_area_fails() {
        let mut bytes = build_record_bytes();
        // Point the 200 entry's length past the end of the record
        bytes[24 + 12 + 3..24 + 12 + 7].copy_from_slice(b"0999");
        assert!(decode(&bytes, TextEncoding::Ansi).is_err());
    }

    #[test]
    fn test_reader_reads_sequence() {
        let mut all_bytes = build_record_bytes();
        all_bytes.extend_from_slice(&build_record_bytes());

        let mut reader = Iso2709Reader::new(Cursor::new(all_bytes), TextEncoding::Ansi);
        assert!(reader.read_record().unwrap().is_some());
        assert!(reader.read_record().unwrap().is_some());
        assert!(reader.read_record().unwrap().is_none());
        assert_eq!(reader.records_read(), 2);
    }

    #[test]
    fn test_reader_iterator() {
        let mut all_bytes = Vec::new();
        for _ in 0..3 {
            all_bytes.extend_from_slice(&build_record_bytes());
        }
        let reader = Iso2709Reader::new(Cursor::new(all_bytes), TextEncoding::Ansi);
        let records: Result<Vec<Record>> = reader.collect();
        assert_eq!(records.unwrap().len(), 3);
    }

    #[test]
    fn test_reader_truncated_input() {
        let bytes = build_record_bytes();
        let mut reader =
            Iso2709Reader::new(Cursor::new(bytes[..40].to_vec()), TextEncoding::Ansi);
        assert!(matches!(
            reader.read_record(),
            Err(IrbisError::TruncatedRecord(_))
        ));

        let mut reader = Iso2709Reader::new(Cursor::new(b"00".to_vec()), TextEncoding::Ansi);
        assert!(reader.read_record().is_err());
    }

    #[test]
    fn test_eof_returns_none() {
        let mut reader = Iso2709Reader::new(Cursor::new(Vec::new()), TextEncoding::Ansi);
        assert!(reader.read_record().unwrap().is_none());
    }
}
