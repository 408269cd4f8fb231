//! Writing records in ISO 2709 format.
//!
//! This module provides [`encode`] for a single record and [`Iso2709Writer`]
//! for writing records to any destination implementing [`std::io::Write`].
//!
//! Encoding is done in two passes. The first pass computes every field's
//! byte length in the chosen encoding, which fixes the directory size, the
//! base address, and the total record length. The second pass writes the
//! leader, the directory, and the field data at the now-known offsets.
//!
//! # Examples
//!
//! ```
//! use irbis::{Field, Iso2709Writer, Record, TextEncoding};
//!
//! let mut record = Record::new();
//! record.add_field(Field::builder(200).subfield('a', "Title").build());
//!
//! let mut buffer = Vec::new();
//! {
//!     let mut writer = Iso2709Writer::new(&mut buffer, TextEncoding::Utf8);
//!     writer.write_record(&record)?;
//!     writer.finish()?;
//! }
//! assert_eq!(buffer.last(), Some(&0x1D));
//! # Ok::<(), irbis::IrbisError>(())
//! ```

use crate::encoding::{encode_string, encoded_length, TextEncoding};
use crate::error::{IrbisError, Result};
use crate::iso2709::{
    write_digits, DIRECTORY_ENTRY_LENGTH, FIELD_TERMINATOR, FIRST_DATA_TAG, LEADER_LENGTH,
    MAX_FIELD_LENGTH, MAX_RECORD_LENGTH, MAX_TAG, RECORD_TERMINATOR, SUBFIELD_DELIMITER,
};
use crate::leader::Leader;
use crate::record::{Field, Record};
use std::io::Write;

const INDICATORS: &[u8] = b"  ";

/// Encode one record as ISO 2709 bytes.
///
/// # Errors
///
/// Returns an error if:
/// - A tag is outside `1..=999`
/// - A subfield code is not printable ASCII
/// - A control field (tag below 10) has subfields
/// - A field is 10000 bytes or longer
/// - The whole record is 100000 bytes or longer
pub fn encode(record: &Record, encoding: TextEncoding) -> Result<Vec<u8>> {
    // First pass: sizes
    let mut field_lengths = Vec::with_capacity(record.fields.len());
    for field in &record.fields {
        let length = field_length(field, encoding)?;
        if length >= MAX_FIELD_LENGTH {
            return Err(IrbisError::InvalidField(format!(
                "Field {} is {length} bytes, limit is {}",
                field.tag,
                MAX_FIELD_LENGTH - 1
            )));
        }
        field_lengths.push(length);
    }

    let directory_length = DIRECTORY_ENTRY_LENGTH * record.fields.len() + 1;
    let base_address = LEADER_LENGTH + directory_length;
    let data_length: usize = field_lengths.iter().sum();
    let record_length = base_address + data_length + 1; // +1 for record terminator
    if record_length >= MAX_RECORD_LENGTH {
        return Err(IrbisError::InvalidRecord(format!(
            "Record is {record_length} bytes, limit is {}",
            MAX_RECORD_LENGTH - 1
        )));
    }

    // Second pass: bytes
    let leader = Leader {
        record_length,
        character_coding: encoding.as_leader_byte(),
        data_base_address: base_address,
        ..Leader::default()
    };

    let mut output = Vec::with_capacity(record_length);
    output.extend_from_slice(&leader.as_bytes()?);

    let mut current_position = 0;
    for (field, &length) in record.fields.iter().zip(&field_lengths) {
        write_digits(&mut output, field.tag as usize, 3)?;
        write_digits(&mut output, length, 4)?;
        write_digits(&mut output, current_position, 5)?;
        current_position += length;
    }
    output.push(FIELD_TERMINATOR);

    for field in &record.fields {
        if field.tag >= FIRST_DATA_TAG {
            output.extend_from_slice(INDICATORS);
        }
        output.extend_from_slice(&encode_string(&field.value, encoding));
        for subfield in &field.subfields {
            output.push(SUBFIELD_DELIMITER);
            output.push(code_byte(field.tag, subfield.code)?);
            output.extend_from_slice(&encode_string(&subfield.value, encoding));
        }
        output.push(FIELD_TERMINATOR);
    }
    output.push(RECORD_TERMINATOR);

    debug_assert_eq!(output.len(), record_length);
    Ok(output)
}

/// A subfield code of field `tag` as its single ASCII byte.
fn code_byte(tag: u32, code: char) -> Result<u8> {
    u8::try_from(code)
        .ok()
        .filter(u8::is_ascii_graphic)
        .ok_or_else(|| {
            IrbisError::InvalidField(format!(
                "Field {tag}: subfield code {code:?} is not printable ASCII"
            ))
        })
}

/// Byte length of one field including its terminator, validating tag and codes.
fn field_length(field: &Field, encoding: TextEncoding) -> Result<usize> {
    if field.tag == 0 || field.tag >= MAX_TAG {
        return Err(IrbisError::InvalidField(format!(
            "Tag {} is outside 1..={}",
            field.tag,
            MAX_TAG - 1
        )));
    }

    let mut length = encoded_length(&field.value, encoding) + 1; // +1 for terminator
    if field.tag < FIRST_DATA_TAG {
        if !field.subfields.is_empty() {
            return Err(IrbisError::InvalidField(format!(
                "Control field {} cannot carry subfields",
                field.tag
            )));
        }
        return Ok(length);
    }

    length += INDICATORS.len();
    for subfield in &field.subfields {
        code_byte(field.tag, subfield.code)?;
        length += 2 + encoded_length(&subfield.value, encoding);
    }
    Ok(length)
}

/// Writer for ISO 2709 records.
///
/// `Iso2709Writer` serializes [`Record`] instances one at a time to any
/// destination implementing [`std::io::Write`].
#[derive(Debug)]
pub struct Iso2709Writer<W: Write> {
    writer: W,
    encoding: TextEncoding,
    records_written: usize,
    finished: bool,
}

impl<W: Write> Iso2709Writer<W> {
    /// Create a new writer encoding field data with `encoding`.
    pub fn new(writer: W, encoding: TextEncoding) -> Self {
        Iso2709Writer {
            writer,
            encoding,
            records_written: 0,
            finished: false,
        }
    }

    /// Write a single record.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The record cannot be represented in ISO 2709 (see [`encode`])
    /// - The writer was already finished
    /// - An I/O error occurs during writing
    pub fn write_record(&mut self, record: &Record) -> Result<()> {
        if self.finished {
            return Err(IrbisError::InvalidRecord(
                "Cannot write to a finished writer".to_string(),
            ));
        }

        let bytes = encode(record, self.encoding)?;
        self.writer.write_all(&bytes)?;
        self.records_written += 1;
        Ok(())
    }

    /// Flush the writer and mark it as finished.
    ///
    /// After calling `finish`, no more records can be written.
    ///
    /// # Errors
    ///
    /// Returns an error if flushing the underlying writer fails.
    pub fn finish(&mut self) -> Result<()> {
        self.writer.flush()?;
        self.finished = true;
        Ok(())
    }

    /// Returns the number of records written so far.
    #[must_use]
    pub fn records_written(&self) -> usize {
        self.records_written
    }
}
