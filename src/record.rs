//! Bibliographic record structures and the text wire form.
//!
//! This module provides the core record types:
//! - [`Record`]: a record with its MFN, status, version, and fields
//! - [`Field`]: a numbered field with an optional value and subfields
//! - [`Subfield`]: a coded data element within a field
//!
//! # Text form
//!
//! On the wire a record is a sequence of lines:
//!
//! ```text
//! 1#0            mfn#status
//! 0#3            0#version
//! 200#^aTitle    tag#value^code1value1^code2value2...
//! 300#Comment
//! ```
//!
//! The line delimiter depends on the context, see [`IRBIS_DELIMITER`],
//! [`SHORT_DELIMITER`], and [`LINE_DELIMITER`].
//!
//! # Examples
//!
//! ```
//! use irbis::{Field, Record, LINE_DELIMITER};
//!
//! let mut record = Record::new();
//! record.add_field(Field::builder(200).subfield('a', "Title").build());
//! record.add(300, "Comment");
//!
//! let text = record.encode(LINE_DELIMITER);
//! let restored = Record::parse(&text, LINE_DELIMITER)?;
//! assert_eq!(restored, record);
//! assert_eq!(restored.first_subfield_value(200, 'a'), Some("Title"));
//! # Ok::<(), irbis::IrbisError>(())
//! ```

use crate::error::{IrbisError, Result};
use crate::navigator::CharNavigator;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

/// Record line delimiter used in the canonical wire form.
pub const IRBIS_DELIMITER: &str = "\x1F\x1E";

/// One-character record line delimiter used in compact replies.
pub const SHORT_DELIMITER: &str = "\x1E";

/// Plain linefeed delimiter for local and human-readable text.
pub const LINE_DELIMITER: &str = "\n";

/// Marker that introduces a subfield inside a field line.
pub const SUBFIELD_MARKER: char = '^';

/// Record status flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordStatus(u32);

impl RecordStatus {
    /// No flags set.
    pub const NONE: RecordStatus = RecordStatus(0);
    /// Record is logically deleted.
    pub const LOGICALLY_DELETED: RecordStatus = RecordStatus(1);
    /// Record is physically deleted.
    pub const PHYSICALLY_DELETED: RecordStatus = RecordStatus(2);
    /// Record is absent.
    pub const ABSENT: RecordStatus = RecordStatus(4);
    /// Record is not actualized in the inverted file.
    pub const NON_ACTUALIZED: RecordStatus = RecordStatus(8);
    /// Record is the last version.
    pub const LAST_VERSION: RecordStatus = RecordStatus(32);
    /// Record is locked for input.
    pub const LOCKED: RecordStatus = RecordStatus(64);

    /// Build from raw bits.
    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        RecordStatus(bits)
    }

    /// Raw bits.
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// True if every flag in `other` is set.
    #[must_use]
    pub const fn contains(self, other: RecordStatus) -> bool {
        self.0 & other.0 == other.0
    }

    /// Set the flags in `other`.
    pub fn insert(&mut self, other: RecordStatus) {
        self.0 |= other.0;
    }

    /// Clear the flags in `other`.
    pub fn remove(&mut self, other: RecordStatus) {
        self.0 &= !other.0;
    }
}

/// A bibliographic record
///
/// `mfn == 0` marks a record that has not been written to the server yet;
/// such a record also has version 0 and no database.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Master file number, 1-based; 0 while unsaved
    pub mfn: u32,
    /// Status flags
    pub status: RecordStatus,
    /// Server-assigned version
    pub version: u32,
    /// Owning database name
    pub database: String,
    /// Fields in document order
    pub fields: Vec<Field>,
}

/// A field in a record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    /// Field tag, positive
    pub tag: u32,
    /// Value preceding the first subfield; empty when absent
    pub value: String,
    /// Subfields (stored in `SmallVec` to avoid allocation for typical fields with 4 or fewer subfields)
    pub subfields: SmallVec<[Subfield; 4]>,
}

/// A subfield within a field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subfield {
    /// Subfield code (single character)
    pub code: char,
    /// Subfield value
    pub value: String,
}

impl Record {
    /// Create a new, unsaved record
    #[must_use]
    pub fn new() -> Self {
        Record::default()
    }

    /// Create a builder for fluently constructing records
    ///
    /// # Examples
    ///
    /// ```
    /// use irbis::{Field, Record};
    ///
    /// let record = Record::builder()
    ///     .field_str(700, "^aAuthor")
    ///     .field(Field::builder(200).subfield('a', "Title").build())
    ///     .build();
    /// assert_eq!(record.fields.len(), 2);
    /// ```
    #[must_use]
    pub fn builder() -> RecordBuilder {
        RecordBuilder {
            record: Record::new(),
        }
    }

    /// Parse a record from its text form split by `delimiter`.
    ///
    /// # Errors
    ///
    /// Returns an error if the header lines or a field line are malformed.
    pub fn parse(text: &str, delimiter: &str) -> Result<Self> {
        let lines: Vec<&str> = text.split(delimiter).collect();
        Record::decode(&lines)
    }

    /// Decode a record from its text lines.
    ///
    /// Line 0 is `mfn#status`, line 1 is `0#version`, the rest are field
    /// lines. Empty field lines are skipped.
    ///
    /// # Errors
    ///
    /// Returns `IrbisError::ParseError` if a header line is missing or not
    /// numeric, and `IrbisError::InvalidField` for a malformed field line.
    pub fn decode(lines: &[&str]) -> Result<Self> {
        let Some((first, rest)) = lines.split_first() else {
            return Err(IrbisError::ParseError("record text is empty".to_string()));
        };
        let Some((second, field_lines)) = rest.split_first() else {
            return Err(IrbisError::ParseError(
                "record version line is missing".to_string(),
            ));
        };

        let (mfn, status) = parse_header_line(first)?;
        let version = parse_version_line(second)?;

        let mut record = Record {
            mfn,
            status: RecordStatus::from_bits(status),
            version,
            ..Record::default()
        };

        for line in field_lines {
            if line.is_empty() {
                continue;
            }
            record.fields.push(Field::decode(line)?);
        }

        Ok(record)
    }

    /// Encode the record into its text form, terminating every line with `delimiter`.
    #[must_use]
    pub fn encode(&self, delimiter: &str) -> String {
        let mut result = format!(
            "{}#{}{delimiter}0#{}{delimiter}",
            self.mfn,
            self.status.bits(),
            self.version
        );
        for field in &self.fields {
            field.encode_into(&mut result);
            result.push_str(delimiter);
        }
        result
    }

    /// True if the record is logically deleted
    #[must_use]
    pub fn deleted(&self) -> bool {
        self.status.contains(RecordStatus::LOGICALLY_DELETED)
    }

    /// True once the record has been written to a database
    #[must_use]
    pub fn is_persisted(&self) -> bool {
        self.mfn != 0
    }

    /// Forget the server identity of the record, keeping its fields.
    pub fn reset(&mut self) {
        self.mfn = 0;
        self.status = RecordStatus::NONE;
        self.version = 0;
        self.database.clear();
    }

    /// Check every field.
    ///
    /// # Errors
    ///
    /// Returns the first field error found.
    pub fn verify(&self) -> Result<()> {
        self.fields.iter().try_for_each(Field::verify)
    }

    /// Append a field
    pub fn add_field(&mut self, field: Field) {
        self.fields.push(field);
    }

    /// Append a field parsed from `value` text (`value^aSub...`).
    pub fn add(&mut self, tag: u32, value: &str) -> &mut Field {
        self.fields.push(Field::with_text(tag, value));
        let last = self.fields.len() - 1;
        &mut self.fields[last]
    }

    /// Replace the first field with `tag` by `value`, or append one.
    /// An empty `value` removes the field.
    pub fn set_field_value(&mut self, tag: u32, value: &str) {
        let position = self.fields.iter().position(|field| field.tag == tag);
        match (position, value.is_empty()) {
            (Some(index), true) => {
                self.fields.remove(index);
            },
            (Some(index), false) => self.fields[index] = Field::with_text(tag, value),
            (None, true) => {},
            (None, false) => self.fields.push(Field::with_text(tag, value)),
        }
    }

    /// Remove the field at `index`, if any
    pub fn remove_field(&mut self, index: usize) -> Option<Field> {
        (index < self.fields.len()).then(|| self.fields.remove(index))
    }

    /// Remove all fields with a given tag, returning them
    pub fn remove_fields(&mut self, tag: u32) -> Vec<Field> {
        let (removed, kept): (Vec<Field>, Vec<Field>) = std::mem::take(&mut self.fields)
            .into_iter()
            .partition(|field| field.tag == tag);
        self.fields = kept;
        removed
    }

    /// Remove all fields
    pub fn clear(&mut self) {
        self.fields.clear();
    }

    /// Get first field with a given tag
    #[must_use]
    pub fn first_field(&self, tag: u32) -> Option<&Field> {
        self.fields.iter().find(|field| field.tag == tag)
    }

    /// Get first field with a given tag, mutably
    pub fn first_field_mut(&mut self, tag: u32) -> Option<&mut Field> {
        self.fields.iter_mut().find(|field| field.tag == tag)
    }

    /// Iterate over fields matching a specific tag, in document order
    pub fn all_fields(&self, tag: u32) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter(move |field| field.tag == tag)
    }

    /// Value of the first field with `tag`
    #[must_use]
    pub fn first_field_value(&self, tag: u32) -> Option<&str> {
        self.first_field(tag).map(|field| field.value.as_str())
    }

    /// First subfield `code` of the first field with `tag`.
    ///
    /// Later repeats of the field are not consulted, even when the first one
    /// lacks the subfield.
    #[must_use]
    pub fn first_subfield_value(&self, tag: u32, code: char) -> Option<&str> {
        self.first_field(tag)
            .and_then(|field| field.first_subfield_value(code))
    }

    /// All subfield `code` values across all fields with `tag`, in document order.
    #[must_use]
    pub fn all_subfield_values(&self, tag: u32, code: char) -> Vec<&str> {
        self.all_fields(tag)
            .flat_map(|field| field.subfield_values(code))
            .collect()
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode(LINE_DELIMITER))
    }
}

/// Parse `number#number`.
fn parse_header_line(line: &str) -> Result<(u32, u32)> {
    let mut navigator = CharNavigator::new(line);
    let first = navigator.read_to('#');
    let second = navigator.remaining();
    Ok((parse_header_number(first, line)?, parse_header_number(second, line)?))
}

/// Parse `placeholder#version`; the placeholder is not read.
fn parse_version_line(line: &str) -> Result<u32> {
    let version = line.split_once('#').map_or(line, |(_, version)| version);
    parse_header_number(version, line)
}

fn parse_header_number(text: &str, line: &str) -> Result<u32> {
    text.trim()
        .parse()
        .map_err(|_| IrbisError::ParseError(format!("bad record header line: {line:?}")))
}

/// Builder for [`Record`]
#[derive(Debug)]
pub struct RecordBuilder {
    record: Record,
}

impl RecordBuilder {
    /// Set the MFN
    #[must_use]
    pub fn mfn(mut self, mfn: u32) -> Self {
        self.record.mfn = mfn;
        self
    }

    /// Set the status
    #[must_use]
    pub fn status(mut self, status: RecordStatus) -> Self {
        self.record.status = status;
        self
    }

    /// Set the version
    #[must_use]
    pub fn version(mut self, version: u32) -> Self {
        self.record.version = version;
        self
    }

    /// Set the database
    #[must_use]
    pub fn database(mut self, database: &str) -> Self {
        self.record.database = database.to_string();
        self
    }

    /// Add a field
    #[must_use]
    pub fn field(mut self, field: Field) -> Self {
        self.record.fields.push(field);
        self
    }

    /// Add a field from its `value^aSub...` text
    #[must_use]
    pub fn field_str(mut self, tag: u32, text: &str) -> Self {
        self.record.fields.push(Field::with_text(tag, text));
        self
    }

    /// Build the record
    #[must_use]
    pub fn build(self) -> Record {
        self.record
    }
}

impl Field {
    /// Create a new field with no value or subfields
    #[must_use]
    pub fn new(tag: u32) -> Self {
        Field {
            tag,
            value: String::new(),
            subfields: SmallVec::new(),
        }
    }

    /// Create a field with a direct value and no subfields
    #[must_use]
    pub fn with_value(tag: u32, value: &str) -> Self {
        Field {
            tag,
            value: value.to_string(),
            subfields: SmallVec::new(),
        }
    }

    /// Create a field from the body of a field line (`value^aSub...`).
    #[must_use]
    pub fn with_text(tag: u32, text: &str) -> Self {
        let mut field = Field::new(tag);
        field.parse_body(text);
        field
    }

    /// Create a builder for fluently constructing fields
    #[must_use]
    pub fn builder(tag: u32) -> FieldBuilder {
        FieldBuilder {
            field: Field::new(tag),
        }
    }

    /// Decode one field line: `tag#value^code1value1^code2value2...`
    ///
    /// # Errors
    ///
    /// Returns `IrbisError::InvalidField` if the line has no `#` or the tag
    /// is not a positive number.
    pub fn decode(line: &str) -> Result<Self> {
        let mut navigator = CharNavigator::new(line);
        let tag_text = navigator.read_until('#');
        if navigator.read() != Some('#') {
            return Err(IrbisError::InvalidField(format!(
                "missing '#' in field line: {line:?}"
            )));
        }

        let tag = tag_text
            .trim()
            .parse::<u32>()
            .ok()
            .filter(|&tag| tag > 0)
            .ok_or_else(|| IrbisError::InvalidField(format!("bad tag: {tag_text:?}")))?;

        Ok(Field::with_text(tag, navigator.remaining()))
    }

    /// Encode the field as one line (without delimiter)
    #[must_use]
    pub fn encode(&self) -> String {
        let mut result = String::new();
        self.encode_into(&mut result);
        result
    }

    fn encode_into(&self, output: &mut String) {
        output.push_str(&self.tag.to_string());
        output.push('#');
        output.push_str(&self.value);
        for subfield in &self.subfields {
            output.push(SUBFIELD_MARKER);
            output.push(subfield.code);
            output.push_str(&subfield.value);
        }
    }

    fn parse_body(&mut self, text: &str) {
        let mut navigator = CharNavigator::new(text);
        self.value = navigator.read_until(SUBFIELD_MARKER).to_string();
        while navigator.read() == Some(SUBFIELD_MARKER) {
            let chunk = navigator.read_until(SUBFIELD_MARKER);
            let mut chunk_navigator = CharNavigator::new(chunk);
            if let Some(code) = chunk_navigator.read() {
                self.subfields
                    .push(Subfield::new(code, chunk_navigator.remaining()));
            }
        }
    }

    /// Check the field structure.
    ///
    /// # Errors
    ///
    /// Returns `IrbisError::InvalidField` for tag 0 or a subfield with no code.
    pub fn verify(&self) -> Result<()> {
        if self.tag == 0 {
            return Err(IrbisError::InvalidField("tag must be positive".to_string()));
        }
        if let Some(subfield) = self.subfields.iter().find(|s| s.code == Subfield::NO_CODE) {
            return Err(IrbisError::InvalidField(format!(
                "field {} has a subfield without code: {:?}",
                self.tag, subfield.value
            )));
        }
        Ok(())
    }

    /// Add a subfield
    pub fn add_subfield(&mut self, code: char, value: &str) {
        self.subfields.push(Subfield::new(code, value));
    }

    /// Get first subfield with a given code (case-insensitive)
    #[must_use]
    pub fn first_subfield(&self, code: char) -> Option<&Subfield> {
        self.subfields.iter().find(|subfield| subfield.matches(code))
    }

    /// Get first subfield value with a given code (case-insensitive)
    #[must_use]
    pub fn first_subfield_value(&self, code: char) -> Option<&str> {
        self.first_subfield(code)
            .map(|subfield| subfield.value.as_str())
    }

    /// Iterate over subfield values with a given code (case-insensitive)
    pub fn subfield_values(&self, code: char) -> impl Iterator<Item = &str> {
        self.subfields
            .iter()
            .filter(move |subfield| subfield.matches(code))
            .map(|subfield| subfield.value.as_str())
    }

    /// Remove all subfields with a given code, returning them
    pub fn remove_subfields(&mut self, code: char) -> Vec<Subfield> {
        let mut removed = Vec::new();
        self.subfields.retain(|subfield| {
            if subfield.matches(code) {
                removed.push(subfield.clone());
                false
            } else {
                true
            }
        });
        removed
    }

    /// True if the field has neither a value nor subfields
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.value.is_empty() && self.subfields.is_empty()
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

/// Builder for [`Field`]
#[derive(Debug)]
pub struct FieldBuilder {
    field: Field,
}

impl FieldBuilder {
    /// Set the direct value
    #[must_use]
    pub fn value(mut self, value: &str) -> Self {
        self.field.value = value.to_string();
        self
    }

    /// Add a subfield
    #[must_use]
    pub fn subfield(mut self, code: char, value: &str) -> Self {
        self.field.add_subfield(code, value);
        self
    }

    /// Build the field
    #[must_use]
    pub fn build(self) -> Field {
        self.field
    }
}

impl Subfield {
    /// The "no code" sentinel; never valid in a record.
    pub const NO_CODE: char = '\0';

    /// Create a subfield
    #[must_use]
    pub fn new(code: char, value: &str) -> Self {
        Subfield {
            code,
            value: value.to_string(),
        }
    }

    /// True if the code matches, ignoring ASCII case
    #[must_use]
    pub fn matches(&self, code: char) -> bool {
        self.code.eq_ignore_ascii_case(&code)
    }
}

impl fmt::Display for Subfield {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{SUBFIELD_MARKER}{}{}", self.code, self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_record() -> Record {
        Record::builder()
            .mfn(1)
            .field(Field::builder(200).subfield('a', "Title").build())
            .field(Field::with_value(300, "Comment"))
            .build()
    }

    #[test]
    fn test_record_creation() {
        let record = Record::new();
        assert_eq!(record.mfn, 0);
        assert_eq!(record.version, 0);
        assert!(record.database.is_empty());
        assert!(!record.is_persisted());
        assert!(record.fields.is_empty());
    }

    #[test]
    fn test_encode_line_form() {
        let text = make_record().encode(LINE_DELIMITER);
        assert_eq!(text, "1#0\n0#0\n200#^aTitle\n300#Comment\n");
    }

    #[test]
    fn test_roundtrip_all_delimiters() {
        let mut record = make_record();
        record.version = 7;
        record.status = RecordStatus::LAST_VERSION;
        for delimiter in [IRBIS_DELIMITER, SHORT_DELIMITER, LINE_DELIMITER] {
            let text = record.encode(delimiter);
            let restored = Record::parse(&text, delimiter).unwrap();
            assert_eq!(restored, record);
        }
    }

    #[test]
    fn test_decode_skips_empty_lines() {
        let lines = ["5#0", "0#2", "", "700#^aAuthor", "", ""];
        let record = Record::decode(&lines).unwrap();
        assert_eq!(record.mfn, 5);
        assert_eq!(record.version, 2);
        assert_eq!(record.fields.len(), 1);
    }

    #[test]
    fn test_decode_header_errors() {
        assert!(Record::decode(&[]).is_err());
        assert!(Record::decode(&["1#0"]).is_err());
        assert!(Record::decode(&["x#0", "0#1"]).is_err());
        assert!(Record::decode(&["1#0", "0#x"]).is_err());
    }

    #[test]
    fn test_version_line_placeholder_is_ignored() {
        let record = Record::decode(&["1#0", "x#3", "200#^aTitle"]).unwrap();
        assert_eq!(record.mfn, 1);
        assert_eq!(record.version, 3);
        assert_eq!(record.first_subfield_value(200, 'a'), Some("Title"));
    }

    #[test]
    fn test_field_decode_forms() {
        let empty = Field::decode("920#").unwrap();
        assert!(empty.is_empty());

        let only_subfields = Field::decode("200#^aTitle^eSubtitle").unwrap();
        assert!(only_subfields.value.is_empty());
        assert_eq!(only_subfields.subfields.len(), 2);
        assert_eq!(only_subfields.subfields[1], Subfield::new('e', "Subtitle"));

        let mixed = Field::decode("910#Value^aX").unwrap();
        assert_eq!(mixed.value, "Value");
        assert_eq!(mixed.first_subfield_value('a'), Some("X"));
    }

    #[test]
    fn test_field_decode_trailing_marker() {
        let field = Field::decode("200#^aTitle^").unwrap();
        assert_eq!(field.subfields.len(), 1);
    }

    #[test]
    fn test_field_decode_errors() {
        assert!(Field::decode("no hash here").is_err());
        assert!(Field::decode("0#zero tag").is_err());
        assert!(Field::decode("abc#text").is_err());
    }

    #[test]
    fn test_subfield_code_case_insensitive() {
        let field = Field::decode("200#^ATitle").unwrap();
        assert_eq!(field.first_subfield_value('a'), Some("Title"));
        assert_eq!(field.subfield_values('A').count(), 1);
    }

    #[test]
    fn test_first_and_all_subfield_values() {
        let record = Record::builder()
            .field_str(910, "^aFirst^bInv1")
            .field_str(200, "^aTitle")
            .field_str(910, "^aSecond^bInv2")
            .build();
        assert_eq!(record.first_subfield_value(910, 'a'), Some("First"));
        assert_eq!(record.all_subfield_values(910, 'a'), vec!["First", "Second"]);
        assert_eq!(record.all_fields(910).count(), 2);
        assert_eq!(record.first_subfield_value(910, 'z'), None);
    }

    #[test]
    fn test_first_subfield_value_uses_first_occurrence_only() {
        let record = Record::builder()
            .field_str(910, "^bInv1")
            .field_str(910, "^aSecond")
            .build();
        assert_eq!(record.first_subfield_value(910, 'a'), None);
        assert_eq!(record.all_subfield_values(910, 'a'), vec!["Second"]);
    }

    #[test]
    fn test_deleted_flag() {
        let mut record = make_record();
        assert!(!record.deleted());
        record.status.insert(RecordStatus::LOGICALLY_DELETED);
        assert!(record.deleted());
        record.status.remove(RecordStatus::LOGICALLY_DELETED);
        assert!(!record.deleted());
    }

    #[test]
    fn test_reset_restores_unsaved_state() {
        let mut record = make_record();
        record.version = 4;
        record.database = "IBIS".to_string();
        record.reset();
        assert_eq!(record.mfn, 0);
        assert_eq!(record.version, 0);
        assert!(record.database.is_empty());
        assert_eq!(record.fields.len(), 2);
    }

    #[test]
    fn test_set_field_value() {
        let mut record = make_record();
        record.set_field_value(300, "Changed");
        assert_eq!(record.first_field_value(300), Some("Changed"));
        record.set_field_value(300, "");
        assert!(record.first_field(300).is_none());
        record.set_field_value(10, "^a5-02-013");
        assert_eq!(record.first_subfield_value(10, 'a'), Some("5-02-013"));
    }

    #[test]
    fn test_remove_fields() {
        let mut record = make_record();
        record.add(200, "^aSecond");
        let removed = record.remove_fields(200);
        assert_eq!(removed.len(), 2);
        assert_eq!(record.fields.len(), 1);
        assert!(record.remove_field(5).is_none());
        assert_eq!(record.remove_field(0).map(|f| f.tag), Some(300));
    }

    #[test]
    fn test_verify() {
        let mut record = make_record();
        assert!(record.verify().is_ok());
        record.add_field(Field::new(0));
        assert!(record.verify().is_err());

        let mut field = Field::new(200);
        field.add_subfield(Subfield::NO_CODE, "x");
        assert!(field.verify().is_err());
    }

    #[test]
    fn test_display() {
        let field = Field::builder(700).subfield('a', "Pushkin").subfield('g', "A. S.").build();
        assert_eq!(field.to_string(), "700#^aPushkin^gA. S.");
        assert_eq!(Subfield::new('a', "X").to_string(), "^aX");
    }
}
