//! JSON serialization and deserialization of records.
//!
//! This module provides conversion between records and a generic JSON
//! representation, handy for local dumps and diagnostics:
//!
//! ```json
//! {
//!   "mfn": 1, "status": 0, "version": 3, "database": "IBIS",
//!   "fields": [
//!     {"tag": 200, "value": "", "subfields": [{"code": "a", "value": "Title"}]},
//!     {"tag": 300, "value": "Comment", "subfields": []}
//!   ]
//! }
//! ```
//!
//! # Examples
//!
//! ```
//! use irbis::{json, Field, Record};
//!
//! let mut record = Record::new();
//! record.add_field(Field::builder(200).subfield('a', "Title").build());
//!
//! let value = json::record_to_json(&record);
//! let restored = json::json_to_record(&value)?;
//! assert_eq!(restored, record);
//! # Ok::<(), irbis::IrbisError>(())
//! ```

use crate::error::{IrbisError, Result};
use crate::record::{Field, Record, RecordStatus};
use serde_json::{json, Map, Value};

/// Convert a record to JSON.
#[must_use]
pub fn record_to_json(record: &Record) -> Value {
    let fields: Vec<Value> = record
        .fields
        .iter()
        .map(|field| {
            let subfields: Vec<Value> = field
                .subfields
                .iter()
                .map(|subfield| {
                    json!({
                        "code": subfield.code.to_string(),
                        "value": subfield.value
                    })
                })
                .collect();
            json!({
                "tag": field.tag,
                "value": field.value,
                "subfields": subfields
            })
        })
        .collect();

    json!({
        "mfn": record.mfn,
        "status": record.status.bits(),
        "version": record.version,
        "database": record.database,
        "fields": fields
    })
}

/// Convert JSON back to a record.
///
/// Reverses the transformation performed by [`record_to_json`]. Missing
/// `mfn`, `status`, `version`, `database`, `value` and `subfields` keys
/// take their defaults.
///
/// # Errors
///
/// Returns an error if the JSON is not an object, a field has no positive
/// `tag`, or a subfield has no single-character `code`.
pub fn json_to_record(json: &Value) -> Result<Record> {
    let object = json
        .as_object()
        .ok_or_else(|| IrbisError::InvalidRecord("Expected JSON object".to_string()))?;

    let mut record = Record {
        mfn: number(object, "mfn")?,
        status: RecordStatus::from_bits(number(object, "status")?),
        version: number(object, "version")?,
        database: text(object, "database").to_string(),
        fields: Vec::new(),
    };

    let Some(fields) = object.get("fields") else {
        return Ok(record);
    };
    let fields = fields
        .as_array()
        .ok_or_else(|| IrbisError::InvalidRecord("\"fields\" must be an array".to_string()))?;

    for item in fields {
        let field_object = item
            .as_object()
            .ok_or_else(|| IrbisError::InvalidField("Field must be object".to_string()))?;

        let tag = number(field_object, "tag")?;
        if tag == 0 {
            return Err(IrbisError::InvalidField(
                "Field needs a positive tag".to_string(),
            ));
        }
        let mut field = Field::with_value(tag, text(field_object, "value"));

        if let Some(subfields) = field_object.get("subfields").and_then(Value::as_array) {
            for subfield in subfields {
                let code = subfield
                    .get("code")
                    .and_then(Value::as_str)
                    .and_then(single_char)
                    .ok_or_else(|| {
                        IrbisError::InvalidField(format!("Field {tag}: bad subfield code"))
                    })?;
                let value = subfield.get("value").and_then(Value::as_str).unwrap_or("");
                field.add_subfield(code, value);
            }
        }

        record.add_field(field);
    }

    Ok(record)
}

fn number(object: &Map<String, Value>, key: &str) -> Result<u32> {
    match object.get(key) {
        None | Some(Value::Null) => Ok(0),
        Some(value) => value
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .ok_or_else(|| IrbisError::InvalidRecord(format!("\"{key}\" must be a u32"))),
    }
}

fn text<'a>(object: &'a Map<String, Value>, key: &str) -> &'a str {
    object.get(key).and_then(Value::as_str).unwrap_or("")
}

fn single_char(text: &str) -> Option<char> {
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}
