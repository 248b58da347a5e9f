//! Value decoding errors
//!
//! A decode failure is always scoped to one field of one record. The
//! record builders log it and keep going with the field unset.

use std::num::ParseIntError;

use thiserror::Error;

/// Why a value's text could not be converted
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConvertError {
    /// Text is not an integer of the expected type
    #[error("'{text}' is not a valid {expected}: {source}")]
    InvalidInteger {
        text: String,
        expected: &'static str,
        #[source]
        source: ParseIntError,
    },

    /// Integer parsed but does not map to a representable instant
    #[error("{value} is outside the representable {unit} range")]
    TimestampOutOfRange { value: i64, unit: &'static str },
}

/// A single field failed to decode
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("field {field} (value name '{value_name}') could not be decoded: {source}")]
pub struct FieldDecodeError {
    /// Domain field name
    pub field: &'static str,
    /// Value name (key token) as stored
    pub value_name: String,
    /// Value text as stored
    pub value_data: String,
    #[source]
    pub source: ConvertError,
}

impl FieldDecodeError {
    pub fn new(
        field: &'static str,
        value_name: impl Into<String>,
        value_data: impl Into<String>,
        source: ConvertError,
    ) -> Self {
        Self {
            field,
            value_name: value_name.into(),
            value_data: value_data.into(),
            source,
        }
    }
}
