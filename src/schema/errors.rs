//! Schema error types
//!
//! Error codes:
//! - FORM_EMPTY_NAME
//! - FORM_NO_FIELDS
//! - FORM_EMPTY_LABEL
//! - FORM_DUPLICATE_FIELD_ID
//! - FORM_UNKNOWN_FIELD
//! - FORM_INDEX_OUT_OF_RANGE
//! - FORM_INVALID_STRUCTURE

use std::fmt;

/// Schema-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaErrorCode {
    /// Form saved without a name
    FormEmptyName,
    /// Form saved without any field
    FormNoFields,
    /// Field committed without a label
    FormEmptyLabel,
    /// Field id already used in the form
    FormDuplicateFieldId,
    /// Field id not present in the form
    FormUnknownField,
    /// Reorder or rule index past the end of the list
    FormIndexOutOfRange,
    /// Schema violates a structural invariant
    FormInvalidStructure,
}

impl SchemaErrorCode {
    /// Returns the stable string code
    pub fn code(&self) -> &'static str {
        match self {
            SchemaErrorCode::FormEmptyName => "FORM_EMPTY_NAME",
            SchemaErrorCode::FormNoFields => "FORM_NO_FIELDS",
            SchemaErrorCode::FormEmptyLabel => "FORM_EMPTY_LABEL",
            SchemaErrorCode::FormDuplicateFieldId => "FORM_DUPLICATE_FIELD_ID",
            SchemaErrorCode::FormUnknownField => "FORM_UNKNOWN_FIELD",
            SchemaErrorCode::FormIndexOutOfRange => "FORM_INDEX_OUT_OF_RANGE",
            SchemaErrorCode::FormInvalidStructure => "FORM_INVALID_STRUCTURE",
        }
    }
}

impl fmt::Display for SchemaErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Schema error type with context
#[derive(Debug, Clone)]
pub struct SchemaError {
    code: SchemaErrorCode,
    message: String,
    /// Field the error refers to, if any
    field_id: Option<String>,
}

impl SchemaError {
    pub fn empty_name() -> Self {
        Self {
            code: SchemaErrorCode::FormEmptyName,
            message: "Form name must not be empty".into(),
            field_id: None,
        }
    }

    pub fn no_fields() -> Self {
        Self {
            code: SchemaErrorCode::FormNoFields,
            message: "Form must contain at least one field".into(),
            field_id: None,
        }
    }

    pub fn empty_label(field_id: impl Into<String>) -> Self {
        let id = field_id.into();
        Self {
            code: SchemaErrorCode::FormEmptyLabel,
            message: format!("Field '{}' has an empty label", id),
            field_id: Some(id),
        }
    }

    pub fn duplicate_field(field_id: impl Into<String>) -> Self {
        let id = field_id.into();
        Self {
            code: SchemaErrorCode::FormDuplicateFieldId,
            message: format!("Field id '{}' already exists in this form", id),
            field_id: Some(id),
        }
    }

    pub fn unknown_field(field_id: impl Into<String>) -> Self {
        let id = field_id.into();
        Self {
            code: SchemaErrorCode::FormUnknownField,
            message: format!("Field '{}' not found", id),
            field_id: Some(id),
        }
    }

    pub fn index_out_of_range(index: usize, len: usize) -> Self {
        Self {
            code: SchemaErrorCode::FormIndexOutOfRange,
            message: format!("Index {} out of range for length {}", index, len),
            field_id: None,
        }
    }

    pub fn invalid_structure(reason: impl Into<String>) -> Self {
        Self {
            code: SchemaErrorCode::FormInvalidStructure,
            message: reason.into(),
            field_id: None,
        }
    }

    /// Returns the error code
    pub fn code(&self) -> SchemaErrorCode {
        self.code
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the field id if applicable
    pub fn field_id(&self) -> Option<&str> {
        self.field_id.as_deref()
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for SchemaError {}

/// Result type for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;
