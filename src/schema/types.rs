//! Form schema type definitions
//!
//! Supported field types:
//! - text, number, textarea: free-form input
//! - select, radio: choice from an ordered option list
//! - checkbox: boolean flag
//! - date: calendar date
//!
//! Stored forms mirror these types field-for-field in camelCase JSON.

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Current entered values keyed by field id
pub type ValueMap = BTreeMap<String, Value>;

/// Message used for the rule inserted by the `required` flag
pub const REQUIRED_MESSAGE: &str = "This field is required";

/// Closed set of field input types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Number,
    Textarea,
    Select,
    Radio,
    Checkbox,
    Date,
}

impl FieldType {
    /// All field types in palette order
    pub const ALL: [FieldType; 7] = [
        FieldType::Text,
        FieldType::Number,
        FieldType::Textarea,
        FieldType::Select,
        FieldType::Radio,
        FieldType::Checkbox,
        FieldType::Date,
    ];

    /// Returns the type name used in storage and error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Number => "number",
            FieldType::Textarea => "textarea",
            FieldType::Select => "select",
            FieldType::Radio => "radio",
            FieldType::Checkbox => "checkbox",
            FieldType::Date => "date",
        }
    }

    /// Whether fields of this type carry an option list
    pub fn has_options(&self) -> bool {
        matches!(self, FieldType::Select | FieldType::Radio)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.type_name())
    }
}

/// Kind of a validation rule.
///
/// Unrecognized kinds are kept verbatim so stored forms survive a round trip;
/// they always pass validation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RuleKind {
    Required,
    MinLength,
    MaxLength,
    Email,
    Password,
    Unknown(String),
}

impl RuleKind {
    pub fn as_str(&self) -> &str {
        match self {
            RuleKind::Required => "required",
            RuleKind::MinLength => "minLength",
            RuleKind::MaxLength => "maxLength",
            RuleKind::Email => "email",
            RuleKind::Password => "password",
            RuleKind::Unknown(other) => other,
        }
    }

    /// Length kinds are the only ones that read a bound
    pub fn is_length(&self) -> bool {
        matches!(self, RuleKind::MinLength | RuleKind::MaxLength)
    }
}

impl From<String> for RuleKind {
    fn from(s: String) -> Self {
        match s.as_str() {
            "required" => RuleKind::Required,
            "minLength" => RuleKind::MinLength,
            "maxLength" => RuleKind::MaxLength,
            "email" => RuleKind::Email,
            "password" => RuleKind::Password,
            _ => RuleKind::Unknown(s),
        }
    }
}

impl From<RuleKind> for String {
    fn from(kind: RuleKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A named condition plus the message reported when it fails
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationRule {
    #[serde(rename = "type")]
    pub kind: RuleKind,
    /// Length bound, read only by minLength/maxLength
    #[serde(rename = "value", default, skip_serializing_if = "Option::is_none")]
    pub bound: Option<u32>,
    pub message: String,
}

impl ValidationRule {
    pub fn new(kind: RuleKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            bound: None,
            message: message.into(),
        }
    }

    pub fn required(message: impl Into<String>) -> Self {
        Self::new(RuleKind::Required, message)
    }

    pub fn min_length(bound: u32, message: impl Into<String>) -> Self {
        Self {
            kind: RuleKind::MinLength,
            bound: Some(bound),
            message: message.into(),
        }
    }

    pub fn max_length(bound: u32, message: impl Into<String>) -> Self {
        Self {
            kind: RuleKind::MaxLength,
            bound: Some(bound),
            message: message.into(),
        }
    }

    pub fn email(message: impl Into<String>) -> Self {
        Self::new(RuleKind::Email, message)
    }

    pub fn password(message: impl Into<String>) -> Self {
        Self::new(RuleKind::Password, message)
    }
}

/// One choice of a select or radio field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldOption {
    pub label: String,
    pub value: String,
}

impl FieldOption {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// Default value applied when a preview starts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DefaultValue {
    Flag(bool),
    Number(serde_json::Number),
    Text(String),
}

impl DefaultValue {
    pub fn to_value(&self) -> Value {
        match self {
            DefaultValue::Flag(b) => Value::Bool(*b),
            DefaultValue::Number(n) => Value::Number(n.clone()),
            DefaultValue::Text(s) => Value::String(s.clone()),
        }
    }
}

/// Named computation applied to a derived field.
///
/// Adding a derivation means adding a variant here and a branch in
/// `derivation::try_derive_at`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DerivationLogic {
    #[default]
    None,
    /// Whole years elapsed since the date held by the first parent field
    AgeFromDob,
    Unknown(String),
}

impl DerivationLogic {
    pub fn as_str(&self) -> &str {
        match self {
            DerivationLogic::None => "",
            DerivationLogic::AgeFromDob => "ageFromDOB",
            DerivationLogic::Unknown(other) => other,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, DerivationLogic::None)
    }
}

impl From<String> for DerivationLogic {
    fn from(s: String) -> Self {
        match s.as_str() {
            "" => DerivationLogic::None,
            "ageFromDOB" => DerivationLogic::AgeFromDob,
            _ => DerivationLogic::Unknown(s),
        }
    }
}

impl From<DerivationLogic> for String {
    fn from(logic: DerivationLogic) -> Self {
        logic.as_str().to_string()
    }
}

/// Configuration of one form field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldConfig {
    /// Unique within the owning form
    pub id: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub label: String,
    /// Mirrors the presence of a leading `required` rule
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<DefaultValue>,
    #[serde(default)]
    pub options: Vec<FieldOption>,
    /// Evaluated in order; the first failing rule wins
    #[serde(default)]
    pub validations: Vec<ValidationRule>,
    #[serde(default)]
    pub is_derived: bool,
    #[serde(default)]
    pub parent_fields: Vec<String>,
    #[serde(default)]
    pub derivation_logic: DerivationLogic,
}

impl FieldConfig {
    /// Create a plain, optional field with no rules
    pub fn new(id: impl Into<String>, field_type: FieldType, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            field_type,
            label: label.into(),
            required: false,
            default_value: None,
            options: Vec::new(),
            validations: Vec::new(),
            is_derived: false,
            parent_fields: Vec::new(),
            derivation_logic: DerivationLogic::None,
        }
    }

    /// A field the editor would allow saving: its label has visible text
    pub fn is_savable(&self) -> bool {
        !self.label.trim().is_empty()
    }

    /// Rules the preview validates against.
    ///
    /// A field flagged `required` whose list lacks a `required` rule gets one
    /// prepended with the default message.
    pub fn effective_rules(&self) -> Vec<ValidationRule> {
        let mut rules = self.validations.clone();
        if self.required && !rules.iter().any(|r| r.kind == RuleKind::Required) {
            rules.insert(0, ValidationRule::required(REQUIRED_MESSAGE));
        }
        rules
    }

    /// Checks the invariants a single field must hold
    pub fn validate_structure(&self) -> Result<(), String> {
        if self.id.is_empty() {
            return Err("Field id must not be empty".into());
        }

        for (i, rule) in self.validations.iter().enumerate() {
            if rule.kind.is_length() && rule.bound.is_none() {
                return Err(format!(
                    "Field '{}': rule {} ({}) needs a length bound",
                    self.id, i, rule.kind
                ));
            }
        }

        let required_at: Vec<usize> = self
            .validations
            .iter()
            .enumerate()
            .filter(|(_, r)| r.kind == RuleKind::Required)
            .map(|(i, _)| i)
            .collect();

        if self.required {
            if required_at != [0] {
                return Err(format!(
                    "Field '{}': required flag needs exactly one leading 'required' rule",
                    self.id
                ));
            }
        } else if !required_at.is_empty() {
            return Err(format!(
                "Field '{}': 'required' rule present but required flag is off",
                self.id
            ));
        }

        Ok(())
    }
}

/// A saved form: ordered field configurations plus identity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormSchema {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub fields: Vec<FieldConfig>,
}

impl FormSchema {
    /// Create a new form schema
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        created_at: DateTime<Utc>,
        fields: Vec<FieldConfig>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            created_at,
            fields,
        }
    }

    /// Gets a field by id
    pub fn field(&self, id: &str) -> Option<&FieldConfig> {
        self.fields.iter().find(|f| f.id == id)
    }

    /// Fields a user types into, in schema order
    pub fn input_fields(&self) -> impl Iterator<Item = &FieldConfig> {
        self.fields.iter().filter(|f| !f.is_derived)
    }

    /// Fields whose value is computed, in schema order
    pub fn derived_fields(&self) -> impl Iterator<Item = &FieldConfig> {
        self.fields.iter().filter(|f| f.is_derived)
    }

    /// Validates the schema structure itself (not entered values)
    pub fn validate_structure(&self) -> Result<(), String> {
        let mut seen = HashSet::new();
        for field in &self.fields {
            field.validate_structure()?;
            if !seen.insert(field.id.as_str()) {
                return Err(format!("Duplicate field id '{}'", field.id));
            }
        }

        for field in self.derived_fields() {
            for parent in &field.parent_fields {
                if parent == &field.id {
                    return Err(format!("Derived field '{}' depends on itself", field.id));
                }
                match self.field(parent) {
                    None => {
                        return Err(format!(
                            "Derived field '{}' depends on unknown field '{}'",
                            field.id, parent
                        ))
                    }
                    Some(p) if p.is_derived => {
                        return Err(format!(
                            "Derived field '{}' depends on derived field '{}'",
                            field.id, parent
                        ))
                    }
                    Some(_) => {}
                }
            }
        }

        Ok(())
    }
}
