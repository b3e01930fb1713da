//! Form schema subsystem
//!
//! Schemas describe a form: an ordered list of field configurations, each
//! with a type, label, validation rules and optional derivation.
//!
//! # Invariants
//!
//! - Field ids are unique within a form
//! - The `required` flag and a single leading `required` rule go together
//! - Length rules always carry a bound
//! - Derived fields depend only on existing, non-derived fields
//! - Saved schemas are snapshots; editing happens on a `FormDraft`

mod editor;
mod errors;
mod types;

pub use editor::{FormDraft, FALLBACK_RULE_MESSAGE};
pub use errors::{SchemaError, SchemaErrorCode, SchemaResult};
pub use types::{
    DefaultValue, DerivationLogic, FieldConfig, FieldOption, FieldType, FormSchema, RuleKind,
    ValidationRule, ValueMap, REQUIRED_MESSAGE,
};
