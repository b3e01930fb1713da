//! Live preview of one form
//!
//! The session owns the value map and error map for a single schema.
//! Every mutation runs to completion before the next event; there is no
//! background work.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use super::errors::{SessionError, SessionResult};
use crate::derivation::try_derive_at;
use crate::observability::{Event, Logger};
use crate::schema::{DefaultValue, FieldConfig, FieldType, FormSchema, ValueMap};
use crate::validation::{is_truthy, validate};

/// Source of "now" for derivations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Clock {
    /// Wall clock, read on every recomputation
    #[default]
    System,
    /// Pinned instant
    Fixed(DateTime<Utc>),
}

impl Clock {
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::System => Utc::now(),
            Clock::Fixed(at) => *at,
        }
    }
}

/// One field's validation failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldError {
    pub field_id: String,
    pub message: String,
}

/// Result of a submit attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Every input field is valid
    Accepted,
    /// All failing fields, in schema order
    Rejected(Vec<FieldError>),
}

impl SubmitOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, SubmitOutcome::Accepted)
    }

    pub fn errors(&self) -> &[FieldError] {
        match self {
            SubmitOutcome::Accepted => &[],
            SubmitOutcome::Rejected(errors) => errors,
        }
    }
}

/// Seeds the value map for a fresh preview.
///
/// Checkbox fields start at their boolean default or `false`; other input
/// fields at their default or `""`. Derived fields get no entry.
pub fn initial_values(schema: &FormSchema) -> ValueMap {
    schema
        .input_fields()
        .map(|field| (field.id.clone(), seed_value(field)))
        .collect()
}

fn seed_value(field: &FieldConfig) -> Value {
    match (&field.field_type, &field.default_value) {
        (FieldType::Checkbox, Some(DefaultValue::Flag(b))) => Value::Bool(*b),
        (FieldType::Checkbox, _) => Value::Bool(false),
        (_, Some(default)) => default.to_value(),
        (_, None) => Value::String(String::new()),
    }
}

/// Evaluation state for one schema
#[derive(Debug)]
pub struct EvaluationSession<'a> {
    schema: &'a FormSchema,
    clock: Clock,
    values: ValueMap,
    derived: ValueMap,
    errors: BTreeMap<String, String>,
}

impl<'a> EvaluationSession<'a> {
    /// Starts a session on the wall clock
    pub fn new(schema: &'a FormSchema) -> Self {
        Self::with_clock(schema, Clock::System)
    }

    /// Starts a session with an explicit clock
    pub fn with_clock(schema: &'a FormSchema, clock: Clock) -> Self {
        let mut session = Self {
            schema,
            clock,
            values: initial_values(schema),
            derived: ValueMap::new(),
            errors: BTreeMap::new(),
        };
        session.recompute_derived();
        session
    }

    pub fn schema(&self) -> &FormSchema {
        self.schema
    }

    /// Current entered values (input fields only)
    pub fn values(&self) -> &ValueMap {
        &self.values
    }

    pub fn value(&self, field_id: &str) -> Option<&Value> {
        self.values.get(field_id)
    }

    /// Computed values of derived fields
    pub fn derived_values(&self) -> &ValueMap {
        &self.derived
    }

    pub fn derived_value(&self, field_id: &str) -> Option<&Value> {
        self.derived.get(field_id)
    }

    /// Current error messages keyed by field id
    pub fn errors(&self) -> &BTreeMap<String, String> {
        &self.errors
    }

    pub fn error(&self, field_id: &str) -> Option<&str> {
        self.errors.get(field_id).map(String::as_str)
    }

    /// Back to the seeded state: defaults, no errors, fresh derived values
    pub fn reset(&mut self) {
        self.values = initial_values(self.schema);
        self.errors.clear();
        self.recompute_derived();
    }

    /// Records a new value for an input field.
    ///
    /// Clears that field's error (it returns only on the next blur or submit)
    /// and recomputes every derived field.
    pub fn set_value(&mut self, field_id: &str, value: Value) -> SessionResult<()> {
        let field = self.input_field(field_id)?;
        let id = field.id.clone();

        self.values.insert(id, value);
        self.errors.remove(field_id);
        self.recompute_derived();
        Ok(())
    }

    /// Validates one field as when focus leaves it.
    ///
    /// Stores and returns the message, or clears the stored one when valid.
    /// Derived fields never produce a message.
    pub fn blur(&mut self, field_id: &str) -> SessionResult<Option<&str>> {
        let schema = self.schema;
        let field = schema
            .field(field_id)
            .ok_or_else(|| SessionError::UnknownField(field_id.to_string()))?;

        match self.check_field(field) {
            Some(message) => {
                self.errors.insert(field.id.clone(), message);
            }
            None => {
                self.errors.remove(field_id);
            }
        }
        Ok(self.error(field_id))
    }

    /// Validates every input field in schema order.
    ///
    /// The error map is replaced by exactly the failures found. Submission is
    /// accepted only when there are none. Nothing is stored.
    pub fn submit(&mut self) -> SubmitOutcome {
        let schema = self.schema;
        let failures: Vec<FieldError> = schema
            .input_fields()
            .filter_map(|field| {
                self.check_field(field).map(|message| FieldError {
                    field_id: field.id.clone(),
                    message,
                })
            })
            .collect();

        self.errors = failures
            .iter()
            .map(|e| (e.field_id.clone(), e.message.clone()))
            .collect();

        let count = failures.len().to_string();
        if failures.is_empty() {
            Logger::info(Event::SubmitAccepted.as_str(), &[("form_id", schema.id.as_str())]);
            SubmitOutcome::Accepted
        } else {
            Logger::info(
                Event::SubmitRejected.as_str(),
                &[("error_count", count.as_str()), ("form_id", schema.id.as_str())],
            );
            SubmitOutcome::Rejected(failures)
        }
    }

    /// Runs the field's effective rules against its effective value.
    /// Checkbox values are read as booleans.
    fn check_field(&self, field: &FieldConfig) -> Option<String> {
        if field.is_derived {
            return None;
        }
        let current = self.values.get(&field.id).cloned().unwrap_or(Value::Null);
        let value = if field.field_type == FieldType::Checkbox {
            Value::Bool(is_truthy(&current))
        } else {
            current
        };
        let rules = field.effective_rules();
        validate(&value, &rules).map(str::to_string)
    }

    fn input_field(&self, field_id: &str) -> SessionResult<&'a FieldConfig> {
        let field = self
            .schema
            .field(field_id)
            .ok_or_else(|| SessionError::UnknownField(field_id.to_string()))?;
        if field.is_derived {
            return Err(SessionError::ReadOnlyField(field_id.to_string()));
        }
        Ok(field)
    }

    fn recompute_derived(&mut self) {
        let now = self.clock.now();
        let values = &self.values;
        self.derived = self
            .schema
            .derived_fields()
            .map(|field| {
                let value = match try_derive_at(field, values, now) {
                    Ok(value) => value,
                    Err(e) => {
                        let reason = e.to_string();
                        Logger::trace(
                            Event::DerivationFailed.as_str(),
                            &[("field_id", field.id.as_str()), ("reason", reason.as_str())],
                        );
                        Value::String(String::new())
                    }
                };
                (field.id.clone(), value)
            })
            .collect();
    }
}
