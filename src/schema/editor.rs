//! Editing buffer for forms under construction
//!
//! Field edits are pure transforms: each `with_*` method consumes a
//! `FieldConfig` and returns the rebuilt one. The `required` flag is the only
//! writer of the leading `required` rule.

use chrono::{DateTime, Utc};

use super::errors::{SchemaError, SchemaResult};
use super::types::{
    DerivationLogic, FieldConfig, FieldOption, FieldType, FormSchema, RuleKind, ValidationRule,
    REQUIRED_MESSAGE,
};
use crate::ids::IdGenerator;

/// Message given to rules added without one
pub const FALLBACK_RULE_MESSAGE: &str = "Invalid value";

impl FieldConfig {
    /// Sets the required flag, rebuilding the rule list so that it holds
    /// exactly one leading `required` rule when on and none when off.
    pub fn with_required(self, required: bool) -> Self {
        self.with_required_message(required, REQUIRED_MESSAGE)
    }

    /// Same as [`FieldConfig::with_required`] with a custom message.
    pub fn with_required_message(self, required: bool, message: impl Into<String>) -> Self {
        let mut validations: Vec<ValidationRule> = self
            .validations
            .into_iter()
            .filter(|r| r.kind != RuleKind::Required)
            .collect();
        if required {
            validations.insert(0, ValidationRule::required(message));
        }
        Self {
            required,
            validations,
            ..self
        }
    }

    /// Changes the input type. Options survive only for select and radio;
    /// the default value is cleared.
    pub fn with_type(self, field_type: FieldType) -> Self {
        let options = if field_type.has_options() {
            self.options
        } else {
            Vec::new()
        };
        Self {
            field_type,
            options,
            default_value: None,
            ..self
        }
    }

    /// Turns derivation on or off. A derived field keeps no default value.
    pub fn with_derived(self, is_derived: bool) -> Self {
        let default_value = if is_derived { None } else { self.default_value };
        Self {
            is_derived,
            default_value,
            ..self
        }
    }

    /// Marks the field derived from `parents` through `logic`.
    pub fn with_derivation(self, parents: Vec<String>, logic: DerivationLogic) -> Self {
        Self {
            parent_fields: parents,
            derivation_logic: logic,
            ..self.with_derived(true)
        }
    }

    /// Appends a rule.
    ///
    /// A `required` rule is not appended: it switches the required flag on
    /// with the rule's message instead.
    pub fn with_rule(self, mut rule: ValidationRule) -> Self {
        if rule.message.is_empty() {
            rule.message = FALLBACK_RULE_MESSAGE.to_string();
        }
        if rule.kind == RuleKind::Required {
            return self.with_required_message(true, rule.message);
        }
        if rule.kind.is_length() && rule.bound.is_none() {
            rule.bound = Some(0);
        }
        let mut validations = self.validations;
        validations.push(rule);
        Self {
            validations,
            ..self
        }
    }

    /// Removes the rule at `index`. Removing the `required` rule clears the flag.
    pub fn without_rule(self, index: usize) -> SchemaResult<Self> {
        let len = self.validations.len();
        let kind = match self.validations.get(index) {
            Some(rule) => rule.kind.clone(),
            None => return Err(SchemaError::index_out_of_range(index, len)),
        };
        if kind == RuleKind::Required {
            return Ok(self.with_required(false));
        }
        let mut validations = self.validations;
        validations.remove(index);
        Ok(Self {
            validations,
            ..self
        })
    }

    /// Replaces the options from comma-separated labels; each label is also
    /// the option value.
    pub fn with_options_csv(self, text: &str) -> Self {
        let options = text
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|label| FieldOption::new(label, label))
            .collect();
        Self { options, ..self }
    }
}

/// A form being assembled, not yet saved
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormDraft {
    pub name: String,
    fields: Vec<FieldConfig>,
}

impl FormDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a draft from a saved form's name and fields
    pub fn load(schema: &FormSchema) -> Self {
        Self {
            name: schema.name.clone(),
            fields: schema.fields.clone(),
        }
    }

    pub fn fields(&self) -> &[FieldConfig] {
        &self.fields
    }

    pub fn field(&self, id: &str) -> Option<&FieldConfig> {
        self.fields.iter().find(|f| f.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Replaces the whole field list
    pub fn set_fields(&mut self, fields: Vec<FieldConfig>) {
        self.fields = fields;
    }

    /// Commits a new field at the end of the form
    pub fn add_field(&mut self, field: FieldConfig) -> SchemaResult<()> {
        if !field.is_savable() {
            return Err(SchemaError::empty_label(&field.id));
        }
        if self.field(&field.id).is_some() {
            return Err(SchemaError::duplicate_field(&field.id));
        }
        self.fields.push(field);
        Ok(())
    }

    /// Replaces the field with id `id`. The replacement may carry a new id as
    /// long as it does not collide with another field.
    pub fn update_field(&mut self, id: &str, field: FieldConfig) -> SchemaResult<()> {
        if !field.is_savable() {
            return Err(SchemaError::empty_label(&field.id));
        }
        let idx = self
            .fields
            .iter()
            .position(|f| f.id == id)
            .ok_or_else(|| SchemaError::unknown_field(id))?;
        if field.id != id && self.field(&field.id).is_some() {
            return Err(SchemaError::duplicate_field(&field.id));
        }
        self.fields[idx] = field;
        Ok(())
    }

    /// Removes a field, returning it
    pub fn remove_field(&mut self, id: &str) -> SchemaResult<FieldConfig> {
        let idx = self
            .fields
            .iter()
            .position(|f| f.id == id)
            .ok_or_else(|| SchemaError::unknown_field(id))?;
        Ok(self.fields.remove(idx))
    }

    /// Moves the field at `from` so it ends up at `to`
    pub fn reorder(&mut self, from: usize, to: usize) -> SchemaResult<()> {
        let len = self.fields.len();
        if from >= len {
            return Err(SchemaError::index_out_of_range(from, len));
        }
        if to >= len {
            return Err(SchemaError::index_out_of_range(to, len));
        }
        let field = self.fields.remove(from);
        self.fields.insert(to, field);
        Ok(())
    }

    /// Freezes the draft into a saved form and resets the draft.
    ///
    /// The name is trimmed and must be non-empty; the form needs at least one
    /// field and must pass [`FormSchema::validate_structure`]. On error the
    /// draft is left untouched.
    pub fn save(
        &mut self,
        name: &str,
        ids: &IdGenerator,
        created_at: DateTime<Utc>,
    ) -> SchemaResult<FormSchema> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SchemaError::empty_name());
        }
        if self.fields.is_empty() {
            return Err(SchemaError::no_fields());
        }

        let schema = FormSchema::new(ids.next_id(), name, created_at, self.fields.clone());
        schema
            .validate_structure()
            .map_err(SchemaError::invalid_structure)?;

        *self = Self::default();
        Ok(schema)
    }
}
