//! Rule evaluation against a single value
//!
//! Semantics:
//! - Rules run in list order; the first failure's message is returned
//! - No rule failing (or no rules at all) means the value is valid
//! - Unknown rule kinds always pass
//! - Pure: no logging, no state

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

use super::value::{is_truthy, text_length, to_display_string, trim_text};
use crate::schema::{RuleKind, ValidationRule};

/// Minimum accepted password length
pub const PASSWORD_MIN_LENGTH: usize = 8;

static EMAIL_PATTERN: OnceLock<Option<Regex>> = OnceLock::new();

fn is_email(text: &str) -> bool {
    EMAIL_PATTERN
        .get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").ok())
        .as_ref()
        .map_or(false, |re| re.is_match(text))
}

/// Validates a value against an ordered rule list.
///
/// Returns the message of the first failing rule, or `None` when every rule
/// passes. Use `Value::Null` for an absent value.
pub fn validate<'r>(value: &Value, rules: &'r [ValidationRule]) -> Option<&'r str> {
    rules
        .iter()
        .find(|rule| !rule_passes(value, rule))
        .map(|rule| rule.message.as_str())
}

/// Evaluates a single rule
pub fn rule_passes(value: &Value, rule: &ValidationRule) -> bool {
    match &rule.kind {
        RuleKind::Required => !is_blank(value),
        RuleKind::MinLength => match rule.bound {
            Some(bound) => text_length(&to_display_string(value)) >= bound as usize,
            None => true,
        },
        RuleKind::MaxLength => match rule.bound {
            Some(bound) => text_length(&to_display_string(value)) <= bound as usize,
            None => true,
        },
        RuleKind::Email => !is_truthy(value) || is_email(&to_display_string(value)),
        RuleKind::Password => {
            let text = if is_truthy(value) {
                to_display_string(value)
            } else {
                String::new()
            };
            text_length(&text) >= PASSWORD_MIN_LENGTH && text.chars().any(|c| c.is_ascii_digit())
        }
        RuleKind::Unknown(_) => true,
    }
}

/// What the `required` rule rejects: null, whitespace-only text and `false`.
/// The number `0` is a present value.
fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::String(s) => trim_text(s).is_empty(),
        _ => false,
    }
}
