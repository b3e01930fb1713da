//! Validation engine
//!
//! Evaluates an ordered list of `ValidationRule`s against one entered value
//! and reports the first failure. Validation failures are ordinary results
//! (a message), never errors.

mod validator;
mod value;

pub use validator::{rule_passes, validate, PASSWORD_MIN_LENGTH};
pub use value::{is_truthy, text_length, to_display_string, trim_text};
