//! Form evaluation session
//!
//! Pairs a `FormSchema` with a live map of entered values and keeps two
//! derived views up to date:
//! - derived-field values, recomputed on every change
//! - per-field error messages, refreshed on blur and submit
//!
//! A derived field is never seeded, never validated and never blocks a
//! submission. Submitted values are not persisted.

mod errors;
mod session;

pub use errors::{SessionError, SessionResult};
pub use session::{initial_values, Clock, EvaluationSession, FieldError, SubmitOutcome};
