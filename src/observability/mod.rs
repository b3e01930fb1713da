//! Observability for formwright
//!
//! Structured JSON logging of typed lifecycle events.
//!
//! # Principles
//!
//! 1. Observability is read-only
//! 2. Logging never fails or alters the operation being logged
//! 3. No async or background threads
//! 4. Deterministic output
//!
//! # Usage
//!
//! ```ignore
//! use formwright::observability::{log_event_with_fields, Event, Logger};
//!
//! Logger::info("FORMS_SAVED", &[("count", "3")]);
//! log_event_with_fields(Event::FormSaved, &[("form_id", "1718000000000")]);
//! ```

mod events;
mod logger;

pub use events::Event;
pub use logger::{Logger, Severity};

/// Log a lifecycle event with fields at its default severity
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event.severity(), event.as_str(), fields);
}
