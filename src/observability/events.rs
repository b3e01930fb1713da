//! Observable events
//!
//! Events are explicit and typed. Each carries the severity it is normally
//! logged at.

use std::fmt;

use super::logger::Severity;

/// Observable events in formwright
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Configuration
    /// Configuration loaded
    ConfigLoaded,

    // Persistence
    /// Saved forms read from storage
    FormsLoaded,
    /// Stored forms could not be read or parsed; treated as empty
    FormsLoadFailed,
    /// Forms collection written to storage
    FormsSaved,
    /// A new form was appended to the collection
    FormSaved,

    // Evaluation
    /// A derived field could not be computed
    DerivationFailed,
    /// Submission passed validation
    SubmitAccepted,
    /// Submission failed validation
    SubmitRejected,

    // CLI
    /// A command terminated with an error
    CommandFailed,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",

            Event::FormsLoaded => "FORMS_LOADED",
            Event::FormsLoadFailed => "FORMS_LOAD_FAILED",
            Event::FormsSaved => "FORMS_SAVED",
            Event::FormSaved => "FORM_SAVED",

            Event::DerivationFailed => "DERIVATION_FAILED",
            Event::SubmitAccepted => "SUBMIT_ACCEPTED",
            Event::SubmitRejected => "SUBMIT_REJECTED",

            Event::CommandFailed => "COMMAND_FAILED",
        }
    }

    /// Severity the event is logged at by default
    pub fn severity(&self) -> Severity {
        match self {
            Event::DerivationFailed => Severity::Trace,
            Event::FormsLoadFailed => Severity::Warn,
            Event::CommandFailed => Severity::Error,
            _ => Severity::Info,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_events_have_string_representation() {
        let events = [
            Event::ConfigLoaded,
            Event::FormsLoaded,
            Event::FormsLoadFailed,
            Event::FormsSaved,
            Event::FormSaved,
            Event::DerivationFailed,
            Event::SubmitAccepted,
            Event::SubmitRejected,
            Event::CommandFailed,
        ];

        for event in events {
            let s = event.as_str();
            assert!(!s.is_empty());
            assert!(s.chars().all(|c| c.is_uppercase() || c == '_'));
        }
    }

    #[test]
    fn test_event_severity() {
        assert_eq!(Event::DerivationFailed.severity(), Severity::Trace);
        assert_eq!(Event::FormsLoadFailed.severity(), Severity::Warn);
        assert_eq!(Event::CommandFailed.severity(), Severity::Error);
        assert_eq!(Event::SubmitRejected.severity(), Severity::Info);
    }

    #[test]
    fn test_event_display() {
        assert_eq!(format!("{}", Event::FormsSaved), "FORMS_SAVED");
        assert_eq!(format!("{}", Event::SubmitAccepted), "SUBMIT_ACCEPTED");
    }
}
