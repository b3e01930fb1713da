//! formwright - form schemas, rule validation and derived fields
//!
//! A form is an ordered list of field configurations. Entered values are
//! checked against each field's rules, derived fields are recomputed from
//! their parents, and saved forms live in a single JSON file.

pub mod cli;
pub mod derivation;
pub mod ids;
pub mod observability;
pub mod persistence;
pub mod schema;
pub mod session;
pub mod validation;
