//! Derivation engine
//!
//! Computes the display value of a derived field from the current entered
//! values. Dispatch is a closed match over `DerivationLogic`; new derivations
//! are new variants.
//!
//! Failures (no parent value, unparseable date, unknown logic) never
//! propagate: `derive_value` returns the empty string instead.

mod engine;
mod errors;

pub use engine::{derive_value, derive_value_at, parse_date, try_derive_at};
pub use errors::{DerivationError, DerivationResult};
