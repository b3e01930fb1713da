//! Persistence adapter for saved forms
//!
//! The saved-forms collection is read wholesale and written wholesale:
//! - `try_load_forms` reports unreadable data; absent data is no forms
//! - `load_forms` never fails; unreadable data reads as no forms
//! - `add_form` refuses to write over data it could not read
//! - `save_forms` replaces the whole collection
//!
//! There is no locking. Two writers sharing one store race and the last
//! write wins.

mod errors;
mod store;

pub use errors::{StoreError, StoreResult};
pub use store::{FileFormStore, FormStore, MemoryFormStore};
