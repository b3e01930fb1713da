//! CLI module for formwright
//!
//! Provides command-line interface for:
//! - init: Create the data directory and an empty forms file
//! - list / show: Inspect saved forms
//! - save: Store a new form definition
//! - preview / submit: Evaluate a saved form against entered values

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{
    init, list, preview, preview_form, run, run_command, save, save_form, show, submit,
    submit_form, Config,
};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{read_optional_request, read_request, write_error, write_response};
