//! CLI argument definitions using clap
//!
//! Commands:
//! - formwright init --config <path>
//! - formwright list --config <path>
//! - formwright show --config <path> --form <id>
//! - formwright save --config <path>
//! - formwright preview --config <path> --form <id>
//! - formwright submit --config <path> --form <id>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// formwright - build form schemas and evaluate them against entered values
#[derive(Parser, Debug)]
#[command(name = "formwright")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create the data directory and an empty forms file
    Init {
        /// Path to configuration file
        #[arg(long, default_value = "./formwright.json")]
        config: PathBuf,
    },

    /// List saved forms
    List {
        /// Path to configuration file
        #[arg(long, default_value = "./formwright.json")]
        config: PathBuf,
    },

    /// Print one saved form
    Show {
        /// Path to configuration file
        #[arg(long, default_value = "./formwright.json")]
        config: PathBuf,

        /// Form id
        #[arg(long)]
        form: String,
    },

    /// Save a new form read from stdin
    Save {
        /// Path to configuration file
        #[arg(long, default_value = "./formwright.json")]
        config: PathBuf,
    },

    /// Fill a saved form with values from stdin and show derived values and errors
    Preview {
        /// Path to configuration file
        #[arg(long, default_value = "./formwright.json")]
        config: PathBuf,

        /// Form id
        #[arg(long)]
        form: String,
    },

    /// Validate values from stdin against a saved form as a submission
    Submit {
        /// Path to configuration file
        #[arg(long, default_value = "./formwright.json")]
        config: PathBuf,

        /// Form id
        #[arg(long)]
        form: String,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
