//! CLI argument definitions using clap
//!
//! Commands:
//! - totp-vault init --config <path>
//! - totp-vault list --config <path>
//! - totp-vault export --config <path> [--output <file>]
//! - totp-vault import --config <path> <document>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// totp-vault - TOTP profile storage and document editing tool
#[derive(Parser, Debug)]
#[command(name = "totp-vault")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create an erased flash image
    Init {
        /// Path to configuration file
        #[arg(long, default_value = "./totp-vault.json")]
        config: PathBuf,
    },

    /// List stored profiles (keys are never printed)
    List {
        /// Path to configuration file
        #[arg(long, default_value = "./totp-vault.json")]
        config: PathBuf,
    },

    /// Write the profile document
    Export {
        /// Path to configuration file
        #[arg(long, default_value = "./totp-vault.json")]
        config: PathBuf,

        /// Output file (stdout if omitted)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Apply an edited profile document
    Import {
        /// Path to configuration file
        #[arg(long, default_value = "./totp-vault.json")]
        config: PathBuf,

        /// Edited document
        document: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
