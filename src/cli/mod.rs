//! CLI module for totp-vault
//!
//! Provides command-line interface for:
//! - init: Create an erased flash image
//! - list: Show stored profiles without their keys
//! - export: Write the profile document
//! - import: Apply an edited profile document

mod args;
mod commands;
mod config;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{export, import, init, list, run, run_command};
pub use config::Config;
pub use errors::{CliError, CliErrorCode, CliResult};
