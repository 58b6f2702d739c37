//! Output handling for CLI
//!
//! - Listings and results: one JSON object per command on stdout
//! - Documents: raw bytes on stdout or into a file
//! - Logs never go to stdout

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use serde_json::Value;

use super::errors::CliResult;

/// Write a success response to stdout
pub fn write_response(data: Value) -> CliResult<()> {
    let response = serde_json::json!({
        "status": "ok",
        "data": data
    });

    let mut stdout = io::stdout();
    serde_json::to_writer(&mut stdout, &response)?;
    writeln!(stdout)?;
    stdout.flush()?;

    Ok(())
}

/// Write document bytes to `output`, or to stdout when none is given
pub fn write_document(output: Option<&Path>, document: &[u8]) -> CliResult<()> {
    match output {
        Some(path) => {
            fs::write(path, document)?;
        }
        None => {
            let mut stdout = io::stdout();
            stdout.write_all(document)?;
            stdout.flush()?;
        }
    }
    Ok(())
}
