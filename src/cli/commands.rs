//! CLI command implementations
//!
//! Every command loads the configuration first, then opens the flash image
//! and profile table it names. Only `import` writes to the image.

use std::fs;
use std::path::Path;

use serde_json::{json, Value};

use crate::flash::FileFlash;
use crate::ingest::WriteOutcome;
use crate::observability::{log_event, log_event_with_fields, Event, Logger};
use crate::storage::ProfileTable;
use crate::volume::ProfileVolume;

use super::args::Command;
use super::config::Config;
use super::errors::{CliError, CliResult};
use super::io::{write_document, write_response};

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Init { config } => init(&config),
        Command::List { config } => list(&config),
        Command::Export { config, output } => export(&config, output.as_deref()),
        Command::Import { config, document } => import(&config, &document),
    }
}

/// Create an erased flash image
///
/// Refuses to overwrite an existing image.
pub fn init(config_path: &Path) -> CliResult<()> {
    let config = boot(config_path)?;
    let image_path = config.image_path();

    if image_path.exists() {
        return Err(CliError::already_initialized());
    }

    let flash = FileFlash::create(
        image_path,
        config.image_capacity(),
        config.erase_sector_size,
        config.program_block_size,
    )?;
    let table = ProfileTable::open(flash, config.region_start, config.region_size)?;

    write_response(json!({
        "initialized": true,
        "image_path": config.image_path,
        "capacity": config.image_capacity(),
        "max_profiles": table.capacity(),
    }))
}

/// Print the stored profiles
///
/// Keys are reported by length only.
pub fn list(config_path: &Path) -> CliResult<()> {
    let config = boot(config_path)?;
    let table = open_table(&config)?;

    let profiles: Vec<Value> = table
        .entries()
        .iter()
        .map(|record| {
            json!({
                "name": record.name().to_string(),
                "interval": record.interval(),
                "digits": record.digits().code(),
                "key_length": record.key().len(),
            })
        })
        .collect();

    write_response(json!({ "profiles": profiles }))
}

/// Write the profile document, read chunk by chunk as a host would
pub fn export(config_path: &Path, output: Option<&Path>) -> CliResult<()> {
    let config = boot(config_path)?;
    let volume = open_volume(&config)?;

    let chunk_size = volume.chunk_size();
    let mut document = vec![0u8; volume.chunk_count() as usize * chunk_size];
    for (index, chunk) in document.chunks_mut(chunk_size).enumerate() {
        volume.read_chunks(index as u32, chunk, 1)?;
    }
    document.truncate(volume.file_size());

    write_document(output, &document)
}

/// Apply an edited document
///
/// The file is written to the volume in order, one chunk per call. Prints
/// the diagnostics newest first, acknowledging each, and the counters.
pub fn import(config_path: &Path, document_path: &Path) -> CliResult<()> {
    let config = boot(config_path)?;
    let mut volume = open_volume(&config)?;

    let mut data = fs::read(document_path).map_err(|e| {
        CliError::io_error(format!("Failed to read {}: {}", document_path.display(), e))
    })?;
    let chunk_size = volume.chunk_size();
    let padded_len = (data.len() + chunk_size - 1) / chunk_size * chunk_size;
    data.resize(padded_len.max(chunk_size), 0);

    volume.activate();

    let mut outcome = WriteOutcome::Ignored;
    for (index, chunk) in data.chunks(chunk_size).enumerate() {
        outcome = volume.write_chunks(index as u32, chunk, 1)?;
        if matches!(outcome, WriteOutcome::Committed | WriteOutcome::Ignored) {
            break;
        }
    }

    let committed = outcome == WriteOutcome::Committed;
    if !committed {
        let path = document_path.display().to_string();
        Logger::warn("IMPORT_NOT_COMMITTED", &[("document", &path)]);
    }

    let mut diagnostics = Vec::new();
    while let Some(diagnostic) = volume.diagnostics_mut().acknowledge() {
        diagnostics.push(json!({
            "code": diagnostic.code.as_str(),
            "name": diagnostic.name,
            "message": diagnostic.code.message(),
        }));
    }

    let metrics = serde_json::to_value(volume.metrics().snapshot())?;

    write_response(json!({
        "committed": committed,
        "profiles": volume.table().len(),
        "diagnostics": diagnostics,
        "metrics": metrics,
    }))
}

/// Load the configuration and apply its log level
fn boot(config_path: &Path) -> CliResult<Config> {
    log_event(Event::BootStart);

    let config = Config::load(config_path)?;
    Logger::set_min_severity(config.severity()?);

    log_event_with_fields(Event::ConfigLoaded, &[("image_path", &config.image_path)]);
    Ok(config)
}

fn open_table(config: &Config) -> CliResult<ProfileTable<FileFlash>> {
    let image_path = config.image_path();
    if !image_path.exists() {
        return Err(CliError::not_initialized());
    }

    let flash = FileFlash::open(
        image_path,
        config.erase_sector_size,
        config.program_block_size,
    )?;
    let table = ProfileTable::open(flash, config.region_start, config.region_size)?;
    Ok(table)
}

fn open_volume(config: &Config) -> CliResult<ProfileVolume<FileFlash>> {
    let table = open_table(config)?;
    let volume = ProfileVolume::new(table, config.chunk_size)?;
    Ok(volume)
}
