//! Configuration file
//!
//! ```json
//! {
//!     "image_path": "./flash.bin",
//!     "region_start": 0,
//!     "region_size": 4096,
//!     "erase_sector_size": 4096,
//!     "program_block_size": 1024,
//!     "chunk_size": 512,
//!     "log_level": "info"
//! }
//! ```
//!
//! Only `image_path` is required.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::observability::Severity;
use crate::storage::TABLE_IMAGE_SIZE;
use crate::volume::DEFAULT_CHUNK_SIZE;

use super::errors::{CliError, CliResult};

/// Configuration file structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Flash image file (required)
    pub image_path: String,

    /// First byte of the profile region (optional, default 0)
    #[serde(default)]
    pub region_start: u32,

    /// Size of the profile region (optional, default 4096)
    #[serde(default = "default_region_size")]
    pub region_size: u32,

    /// Erase granularity (optional, default 4096)
    #[serde(default = "default_erase_sector_size")]
    pub erase_sector_size: u32,

    /// Program granularity (optional, default 1024)
    #[serde(default = "default_program_block_size")]
    pub program_block_size: u32,

    /// Document chunk size (optional, default 512)
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Minimum log severity (optional, default "info")
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_region_size() -> u32 {
    4096
}
fn default_erase_sector_size() -> u32 {
    4096
}
fn default_program_block_size() -> u32 {
    1024
}
fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;

        let config: Config = serde_json::from_str(&content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> CliResult<()> {
        if self.image_path.is_empty() {
            return Err(CliError::config_error("image_path must not be empty"));
        }

        if !self.erase_sector_size.is_power_of_two() {
            return Err(CliError::config_error(format!(
                "erase_sector_size must be a power of two, got {}",
                self.erase_sector_size
            )));
        }

        if !self.program_block_size.is_power_of_two()
            || TABLE_IMAGE_SIZE as u32 % self.program_block_size != 0
        {
            return Err(CliError::config_error(format!(
                "program_block_size must be a power of two dividing {}, got {}",
                TABLE_IMAGE_SIZE, self.program_block_size
            )));
        }

        if self.region_start % self.erase_sector_size != 0 {
            return Err(CliError::config_error(format!(
                "region_start {} is not a multiple of erase_sector_size {}",
                self.region_start, self.erase_sector_size
            )));
        }

        if (self.region_size as usize) < TABLE_IMAGE_SIZE {
            return Err(CliError::config_error(format!(
                "region_size must be at least {}, got {}",
                TABLE_IMAGE_SIZE, self.region_size
            )));
        }

        if self.region_start.checked_add(self.region_size).is_none() {
            return Err(CliError::config_error(
                "region_start + region_size exceeds the 32-bit address space",
            ));
        }

        if !self.chunk_size.is_power_of_two() || self.chunk_size < DEFAULT_CHUNK_SIZE {
            return Err(CliError::config_error(format!(
                "chunk_size must be a power of two of at least {}, got {}",
                DEFAULT_CHUNK_SIZE, self.chunk_size
            )));
        }

        self.severity()?;

        Ok(())
    }

    /// Get image path as Path
    pub fn image_path(&self) -> &Path {
        Path::new(&self.image_path)
    }

    /// Size of a freshly created image: everything up to the end of the region.
    pub fn image_capacity(&self) -> u32 {
        self.region_start + self.region_size
    }

    /// Parsed `log_level`
    pub fn severity(&self) -> CliResult<Severity> {
        self.log_level
            .parse::<Severity>()
            .map_err(|e: String| CliError::config_error(format!("Invalid log_level: {}", e)))
    }
}
