//! Profile storage error types
//!
//! Error codes:
//! - TOTP_STORAGE_INVALID_REGION (FATAL severity)
//! - TOTP_STORAGE_ERASE_FAILED (ERROR severity)
//! - TOTP_STORAGE_WRITE_FAILED (ERROR severity)
//! - TOTP_STORAGE_TABLE_FULL (ERROR severity)
//!
//! Erase and write failures are never retried here. They end the commit that
//! raised them and are returned to the caller as-is.

use std::fmt;

use crate::flash::FlashError;

/// Severity levels for storage errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Operation fails, device keeps running
    Error,
    /// Storage cannot be used at all
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "ERROR"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Storage-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageErrorCode {
    /// Configured region cannot hold a full table image or is misplaced
    TotpStorageInvalidRegion,
    /// Sector erase failed
    TotpStorageEraseFailed,
    /// Block program failed
    TotpStorageWriteFailed,
    /// More records than the table capacity
    TotpStorageTableFull,
}

impl StorageErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            StorageErrorCode::TotpStorageInvalidRegion => "TOTP_STORAGE_INVALID_REGION",
            StorageErrorCode::TotpStorageEraseFailed => "TOTP_STORAGE_ERASE_FAILED",
            StorageErrorCode::TotpStorageWriteFailed => "TOTP_STORAGE_WRITE_FAILED",
            StorageErrorCode::TotpStorageTableFull => "TOTP_STORAGE_TABLE_FULL",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        match self {
            StorageErrorCode::TotpStorageInvalidRegion => Severity::Fatal,
            StorageErrorCode::TotpStorageEraseFailed => Severity::Error,
            StorageErrorCode::TotpStorageWriteFailed => Severity::Error,
            StorageErrorCode::TotpStorageTableFull => Severity::Error,
        }
    }
}

impl fmt::Display for StorageErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Storage error with code, message and optional flash cause
#[derive(Debug)]
pub struct StorageError {
    code: StorageErrorCode,
    message: String,
    /// Address the failing operation targeted, if any
    address: Option<u32>,
    source: Option<FlashError>,
}

impl StorageError {
    /// Region smaller than the table image
    pub fn region_too_small(region_size: u32, required: u32) -> Self {
        Self {
            code: StorageErrorCode::TotpStorageInvalidRegion,
            message: format!(
                "Profile region is {} bytes, table image needs {}",
                region_size, required
            ),
            address: None,
            source: None,
        }
    }

    /// Region not sector aligned or outside of the flash device
    pub fn invalid_region(message: impl Into<String>) -> Self {
        Self {
            code: StorageErrorCode::TotpStorageInvalidRegion,
            message: message.into(),
            address: None,
            source: None,
        }
    }

    /// Sector erase failed
    pub fn erase_failed(address: u32, source: FlashError) -> Self {
        Self {
            code: StorageErrorCode::TotpStorageEraseFailed,
            message: "Failed to erase profile sector".to_string(),
            address: Some(address),
            source: Some(source),
        }
    }

    /// Block program failed
    pub fn write_failed(address: u32, source: FlashError) -> Self {
        Self {
            code: StorageErrorCode::TotpStorageWriteFailed,
            message: "Failed to program profile block".to_string(),
            address: Some(address),
            source: Some(source),
        }
    }

    /// Too many records for the table
    pub fn table_full(count: usize, capacity: usize) -> Self {
        Self {
            code: StorageErrorCode::TotpStorageTableFull,
            message: format!("{} records exceed table capacity {}", count, capacity),
            address: None,
            source: None,
        }
    }

    /// Returns the error code
    pub fn code(&self) -> StorageErrorCode {
        self.code
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the flash address involved, if any
    pub fn address(&self) -> Option<u32> {
        self.address
    }

    /// Returns whether this error leaves storage unusable
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.code.severity(),
            self.code.code(),
            self.message
        )?;
        if let Some(address) = self.address {
            write!(f, " (address: {:#x})", address)?;
        }
        if let Some(ref source) = self.source {
            write!(f, " (caused by: {})", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
