//! totp-vault - profile storage for a hardware TOTP authenticator
//!
//! Profiles live in a fixed table on NOR flash and are edited through a
//! synthesized text document: read it, change it, write it back.

pub mod cli;
pub mod document;
pub mod flash;
pub mod ingest;
pub mod key;
pub mod observability;
pub mod storage;
pub mod volume;
