//! # Configuration Module
//!
//! Data directory setup for Sway. The move catalog lives in the
//! platform-standard data directory:
//! - Linux: `~/.local/share/sway/`
//! - macOS: `~/Library/Application Support/sway/`
//! - Windows: `%APPDATA%\sway\`
//!
//! This module is designed to be extended with additional configuration
//! options later (default tempo, preferred voice, custom catalog
//! locations).

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

/// Returns the platform-appropriate Sway data directory, creating it if
/// needed.
///
/// # Errors
///
/// Returns an error if the system data directory cannot be determined or
/// the subdirectory cannot be created.
pub fn get_data_dir() -> Result<PathBuf> {
    let data_dir = dirs::data_dir().ok_or_else(|| {
        anyhow::anyhow!(
            "Could not determine system data directory. Please ensure your platform supports standard data directories."
        )
    })?;

    let sway_dir = data_dir.join("sway");
    fs::create_dir_all(&sway_dir).with_context(|| {
        format!(
            "Failed to create Sway data directory at {}. Please check file permissions.",
            sway_dir.display()
        )
    })?;

    Ok(sway_dir)
}

/// Returns the path of the catalog file (`catalog.json`) inside the data
/// directory. The file itself may not exist yet.
///
/// # Errors
///
/// Propagates [`get_data_dir`] failures.
pub fn get_catalog_path() -> Result<PathBuf> {
    Ok(get_data_dir()?.join("catalog.json"))
}
