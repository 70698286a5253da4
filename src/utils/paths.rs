//! Cross-Platform Path Utilities
//!
//! Functions for resolving application directories across platforms.
//! Handles ~/.flora-lens/ and the files kept inside it.

use std::path::{Path, PathBuf};

use crate::utils::error::{AppError, AppResult};

/// Get the user's home directory
pub fn home_dir() -> AppResult<PathBuf> {
    dirs::home_dir().ok_or_else(|| AppError::config("Could not determine home directory"))
}

/// Get the default Flora Lens directory (~/.flora-lens/)
pub fn flora_lens_dir() -> AppResult<PathBuf> {
    Ok(home_dir()?.join(".flora-lens"))
}

/// Resolve the data directory, preferring an explicit override
pub fn resolve_data_dir(override_dir: Option<PathBuf>) -> AppResult<PathBuf> {
    match override_dir {
        Some(dir) => Ok(dir),
        None => flora_lens_dir(),
    }
}

/// Get the config file path (<data dir>/config.json)
pub fn config_path(data_dir: &Path) -> PathBuf {
    data_dir.join("config.json")
}

/// Get the database file path (<data dir>/data.db)
pub fn database_path(data_dir: &Path) -> PathBuf {
    data_dir.join("data.db")
}

/// Ensure a directory exists, creating it if necessary
pub fn ensure_dir(path: &Path) -> AppResult<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}
