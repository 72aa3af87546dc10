//! Default values for f2 configuration.
//!
//! This module provides centralized default values used across commands,
//! ensuring consistency and avoiding duplication.

use std::path::PathBuf;

/// Directory under the data root that holds everything f2 persists.
pub const APP_DIR: &str = "f2";

/// Directory under [`APP_DIR`] that holds backup records.
pub const BACKUPS_DIR: &str = "backups";

/// Returns the default per-user data root.
///
/// Uses the platform-appropriate data directory:
/// - Linux: `~/.local/share` (XDG Base Directory)
/// - macOS: `~/Library/Application Support`
/// - Windows: `{FOLDERID_RoamingAppData}`
///
/// Falls back to `.f2-data` in the current directory if the platform data
/// directory cannot be determined.
///
/// This can be overridden by the `--data-dir` CLI flag or the `F2_DATA_DIR`
/// environment variable.
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir().unwrap_or_else(|| PathBuf::from(".f2-data"))
}
