/// Platform-specific location of the configuration file
///
/// Follows the XDG Base Directory specification on Linux (via `dirs`), the
/// Application Support folder on macOS and `%APPDATA%` on Windows.
use std::path::PathBuf;

/// Directory name used under the platform config directory
pub const APP_DIR_NAME: &str = "repo-overlap";

/// Platform-agnostic path utilities
pub struct PlatformPaths;

impl PlatformPaths {
    /// Get the platform config directory, falling back to the working directory
    pub fn config_dir() -> PathBuf {
        dirs::config_dir().unwrap_or_else(|| PathBuf::from("."))
    }

    /// Returns: {config_dir}/repo-overlap
    pub fn project_config_dir() -> PathBuf {
        Self::config_dir().join(APP_DIR_NAME)
    }

    /// Returns: {config_dir}/repo-overlap/config.toml
    pub fn default_config_path() -> PathBuf {
        Self::project_config_dir().join("config.toml")
    }
}
