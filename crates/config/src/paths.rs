//! Default locations for sriracha files
//!
//! Everything lives under `~/.sriracha/` unless configured otherwise.

use crate::{ConfigError, Result};
use std::path::{Path, PathBuf};

/// Get the base sriracha directory (~/.sriracha/)
pub fn sriracha_home() -> Result<PathBuf> {
    Ok(dirs::home_dir().ok_or(ConfigError::NoHome)?.join(".sriracha"))
}

/// Get the default config file path (~/.sriracha/config.toml)
pub fn default_config_path() -> Result<PathBuf> {
    Ok(sriracha_home()?.join("config.toml"))
}

/// Get the default local sync directory (~/.sriracha/s3/)
pub fn default_sync_dir() -> Result<PathBuf> {
    Ok(sriracha_home()?.join("s3"))
}

/// Get the default log directory (~/.sriracha/logs/)
pub fn default_log_dir() -> Result<PathBuf> {
    Ok(sriracha_home()?.join("logs"))
}

/// Expand a leading `~` to the home directory
///
/// Paths without a leading `~`, or when no home directory is known, are
/// returned unchanged.
pub fn expand_tilde(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    match dirs::home_dir() {
        Some(home) => home.join(rest),
        None => path.to_path_buf(),
    }
}
