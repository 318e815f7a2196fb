//! User-level configuration for sriracha
//!
//! The configuration lives in a single TOML file, `~/.sriracha/config.toml`
//! by default, written by `sriracha configure` and read by every command that
//! needs the local sync directory.
//!
//! ```toml
//! local_sync_dir = "/home/me/.sriracha/s3"
//! log_dir = "/home/me/.sriracha/logs"
//! ```

mod paths;

use serde::{Deserialize, Serialize};
use sriracha_mirror::{MirrorError, MirrorRoot};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub use paths::{
    default_config_path, default_log_dir, default_sync_dir, expand_tilde, sriracha_home,
};

/// Errors that can occur while reading or writing the user configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file {} does not exist. Please run \"sriracha configure\"", path.display())]
    Missing { path: PathBuf },

    #[error("Failed to parse config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0} cannot be a remote path")]
    RemotePath(String),

    #[error("Failed to determine home directory")]
    NoHome,
}

impl From<ConfigError> for MirrorError {
    fn from(err: ConfigError) -> Self {
        MirrorError::Configuration(err.to_string())
    }
}

/// Result type alias for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// User-specific configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserConfig {
    /// Local directory under which S3 objects are mirrored
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_sync_dir: Option<PathBuf>,

    /// Local directory for log files
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<PathBuf>,
}

impl UserConfig {
    /// Load configuration from `path`
    ///
    /// Fails with `ConfigError::Missing` if the file does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ConfigError::Missing {
                    path: path.to_path_buf(),
                })
            }
            Err(e) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source: e,
                })
            }
        };

        let mut config: UserConfig = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;

        config.local_sync_dir = config.local_sync_dir.map(|p| expand_tilde(&p));
        config.log_dir = config.log_dir.map(|p| expand_tilde(&p));
        Ok(config)
    }

    /// Load configuration, returning an empty config if the file doesn't exist
    pub fn load_or_default(path: &Path) -> Result<Self> {
        match Self::load(path) {
            Err(ConfigError::Missing { .. }) => Ok(Self::default()),
            other => other,
        }
    }

    /// Save configuration to `path`
    ///
    /// Creates parent directories if needed. On Unix the file is readable and
    /// writable by its owner only.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600)).map_err(
                |e| ConfigError::Io {
                    path: path.to_path_buf(),
                    source: e,
                },
            )?;
        }

        tracing::info!("Wrote to {}", path.display());
        Ok(())
    }

    /// The configured mirror root
    ///
    /// Fails with `MirrorError::Configuration` if no local sync directory is
    /// configured or it is not a usable directory.
    pub fn mirror_root(&self) -> std::result::Result<MirrorRoot, MirrorError> {
        let dir = self.local_sync_dir.as_ref().ok_or_else(|| {
            MirrorError::Configuration(
                "local sync directory is not configured. Please run \"sriracha configure\""
                    .to_string(),
            )
        })?;
        MirrorRoot::new(dir)
    }
}

/// Turn a user-supplied directory into an absolute local path and create it
///
/// `key` names the setting in error messages.
pub fn prepare_dir(key: &str, value: &str) -> Result<PathBuf> {
    if value.contains("://") || value.starts_with("//") {
        return Err(ConfigError::RemotePath(key.to_string()));
    }

    let expanded = expand_tilde(Path::new(value));
    let path = std::path::absolute(&expanded).map_err(|e| ConfigError::Io {
        path: expanded.clone(),
        source: e,
    })?;

    std::fs::create_dir_all(&path).map_err(|e| ConfigError::Io {
        path: path.clone(),
        source: e,
    })?;

    Ok(path)
}
