//! Local side of the mirror: the root directory and cached file checks

use crate::store::ObjectMeta;
use crate::{DownloadMode, MirrorError, Result};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Base directory under which remote objects are mirrored
///
/// Constructing a root checks that the directory exists and is writable, so
/// every resolver holds a usable root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorRoot {
    path: PathBuf,
}

impl MirrorRoot {
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let metadata = std::fs::metadata(&path).map_err(|e| {
            MirrorError::Configuration(format!(
                "local sync directory {} is not accessible: {e}",
                path.display()
            ))
        })?;

        if !metadata.is_dir() {
            return Err(MirrorError::Configuration(format!(
                "local sync directory {} is not a directory",
                path.display()
            )));
        }
        check_writable(&path)?;

        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

// Permission bits alone do not say whether this process may write here
fn check_writable(dir: &Path) -> Result<()> {
    let marker = dir.join(format!(".sriracha-write-check-{}", std::process::id()));
    let created = std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&marker);

    match created {
        Ok(_) => {
            if let Err(e) = std::fs::remove_file(&marker) {
                tracing::warn!("Failed to remove {}: {e}", marker.display());
            }
            Ok(())
        }
        Err(e) => Err(MirrorError::Configuration(format!(
            "local sync directory {} is not writable: {e}",
            dir.display()
        ))),
    }
}

/// State of an existing local copy
#[derive(Debug, Clone, Copy)]
pub(crate) struct LocalFile {
    pub size: u64,
    pub modified: Option<SystemTime>,
}

impl LocalFile {
    /// Stat a local file; None if it does not exist
    pub fn stat(path: &Path) -> Result<Option<Self>> {
        match std::fs::metadata(path) {
            Ok(metadata) if metadata.is_file() => Ok(Some(Self {
                size: metadata.len(),
                modified: metadata.modified().ok(),
            })),
            Ok(_) => Ok(None),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(MirrorError::filesystem(path, e)),
        }
    }

    /// Whether this copy can be reused for `remote` under `mode`
    pub fn is_fresh(&self, remote: &ObjectMeta, mode: DownloadMode) -> bool {
        match mode {
            DownloadMode::Always => false,
            DownloadMode::IfMissing | DownloadMode::Never => true,
            DownloadMode::SizeOnly => self.size == remote.size,
            DownloadMode::SizeAndTimestamp => {
                self.size == remote.size
                    && match (self.modified, remote.last_modified) {
                        (Some(local), Some(remote)) => unix_secs(local) >= unix_secs(remote),
                        _ => false,
                    }
            }
        }
    }
}

/// Stamp a downloaded file with the remote modification time
pub(crate) fn set_modified(path: &Path, modified: SystemTime) -> Result<()> {
    let file = std::fs::OpenOptions::new()
        .write(true)
        .open(path)
        .map_err(|e| MirrorError::filesystem(path, e))?;
    file.set_modified(modified)
        .map_err(|e| MirrorError::filesystem(path, e))
}

/// Create the parent directory of `path` if needed
pub(crate) fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| MirrorError::filesystem(parent, e))?;
    }
    Ok(())
}

// S3 reports whole seconds
fn unix_secs(t: SystemTime) -> i64 {
    match t.duration_since(SystemTime::UNIX_EPOCH) {
        Ok(d) => d.as_secs() as i64,
        Err(e) => -(e.duration().as_secs() as i64),
    }
}
