//! Download decision modes

use clap::ValueEnum;

/// How the resolver decides whether a remote object must be downloaded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum DownloadMode {
    /// Always download, even if the local file exists. Single objects only.
    #[value(name = "always")]
    Always,
    /// Download only if the local file does not exist. Single objects only.
    #[value(name = "if-missing")]
    IfMissing,
    /// Skip when the local file has the same size as the remote object
    #[value(name = "size-only")]
    SizeOnly,
    /// Skip when sizes match and the local copy is not older than the remote object
    #[default]
    #[value(name = "size-and-timestamp")]
    SizeAndTimestamp,
    /// Never download; only compute the local path
    #[value(name = "never")]
    Never,
}

impl DownloadMode {
    /// Mode to use when syncing a prefix
    ///
    /// `Always` and `IfMissing` have no meaning for prefixes and fall back to
    /// `SizeAndTimestamp`.
    pub fn for_prefix(self) -> Self {
        match self {
            DownloadMode::Always | DownloadMode::IfMissing => {
                tracing::warn!(
                    "Download mode {:?} is not supported for prefixes, falling back to size-and-timestamp",
                    self
                );
                DownloadMode::SizeAndTimestamp
            }
            other => other,
        }
    }
}
