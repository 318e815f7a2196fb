//! sriracha
//!
//! Shared helpers for keeping local copies of S3 data.
//!
//! # Crates
//!
//! - `sriracha_mirror` - remote references, the S3 store, and the local mirror resolver
//! - `sriracha_config` - the user configuration file written by `sriracha configure`
//!
//! # CLI Usage
//!
//! ```bash
//! # One-time setup of the local sync and log directories
//! sriracha configure
//!
//! # Mirror an object (or a whole prefix) and print the local path
//! sriracha s3-to-local s3://bucket/path/to/file.csv
//! sriracha s3-to-local s3://bucket/dataset/ --include '*.csv'
//!
//! # Print a dataset manifest
//! sriracha get-manifest s3://bucket/dataset
//! ```

use clap::Parser;
use std::path::PathBuf;

pub mod configure;
pub mod logging;

pub use sriracha_config as config;
pub use sriracha_mirror as mirror;

use sriracha_mirror::{DownloadMode, MirrorError, ResolveOptions};

#[derive(Parser, Clone, Debug)]
pub struct ConfigOpts {
    /// Path to the config file (default: ~/.sriracha/config.toml)
    #[arg(long = "config", global = true, env = "SRIRACHA_CONFIG", value_name = "PATH")]
    pub config_path: Option<PathBuf>,
}

impl ConfigOpts {
    pub fn path(&self) -> anyhow::Result<PathBuf> {
        match &self.config_path {
            Some(path) => Ok(path.clone()),
            None => Ok(config::default_config_path()?),
        }
    }
}

#[derive(Parser, Clone, Debug)]
pub struct MirrorOpts {
    /// Decide when a remote object is downloaded
    #[arg(long, value_enum, default_value_t = DownloadMode::SizeAndTimestamp)]
    pub download_mode: DownloadMode,

    /// Only sync objects matching this glob (relative to the prefix); repeatable
    #[arg(long = "include", value_name = "GLOB")]
    pub include: Vec<String>,
}

impl MirrorOpts {
    pub fn resolve_options(&self) -> Result<ResolveOptions, MirrorError> {
        ResolveOptions::new(self.download_mode).with_include_patterns(&self.include)
    }
}
