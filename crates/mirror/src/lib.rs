//! Local mirror of S3 objects
//!
//! This crate maps remote object references onto a configured local directory
//! and keeps the local copies in step with the remote store.
//!
//! # Layout
//!
//! A reference `s3://bucket/path/to/file.csv` is mirrored at
//! `<root>/bucket/path/to/file.csv`. The mapping is deterministic, so a file
//! downloaded once is found again on the next call.
//!
//! # Prefixes
//!
//! A reference is treated as a prefix if its key ends with `/`, is empty, or
//! names no object. Every object under the prefix is mirrored below the
//! corresponding local directory.
//!
//! # Example
//!
//! ```ignore
//! use sriracha_mirror::{MirrorResolver, MirrorRoot, ResolveOptions, S3Store};
//!
//! let root = MirrorRoot::new("/tmp/mirror")?;
//! let resolver = MirrorResolver::new(root, S3Store::new().await);
//! let path = resolver.resolve("s3://bucket/a.csv", &ResolveOptions::default()).await?;
//! // path == /tmp/mirror/bucket/a.csv
//! ```

mod error;
mod local;
mod mode;
mod resolver;
mod s3;
mod store;


use std::fmt;
use std::path::{Path, PathBuf};

pub use error::{InvalidReason, MirrorError, RemoteFailure, Result};
pub use local::MirrorRoot;
pub use mode::DownloadMode;
pub use resolver::{
    fetch_manifest, local_passthrough, MirrorResolver, ResolveOptions, MANIFEST_FILENAMES,
};
pub use s3::S3Store;
pub use store::{ObjectMeta, RemoteStore};

/// Scheme prefix recognized for remote references.
pub const S3_SCHEME: &str = "s3://";

/// A bucket and object key parsed from an `s3://` URI
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RemoteReference {
    bucket: String,
    key: String,
    prefix: bool,
}

impl RemoteReference {
    /// Parse a reference in the format `s3://bucket/key/to/file`
    ///
    /// The key may be empty (the whole bucket) or end with `/` (a prefix).
    /// Leading and trailing slashes are stripped from the stored key.
    pub fn parse(uri: &str) -> Result<Self> {
        let rest = uri
            .strip_prefix(S3_SCHEME)
            .ok_or_else(|| MirrorError::invalid(uri, InvalidReason::WrongScheme))?;

        let (bucket, raw_key) = rest.split_once('/').unwrap_or((rest, ""));
        if bucket.is_empty() {
            return Err(MirrorError::invalid(uri, InvalidReason::NoBucketName));
        }
        if !is_valid_bucket_name(bucket) {
            return Err(MirrorError::invalid(uri, InvalidReason::InvalidBucketName));
        }

        let key = raw_key.trim_matches('/');
        if !key.is_empty() && key.split('/').any(|s| s.is_empty() || s == "." || s == "..") {
            return Err(MirrorError::invalid(uri, InvalidReason::UnsafeKey));
        }

        Ok(Self {
            bucket: bucket.to_string(),
            key: key.to_string(),
            prefix: key.is_empty() || raw_key.ends_with('/'),
        })
    }

    pub(crate) fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            bucket: bucket.into(),
            prefix: key.is_empty(),
            key,
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Object key without leading or trailing slashes
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Whether the reference explicitly names a prefix (trailing `/` or empty key)
    pub fn is_prefix(&self) -> bool {
        self.prefix
    }

    /// Key prefix used for listing, with a trailing `/` unless it names the bucket root
    pub fn list_prefix(&self) -> String {
        if self.key.is_empty() {
            String::new()
        } else {
            format!("{}/", self.key)
        }
    }

    /// Reference to an object nested below this one
    pub fn child(&self, relative: &str) -> Self {
        let key = if self.key.is_empty() {
            relative.to_string()
        } else {
            format!("{}/{}", self.key, relative)
        };
        Self::new(self.bucket.clone(), key)
    }

    /// Deterministic location of this reference under `root`
    pub fn local_path(&self, root: &Path) -> PathBuf {
        let mut path = root.join(&self.bucket);
        for segment in self.key.split('/').filter(|s| !s.is_empty()) {
            path.push(segment);
        }
        path
    }
}

impl fmt::Display for RemoteReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{S3_SCHEME}{}/{}", self.bucket, self.key)?;
        if self.prefix && !self.key.is_empty() {
            f.write_str("/")?;
        }
        Ok(())
    }
}

/// S3 bucket naming: 3-63 chars of lowercase letters, digits, dots and hyphens,
/// beginning and ending with a letter or digit
fn is_valid_bucket_name(name: &str) -> bool {
    let bytes = name.as_bytes();
    let edge_ok = |b: u8| b.is_ascii_lowercase() || b.is_ascii_digit();
    (3..=63).contains(&bytes.len())
        && bytes
            .iter()
            .all(|&b| edge_ok(b) || b == b'.' || b == b'-')
        && edge_ok(bytes[0])
        && edge_ok(bytes[bytes.len() - 1])
        && !name.contains("..")
}
