//! Remote store trait and shared types
//!
//! The resolver talks to object storage only through `RemoteStore`, so the
//! same mirroring logic runs against S3 (`S3Store`) or an in-memory store in
//! tests.

use crate::{RemoteReference, Result};
use async_trait::async_trait;
use std::path::Path;
use std::time::SystemTime;

/// Metadata of a remote object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectMeta {
    /// Full object key
    pub key: String,
    /// Size in bytes
    pub size: u64,
    /// Last-modified time reported by the store, if any
    pub last_modified: Option<SystemTime>,
}

/// Trait for object storage operations used by the resolver.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Fetch object metadata.
    ///
    /// Returns None if no object exists under exactly this key.
    async fn head(&self, reference: &RemoteReference) -> Result<Option<ObjectMeta>>;

    /// List every object whose key starts with `prefix` (recursive).
    async fn list(&self, bucket: &str, prefix: &str) -> Result<Vec<ObjectMeta>>;

    /// Download an object into `dest`, overwriting any existing file.
    ///
    /// The parent directory of `dest` must already exist.
    async fn download(&self, reference: &RemoteReference, dest: &Path) -> Result<()>;

    /// Read a whole object into memory.
    ///
    /// Returns None if the object does not exist.
    async fn get(&self, reference: &RemoteReference) -> Result<Option<Vec<u8>>>;
}
