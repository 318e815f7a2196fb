//! Error types for the mirror crate.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while resolving a remote reference to a local mirror path.
#[derive(Error, Debug)]
pub enum MirrorError {
    #[error("Invalid path \"{reference}\": {reason}")]
    InvalidReference {
        reference: String,
        reason: InvalidReason,
    },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Cannot access \"{reference}\": {reason}")]
    RemoteAccess {
        reference: String,
        reason: RemoteFailure,
    },

    #[error("Filesystem error at {}: {source}", path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid option: {0}")]
    InvalidOption(String),
}

impl MirrorError {
    pub(crate) fn invalid(reference: impl Into<String>, reason: InvalidReason) -> Self {
        MirrorError::InvalidReference {
            reference: reference.into(),
            reason,
        }
    }

    pub(crate) fn remote(reference: impl fmt::Display, reason: RemoteFailure) -> Self {
        MirrorError::RemoteAccess {
            reference: reference.to_string(),
            reason,
        }
    }

    pub(crate) fn filesystem(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        MirrorError::Filesystem {
            path: path.into(),
            source,
        }
    }
}

/// Why a reference string was rejected before any I/O.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidReason {
    WrongScheme,
    NoBucketName,
    InvalidBucketName,
    UnsafeKey,
}

impl fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            InvalidReason::WrongScheme => "wrong scheme, the path must start with s3://",
            InvalidReason::NoBucketName => "no bucket name",
            InvalidReason::InvalidBucketName => "invalid bucket name",
            InvalidReason::UnsafeKey => "key contains empty, '.' or '..' segments",
        };
        f.write_str(msg)
    }
}

/// Classified failure reported by the remote store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteFailure {
    NoObjectFound,
    NoSuchBucket,
    InvalidBucketName,
    AccessDenied,
    Other(String),
}

impl fmt::Display for RemoteFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemoteFailure::NoObjectFound => f.write_str("no object found"),
            RemoteFailure::NoSuchBucket => f.write_str("bucket not found"),
            RemoteFailure::InvalidBucketName => f.write_str("invalid bucket name"),
            RemoteFailure::AccessDenied => f.write_str("access denied"),
            RemoteFailure::Other(msg) => f.write_str(msg),
        }
    }
}

/// Result type alias for mirror operations.
pub type Result<T> = std::result::Result<T, MirrorError>;
