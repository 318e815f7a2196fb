//! S3 remote store implementation with prefix listing support

use crate::store::{ObjectMeta, RemoteStore};
use crate::{MirrorError, RemoteFailure, RemoteReference, Result};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata};
use aws_sdk_s3::primitives::DateTime;
use std::path::Path;
use std::time::SystemTime;
use tokio::io::AsyncWriteExt;

/// Shared S3 client for mirror operations
///
/// Creating an S3 client is relatively expensive, so one store is built per
/// process and reused across resolves.
pub struct S3Store {
    client: aws_sdk_s3::Client,
}

impl S3Store {
    /// Create a new store from the default AWS environment (credentials, region, profile)
    pub async fn new() -> Self {
        let sdk_config = aws_config::load_defaults(BehaviorVersion::latest()).await;
        Self::from_client(aws_sdk_s3::Client::new(&sdk_config))
    }

    pub fn from_client(client: aws_sdk_s3::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RemoteStore for S3Store {
    async fn head(&self, reference: &RemoteReference) -> Result<Option<ObjectMeta>> {
        let response = self
            .client
            .head_object()
            .bucket(reference.bucket())
            .key(reference.key())
            .send()
            .await;

        match response {
            Ok(output) => Ok(Some(ObjectMeta {
                key: reference.key().to_string(),
                size: to_size(output.content_length()),
                last_modified: output.last_modified().and_then(to_system_time),
            })),
            Err(err) => {
                let status = err.raw_response().map(|r| r.status().as_u16());
                let service = err.into_service_error();
                if service.is_not_found() {
                    return Ok(None);
                }
                Err(MirrorError::remote(
                    reference,
                    classify(service.code(), status, &service),
                ))
            }
        }
    }

    async fn list(&self, bucket: &str, prefix: &str) -> Result<Vec<ObjectMeta>> {
        let mut results = Vec::new();
        let mut continuation_token: Option<String> = None;

        loop {
            let response = self
                .client
                .list_objects_v2()
                .bucket(bucket)
                .prefix(prefix)
                .set_continuation_token(continuation_token.take())
                .send()
                .await;

            let response = match response {
                Ok(output) => output,
                Err(err) => {
                    let status = err.raw_response().map(|r| r.status().as_u16());
                    let service = err.into_service_error();
                    let reason = if service.is_no_such_bucket() {
                        RemoteFailure::NoSuchBucket
                    } else {
                        classify(service.code(), status, &service)
                    };
                    return Err(MirrorError::remote(
                        RemoteReference::new(bucket, prefix.trim_end_matches('/')),
                        reason,
                    ));
                }
            };

            for object in response.contents.unwrap_or_default() {
                if let Some(key) = object.key {
                    results.push(ObjectMeta {
                        key,
                        size: to_size(object.size),
                        last_modified: object.last_modified.as_ref().and_then(to_system_time),
                    });
                }
            }

            if response.is_truncated == Some(true) {
                continuation_token = response.next_continuation_token;
                if continuation_token.is_none() {
                    break;
                }
            } else {
                break;
            }
        }

        tracing::debug!(
            "Listed {} objects in S3 prefix: s3://{}/{}",
            results.len(),
            bucket,
            prefix
        );

        Ok(results)
    }

    async fn download(&self, reference: &RemoteReference, dest: &Path) -> Result<()> {
        let response = self
            .client
            .get_object()
            .bucket(reference.bucket())
            .key(reference.key())
            .send()
            .await;

        let output = match response {
            Ok(output) => output,
            Err(err) => {
                let status = err.raw_response().map(|r| r.status().as_u16());
                let service = err.into_service_error();
                let reason = if service.is_no_such_key() {
                    RemoteFailure::NoObjectFound
                } else {
                    classify(service.code(), status, &service)
                };
                return Err(MirrorError::remote(reference, reason));
            }
        };

        let mut file = tokio::fs::File::create(dest)
            .await
            .map_err(|e| MirrorError::filesystem(dest, e))?;

        let mut body = output.body;
        while let Some(chunk) = body
            .try_next()
            .await
            .map_err(|e| MirrorError::remote(reference, RemoteFailure::Other(e.to_string())))?
        {
            file.write_all(&chunk)
                .await
                .map_err(|e| MirrorError::filesystem(dest, e))?;
        }
        file.flush()
            .await
            .map_err(|e| MirrorError::filesystem(dest, e))?;

        Ok(())
    }

    async fn get(&self, reference: &RemoteReference) -> Result<Option<Vec<u8>>> {
        let response = self
            .client
            .get_object()
            .bucket(reference.bucket())
            .key(reference.key())
            .send()
            .await;

        let output = match response {
            Ok(output) => output,
            Err(err) => {
                let status = err.raw_response().map(|r| r.status().as_u16());
                let service = err.into_service_error();
                if service.is_no_such_key() {
                    return Ok(None);
                }
                return Err(MirrorError::remote(
                    reference,
                    classify(service.code(), status, &service),
                ));
            }
        };

        let bytes = output
            .body
            .collect()
            .await
            .map_err(|e| MirrorError::remote(reference, RemoteFailure::Other(e.to_string())))?;

        Ok(Some(bytes.into_bytes().to_vec()))
    }
}

/// Map an S3 error code (or bare HTTP status for bodiless responses) to a failure reason
fn classify<E: std::error::Error>(code: Option<&str>, status: Option<u16>, err: &E) -> RemoteFailure {
    match (code, status) {
        (Some("NoSuchKey" | "NotFound"), _) | (None, Some(404)) => RemoteFailure::NoObjectFound,
        (Some("NoSuchBucket"), _) => RemoteFailure::NoSuchBucket,
        (Some("InvalidBucketName"), _) => RemoteFailure::InvalidBucketName,
        (Some("AccessDenied" | "Forbidden"), _) | (None, Some(403)) => RemoteFailure::AccessDenied,
        _ => RemoteFailure::Other(DisplayErrorContext(err).to_string()),
    }
}

fn to_size(length: Option<i64>) -> u64 {
    length.and_then(|l| u64::try_from(l).ok()).unwrap_or(0)
}

fn to_system_time(dt: &DateTime) -> Option<SystemTime> {
    SystemTime::try_from(*dt).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct FakeError;

    impl std::fmt::Display for FakeError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("boom")
        }
    }

    impl std::error::Error for FakeError {}

    #[test]
    fn test_classify_codes() {
        assert_eq!(
            classify(Some("NoSuchBucket"), Some(404), &FakeError),
            RemoteFailure::NoSuchBucket
        );
        assert_eq!(
            classify(Some("NoSuchKey"), Some(404), &FakeError),
            RemoteFailure::NoObjectFound
        );
        assert_eq!(
            classify(Some("AccessDenied"), Some(403), &FakeError),
            RemoteFailure::AccessDenied
        );
        assert_eq!(
            classify(Some("InvalidBucketName"), Some(400), &FakeError),
            RemoteFailure::InvalidBucketName
        );
    }

    #[test]
    fn test_classify_bodiless_status() {
        assert_eq!(classify(None, Some(403), &FakeError), RemoteFailure::AccessDenied);
        assert_eq!(classify(None, Some(404), &FakeError), RemoteFailure::NoObjectFound);
        assert!(matches!(
            classify(None, Some(500), &FakeError),
            RemoteFailure::Other(msg) if msg.contains("boom")
        ));
    }

    #[test]
    fn test_to_size() {
        assert_eq!(to_size(Some(42)), 42);
        assert_eq!(to_size(Some(-1)), 0);
        assert_eq!(to_size(None), 0);
    }

    #[test]
    fn test_to_system_time() {
        let dt = DateTime::from_secs(1_700_000_000);
        let t = to_system_time(&dt).unwrap();
        assert_eq!(
            t.duration_since(SystemTime::UNIX_EPOCH).unwrap().as_secs(),
            1_700_000_000
        );
    }
}
