//! S3-compatible object store client
//!
//! Wraps the AWS SDK client configured for path-style addressing, which is
//! what MinIO and most self-hosted S3 implementations expect.

use std::path::Path;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::timeout::TimeoutConfig;
use aws_sdk_s3::config::{Credentials, Region};
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata};
use aws_sdk_s3::primitives::{ByteStream, DateTime as SmithyDateTime};
use aws_sdk_s3::types::{BucketLocationConstraint, CreateBucketConfiguration};
use aws_sdk_s3::Client;
use chrono::{DateTime, Utc};
use tracing::{debug, info};
use url::Url;

use super::{BucketSummary, ObjectData, ObjectStat, ObjectStore, ObjectSummary, StoreError};
use crate::config::StorageConfig;

const DEFAULT_REGION: &str = "us-east-1";

/// `ObjectStore` backed by `aws-sdk-s3`
#[derive(Debug, Clone)]
pub struct S3ObjectStore {
    client: Client,
    endpoint: String,
    region: String,
}

impl S3ObjectStore {
    /// Build a client for the configured endpoint.
    ///
    /// No request is sent; connectivity is only known once the first call
    /// reaches the store.
    pub async fn connect(config: &StorageConfig) -> Result<Self> {
        let endpoint = normalize_endpoint(&config.endpoint, config.secure)?;
        info!(endpoint = %endpoint, region = %config.region, "Initializing object store client");

        let credentials = Credentials::new(
            config.access_key.clone(),
            config.secret_key.clone(),
            None,
            None,
            "storage-service",
        );

        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .credentials_provider(credentials)
            .endpoint_url(endpoint.clone());

        if let Some(secs) = config.operation_timeout_secs {
            loader = loader.timeout_config(
                TimeoutConfig::builder()
                    .operation_timeout(Duration::from_secs(secs))
                    .build(),
            );
        }

        let shared_config = loader.load().await;
        let s3_config = aws_sdk_s3::config::Builder::from(&shared_config)
            .force_path_style(true)
            .build();

        Ok(Self {
            client: Client::from_conf(s3_config),
            endpoint,
            region: config.region.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn bucket_configuration(&self) -> Option<CreateBucketConfiguration> {
        if self.region == DEFAULT_REGION {
            return None;
        }
        Some(
            CreateBucketConfiguration::builder()
                .location_constraint(BucketLocationConstraint::from(self.region.as_str()))
                .build(),
        )
    }
}

/// Resolve the endpoint URL the SDK should talk to.
///
/// Any scheme in `raw` is replaced by the one implied by `secure`, so
/// `10.0.0.5:9000`, `http://10.0.0.5:9000` and `https://10.0.0.5:9000` all
/// honour the TLS flag.
pub fn normalize_endpoint(raw: &str, secure: bool) -> Result<String> {
    let trimmed = raw.trim();
    let without_scheme = trimmed
        .strip_prefix("http://")
        .or_else(|| trimmed.strip_prefix("https://"))
        .unwrap_or(trimmed)
        .trim_end_matches('/');

    if without_scheme.is_empty() {
        return Err(anyhow!("object store endpoint is empty"));
    }

    let scheme = if secure { "https" } else { "http" };
    let candidate = format!("{}://{}", scheme, without_scheme);
    let url = Url::parse(&candidate)
        .with_context(|| format!("invalid object store endpoint '{}'", raw))?;

    if url.host_str().is_none() {
        return Err(anyhow!("object store endpoint '{}' has no host", raw));
    }

    Ok(url.as_str().trim_end_matches('/').to_string())
}

fn backend_error<E>(action: &str, err: E) -> StoreError
where
    E: std::error::Error + 'static,
{
    StoreError::Backend(format!("{}: {}", action, DisplayErrorContext(&err)))
}

fn to_chrono(value: Option<&SmithyDateTime>) -> Option<DateTime<Utc>> {
    value.and_then(|dt| DateTime::from_timestamp(dt.secs(), dt.subsec_nanos()))
}

fn to_size(value: Option<i64>) -> u64 {
    value.and_then(|v| u64::try_from(v).ok()).unwrap_or(0)
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn bucket_exists(&self, bucket: &str) -> Result<bool, StoreError> {
        match self.client.head_bucket().bucket(bucket).send().await {
            Ok(_) => Ok(true),
            Err(err) => match err.as_service_error() {
                Some(service_err) if service_err.is_not_found() => Ok(false),
                _ => Err(backend_error("HeadBucket failed", err)),
            },
        }
    }

    async fn make_bucket(&self, bucket: &str) -> Result<(), StoreError> {
        let mut request = self.client.create_bucket().bucket(bucket);
        if let Some(configuration) = self.bucket_configuration() {
            request = request.create_bucket_configuration(configuration);
        }

        match request.send().await {
            Ok(_) => Ok(()),
            Err(err) => match err.as_service_error() {
                Some(service_err)
                    if service_err.is_bucket_already_exists()
                        || service_err.is_bucket_already_owned_by_you() =>
                {
                    Err(StoreError::AlreadyExists(bucket.to_string()))
                }
                _ => Err(backend_error("CreateBucket failed", err)),
            },
        }
    }

    async fn stat_object(&self, bucket: &str, key: &str) -> Result<ObjectStat, StoreError> {
        let output = match self.client.head_object().bucket(bucket).key(key).send().await {
            Ok(output) => output,
            Err(err) => {
                return match err.as_service_error() {
                    Some(service_err) if service_err.is_not_found() => {
                        Err(StoreError::NotFound(format!("{}/{}", bucket, key)))
                    }
                    _ => Err(backend_error("HeadObject failed", err)),
                };
            }
        };

        Ok(ObjectStat {
            key: key.to_string(),
            size: to_size(output.content_length()),
            content_type: output.content_type().map(str::to_string),
            last_modified: to_chrono(output.last_modified()),
        })
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        path: &Path,
        content_type: &str,
    ) -> Result<(), StoreError> {
        let body = ByteStream::from_path(path)
            .await
            .map_err(|e| backend_error("Failed to read staged upload", e))?;

        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .content_type(content_type)
            .body(body)
            .send()
            .await
            .map_err(|e| backend_error("PutObject failed", e))?;

        debug!(bucket = %bucket, key = %key, "Object stored");
        Ok(())
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<ObjectData, StoreError> {
        let output = match self.client.get_object().bucket(bucket).key(key).send().await {
            Ok(output) => output,
            Err(err) => {
                return match err.as_service_error() {
                    Some(service_err) if service_err.is_no_such_key() => {
                        Err(StoreError::NotFound(format!("{}/{}", bucket, key)))
                    }
                    _ => Err(backend_error("GetObject failed", err)),
                };
            }
        };

        let content_type = output.content_type().map(str::to_string);
        let data = output
            .body
            .collect()
            .await
            .map_err(|e| backend_error("Failed to read object body", e))?
            .into_bytes();

        Ok(ObjectData { data, content_type })
    }

    async fn list_objects(&self, bucket: &str) -> Result<Vec<ObjectSummary>, StoreError> {
        let mut objects = Vec::new();
        let mut continuation_token: Option<String> = None;

        loop {
            let mut request = self.client.list_objects_v2().bucket(bucket);
            if let Some(token) = continuation_token.take() {
                request = request.continuation_token(token);
            }

            let output = request.send().await.map_err(|err| {
                match err.as_service_error() {
                    Some(service_err) if service_err.is_no_such_bucket() => {
                        StoreError::NotFound(bucket.to_string())
                    }
                    _ => backend_error("ListObjectsV2 failed", err),
                }
            })?;

            for object in output.contents() {
                let Some(key) = object.key() else { continue };
                objects.push(ObjectSummary {
                    key: key.to_string(),
                    size: to_size(object.size()),
                    last_modified: to_chrono(object.last_modified()),
                });
            }

            match output.next_continuation_token() {
                Some(token) if output.is_truncated() == Some(true) => {
                    continuation_token = Some(token.to_string());
                }
                _ => break,
            }
        }

        Ok(objects)
    }

    async fn list_buckets(&self) -> Result<Vec<BucketSummary>, StoreError> {
        let output = self
            .client
            .list_buckets()
            .send()
            .await
            .map_err(|e| backend_error("ListBuckets failed", e))?;

        Ok(output
            .buckets()
            .iter()
            .filter_map(|bucket| {
                bucket.name().map(|name| BucketSummary {
                    name: name.to_string(),
                    creation_date: to_chrono(bucket.creation_date()),
                })
            })
            .collect())
    }

    async fn remove_object(&self, bucket: &str, key: &str) -> Result<(), StoreError> {
        match self.client.delete_object().bucket(bucket).key(key).send().await {
            Ok(_) => Ok(()),
            Err(err) => match err.as_service_error().and_then(|e| e.code()) {
                Some("NoSuchKey") => Err(StoreError::NotFound(format!("{}/{}", bucket, key))),
                _ => Err(backend_error("DeleteObject failed", err)),
            },
        }
    }
}
