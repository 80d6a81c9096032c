//! Object store access
//!
//! The service talks to an S3-compatible store (MinIO by default) through the
//! [`ObjectStore`] trait. The production implementation lives in
//! [`s3_client`]; handlers only ever see the trait object, shared behind an
//! `Arc` by every in-flight request.

pub mod s3_client;

#[cfg(test)]
pub mod memory;

pub use s3_client::S3ObjectStore;

use std::path::Path;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Store failures, split the way callers need to branch on them
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("{0}")]
    Backend(String),
}

/// One entry of a bucket listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectSummary {
    pub key: String,
    pub size: u64,
    pub last_modified: Option<DateTime<Utc>>,
}

/// Object metadata as reported by a HEAD request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectStat {
    pub key: String,
    pub size: u64,
    pub content_type: Option<String>,
    pub last_modified: Option<DateTime<Utc>>,
}

/// Downloaded object body
#[derive(Debug, Clone)]
pub struct ObjectData {
    pub data: Bytes,
    pub content_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketSummary {
    pub name: String,
    pub creation_date: Option<DateTime<Utc>>,
}

/// Capabilities the gateway needs from the object store.
///
/// Implementations must be safe to share across concurrent requests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn bucket_exists(&self, bucket: &str) -> Result<bool, StoreError>;

    /// Fails with [`StoreError::AlreadyExists`] when the bucket is already there.
    async fn make_bucket(&self, bucket: &str) -> Result<(), StoreError>;

    /// Fails with [`StoreError::NotFound`] when the key is absent.
    async fn stat_object(&self, bucket: &str, key: &str) -> Result<ObjectStat, StoreError>;

    /// Upload the file at `path` under `key`.
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        path: &Path,
        content_type: &str,
    ) -> Result<(), StoreError>;

    async fn get_object(&self, bucket: &str, key: &str) -> Result<ObjectData, StoreError>;

    /// Every object in the bucket, in the order the store returns them.
    async fn list_objects(&self, bucket: &str) -> Result<Vec<ObjectSummary>, StoreError>;

    async fn list_buckets(&self) -> Result<Vec<BucketSummary>, StoreError>;

    async fn remove_object(&self, bucket: &str, key: &str) -> Result<(), StoreError>;
}
