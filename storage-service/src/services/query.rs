use std::sync::Arc;

use bytes::Bytes;
use tracing::info;

use crate::error::{ServiceError, ServiceResult, ValidationError};
use crate::services::provisioner::{validate_bucket_name, BucketProvisioner};
use crate::storage::{BucketSummary, ObjectStore, ObjectSummary, StoreError};

/// Connectivity as seen by the status probe
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreStatus {
    Connected,
    /// No client could be built at startup
    Disconnected,
    Error(String),
}

impl StoreStatus {
    pub fn as_str(&self) -> &str {
        match self {
            StoreStatus::Connected => "connected",
            StoreStatus::Disconnected => "disconnected",
            StoreStatus::Error(_) => "error",
        }
    }
}

/// Probe the store by listing buckets.
pub async fn probe_store(store: Option<&dyn ObjectStore>) -> StoreStatus {
    let Some(store) = store else {
        return StoreStatus::Disconnected;
    };

    match store.list_buckets().await {
        Ok(_) => StoreStatus::Connected,
        Err(e) => StoreStatus::Error(e.to_string()),
    }
}

#[derive(Debug, Clone)]
pub struct FileListing {
    pub bucket: String,
    pub files: Vec<ObjectSummary>,
}

#[derive(Debug, Clone)]
pub struct Download {
    pub key: String,
    pub data: Bytes,
    pub content_type: String,
}

/// Pass-through read, create and delete operations
#[derive(Clone)]
pub struct QueryService {
    store: Arc<dyn ObjectStore>,
    provisioner: BucketProvisioner,
    default_bucket: String,
}

impl QueryService {
    pub fn new(store: Arc<dyn ObjectStore>, default_bucket: String) -> Self {
        Self {
            provisioner: BucketProvisioner::new(Arc::clone(&store)),
            store,
            default_bucket,
        }
    }

    pub fn resolve_bucket(&self, requested: Option<&str>) -> String {
        requested
            .map(str::trim)
            .filter(|b| !b.is_empty())
            .unwrap_or(self.default_bucket.as_str())
            .to_string()
    }

    /// List every object in the bucket, creating the bucket if needed.
    pub async fn list_files(&self, bucket: Option<&str>) -> ServiceResult<FileListing> {
        let bucket = self.resolve_bucket(bucket);
        self.provisioner
            .ensure(&bucket)
            .await
            .map_err(|e| ServiceError::Storage(format!("Failed to list files: {}", e)))?;

        let files = self
            .store
            .list_objects(&bucket)
            .await
            .map_err(|e| ServiceError::storage("Failed to list files", e))?;

        Ok(FileListing { bucket, files })
    }

    pub async fn download(&self, bucket: Option<&str>, key: &str) -> ServiceResult<Download> {
        let bucket = self.resolve_bucket(bucket);
        let object = self
            .store
            .get_object(&bucket, key)
            .await
            .map_err(|e| ServiceError::storage("Download failed", e))?;

        Ok(Download {
            key: key.to_string(),
            data: object.data,
            content_type: object
                .content_type
                .filter(|ct| !ct.trim().is_empty())
                .unwrap_or_else(|| mime::APPLICATION_OCTET_STREAM.to_string()),
        })
    }

    pub async fn list_buckets(&self) -> ServiceResult<Vec<BucketSummary>> {
        self.store
            .list_buckets()
            .await
            .map_err(|e| ServiceError::storage("Failed to list buckets", e))
    }

    /// Create a new bucket, refusing invalid or already taken names.
    pub async fn create_bucket(&self, name: &str) -> ServiceResult<String> {
        let name = validate_bucket_name(name)?.to_string();

        let exists = self
            .store
            .bucket_exists(&name)
            .await
            .map_err(|e| ServiceError::storage("Failed to create bucket", e))?;
        if exists {
            return Err(ValidationError::BucketExists(name).into());
        }

        match self.store.make_bucket(&name).await {
            Ok(()) => {
                info!(bucket = %name, "Created bucket");
                Ok(name)
            }
            Err(StoreError::AlreadyExists(_)) => Err(ValidationError::BucketExists(name).into()),
            Err(e) => Err(ServiceError::storage("Failed to create bucket", e)),
        }
    }

    /// Remove an object. Deleting a key that does not exist succeeds.
    pub async fn delete(&self, bucket: Option<&str>, key: &str) -> ServiceResult<()> {
        let bucket = self.resolve_bucket(bucket);
        match self.store.remove_object(&bucket, key).await {
            Ok(()) | Err(StoreError::NotFound(_)) => {
                info!(bucket = %bucket, key = %key, "Object deleted");
                Ok(())
            }
            Err(e) => Err(ServiceError::storage("Delete failed", e)),
        }
    }
}
