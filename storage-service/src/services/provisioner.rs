use std::sync::Arc;

use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, info};

use crate::error::{ServiceError, ServiceResult, ValidationError};
use crate::storage::{ObjectStore, StoreError};

lazy_static! {
    static ref BUCKET_NAME_REGEX: Regex = Regex::new(r"^[a-z0-9][a-z0-9.-]*[a-z0-9]$").unwrap();
}

pub fn is_valid_bucket_name(name: &str) -> bool {
    BUCKET_NAME_REGEX.is_match(name)
}

/// Trim and check a client supplied bucket name.
pub fn validate_bucket_name(name: &str) -> Result<&str, ValidationError> {
    let trimmed = name.trim();
    if is_valid_bucket_name(trimmed) {
        Ok(trimmed)
    } else {
        Err(ValidationError::BadBucketName(trimmed.to_string()))
    }
}

/// Creates buckets on first use
#[derive(Clone)]
pub struct BucketProvisioner {
    store: Arc<dyn ObjectStore>,
}

impl BucketProvisioner {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    /// Make sure `bucket` exists.
    ///
    /// Losing a creation race to another caller counts as success. Existing
    /// buckets are never touched.
    pub async fn ensure(&self, bucket: &str) -> ServiceResult<()> {
        let exists = self
            .store
            .bucket_exists(bucket)
            .await
            .map_err(|e| ServiceError::storage("Failed to check bucket", e))?;

        if exists {
            return Ok(());
        }

        match self.store.make_bucket(bucket).await {
            Ok(()) => {
                info!(bucket = %bucket, "Created bucket");
                Ok(())
            }
            Err(StoreError::AlreadyExists(_)) => {
                debug!(bucket = %bucket, "Bucket created concurrently");
                Ok(())
            }
            Err(e) => Err(ServiceError::storage("Failed to create bucket", e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MockObjectStore;
    use mockall::predicate::eq;

    #[test]
    fn test_bucket_name_grammar() {
        assert!(is_valid_bucket_name("uploads"));
        assert!(is_valid_bucket_name("my-bucket.1"));
        assert!(is_valid_bucket_name("a1"));

        assert!(!is_valid_bucket_name("My_Bucket"));
        assert!(!is_valid_bucket_name("-leading"));
        assert!(!is_valid_bucket_name("trailing."));
        assert!(!is_valid_bucket_name("a"));
        assert!(!is_valid_bucket_name(""));
        assert!(!is_valid_bucket_name("has space"));
    }

    #[test]
    fn test_validate_bucket_name_trims() {
        assert_eq!(validate_bucket_name("  reports  ").unwrap(), "reports");
        assert_eq!(
            validate_bucket_name("My_Bucket"),
            Err(ValidationError::BadBucketName("My_Bucket".to_string()))
        );
    }

    #[tokio::test]
    async fn test_ensure_creates_missing_bucket() {
        let mut store = MockObjectStore::new();
        store
            .expect_bucket_exists()
            .with(eq("reports"))
            .times(1)
            .returning(|_| Ok(false));
        store
            .expect_make_bucket()
            .with(eq("reports"))
            .times(1)
            .returning(|_| Ok(()));

        let provisioner = BucketProvisioner::new(Arc::new(store));
        provisioner.ensure("reports").await.unwrap();
    }

    #[tokio::test]
    async fn test_ensure_leaves_existing_bucket_alone() {
        let mut store = MockObjectStore::new();
        store.expect_bucket_exists().times(1).returning(|_| Ok(true));
        store.expect_make_bucket().times(0);

        let provisioner = BucketProvisioner::new(Arc::new(store));
        provisioner.ensure("reports").await.unwrap();
    }

    #[tokio::test]
    async fn test_ensure_tolerates_creation_race() {
        let mut store = MockObjectStore::new();
        store.expect_bucket_exists().returning(|_| Ok(false));
        store
            .expect_make_bucket()
            .returning(|name| Err(StoreError::AlreadyExists(name.to_string())));

        let provisioner = BucketProvisioner::new(Arc::new(store));
        assert!(provisioner.ensure("reports").await.is_ok());
    }

    #[tokio::test]
    async fn test_ensure_reports_store_failures() {
        let mut store = MockObjectStore::new();
        store
            .expect_bucket_exists()
            .returning(|_| Err(StoreError::Backend("connection refused".to_string())));

        let provisioner = BucketProvisioner::new(Arc::new(store));
        let err = provisioner.ensure("reports").await.unwrap_err();
        assert!(matches!(err, ServiceError::Storage(_)));
        assert!(err.to_string().contains("connection refused"));
    }
}
