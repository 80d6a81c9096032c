// In-memory object store used by the unit tests

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::{BucketSummary, ObjectData, ObjectStat, ObjectStore, ObjectSummary, StoreError};

#[derive(Debug, Clone)]
struct StoredEntry {
    data: Bytes,
    content_type: String,
    last_modified: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct BucketEntry {
    created: Option<DateTime<Utc>>,
    objects: BTreeMap<String, StoredEntry>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    buckets: RwLock<HashMap<String, BucketEntry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn with_bucket(self, bucket: &str) -> Self {
        self.buckets.write().await.insert(
            bucket.to_string(),
            BucketEntry {
                created: Some(Utc::now()),
                objects: BTreeMap::new(),
            },
        );
        self
    }

    pub async fn object_count(&self, bucket: &str) -> usize {
        self.buckets
            .read()
            .await
            .get(bucket)
            .map(|b| b.objects.len())
            .unwrap_or(0)
    }
}

fn no_such_bucket(bucket: &str) -> StoreError {
    StoreError::Backend(format!("NoSuchBucket: {}", bucket))
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn bucket_exists(&self, bucket: &str) -> Result<bool, StoreError> {
        Ok(self.buckets.read().await.contains_key(bucket))
    }

    async fn make_bucket(&self, bucket: &str) -> Result<(), StoreError> {
        let mut buckets = self.buckets.write().await;
        if buckets.contains_key(bucket) {
            return Err(StoreError::AlreadyExists(bucket.to_string()));
        }
        buckets.insert(
            bucket.to_string(),
            BucketEntry {
                created: Some(Utc::now()),
                objects: BTreeMap::new(),
            },
        );
        Ok(())
    }

    async fn stat_object(&self, bucket: &str, key: &str) -> Result<ObjectStat, StoreError> {
        let buckets = self.buckets.read().await;
        let entry = buckets
            .get(bucket)
            .and_then(|b| b.objects.get(key))
            .ok_or_else(|| StoreError::NotFound(format!("{}/{}", bucket, key)))?;

        Ok(ObjectStat {
            key: key.to_string(),
            size: entry.data.len() as u64,
            content_type: Some(entry.content_type.clone()),
            last_modified: Some(entry.last_modified),
        })
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        path: &Path,
        content_type: &str,
    ) -> Result<(), StoreError> {
        let data = tokio::fs::read(path)
            .await
            .map_err(|e| StoreError::Backend(format!("Failed to read staged upload: {}", e)))?;

        let mut buckets = self.buckets.write().await;
        let target = buckets.get_mut(bucket).ok_or_else(|| no_such_bucket(bucket))?;
        target.objects.insert(
            key.to_string(),
            StoredEntry {
                data: Bytes::from(data),
                content_type: content_type.to_string(),
                last_modified: Utc::now(),
            },
        );
        Ok(())
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<ObjectData, StoreError> {
        let buckets = self.buckets.read().await;
        let entry = buckets
            .get(bucket)
            .ok_or_else(|| no_such_bucket(bucket))?
            .objects
            .get(key)
            .ok_or_else(|| StoreError::NotFound(format!("{}/{}", bucket, key)))?;

        Ok(ObjectData {
            data: entry.data.clone(),
            content_type: Some(entry.content_type.clone()),
        })
    }

    async fn list_objects(&self, bucket: &str) -> Result<Vec<ObjectSummary>, StoreError> {
        let buckets = self.buckets.read().await;
        let target = buckets.get(bucket).ok_or_else(|| no_such_bucket(bucket))?;

        Ok(target
            .objects
            .iter()
            .map(|(key, entry)| ObjectSummary {
                key: key.clone(),
                size: entry.data.len() as u64,
                last_modified: Some(entry.last_modified),
            })
            .collect())
    }

    async fn list_buckets(&self) -> Result<Vec<BucketSummary>, StoreError> {
        let buckets = self.buckets.read().await;
        let mut summaries: Vec<BucketSummary> = buckets
            .iter()
            .map(|(name, entry)| BucketSummary {
                name: name.clone(),
                creation_date: entry.created,
            })
            .collect();
        summaries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(summaries)
    }

    async fn remove_object(&self, bucket: &str, key: &str) -> Result<(), StoreError> {
        let mut buckets = self.buckets.write().await;
        let target = buckets.get_mut(bucket).ok_or_else(|| no_such_bucket(bucket))?;
        // S3 semantics: deleting an absent key succeeds
        target.objects.remove(key);
        Ok(())
    }
}
