use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::services::UploadOutcome;
use crate::storage::{BucketSummary, ObjectSummary};

/// `?bucket_name=` on the file endpoints
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BucketQuery {
    pub bucket_name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub minio_status: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusErrorResponse {
    pub minio_status: String,
    pub error: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub message: String,
    pub filename: String,
    pub object_name: String,
    pub bucket: String,
}

impl From<UploadOutcome> for UploadResponse {
    fn from(outcome: UploadOutcome) -> Self {
        Self {
            message: "File uploaded successfully".to_string(),
            filename: outcome.filename,
            object_name: outcome.object_name,
            bucket: outcome.bucket,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FileEntry {
    pub name: String,
    pub size: u64,
    pub last_modified: Option<DateTime<Utc>>,
    pub bucket: String,
}

impl FileEntry {
    pub fn new(object: ObjectSummary, bucket: &str) -> Self {
        Self {
            name: object.key,
            size: object.size,
            last_modified: object.last_modified,
            bucket: bucket.to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FileListResponse {
    pub files: Vec<FileEntry>,
    pub bucket: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BucketEntry {
    pub name: String,
    pub creation_date: Option<DateTime<Utc>>,
}

impl From<BucketSummary> for BucketEntry {
    fn from(bucket: BucketSummary) -> Self {
        Self {
            name: bucket.name,
            creation_date: bucket.creation_date,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BucketListResponse {
    pub buckets: Vec<BucketEntry>,
}

/// Body of `POST /buckets`
#[derive(Debug, Clone, Deserialize)]
pub struct CreateBucketRequest {
    pub bucket_name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateBucketResponse {
    pub message: String,
    pub bucket_name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}
