use std::sync::Arc;

use tracing::info;

use crate::config::UploadConfig;
use crate::error::{ServiceError, ServiceResult, ValidationError};
use crate::services::naming::{resolve_object_key, secure_filename};
use crate::services::provisioner::BucketProvisioner;
use crate::services::staging::StagedFile;
use crate::services::validation::{validate_file_size, validate_file_type};
use crate::storage::ObjectStore;

/// One inbound file upload
#[derive(Debug, Default)]
pub struct UploadRequest {
    /// Payload already written to disk; removed once the request drops
    pub file: Option<StagedFile>,
    pub filename: String,
    pub content_type: Option<String>,
    /// Falls back to the configured default bucket when absent or blank.
    pub bucket: Option<String>,
    pub keep_original_name: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOutcome {
    /// Sanitized client filename
    pub filename: String,
    /// Key the object was stored under
    pub object_name: String,
    pub bucket: String,
}

/// Validates, names and stores uploaded files
#[derive(Clone)]
pub struct UploadGateway {
    store: Arc<dyn ObjectStore>,
    provisioner: BucketProvisioner,
    settings: UploadConfig,
    default_bucket: String,
}

impl UploadGateway {
    pub fn new(store: Arc<dyn ObjectStore>, settings: UploadConfig, default_bucket: String) -> Self {
        Self {
            provisioner: BucketProvisioner::new(Arc::clone(&store)),
            store,
            settings,
            default_bucket,
        }
    }

    pub fn max_file_size(&self) -> u64 {
        self.settings.max_file_size
    }

    /// Store one file.
    ///
    /// Validation happens before the first store call, so a rejected upload
    /// never reaches the object store.
    pub async fn upload(&self, request: UploadRequest) -> ServiceResult<UploadOutcome> {
        let staged = request.file.ok_or(ValidationError::MissingFile)?;
        if request.filename.trim().is_empty() {
            return Err(ValidationError::MissingFile.into());
        }

        validate_file_size(staged.size(), self.settings.max_file_size)?;

        let filename = secure_filename(&request.filename);
        if filename.is_empty() {
            return Err(ValidationError::MissingFile.into());
        }
        validate_file_type(&filename, &self.settings.allowed_extensions)?;

        let bucket = self.resolve_bucket(request.bucket.as_deref());
        self.provisioner.ensure(&bucket).await?;

        let object_name =
            resolve_object_key(self.store.as_ref(), &bucket, &filename, request.keep_original_name)
                .await?;

        let content_type = request
            .content_type
            .filter(|ct| !ct.trim().is_empty())
            .unwrap_or_else(|| mime::APPLICATION_OCTET_STREAM.to_string());

        self.store
            .put_object(&bucket, &object_name, staged.path(), &content_type)
            .await
            .map_err(|e| ServiceError::storage("Upload failed", e))?;

        info!(
            bucket = %bucket,
            object_name = %object_name,
            size = staged.size(),
            "File uploaded"
        );

        Ok(UploadOutcome {
            filename,
            object_name,
            bucket,
        })
    }

    fn resolve_bucket(&self, requested: Option<&str>) -> String {
        requested
            .map(str::trim)
            .filter(|b| !b.is_empty())
            .unwrap_or(self.default_bucket.as_str())
            .to_string()
    }
}
