//! On-disk staging for upload payloads
//!
//! Multipart chunks are appended to a `NamedTempFile` as they arrive, so an
//! upload never sits in memory as a whole. The file is removed when the
//! [`StagedFile`] drops.

use std::path::Path;

use tempfile::NamedTempFile;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

use crate::error::{ServiceError, ServiceResult};

fn staging_error(err: std::io::Error) -> ServiceError {
    ServiceError::Storage(format!("Failed to stage upload: {}", err))
}

/// A fully written payload waiting to be stored
#[derive(Debug)]
pub struct StagedFile {
    file: NamedTempFile,
    size: u64,
}

impl StagedFile {
    pub async fn from_bytes(data: &[u8]) -> ServiceResult<Self> {
        let mut writer = StagingWriter::new()?;
        writer.write(data).await?;
        writer.finish().await
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

/// Appends chunks to a fresh temp file
#[derive(Debug)]
pub struct StagingWriter {
    file: NamedTempFile,
    writer: File,
    size: u64,
}

impl StagingWriter {
    pub fn new() -> ServiceResult<Self> {
        let file = NamedTempFile::new().map_err(staging_error)?;
        let writer = File::from_std(file.reopen().map_err(staging_error)?);
        Ok(Self {
            file,
            writer,
            size: 0,
        })
    }

    /// Bytes written so far
    pub fn size(&self) -> u64 {
        self.size
    }

    pub async fn write(&mut self, chunk: &[u8]) -> ServiceResult<()> {
        self.writer.write_all(chunk).await.map_err(staging_error)?;
        self.size += chunk.len() as u64;
        Ok(())
    }

    pub async fn finish(mut self) -> ServiceResult<StagedFile> {
        self.writer.flush().await.map_err(staging_error)?;
        Ok(StagedFile {
            file: self.file,
            size: self.size,
        })
    }
}
