use axum::{
    extract::{
        multipart::{Field, MultipartError, MultipartRejection},
        Multipart, State,
    },
    http::StatusCode,
    Json,
};
use shared::env::parse_flag;

use crate::error::{ServiceResult, ValidationError};
use crate::models::UploadResponse;
use crate::services::{StagedFile, StagingWriter, UploadRequest};
use crate::AppState;

/// Handle file upload
///
/// POST /upload, multipart fields `file`, `bucket_name`, `keep_original_name`
pub async fn upload_file(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ServiceResult<Json<UploadResponse>> {
    tracing::info!("Received file upload request");

    let services = state.services()?;
    let max_file_size = services.uploads.max_file_size();

    let mut multipart =
        multipart.map_err(|e| ValidationError::MalformedRequest(e.body_text()))?;
    let request = read_upload_form(&mut multipart, max_file_size).await?;

    let outcome = services.uploads.upload(request).await?;

    Ok(Json(UploadResponse::from(outcome)))
}

async fn read_upload_form(multipart: &mut Multipart, max_file_size: u64) -> ServiceResult<UploadRequest> {
    let mut request = UploadRequest::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, max_file_size))?
    {
        let field_name = field.name().unwrap_or_default().to_string();
        tracing::debug!("Processing field: {}", field_name);

        match field_name.as_str() {
            "file" if request.file.is_none() => {
                request.filename = field.file_name().unwrap_or_default().to_string();
                request.content_type = field.content_type().map(str::to_string);
                request.file = Some(stage_file_field(field, max_file_size).await?);
            }
            "bucket_name" => {
                let value = field.text().await.map_err(|e| multipart_error(e, max_file_size))?;
                request.bucket = Some(value);
            }
            "keep_original_name" => {
                let value = field.text().await.map_err(|e| multipart_error(e, max_file_size))?;
                request.keep_original_name = parse_flag(&value);
            }
            _ => {}
        }
    }

    Ok(request)
}

/// Stream the file part to disk, giving up as soon as it outgrows the limit.
async fn stage_file_field(mut field: Field<'_>, max_file_size: u64) -> ServiceResult<StagedFile> {
    let mut writer = StagingWriter::new()?;

    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|e| multipart_error(e, max_file_size))?
    {
        if writer.size() + chunk.len() as u64 > max_file_size {
            return Err(ValidationError::TooLarge { limit: max_file_size }.into());
        }
        writer.write(&chunk).await?;
    }

    writer.finish().await
}

fn multipart_error(err: MultipartError, max_file_size: u64) -> ValidationError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ValidationError::TooLarge { limit: max_file_size }
    } else {
        ValidationError::MalformedRequest(err.body_text())
    }
}
