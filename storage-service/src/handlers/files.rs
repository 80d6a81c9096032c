use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{header, HeaderValue, StatusCode},
    response::Response,
    Json,
};

use crate::error::{ServiceError, ServiceResult};
use crate::models::{BucketQuery, FileEntry, FileListResponse, MessageResponse};
use crate::AppState;

/// GET /files
pub async fn list_files(
    State(state): State<AppState>,
    Query(query): Query<BucketQuery>,
) -> ServiceResult<Json<FileListResponse>> {
    let listing = state
        .services()?
        .queries
        .list_files(query.bucket_name.as_deref())
        .await?;

    let files = listing
        .files
        .into_iter()
        .map(|object| FileEntry::new(object, &listing.bucket))
        .collect();

    Ok(Json(FileListResponse {
        files,
        bucket: listing.bucket,
    }))
}

/// GET /download/{key}
///
/// Streams the object back as an attachment named after its key.
pub async fn download_file(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Query(query): Query<BucketQuery>,
) -> ServiceResult<Response> {
    let download = state
        .services()?
        .queries
        .download(query.bucket_name.as_deref(), &key)
        .await?;

    let content_type = HeaderValue::from_str(&download.content_type)
        .unwrap_or_else(|_| HeaderValue::from_static(mime::APPLICATION_OCTET_STREAM.as_ref()));

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_DISPOSITION, attachment_header(&download.key))
        .body(Body::from(download.data))
        .map_err(|e| ServiceError::Storage(format!("Download failed: {}", e)))
}

/// DELETE /delete/{key}
pub async fn delete_file(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Query(query): Query<BucketQuery>,
) -> ServiceResult<Json<MessageResponse>> {
    state
        .services()?
        .queries
        .delete(query.bucket_name.as_deref(), &key)
        .await?;

    Ok(Json(MessageResponse {
        message: "File deleted successfully".to_string(),
    }))
}

fn attachment_header(key: &str) -> HeaderValue {
    let escaped = key.replace('\\', "\\\\").replace('"', "\\\"");
    let value = format!("attachment; filename=\"{}\"", escaped);
    HeaderValue::from_bytes(value.as_bytes())
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attachment_header_quotes_key() {
        assert_eq!(
            attachment_header("report_1.pdf"),
            "attachment; filename=\"report_1.pdf\""
        );
        assert_eq!(
            attachment_header("say \"hi\".txt"),
            "attachment; filename=\"say \\\"hi\\\".txt\""
        );
    }

    #[test]
    fn test_attachment_header_falls_back_on_control_chars() {
        assert_eq!(attachment_header("bad\nname"), "attachment");
    }
}
