use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};

use crate::error::{ServiceResult, ValidationError};
use crate::models::{BucketEntry, BucketListResponse, CreateBucketRequest, CreateBucketResponse};
use crate::AppState;

/// GET /buckets
pub async fn list_buckets(State(state): State<AppState>) -> ServiceResult<Json<BucketListResponse>> {
    let buckets = state.services()?.queries.list_buckets().await?;

    Ok(Json(BucketListResponse {
        buckets: buckets.into_iter().map(BucketEntry::from).collect(),
    }))
}

/// POST /buckets with `{"bucket_name": "..."}`
pub async fn create_bucket(
    State(state): State<AppState>,
    payload: Result<Json<CreateBucketRequest>, JsonRejection>,
) -> ServiceResult<Json<CreateBucketResponse>> {
    let services = state.services()?;

    let Json(request) = payload.map_err(|e| ValidationError::MalformedRequest(e.body_text()))?;
    let requested = request
        .bucket_name
        .ok_or_else(|| ValidationError::BadBucketName(String::new()))?;

    tracing::info!(bucket = %requested, "Received bucket creation request");

    let bucket_name = services.queries.create_bucket(&requested).await?;

    Ok(Json(CreateBucketResponse {
        message: format!("Bucket \"{}\" created successfully", bucket_name),
        bucket_name,
    }))
}
