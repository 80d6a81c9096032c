use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::Utc;

use crate::models::{StatusErrorResponse, StatusResponse};
use crate::services::query::{probe_store, StoreStatus};
use crate::AppState;

/// GET /status
///
/// Reports object store connectivity. Only a failing probe answers 500;
/// a store that never connected is reported as `disconnected`.
pub async fn system_status(State(state): State<AppState>) -> impl IntoResponse {
    match probe_store(state.store()).await {
        StoreStatus::Error(error) => {
            tracing::warn!(error = %error, "Object store probe failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(StatusErrorResponse {
                    minio_status: "error".to_string(),
                    error,
                }),
            )
                .into_response()
        }
        status => Json(StatusResponse {
            minio_status: status.as_str().to_string(),
            timestamp: Utc::now(),
        })
        .into_response(),
    }
}
