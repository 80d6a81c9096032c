use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

use crate::handlers::{buckets, file_upload, files, status};
use crate::AppState;

/// Headroom for multipart boundaries and the non-file form fields
pub const MULTIPART_OVERHEAD: u64 = 1024 * 1024;

/// Build the HTTP router with all routes and middleware
pub fn router(state: AppState) -> Router {
    let body_limit = usize::try_from(state.config.upload.max_file_size.saturating_add(MULTIPART_OVERHEAD))
        .unwrap_or(usize::MAX);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/status", get(status::system_status))
        .route("/upload", post(file_upload::upload_file))
        .route("/files", get(files::list_files))
        .route("/download/*key", get(files::download_file))
        .route("/buckets", get(buckets::list_buckets).post(buckets::create_bucket))
        .route("/delete/*key", delete(files::delete_file))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
