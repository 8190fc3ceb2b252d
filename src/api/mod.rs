pub mod handlers;
pub mod state;

pub use handlers::*;
pub use state::{AppState, ResultStore};

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;

/// 构建路由
pub fn router(state: AppState) -> Router {
    let max_bytes = state.config.upload.max_bytes;
    Router::new()
        .route("/health", get(health_check))
        .route("/upload", post(upload))
        .route("/download/:id", get(download_json))
        .route("/download/:id/csv", get(download_csv))
        .route("/report/:id", get(download_report))
        .layer(ServiceBuilder::new().layer(DefaultBodyLimit::max(max_bytes)))
        .with_state(state)
}
