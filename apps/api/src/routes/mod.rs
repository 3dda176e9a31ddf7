pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::polish::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        // Extraction + AI polish
        .route("/api/v1/extract", post(handlers::handle_extract))
        .route("/api/v1/polish", post(handlers::handle_polish))
        // Rendering
        .route("/api/v1/format", post(handlers::handle_format))
        .route("/api/v1/render/pdf", post(handlers::handle_render_pdf))
        .route("/api/v1/render/docx", post(handlers::handle_render_docx))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
