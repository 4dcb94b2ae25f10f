use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::features::files::handlers::{count_all, create_text, list_all, search_files};
use crate::features::files::services::FileService;

/// Create routes for the files feature
pub fn routes(service: Arc<FileService>) -> Router {
    Router::new()
        .route("/text", post(create_text))
        .route("/text/all", get(list_all))
        .route("/text/count", get(count_all))
        .route("/text/search", get(search_files))
        .with_state(service)
}
