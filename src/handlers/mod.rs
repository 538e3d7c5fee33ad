use axum::{http::Uri, response::IntoResponse};
use tower_http::cors::{Any, CorsLayer};

use crate::Error;

pub mod blog_posts;

pub fn configure_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
}

pub async fn not_found(uri: Uri) -> impl IntoResponse {
    Error::NotFound(format!("{} not found", uri.path()))
}
