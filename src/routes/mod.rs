use std::sync::Arc;

use axum::{Extension, Router};
use tower_http::trace::TraceLayer;

use crate::{
    handlers::{blog_posts::blog_posts_handler, configure_cors, not_found},
    AppState,
};

pub const ENDPOINTS: &[(&str, &str)] = &[
    ("POST", "/blogposts"),
    ("GET", "/blogposts"),
    ("GET", "/blogposts/{blog_post_id}"),
    ("PUT", "/blogposts/{blog_post_id}"),
    ("DELETE", "/blogposts/{blog_post_id}"),
    ("POST", "/blogposts/{blog_post_id}/comments"),
    ("GET", "/blogposts/{blog_post_id}/comments"),
    ("GET", "/blogposts/{blog_post_id}/comments/{comment_id}"),
    ("PUT", "/blogposts/{blog_post_id}/comments/{comment_id}"),
    ("DELETE", "/blogposts/{blog_post_id}/comments/{comment_id}"),
];

pub fn create_routes(app_state: Arc<AppState>) -> Router {
    Router::new()
        .nest("/blogposts", blog_posts_handler())
        .fallback(not_found)
        .layer(Extension(app_state))
        .layer(TraceLayer::new_for_http())
        .layer(configure_cors())
}
