use std::sync::Arc;

use config::Config;
use repositories::{
    blog_posts_repo::BlogPostsRepository, memory_repo::InMemoryRepo, PostgresRepo,
};
use routes::{create_routes, ENDPOINTS};
use services::posts::BlogPostsService;
use sqlx::postgres::PgPoolOptions;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

pub use self::errors::{Error, Result};

mod config;
mod errors;
mod handlers;
mod models;
mod repositories;
mod routes;
mod services;

#[derive(Clone)]
pub struct AppState {
    pub blog_posts_service: BlogPostsService,
}

#[tokio::main]
async fn main() {
    let config = Config::init();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("blogposts_api=debug,tower_http=debug")),
        )
        .init();

    let repo: Arc<dyn BlogPostsRepository> = match &config.database_url {
        Some(database_url) => {
            let pool = match PgPoolOptions::new()
                .max_connections(config.db_max_connections)
                .connect(database_url)
                .await
            {
                Ok(pool) => {
                    info!("✅ Connection to the database is successful!");
                    pool
                }
                Err(err) => {
                    tracing::error!("🔥 Failed to connect to the database: {:?}", err);
                    std::process::exit(1);
                }
            };

            let repo = PostgresRepo::new(pool);
            if let Err(err) = repo.migrate().await {
                tracing::error!("🔥 Failed to run migrations: {:?}", err);
                std::process::exit(1);
            }
            Arc::new(repo)
        }
        None => {
            warn!("DATABASE_URL is not set, blog posts are kept in memory only");
            Arc::new(InMemoryRepo::new())
        }
    };

    let app_state = AppState {
        blog_posts_service: BlogPostsService::new(repo, config.avatar_base_url.clone()),
    };

    let app = create_routes(Arc::new(app_state));

    let listener = match tokio::net::TcpListener::bind(config.listen_addr()).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("🔥 Failed to bind {}: {:?}", config.listen_addr(), err);
            std::process::exit(1);
        }
    };

    for (method, path) in ENDPOINTS {
        info!("{:<6} {}", method, path);
    }
    info!("Server is running on {}", config.listen_addr());

    if let Err(err) = axum::serve(listener, app).await {
        tracing::error!("🔥 Server error: {:?}", err);
    }
}
