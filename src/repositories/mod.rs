use sqlx::PgPool;

pub mod blog_posts_repo;
pub mod memory_repo;

#[derive(Clone)]
pub struct PostgresRepo {
    pool: PgPool,
}

impl PostgresRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> crate::Result<()> {
        sqlx::migrate!().run(&self.pool).await?;
        Ok(())
    }
}
