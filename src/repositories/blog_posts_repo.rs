use async_trait::async_trait;
use sqlx::types::Json;
use uuid::Uuid;

use crate::{models::blog_post::BlogPost, Result};

use super::PostgresRepo;

/// Applied to a stored post while the store holds it exclusively. An `Err`
/// aborts the update and leaves the stored document untouched.
pub type PostMutation = Box<dyn FnOnce(&mut BlogPost) -> Result<()> + Send>;

/// Persistence port for blog post aggregates. Comments travel inside the
/// post document and have no storage identity of their own.
#[async_trait]
pub trait BlogPostsRepository: Sync + Send {
    async fn get_blog_posts(&self) -> Result<Vec<BlogPost>>;
    async fn find_blog_post(&self, post_id: Uuid) -> Result<Option<BlogPost>>;
    async fn insert_blog_post(&self, post: &BlogPost) -> Result<()>;
    /// Atomic read-modify-write of one document. `Ok(None)` if the post
    /// does not exist.
    async fn update_blog_post(
        &self,
        post_id: Uuid,
        mutation: PostMutation,
    ) -> Result<Option<BlogPost>>;
    /// Returns `false` if nothing was deleted.
    async fn delete_blog_post(&self, post_id: Uuid) -> Result<bool>;
}

#[async_trait]
impl BlogPostsRepository for PostgresRepo {
    async fn get_blog_posts(&self) -> Result<Vec<BlogPost>> {
        let rows: Vec<(Json<BlogPost>,)> = sqlx::query_as(
            r#"
            SELECT document FROM blog_posts ORDER BY created_at, id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|(Json(post),)| post).collect())
    }

    async fn find_blog_post(&self, post_id: Uuid) -> Result<Option<BlogPost>> {
        let row: Option<(Json<BlogPost>,)> = sqlx::query_as(
            r#"
            SELECT document FROM blog_posts WHERE id = $1
            "#,
        )
        .bind(post_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(Json(post),)| post))
    }

    async fn insert_blog_post(&self, post: &BlogPost) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO blog_posts (id, document, created_at, updated_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(post.id)
        .bind(Json(post))
        .bind(post.created_at)
        .bind(post.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update_blog_post(
        &self,
        post_id: Uuid,
        mutation: PostMutation,
    ) -> Result<Option<BlogPost>> {
        let mut tx = self.pool.begin().await?;

        let row: Option<(Json<BlogPost>,)> = sqlx::query_as(
            r#"
            SELECT document FROM blog_posts WHERE id = $1 FOR UPDATE
            "#,
        )
        .bind(post_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some((Json(mut post),)) = row else {
            return Ok(None);
        };
        // Dropping `tx` on error rolls back and releases the row lock.
        mutation(&mut post)?;

        sqlx::query(
            r#"
            UPDATE blog_posts
            SET document = $2,
                updated_at = $3
            WHERE id = $1
            "#,
        )
        .bind(post_id)
        .bind(Json(&post))
        .bind(post.updated_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Some(post))
    }

    async fn delete_blog_post(&self, post_id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM blog_posts WHERE id = $1
            "#,
        )
        .bind(post_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
