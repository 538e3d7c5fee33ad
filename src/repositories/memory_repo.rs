use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{models::blog_post::BlogPost, Result};

use super::blog_posts_repo::{BlogPostsRepository, PostMutation};

/// Document store kept in process memory, in insertion order.
/// Used when no `DATABASE_URL` is configured; data is lost on restart.
#[derive(Default)]
pub struct InMemoryRepo {
    posts: RwLock<Vec<BlogPost>>,
}

impl InMemoryRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BlogPostsRepository for InMemoryRepo {
    async fn get_blog_posts(&self) -> Result<Vec<BlogPost>> {
        Ok(self.posts.read().await.clone())
    }

    async fn find_blog_post(&self, post_id: Uuid) -> Result<Option<BlogPost>> {
        let posts = self.posts.read().await;
        Ok(posts.iter().find(|p| p.id == post_id).cloned())
    }

    async fn insert_blog_post(&self, post: &BlogPost) -> Result<()> {
        self.posts.write().await.push(post.clone());
        Ok(())
    }

    async fn update_blog_post(
        &self,
        post_id: Uuid,
        mutation: PostMutation,
    ) -> Result<Option<BlogPost>> {
        // The write lock is held for the whole mutation.
        let mut posts = self.posts.write().await;
        let Some(stored) = posts.iter_mut().find(|p| p.id == post_id) else {
            return Ok(None);
        };

        let mut post = stored.clone();
        mutation(&mut post)?;
        *stored = post.clone();

        Ok(Some(post))
    }

    async fn delete_blog_post(&self, post_id: Uuid) -> Result<bool> {
        let mut posts = self.posts.write().await;
        let before = posts.len();
        posts.retain(|p| p.id != post_id);
        Ok(posts.len() != before)
    }
}
