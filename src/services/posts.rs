use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;
use validator::Validate;

use crate::{
    models::blog_post::{
        Author, AuthorDto, BlogPost, Comment, CommentDto, CreateBlogPostDto, UpdateBlogPostDto,
    },
    repositories::blog_posts_repo::BlogPostsRepository,
    Error, Result,
};

use super::{Clock, IdGenerator, SystemClock, UuidV7Generator};

/// Post Store: every write hands a mutation of the post aggregate to the store,
/// which applies it atomically and persists the whole document.
#[derive(Clone)]
pub struct BlogPostsService {
    repo: Arc<dyn BlogPostsRepository>,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
    avatar_base_url: String,
}

impl BlogPostsService {
    pub fn new(repo: Arc<dyn BlogPostsRepository>, avatar_base_url: impl Into<String>) -> Self {
        Self {
            repo,
            clock: Arc::new(SystemClock),
            ids: Arc::new(UuidV7Generator),
            avatar_base_url: avatar_base_url.into(),
        }
    }

    #[cfg(test)]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    #[cfg(test)]
    pub fn with_id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    pub fn avatar_url(&self, name: &str) -> String {
        format!("{}?name={}", self.avatar_base_url, urlencoding::encode(name))
    }

    fn author_from(&self, author: AuthorDto) -> Author {
        let avatar = author.name.as_deref().map(|name| self.avatar_url(name));
        Author {
            name: author.name,
            avatar,
        }
    }

    pub async fn create_blog_post(&self, new_post: CreateBlogPostDto) -> Result<Uuid> {
        new_post.validate()?;

        let read_time = new_post
            .read_time
            .and_then(|rt| rt.into_read_time())
            .ok_or_else(|| {
                Error::Validation("Validation failed: readTime: Read time is required".to_string())
            })?;

        let now = self.clock.now();
        let post = BlogPost {
            id: self.ids.next_id(),
            category: new_post.category,
            title: new_post.title,
            cover: new_post.cover,
            read_time,
            author: new_post.author.map(|a| self.author_from(a)),
            content: new_post.content,
            comments: Vec::new(),
            created_at: now,
            updated_at: now,
        };

        self.repo.insert_blog_post(&post).await?;
        debug!("created blog post {}", post.id);

        Ok(post.id)
    }

    pub async fn get_blog_posts(&self) -> Result<Vec<BlogPost>> {
        let posts = self.repo.get_blog_posts().await?;

        Ok(posts)
    }

    pub async fn get_blog_post(&self, post_id: &str) -> Result<BlogPost> {
        let post_id = parse_id(post_id, "BlogPost")?;
        self.load(post_id).await
    }

    pub async fn update_blog_post(
        &self,
        post_id: &str,
        update: UpdateBlogPostDto,
    ) -> Result<BlogPost> {
        let post_id = parse_id(post_id, "BlogPost")?;
        update.validate()?;

        let read_time = match update.read_time {
            Some(read_time) => Some(read_time.into_read_time().ok_or_else(|| {
                Error::Validation(
                    "Validation failed: readTime.value: Read time value is required".to_string(),
                )
            })?),
            None => None,
        };
        let author = update.author.map(|a| self.author_from(a));
        let now = self.clock.now();

        self.mutate(post_id, move |post| {
            if let Some(category) = update.category {
                post.category = category;
            }
            if let Some(title) = update.title {
                post.title = title;
            }
            if let Some(cover) = update.cover {
                post.cover = Some(cover);
            }
            if let Some(read_time) = read_time {
                post.read_time = read_time;
            }
            if let Some(author) = author {
                post.author = Some(author);
            }
            if let Some(content) = update.content {
                post.content = content;
            }
            post.updated_at = now;
            Ok(())
        })
        .await
    }

    pub async fn delete_blog_post(&self, post_id: &str) -> Result<()> {
        let post_id = parse_id(post_id, "BlogPost")?;

        if !self.repo.delete_blog_post(post_id).await? {
            return Err(post_not_found(post_id));
        }
        debug!("deleted blog post {}", post_id);

        Ok(())
    }

    pub async fn add_comment(&self, post_id: &str, new_comment: CommentDto) -> Result<BlogPost> {
        let post_id = parse_id(post_id, "BlogPost")?;
        let now = self.clock.now();
        let comment = Comment {
            id: self.ids.next_id(),
            comment: new_comment.comment,
            added_on: now,
            updated_on: None,
        };

        self.mutate(post_id, move |post| {
            post.comments.push(comment);
            post.updated_at = now;
            Ok(())
        })
        .await
    }

    pub async fn get_comments(&self, post_id: &str) -> Result<Vec<Comment>> {
        let post_id = parse_id(post_id, "BlogPost")?;
        let post = self.load(post_id).await?;

        Ok(post.comments)
    }

    pub async fn get_comment(&self, post_id: &str, comment_id: &str) -> Result<Comment> {
        let post_id = parse_id(post_id, "BlogPost")?;
        let comment_id = parse_id(comment_id, "Comment")?;
        let post = self.load(post_id).await?;

        post.comment(comment_id)
            .cloned()
            .ok_or_else(|| comment_not_found(comment_id))
    }

    pub async fn update_comment(
        &self,
        post_id: &str,
        comment_id: &str,
        update: CommentDto,
    ) -> Result<BlogPost> {
        let post_id = parse_id(post_id, "BlogPost")?;
        let comment_id = parse_id(comment_id, "Comment")?;
        let now = self.clock.now();

        self.mutate(post_id, move |post| {
            let comment = post
                .comment_mut(comment_id)
                .ok_or_else(|| comment_not_found(comment_id))?;
            if let Some(text) = update.comment {
                comment.comment = Some(text);
            }
            comment.updated_on = Some(now);
            post.updated_at = now;
            Ok(())
        })
        .await
    }

    /// Removing an id that is not in the comment list leaves the comments as is.
    pub async fn delete_comment(&self, post_id: &str, comment_id: &str) -> Result<BlogPost> {
        let post_id = parse_id(post_id, "BlogPost")?;
        let comment_id = parse_id(comment_id, "Comment")?;
        let now = self.clock.now();

        self.mutate(post_id, move |post| {
            post.comments.retain(|c| c.id != comment_id);
            post.updated_at = now;
            Ok(())
        })
        .await
    }

    async fn load(&self, post_id: Uuid) -> Result<BlogPost> {
        self.repo
            .find_blog_post(post_id)
            .await?
            .ok_or_else(|| post_not_found(post_id))
    }

    async fn mutate<F>(&self, post_id: Uuid, mutation: F) -> Result<BlogPost>
    where
        F: FnOnce(&mut BlogPost) -> Result<()> + Send + 'static,
    {
        self.repo
            .update_blog_post(post_id, Box::new(mutation))
            .await?
            .ok_or_else(|| post_not_found(post_id))
    }
}

fn parse_id(raw: &str, entity: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).map_err(|_| Error::BadRequest(format!("Invalid {entity} id {raw}")))
}

fn post_not_found(post_id: Uuid) -> Error {
    Error::NotFound(format!("BlogPost with id {post_id} not found!"))
}

fn comment_not_found(comment_id: Uuid) -> Error {
    Error::NotFound(format!("Comment with id {comment_id} not found."))
}
