use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A blog post together with its embedded comments. The whole aggregate is
/// stored and replaced as one document.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct BlogPost {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub category: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover: Option<String>,
    #[serde(rename = "readTime")]
    pub read_time: ReadTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<Author>,
    pub content: String,
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

impl BlogPost {
    pub fn comment(&self, comment_id: Uuid) -> Option<&Comment> {
        self.comments.iter().find(|c| c.id == comment_id)
    }

    pub fn comment_mut(&mut self, comment_id: Uuid) -> Option<&mut Comment> {
        self.comments.iter_mut().find(|c| c.id == comment_id)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ReadTime {
    pub value: f64,
    pub unit: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct Author {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Comment {
    #[serde(rename = "_id")]
    pub id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(rename = "addedOn")]
    pub added_on: DateTime<Utc>,
    #[serde(rename = "updatedOn", default, skip_serializing_if = "Option::is_none")]
    pub updated_on: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, Validate, Clone, Default)]
pub struct CreateBlogPostDto {
    #[serde(default)]
    #[validate(length(min = 1, message = "Category is required"))]
    pub category: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    pub cover: Option<String>,
    #[serde(rename = "readTime", default)]
    #[validate(required(message = "Read time is required"), nested)]
    pub read_time: Option<ReadTimeDto>,
    pub author: Option<AuthorDto>,
    #[serde(default)]
    #[validate(length(min = 1, message = "Content is required"))]
    pub content: String,
}

#[derive(Debug, Deserialize, Validate, Clone, Default)]
pub struct UpdateBlogPostDto {
    #[validate(length(min = 1, message = "Category must not be empty"))]
    pub category: Option<String>,
    #[validate(length(min = 1, message = "Title must not be empty"))]
    pub title: Option<String>,
    pub cover: Option<String>,
    #[serde(rename = "readTime")]
    #[validate(nested)]
    pub read_time: Option<ReadTimeDto>,
    pub author: Option<AuthorDto>,
    #[validate(length(min = 1, message = "Content must not be empty"))]
    pub content: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Validate, Clone, Default)]
pub struct ReadTimeDto {
    #[validate(required(message = "Read time value is required"))]
    pub value: Option<f64>,
    #[serde(default)]
    #[validate(length(min = 1, message = "Read time unit is required"))]
    pub unit: String,
}

impl ReadTimeDto {
    /// `None` when the value is missing; call after `validate`.
    pub fn into_read_time(self) -> Option<ReadTime> {
        Some(ReadTime {
            value: self.value?,
            unit: self.unit,
        })
    }
}

/// Client-sent author. Any `avatar` in the body is ignored, it is always
/// derived from the name.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AuthorDto {
    pub name: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct CommentDto {
    pub comment: Option<String>,
}
