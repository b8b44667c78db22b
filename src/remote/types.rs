//! esa.io API types
//!
//! DTOs for the three post endpoints the diary uses. Write requests are
//! wrapped in a `{"post": {...}}` envelope.

use serde::{Deserialize, Serialize};

use crate::core::article::Article;

// ============== Post Types ==============

/// Post record as returned by the API (unused fields skipped)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub number: u64,
    pub name: String,
    #[serde(default)]
    pub body_md: String,
    #[serde(default)]
    pub wip: bool,
    #[serde(default)]
    pub full_name: Option<String>,
}

impl From<Post> for Article {
    fn from(post: Post) -> Self {
        Article {
            number: post.number,
            name: post.name,
            body_md: post.body_md,
            wip: post.wip,
        }
    }
}

/// Response from the post search endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostListResponse {
    pub posts: Vec<Post>,
}

impl PostListResponse {
    /// First hit whose full name is exactly `full_name`.
    ///
    /// Search can match loosely; hits without a `full_name` are trusted.
    pub fn into_exact(self, full_name: &str) -> Option<Article> {
        self.posts
            .into_iter()
            .find(|p| p.full_name.as_deref().map_or(true, |f| f == full_name))
            .map(Article::from)
    }
}

// ============== Write Types ==============

/// `{"post": ...}` request envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostEnvelope<T> {
    pub post: T,
}

/// Body of an update request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdatePost {
    pub name: String,
    pub body_md: String,
    pub wip: bool,
}

/// Body of a create-from-template request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePost {
    pub name: String,
    pub category: String,
    pub wip: bool,
    pub template_post_full_name: String,
}

// ============== Error Types ==============

/// API error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    pub error: String,
    #[serde(default)]
    pub message: Option<String>,
}
