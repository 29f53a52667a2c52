//! Comment model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Reader comment on an article
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub article_id: String,
    pub author_name: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(article_id: String, author_name: String, body: String, now: DateTime<Utc>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            article_id,
            author_name,
            body,
            created_at: now,
        }
    }
}

/// Input for posting a comment
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateCommentInput {
    pub author_name: String,
    pub body: String,
}
