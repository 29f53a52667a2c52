//! Comment service
//!
//! Reader comments on articles. Comment counts feed the trending score.

use crate::db::repositories::{ArticleRepository, CommentRepository};
use crate::models::{Comment, CreateCommentInput};
use crate::trending::DynClock;
use anyhow::Context;
use std::sync::Arc;

/// Longest accepted comment body, in characters
pub const MAX_COMMENT_LENGTH: usize = 2000;

const MAX_AUTHOR_LENGTH: usize = 100;

#[derive(Debug, thiserror::Error)]
pub enum CommentServiceError {
    #[error("Article not found: {0}")]
    ArticleNotFound(String),

    #[error("Comment not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

pub struct CommentService {
    repo: Arc<dyn CommentRepository>,
    articles: Arc<dyn ArticleRepository>,
    clock: DynClock,
}

impl CommentService {
    pub fn new(
        repo: Arc<dyn CommentRepository>,
        articles: Arc<dyn ArticleRepository>,
        clock: DynClock,
    ) -> Self {
        Self {
            repo,
            articles,
            clock,
        }
    }

    /// Post a comment on an existing article
    pub async fn create(
        &self,
        article_id: &str,
        input: CreateCommentInput,
    ) -> Result<Comment, CommentServiceError> {
        let author = input.author_name.trim();
        if author.is_empty() {
            return Err(CommentServiceError::ValidationError(
                "Author name cannot be empty".to_string(),
            ));
        }
        if author.chars().count() > MAX_AUTHOR_LENGTH {
            return Err(CommentServiceError::ValidationError(format!(
                "Author name must be at most {} characters",
                MAX_AUTHOR_LENGTH
            )));
        }

        let body = input.body.trim();
        if body.is_empty() {
            return Err(CommentServiceError::ValidationError(
                "Comment cannot be empty".to_string(),
            ));
        }
        if body.chars().count() > MAX_COMMENT_LENGTH {
            return Err(CommentServiceError::ValidationError(format!(
                "Comment must be at most {} characters",
                MAX_COMMENT_LENGTH
            )));
        }

        self.ensure_article(article_id).await?;

        let comment = Comment::new(
            article_id.to_string(),
            author.to_string(),
            body.to_string(),
            self.clock.now(),
        );
        let created = self.repo.create(&comment).await.context("Failed to create comment")?;
        tracing::debug!(article_id, comment_id = %created.id, "Comment posted");

        Ok(created)
    }

    /// Comments on an article, oldest first
    pub async fn list_for_article(&self, article_id: &str) -> Result<Vec<Comment>, CommentServiceError> {
        self.ensure_article(article_id).await?;
        self.repo
            .list_by_article(article_id)
            .await
            .context("Failed to list comments")
            .map_err(Into::into)
    }

    pub async fn delete(&self, id: &str) -> Result<(), CommentServiceError> {
        if !self.repo.delete(id).await.context("Failed to delete comment")? {
            return Err(CommentServiceError::NotFound(id.to_string()));
        }
        tracing::info!(id, "Comment deleted");
        Ok(())
    }

    async fn ensure_article(&self, article_id: &str) -> Result<(), CommentServiceError> {
        self.articles
            .get_by_id(article_id)
            .await
            .context("Failed to get article")?
            .map(|_| ())
            .ok_or_else(|| CommentServiceError::ArticleNotFound(article_id.to_string()))
    }
}
