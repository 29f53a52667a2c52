//! Article service
//!
//! Implements business logic for article management:
//! - Create articles as drafts or published, with generated unique slugs
//! - Publish with a timestamp from the injected clock
//! - Breaking-news flagging and listing
//! - View counting
//! - Paged listing, optionally by category
//!
//! Publishing or deleting an article changes which articles can trend, so
//! those operations drop cached trending lists. View and comment counters
//! are left to the trending cache TTL.

use crate::cache::Cache;
use crate::db::repositories::{ArticleFilter, ArticleRepository, CategoryRepository};
use crate::models::{Article, ArticleStatus, CreateArticleInput, ListParams, PagedResult, DEFAULT_CATEGORY_SLUG};
use crate::services::category::{generate_slug, is_valid_slug};
use crate::services::trending::invalidate_trending_cache;
use crate::trending::DynClock;
use anyhow::Context;
use std::sync::Arc;

const MAX_TITLE_LENGTH: usize = 255;

/// Upper bound on breaking-news list length
pub const MAX_BREAKING_LIMIT: i64 = 20;

/// Error types for article service operations
#[derive(Debug, thiserror::Error)]
pub enum ArticleServiceError {
    #[error("Article not found: {0}")]
    NotFound(String),

    #[error("Category not found: {0}")]
    CategoryNotFound(String),

    #[error("Article slug already exists: {0}")]
    DuplicateSlug(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Article service for managing news stories
pub struct ArticleService {
    repo: Arc<dyn ArticleRepository>,
    categories: Arc<dyn CategoryRepository>,
    cache: Arc<Cache>,
    clock: DynClock,
}

impl ArticleService {
    pub fn new(
        repo: Arc<dyn ArticleRepository>,
        categories: Arc<dyn CategoryRepository>,
        cache: Arc<Cache>,
        clock: DynClock,
    ) -> Self {
        Self {
            repo,
            categories,
            cache,
            clock,
        }
    }

    /// Create a new article
    ///
    /// Articles land in the default category when none is given. A slug
    /// derived from the title is made unique with a numeric suffix; an
    /// explicit slug that is taken is rejected.
    ///
    /// # Errors
    /// - `ValidationError` if title or content is empty, or the category is unknown
    /// - `DuplicateSlug` if an explicit slug is taken
    pub async fn create(&self, input: CreateArticleInput) -> Result<Article, ArticleServiceError> {
        validate_create_input(&input)?;

        let category = match input.category_id.as_deref() {
            Some(id) => self.categories.get_by_id(id).await.context("Failed to get category")?,
            None => self
                .categories
                .get_by_slug(DEFAULT_CATEGORY_SLUG)
                .await
                .context("Failed to get default category")?,
        }
        .ok_or_else(|| {
            ArticleServiceError::ValidationError(format!(
                "Category not found: {}",
                input.category_id.as_deref().unwrap_or(DEFAULT_CATEGORY_SLUG)
            ))
        })?;

        let slug = match input.slug.as_deref().map(str::trim) {
            Some(slug) => {
                if !is_valid_slug(slug) {
                    return Err(ArticleServiceError::ValidationError(format!(
                        "Invalid slug '{}': use lowercase letters, digits and single hyphens",
                        slug
                    )));
                }
                if self.repo.exists_by_slug(slug).await.context("Failed to check slug uniqueness")? {
                    return Err(ArticleServiceError::DuplicateSlug(slug.to_string()));
                }
                slug.to_string()
            }
            None => self.unique_slug(&input.title).await?,
        };

        let now = self.clock.now();
        let mut article = Article::new(
            slug,
            input.title.trim().to_string(),
            input.summary.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()),
            input.content,
            category.id,
            now,
        );
        article.is_breaking = input.is_breaking;
        if input.publish {
            article.status = ArticleStatus::Published;
            article.published_at = Some(now);
        }

        let created = self.repo.create(&article).await.context("Failed to create article")?;
        tracing::info!(id = %created.id, slug = %created.slug, status = %created.status, "Article created");

        if created.is_published() {
            invalidate_trending_cache(&self.cache).await;
        }

        Ok(created)
    }

    /// Publish an article, stamping `published_at` with the current time
    ///
    /// Publishing an already published article keeps its original timestamp.
    pub async fn publish(&self, id: &str) -> Result<Article, ArticleServiceError> {
        let article = self
            .repo
            .publish(id, self.clock.now())
            .await
            .context("Failed to publish article")?
            .ok_or_else(|| ArticleServiceError::NotFound(id.to_string()))?;

        tracing::info!(id = %article.id, "Article published");
        invalidate_trending_cache(&self.cache).await;
        Ok(article)
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Option<Article>, ArticleServiceError> {
        self.repo
            .get_by_id(id)
            .await
            .context("Failed to get article")
            .map_err(Into::into)
    }

    pub async fn get_by_slug(&self, slug: &str) -> Result<Option<Article>, ArticleServiceError> {
        self.repo
            .get_by_slug(slug)
            .await
            .context("Failed to get article by slug")
            .map_err(Into::into)
    }

    /// List articles, newest first, optionally restricted to a category slug
    pub async fn list(
        &self,
        category_slug: Option<&str>,
        published_only: bool,
        params: &ListParams,
    ) -> Result<PagedResult<Article>, ArticleServiceError> {
        let category_id = match category_slug {
            Some(slug) => Some(
                self.categories
                    .get_by_slug(slug)
                    .await
                    .context("Failed to get category")?
                    .ok_or_else(|| ArticleServiceError::CategoryNotFound(slug.to_string()))?
                    .id,
            ),
            None => None,
        };

        let filter = ArticleFilter {
            category_id,
            published_only,
        };

        let items = self
            .repo
            .list(&filter, params.offset(), params.limit())
            .await
            .context("Failed to list articles")?;
        let total = self.repo.count(&filter).await.context("Failed to count articles")?;

        Ok(PagedResult::new(items, total, params))
    }

    /// Set or clear the breaking-news flag
    pub async fn set_breaking(&self, id: &str, breaking: bool) -> Result<Article, ArticleServiceError> {
        let article = self
            .repo
            .set_breaking(id, breaking, self.clock.now())
            .await
            .context("Failed to update breaking flag")?
            .ok_or_else(|| ArticleServiceError::NotFound(id.to_string()))?;

        tracing::info!(id = %article.id, breaking, "Breaking flag updated");
        Ok(article)
    }

    /// Published breaking-news articles, newest first
    pub async fn list_breaking(&self, limit: i64) -> Result<Vec<Article>, ArticleServiceError> {
        self.repo
            .list_breaking(limit.clamp(1, MAX_BREAKING_LIMIT))
            .await
            .context("Failed to list breaking news")
            .map_err(Into::into)
    }

    /// Count one view of an article
    pub async fn record_view(&self, id: &str) -> Result<(), ArticleServiceError> {
        if !self.repo.increment_views(id).await.context("Failed to record view")? {
            return Err(ArticleServiceError::NotFound(id.to_string()));
        }
        Ok(())
    }

    /// Delete an article together with its comments
    pub async fn delete(&self, id: &str) -> Result<(), ArticleServiceError> {
        if !self.repo.delete(id).await.context("Failed to delete article")? {
            return Err(ArticleServiceError::NotFound(id.to_string()));
        }

        tracing::info!(id, "Article deleted");
        invalidate_trending_cache(&self.cache).await;
        Ok(())
    }

    async fn unique_slug(&self, title: &str) -> Result<String, ArticleServiceError> {
        let base = generate_slug(title);
        let base = if base.is_empty() {
            format!("article-{}", &uuid::Uuid::new_v4().simple().to_string()[..8])
        } else {
            base
        };

        let mut candidate = base.clone();
        let mut suffix = 2;
        while self
            .repo
            .exists_by_slug(&candidate)
            .await
            .context("Failed to check slug uniqueness")?
        {
            candidate = format!("{}-{}", base, suffix);
            suffix += 1;
        }
        Ok(candidate)
    }
}

fn validate_create_input(input: &CreateArticleInput) -> Result<(), ArticleServiceError> {
    let title = input.title.trim();
    if title.is_empty() {
        return Err(ArticleServiceError::ValidationError(
            "Title cannot be empty".to_string(),
        ));
    }
    if title.chars().count() > MAX_TITLE_LENGTH {
        return Err(ArticleServiceError::ValidationError(format!(
            "Title must be at most {} characters",
            MAX_TITLE_LENGTH
        )));
    }
    if input.content.trim().is_empty() {
        return Err(ArticleServiceError::ValidationError(
            "Content cannot be empty".to_string(),
        ));
    }
    Ok(())
}
