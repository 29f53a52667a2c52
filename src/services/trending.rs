//! Trending service
//!
//! Loads the candidate articles for a window, scores and ranks them with the
//! pure functions in `crate::trending`, and caches the ranked list.
//!
//! Cache keys have the form `trending:{period}:{category|all}:{limit}`.
//! Any mutation that changes the set of trending candidates should call
//! [`invalidate_trending_cache`].

use crate::cache::{Cache, CacheLayer};
use crate::config::{ConfigError, TrendingConfig};
use crate::db::repositories::{ArticleRepository, CategoryRepository};
use crate::models::{Period, TrendingList};
use crate::trending::{
    observed_ceilings, rank_top, score_all, within_window, CeilingMode, DynClock, RankFilter,
};
use anyhow::Context;
use std::sync::Arc;
use std::time::Duration;

const CACHE_KEY_TRENDING_PREFIX: &str = "trending:";

/// Drop every cached trending list
pub async fn invalidate_trending_cache(cache: &Cache) {
    let pattern = format!("{}*", CACHE_KEY_TRENDING_PREFIX);
    if let Err(e) = cache.delete_pattern(&pattern).await {
        tracing::warn!("Failed to invalidate trending cache: {}", e);
    }
}

fn cache_key(period: Period, category: Option<&str>, limit: usize) -> String {
    format!(
        "{}{}:{}:{}",
        CACHE_KEY_TRENDING_PREFIX,
        period,
        category.unwrap_or("all"),
        limit
    )
}

#[derive(Debug, thiserror::Error)]
pub enum TrendingServiceError {
    #[error("Category not found: {0}")]
    CategoryNotFound(String),

    #[error("Invalid trending configuration: {0}")]
    InvalidConfig(#[from] ConfigError),

    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Parameters of one trending request; unset fields fall back to configuration
#[derive(Debug, Clone, Default)]
pub struct TrendingQuery {
    pub period: Option<Period>,
    /// Category slug
    pub category: Option<String>,
    pub limit: Option<usize>,
}

pub struct TrendingService {
    articles: Arc<dyn ArticleRepository>,
    categories: Arc<dyn CategoryRepository>,
    cache: Arc<Cache>,
    clock: DynClock,
    config: TrendingConfig,
}

impl TrendingService {
    pub fn new(
        articles: Arc<dyn ArticleRepository>,
        categories: Arc<dyn CategoryRepository>,
        cache: Arc<Cache>,
        clock: DynClock,
        config: TrendingConfig,
    ) -> Self {
        Self {
            articles,
            categories,
            cache,
            clock,
            config,
        }
    }

    pub fn config(&self) -> &TrendingConfig {
        &self.config
    }

    /// Ranked trending articles for a window, optionally within one category
    ///
    /// # Errors
    /// - `CategoryNotFound` if the category slug is unknown
    /// - `InvalidConfig` if the configured weights or ceilings are unusable
    pub async fn trending(&self, query: TrendingQuery) -> Result<TrendingList, TrendingServiceError> {
        let period = query.period.unwrap_or(self.config.default_period);
        let limit = self.config.effective_limit(query.limit);

        let category = match query.category.as_deref() {
            Some(slug) => Some(
                self.categories
                    .get_by_slug(slug)
                    .await
                    .context("Failed to get category")?
                    .ok_or_else(|| TrendingServiceError::CategoryNotFound(slug.to_string()))?,
            ),
            None => None,
        };

        let key = cache_key(period, category.as_ref().map(|c| c.slug.as_str()), limit);
        if let Some(list) = self.cache.get::<TrendingList>(&key).await.ok().flatten() {
            tracing::debug!(key = %key, "Trending list served from cache");
            return Ok(list);
        }

        let now = self.clock.now();
        let mut scoring = self.config.scoring_config(period)?;

        let candidates: Vec<_> = self
            .articles
            .list_trending_candidates(Some(now - period.window()))
            .await
            .context("Failed to load trending candidates")?
            .into_iter()
            .filter(|article| within_window(article, now, period))
            .collect();

        if self.config.ceiling_mode == CeilingMode::Observed {
            scoring = scoring.with_ceilings(observed_ceilings(&candidates));
        }

        let filter = match &category {
            Some(c) => RankFilter::category(c.id.clone()),
            None => RankFilter::all(),
        };

        let scored = score_all(&candidates, now, &scoring);
        let articles = rank_top(&scored, &filter, limit);

        tracing::debug!(
            period = %period,
            category = category.as_ref().map(|c| c.slug.as_str()).unwrap_or("all"),
            candidates = candidates.len(),
            returned = articles.len(),
            "Trending list computed"
        );

        let list = TrendingList {
            period,
            category: category.map(|c| c.slug),
            generated_at: now,
            articles,
        };

        let ttl = Duration::from_secs(self.config.cache_ttl_seconds);
        if let Err(e) = self.cache.set(&key, &list, ttl).await {
            tracing::warn!("Failed to cache trending list: {}", e);
        }

        Ok(list)
    }
}
