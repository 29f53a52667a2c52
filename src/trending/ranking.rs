//! Ranking stage
//!
//! Orders scored articles by total score and assigns dense 1-based ranks.
//! Ties on total are broken by higher view count, then by ascending id, so
//! the same input always yields the same ordering.

use chrono::{DateTime, Utc};
use std::cmp::Ordering;

use crate::models::{ArticleSnapshot, Period, RankedArticle, ScoredArticle};

/// Filter applied before ranking
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RankFilter {
    /// Only keep articles in this category
    pub category_id: Option<String>,
}

impl RankFilter {
    /// No filtering
    pub fn all() -> Self {
        Self::default()
    }

    /// Restrict to one category
    pub fn category(category_id: impl Into<String>) -> Self {
        Self {
            category_id: Some(category_id.into()),
        }
    }

    pub fn matches(&self, article: &ArticleSnapshot) -> bool {
        match &self.category_id {
            Some(id) => article.category.id == *id,
            None => true,
        }
    }
}

/// Whether an article was published inside `period`'s window ending at `now`.
///
/// Unpublished articles are never inside a window.
pub fn within_window(article: &ArticleSnapshot, now: DateTime<Utc>, period: Period) -> bool {
    match article.published_at {
        Some(published_at) => published_at <= now && now - published_at <= period.window(),
        None => false,
    }
}

/// Total order used for ranking: score desc, views desc, id asc
pub fn compare_scored(a: &ScoredArticle, b: &ScoredArticle) -> Ordering {
    b.score
        .total()
        .cmp(&a.score.total())
        .then_with(|| b.article.views_count.max(0).cmp(&a.article.views_count.max(0)))
        .then_with(|| a.article.id.cmp(&b.article.id))
}

/// Filter, sort and rank. The input is left untouched.
pub fn rank_articles(scored: &[ScoredArticle], filter: &RankFilter) -> Vec<RankedArticle> {
    let mut selected: Vec<&ScoredArticle> = scored
        .iter()
        .filter(|s| filter.matches(&s.article))
        .collect();

    selected.sort_by(|a, b| compare_scored(a, b));

    selected
        .into_iter()
        .enumerate()
        .map(|(index, s)| RankedArticle {
            article: s.article.clone(),
            trend_score: s.score.total(),
            score_breakdown: s.score.breakdown(),
            rank: index + 1,
        })
        .collect()
}

/// Rank and keep only the first `limit` entries
pub fn rank_top(scored: &[ScoredArticle], filter: &RankFilter, limit: usize) -> Vec<RankedArticle> {
    let mut ranked = rank_articles(scored, filter);
    ranked.truncate(limit);
    ranked
}
