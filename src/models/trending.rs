//! Trending read models
//!
//! This module provides:
//! - `Period` - the trending time window (day / week / month)
//! - `ArticleSnapshot` - the read projection of an article used for scoring
//! - `ScoreBreakdown` / `TrendScore` - computed scores (never persisted)
//! - `RankedArticle` / `TrendingList` - ranked output handed to the API layer

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Trending time window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    /// Last 24 hours
    Day,
    /// Last 7 days
    #[default]
    Week,
    /// Last 30 days
    Month,
}

impl Period {
    /// Length of the window; recency decays linearly to zero across it
    pub fn window(&self) -> Duration {
        match self {
            Period::Day => Duration::hours(24),
            Period::Week => Duration::days(7),
            Period::Month => Duration::days(30),
        }
    }

    /// Convert to the string used in query parameters and cache keys
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Day => "day",
            Period::Week => "week",
            Period::Month => "month",
        }
    }

    /// Parse from a query parameter / config value
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "day" => Some(Period::Day),
            "week" => Some(Period::Week),
            "month" => Some(Period::Month),
            _ => None,
        }
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Category fields embedded in an article snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRef {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub color: String,
}

/// Read projection of an article, as supplied by the data layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleSnapshot {
    /// Opaque unique identifier
    pub id: String,
    pub slug: String,
    pub title: String,
    /// Total reads
    #[serde(default)]
    pub views_count: i64,
    /// Number of comment records
    #[serde(default)]
    pub comments_count: i64,
    /// Publication timestamp
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    pub category: CategoryRef,
}

/// Per-signal sub-scores
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    pub views_score: u32,
    pub comments_score: u32,
    pub recency_score: u32,
}

impl ScoreBreakdown {
    pub fn total(&self) -> u32 {
        self.views_score + self.comments_score + self.recency_score
    }
}

/// Computed trending score.
///
/// The total is always the sum of the breakdown; the only way to build one
/// is from a breakdown. Serialization is one-way; the wire form of a ranked
/// article carries the total and breakdown as plain fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct TrendScore {
    breakdown: ScoreBreakdown,
    total: u32,
}

impl TrendScore {
    pub fn from_breakdown(breakdown: ScoreBreakdown) -> Self {
        Self {
            total: breakdown.total(),
            breakdown,
        }
    }

    pub fn breakdown(&self) -> ScoreBreakdown {
        self.breakdown
    }

    pub fn views_score(&self) -> u32 {
        self.breakdown.views_score
    }

    pub fn comments_score(&self) -> u32 {
        self.breakdown.comments_score
    }

    pub fn recency_score(&self) -> u32 {
        self.breakdown.recency_score
    }

    pub fn total(&self) -> u32 {
        self.total
    }
}

/// An article paired with its score, prior to ranking
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoredArticle {
    pub article: ArticleSnapshot,
    pub score: TrendScore,
}

/// A ranked article as rendered by the public trending endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedArticle {
    #[serde(flatten)]
    pub article: ArticleSnapshot,
    #[serde(rename = "trendScore")]
    pub trend_score: u32,
    #[serde(rename = "scoreBreakdown")]
    pub score_breakdown: ScoreBreakdown,
    /// 1-based dense rank within the filtered set
    pub rank: usize,
}

/// Ranked trending list for one period / category / limit combination
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendingList {
    pub period: Period,
    /// Slug of the category filter, if any
    pub category: Option<String>,
    /// Evaluation time used for recency
    pub generated_at: DateTime<Utc>,
    pub articles: Vec<RankedArticle>,
}
