//! Trending score computation
//!
//! A trending score is a 0-100 composite of three independently normalised
//! signals:
//! - views, saturating at a views ceiling (default weight 40)
//! - comments, saturating at a comments ceiling (default weight 30)
//! - recency, decaying linearly to zero across the period window (default weight 30)
//!
//! Everything here is pure: the evaluation instant is a parameter and there
//! are no error paths once a `ScoringConfig` has been built.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{ArticleSnapshot, Period, ScoreBreakdown, ScoredArticle, TrendScore};

/// Upper bound of a trending score
pub const MAX_SCORE: u32 = 100;

pub const DEFAULT_VIEWS_WEIGHT: u32 = 40;
pub const DEFAULT_COMMENTS_WEIGHT: u32 = 30;
pub const DEFAULT_RECENCY_WEIGHT: u32 = 30;

pub const DEFAULT_VIEWS_CEILING: u64 = 10_000;
pub const DEFAULT_COMMENTS_CEILING: u64 = 100;

/// Errors raised while building a scoring configuration
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScoringConfigError {
    #[error("score weights must sum to 100, got {0}")]
    WeightSum(u32),

    #[error("{0} ceiling must be at least 1")]
    ZeroCeiling(&'static str),
}

/// Per-signal weights; each one is also the upper bound of its sub-score
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Weights {
    views: u32,
    comments: u32,
    recency: u32,
}

impl Weights {
    pub fn new(views: u32, comments: u32, recency: u32) -> Result<Self, ScoringConfigError> {
        let sum = views.saturating_add(comments).saturating_add(recency);
        if sum != MAX_SCORE {
            return Err(ScoringConfigError::WeightSum(sum));
        }
        Ok(Self {
            views,
            comments,
            recency,
        })
    }

    pub fn views(&self) -> u32 {
        self.views
    }

    pub fn comments(&self) -> u32 {
        self.comments
    }

    pub fn recency(&self) -> u32 {
        self.recency
    }
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            views: DEFAULT_VIEWS_WEIGHT,
            comments: DEFAULT_COMMENTS_WEIGHT,
            recency: DEFAULT_RECENCY_WEIGHT,
        }
    }
}

/// Reference maxima used to normalise raw counters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ceilings {
    views: u64,
    comments: u64,
}

impl Ceilings {
    pub fn new(views: u64, comments: u64) -> Result<Self, ScoringConfigError> {
        if views == 0 {
            return Err(ScoringConfigError::ZeroCeiling("views"));
        }
        if comments == 0 {
            return Err(ScoringConfigError::ZeroCeiling("comments"));
        }
        Ok(Self { views, comments })
    }

    pub fn views(&self) -> u64 {
        self.views
    }

    pub fn comments(&self) -> u64 {
        self.comments
    }
}

impl Default for Ceilings {
    fn default() -> Self {
        Self {
            views: DEFAULT_VIEWS_CEILING,
            comments: DEFAULT_COMMENTS_CEILING,
        }
    }
}

/// How ceilings are chosen for a trending request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CeilingMode {
    /// Use the configured constants
    #[default]
    Fixed,
    /// Use the largest counters present in the candidate set
    Observed,
}

impl CeilingMode {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "fixed" => Some(CeilingMode::Fixed),
            "observed" => Some(CeilingMode::Observed),
            _ => None,
        }
    }
}

/// Everything the scoring function needs besides the article and `now`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScoringConfig {
    pub period: Period,
    pub weights: Weights,
    pub ceilings: Ceilings,
}

impl ScoringConfig {
    pub fn new(period: Period, weights: Weights, ceilings: Ceilings) -> Self {
        Self {
            period,
            weights,
            ceilings,
        }
    }

    pub fn with_period(mut self, period: Period) -> Self {
        self.period = period;
        self
    }

    pub fn with_ceilings(mut self, ceilings: Ceilings) -> Self {
        self.ceilings = ceilings;
        self
    }
}

/// Score one article's raw metrics.
///
/// Negative counters count as zero; a missing publish time contributes no
/// recency. A publish time after `now` counts as brand new.
pub fn score_article(
    views: i64,
    comments: i64,
    published_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    config: &ScoringConfig,
) -> TrendScore {
    let breakdown = ScoreBreakdown {
        views_score: saturating_share(views, config.ceilings.views, config.weights.views),
        comments_score: saturating_share(
            comments,
            config.ceilings.comments,
            config.weights.comments,
        ),
        recency_score: recency_share(published_at, now, config.period, config.weights.recency),
    };
    TrendScore::from_breakdown(breakdown)
}

/// Score an article snapshot
pub fn score_snapshot(
    article: &ArticleSnapshot,
    now: DateTime<Utc>,
    config: &ScoringConfig,
) -> TrendScore {
    score_article(
        article.views_count,
        article.comments_count,
        article.published_at,
        now,
        config,
    )
}

/// Score every snapshot, preserving input order
pub fn score_all(
    articles: &[ArticleSnapshot],
    now: DateTime<Utc>,
    config: &ScoringConfig,
) -> Vec<ScoredArticle> {
    articles
        .iter()
        .map(|article| ScoredArticle {
            score: score_snapshot(article, now, config),
            article: article.clone(),
        })
        .collect()
}

/// Ceilings equal to the largest counters in `articles` (never below 1)
pub fn observed_ceilings<'a, I>(articles: I) -> Ceilings
where
    I: IntoIterator<Item = &'a ArticleSnapshot>,
{
    let (views, comments) = articles.into_iter().fold((1u64, 1u64), |(v, c), a| {
        (
            v.max(a.views_count.max(0) as u64),
            c.max(a.comments_count.max(0) as u64),
        )
    });
    Ceilings { views, comments }
}

fn saturating_share(value: i64, ceiling: u64, weight: u32) -> u32 {
    let value = value.max(0) as f64;
    let ratio = (value / ceiling.max(1) as f64).min(1.0);
    scale(ratio, weight)
}

fn recency_share(
    published_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    period: Period,
    weight: u32,
) -> u32 {
    let Some(published_at) = published_at else {
        return 0;
    };
    let age_ms = now
        .signed_duration_since(published_at)
        .num_milliseconds()
        .max(0) as f64;
    let window_ms = period.window().num_milliseconds().max(1) as f64;
    let freshness = (1.0 - age_ms / window_ms).clamp(0.0, 1.0);
    scale(freshness, weight)
}

fn scale(ratio: f64, weight: u32) -> u32 {
    ((ratio * weight as f64).round() as u32).min(weight)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CategoryRef;
    use chrono::{Duration, TimeZone};
    use proptest::prelude::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn config(views_ceiling: u64, comments_ceiling: u64) -> ScoringConfig {
        ScoringConfig::new(
            Period::Week,
            Weights::default(),
            Ceilings::new(views_ceiling, comments_ceiling).unwrap(),
        )
    }

    fn snapshot(id: &str, views: i64, comments: i64) -> ArticleSnapshot {
        ArticleSnapshot {
            id: id.to_string(),
            slug: id.to_string(),
            title: id.to_string(),
            views_count: views,
            comments_count: comments,
            published_at: Some(now()),
            category: CategoryRef {
                id: "c1".to_string(),
                name: "News".to_string(),
                slug: "news".to_string(),
                color: "#333333".to_string(),
            },
        }
    }

    #[test]
    fn test_fresh_article_without_engagement_scores_recency_only() {
        let score = score_article(0, 0, Some(now()), now(), &config(1000, 50));
        assert_eq!(score.views_score(), 0);
        assert_eq!(score.comments_score(), 0);
        assert_eq!(score.recency_score(), 30);
        assert_eq!(score.total(), 30);
    }

    #[test]
    fn test_saturated_fresh_article_scores_maximum() {
        let score = score_article(1000, 50, Some(now()), now(), &config(1000, 50));
        assert_eq!(score.views_score(), 40);
        assert_eq!(score.comments_score(), 30);
        assert_eq!(score.recency_score(), 30);
        assert_eq!(score.total(), 100);
    }

    #[test]
    fn test_counters_above_ceiling_clamp_to_band() {
        let score = score_article(i64::MAX, i64::MAX, Some(now()), now(), &config(10, 10));
        assert_eq!(score.views_score(), 40);
        assert_eq!(score.comments_score(), 30);
    }

    #[test]
    fn test_missing_publish_time_scores_no_recency() {
        let cfg = config(1000, 50);
        let fresh = score_article(500, 10, Some(now()), now(), &cfg);
        let unpublished = score_article(500, 10, None, now(), &cfg);
        assert_eq!(unpublished.recency_score(), 0);
        assert_eq!(fresh.total() - unpublished.total(), 30);
    }

    #[test]
    fn test_negative_counters_are_clamped_to_zero() {
        let score = score_article(-5, -100, Some(now()), now(), &config(1000, 50));
        assert_eq!(score.views_score(), 0);
        assert_eq!(score.comments_score(), 0);
    }

    #[test]
    fn test_half_ceiling_rounds_to_half_weight() {
        let score = score_article(500, 25, None, now(), &config(1000, 50));
        assert_eq!(score.views_score(), 20);
        assert_eq!(score.comments_score(), 15);
    }

    #[test]
    fn test_recency_decays_across_window() {
        let cfg = config(1000, 50);
        let half_week = now() - Duration::hours(84);
        let score = score_article(0, 0, Some(half_week), now(), &cfg);
        assert_eq!(score.recency_score(), 15);

        let past_window = now() - Duration::days(8);
        let score = score_article(0, 0, Some(past_window), now(), &cfg);
        assert_eq!(score.recency_score(), 0);
    }

    #[test]
    fn test_recency_depends_on_period() {
        let published = now() - Duration::hours(36);
        let day = score_article(0, 0, Some(published), now(), &config(1, 1).with_period(Period::Day));
        let month =
            score_article(0, 0, Some(published), now(), &config(1, 1).with_period(Period::Month));
        assert_eq!(day.recency_score(), 0);
        assert!(month.recency_score() > 25);
    }

    #[test]
    fn test_future_publish_time_counts_as_fresh() {
        let score = score_article(0, 0, Some(now() + Duration::hours(2)), now(), &config(1, 1));
        assert_eq!(score.recency_score(), 30);
    }

    #[test]
    fn test_custom_weights_bound_sub_scores() {
        let weights = Weights::new(50, 20, 30).unwrap();
        let cfg = ScoringConfig::new(Period::Day, weights, Ceilings::new(10, 10).unwrap());
        let score = score_article(10, 10, Some(now()), now(), &cfg);
        assert_eq!(score.views_score(), 50);
        assert_eq!(score.comments_score(), 20);
        assert_eq!(score.total(), 100);
    }

    #[test]
    fn test_weights_must_sum_to_hundred() {
        assert_eq!(Weights::new(40, 30, 20), Err(ScoringConfigError::WeightSum(90)));
        assert_eq!(
            Weights::new(u32::MAX, 1, 0),
            Err(ScoringConfigError::WeightSum(u32::MAX))
        );
        assert!(Weights::new(100, 0, 0).is_ok());
    }

    #[test]
    fn test_zero_ceiling_rejected() {
        assert_eq!(Ceilings::new(0, 10), Err(ScoringConfigError::ZeroCeiling("views")));
        assert_eq!(Ceilings::new(10, 0), Err(ScoringConfigError::ZeroCeiling("comments")));
    }

    #[test]
    fn test_observed_ceilings() {
        let articles = vec![snapshot("a", 120, 4), snapshot("b", 80, 9), snapshot("c", -3, -1)];
        let ceilings = observed_ceilings(&articles);
        assert_eq!(ceilings.views(), 120);
        assert_eq!(ceilings.comments(), 9);
    }

    #[test]
    fn test_observed_ceilings_of_empty_set_is_one() {
        let ceilings = observed_ceilings(&Vec::<ArticleSnapshot>::new());
        assert_eq!(ceilings.views(), 1);
        assert_eq!(ceilings.comments(), 1);
    }

    #[test]
    fn test_score_all_preserves_order() {
        let articles = vec![snapshot("a", 1, 0), snapshot("b", 999, 0)];
        let scored = score_all(&articles, now(), &config(1000, 50));
        assert_eq!(scored.len(), 2);
        assert_eq!(scored[0].article.id, "a");
        assert_eq!(scored[1].article.id, "b");
        assert!(scored[1].score.total() > scored[0].score.total());
    }

    #[test]
    fn test_ceiling_mode_parse() {
        assert_eq!(CeilingMode::from_str("Fixed"), Some(CeilingMode::Fixed));
        assert_eq!(CeilingMode::from_str("observed"), Some(CeilingMode::Observed));
        assert_eq!(CeilingMode::from_str("max"), None);
    }

    fn period_strategy() -> impl Strategy<Value = Period> {
        prop_oneof![Just(Period::Day), Just(Period::Week), Just(Period::Month)]
    }

    fn age_strategy() -> impl Strategy<Value = Option<i64>> {
        // Age in minutes; negative values are future publish times
        proptest::option::of(-10_000i64..100_000)
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn prop_score_within_bands(
            views in any::<i64>(),
            comments in any::<i64>(),
            age in age_strategy(),
            views_ceiling in 1u64..1_000_000,
            comments_ceiling in 1u64..10_000,
            period in period_strategy(),
        ) {
            let cfg = config(views_ceiling, comments_ceiling).with_period(period);
            let published = age.map(|m| now() - Duration::minutes(m));
            let score = score_article(views, comments, published, now(), &cfg);

            prop_assert!(score.views_score() <= 40);
            prop_assert!(score.comments_score() <= 30);
            prop_assert!(score.recency_score() <= 30);
            prop_assert!(score.total() <= MAX_SCORE);
            prop_assert_eq!(
                score.total(),
                score.views_score() + score.comments_score() + score.recency_score()
            );
        }

        #[test]
        fn prop_views_monotonic(
            views in 0i64..2_000_000,
            extra in 0i64..2_000_000,
            comments in 0i64..1000,
            ceiling in 1u64..1_000_000,
        ) {
            let cfg = config(ceiling, 100);
            let low = score_article(views, comments, Some(now()), now(), &cfg);
            let high = score_article(views + extra, comments, Some(now()), now(), &cfg);
            prop_assert!(high.views_score() >= low.views_score());
            prop_assert_eq!(high.comments_score(), low.comments_score());
            prop_assert_eq!(high.recency_score(), low.recency_score());
        }

        #[test]
        fn prop_comments_monotonic(
            comments in 0i64..20_000,
            extra in 0i64..20_000,
            ceiling in 1u64..10_000,
        ) {
            let cfg = config(1000, ceiling);
            let low = score_article(0, comments, None, now(), &cfg);
            let high = score_article(0, comments + extra, None, now(), &cfg);
            prop_assert!(high.comments_score() >= low.comments_score());
        }

        #[test]
        fn prop_recency_non_increasing_with_age(
            age in 0i64..100_000,
            extra in 0i64..100_000,
            period in period_strategy(),
        ) {
            let cfg = config(1000, 50).with_period(period);
            let newer = score_article(0, 0, Some(now() - Duration::minutes(age)), now(), &cfg);
            let older = score_article(0, 0, Some(now() - Duration::minutes(age + extra)), now(), &cfg);
            prop_assert!(older.recency_score() <= newer.recency_score());
        }

        #[test]
        fn prop_scoring_is_idempotent(
            views in any::<i64>(),
            comments in any::<i64>(),
            age in age_strategy(),
        ) {
            let cfg = config(5000, 80);
            let published = age.map(|m| now() - Duration::minutes(m));
            let first = score_article(views, comments, published, now(), &cfg);
            let second = score_article(views, comments, published, now(), &cfg);
            prop_assert_eq!(first, second);
        }
    }
}
