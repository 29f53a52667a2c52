//! Trending engine
//!
//! Pure scoring and ranking of articles by estimated reader interest.
//! Nothing in this module performs I/O; callers supply the candidate set
//! and the evaluation instant.
//!
//! # Usage
//!
//! ```ignore
//! use newsdesk::trending::{score_all, rank_articles, RankFilter, ScoringConfig};
//!
//! let scored = score_all(&snapshots, now, &ScoringConfig::default());
//! let ranked = rank_articles(&scored, &RankFilter::all());
//! ```

pub mod clock;
pub mod ranking;
pub mod scoring;

pub use clock::{system_clock, Clock, DynClock, FixedClock, SystemClock};
pub use ranking::{compare_scored, rank_articles, rank_top, within_window, RankFilter};
pub use scoring::{
    observed_ceilings, score_all, score_article, score_snapshot, CeilingMode, Ceilings,
    ScoringConfig, ScoringConfigError, Weights, MAX_SCORE,
};
