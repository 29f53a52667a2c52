//! Data models
//!
//! This module contains all data structures used throughout Newsdesk.
//! Models represent:
//! - Database entities (Article, Category, Comment)
//! - Trending read projections and computed scores
//! - API input types

mod article;
mod category;
mod comment;
mod trending;

pub use article::{Article, ArticleStatus, CreateArticleInput, ListParams, PagedResult};
pub use category::{
    Category, CreateCategoryInput, UpdateCategoryInput, DEFAULT_CATEGORY_COLOR,
    DEFAULT_CATEGORY_SLUG,
};
pub use comment::{Comment, CreateCommentInput};
pub use trending::{
    ArticleSnapshot, CategoryRef, Period, RankedArticle, ScoreBreakdown, ScoredArticle,
    TrendScore, TrendingList,
};
