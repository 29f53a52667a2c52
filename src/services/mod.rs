//! Services layer - Business logic
//!
//! Services are responsible for:
//! - Implementing business rules and validation
//! - Coordinating between repositories and cache
//! - Reading the current time through the injected clock

pub mod article;
pub mod category;
pub mod comment;
pub mod trending;

pub use article::{ArticleService, ArticleServiceError};
pub use category::{generate_slug, is_valid_slug, CategoryService, CategoryServiceError};
pub use comment::{CommentService, CommentServiceError};
pub use trending::{invalidate_trending_cache, TrendingQuery, TrendingService, TrendingServiceError};
