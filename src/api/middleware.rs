//! API middleware and shared handler types
//!
//! Contains:
//! - `AppState`, the state shared by every handler
//! - `ApiError`, the JSON error body and its status mapping
//! - Conversions from service errors into `ApiError`
//! - `ApiJson` / `ApiQuery` extractors that reject with `ApiError`
//! - Request statistics middleware

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        FromRequest, FromRequestParts, Request, State,
    },
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::cache::Cache;
use crate::config::TrendingConfig;
use crate::db::repositories::{SqlxArticleRepository, SqlxCategoryRepository, SqlxCommentRepository};
use crate::db::DbPool;
use crate::trending::DynClock;
use crate::services::{
    ArticleService, ArticleServiceError, CategoryService, CategoryServiceError, CommentService,
    CommentServiceError, TrendingService, TrendingServiceError,
};

// ============================================================================
// Request Statistics
// ============================================================================

/// Lock-free request counters reported by the health endpoint
pub struct RequestStats {
    total_requests: AtomicU64,
    total_response_time_us: AtomicU64,
    start_time: Instant,
}

impl RequestStats {
    pub fn new() -> Self {
        Self {
            total_requests: AtomicU64::new(0),
            total_response_time_us: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Record one request and how long it took
    pub fn record(&self, duration_us: u64) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        self.total_response_time_us.fetch_add(duration_us, Ordering::Relaxed);
    }

    pub fn total_requests(&self) -> u64 {
        self.total_requests.load(Ordering::Relaxed)
    }

    /// Mean response time in microseconds
    pub fn avg_response_time_us(&self) -> f64 {
        let total = self.total_requests.load(Ordering::Relaxed);
        if total == 0 {
            return 0.0;
        }
        self.total_response_time_us.load(Ordering::Relaxed) as f64 / total as f64
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

impl Default for RequestStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Record the duration of every request
pub async fn request_stats_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let response = next.run(request).await;
    state
        .request_stats
        .record(start.elapsed().as_micros() as u64);
    response
}

// ============================================================================
// Application State
// ============================================================================

/// State shared by all handlers
#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub category_service: Arc<CategoryService>,
    pub article_service: Arc<ArticleService>,
    pub comment_service: Arc<CommentService>,
    pub trending_service: Arc<TrendingService>,
    pub request_stats: Arc<RequestStats>,
}

impl AppState {
    /// Wire repositories and services over one pool, cache and clock
    pub fn new(pool: DbPool, cache: Arc<Cache>, clock: DynClock, trending: TrendingConfig) -> Self {
        let categories = SqlxCategoryRepository::boxed(pool.clone());
        let articles = SqlxArticleRepository::boxed(pool.clone());
        let comments = SqlxCommentRepository::boxed(pool.clone());

        Self {
            category_service: Arc::new(CategoryService::new(categories.clone(), cache.clone())),
            article_service: Arc::new(ArticleService::new(
                articles.clone(),
                categories.clone(),
                cache.clone(),
                clock.clone(),
            )),
            comment_service: Arc::new(CommentService::new(comments, articles.clone(), clock.clone())),
            trending_service: Arc::new(TrendingService::new(
                articles, categories, cache, clock, trending,
            )),
            request_stats: Arc::new(RequestStats::new()),
            pool,
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Error response for API errors
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ApiErrorDetail {
                code: code.into(),
                message: message.into(),
                details: None,
            },
        }
    }

    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self {
            error: ApiErrorDetail {
                code: code.into(),
                message: message.into(),
                details: Some(details),
            },
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new("NOT_FOUND", message)
    }

    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new("CONFLICT", message)
    }

    /// Internal failures are logged in full; clients only see a generic message
    pub fn internal_error(message: impl Into<String>) -> Self {
        let message = message.into();
        tracing::error!("Internal error: {}", message);
        Self::new("INTERNAL_ERROR", "Internal server error")
    }

    pub fn status(&self) -> StatusCode {
        match self.error.code.as_str() {
            "NOT_FOUND" => StatusCode::NOT_FOUND,
            "VALIDATION_ERROR" => StatusCode::BAD_REQUEST,
            "CONFLICT" => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}

// ============================================================================
// Extractors
// ============================================================================

/// JSON body extractor whose failures render as `VALIDATION_ERROR`
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Query string extractor whose failures render as `VALIDATION_ERROR`
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::validation_error(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::validation_error(rejection.body_text())
    }
}

impl From<CategoryServiceError> for ApiError {
    fn from(err: CategoryServiceError) -> Self {
        match err {
            CategoryServiceError::NotFound(slug) => {
                ApiError::not_found(format!("Category not found: {}", slug))
            }
            CategoryServiceError::DuplicateName(_) | CategoryServiceError::DuplicateSlug(_) => {
                ApiError::conflict(err.to_string())
            }
            CategoryServiceError::InUse { ref slug, count } => ApiError::with_details(
                "CONFLICT",
                err.to_string(),
                serde_json::json!({ "slug": slug, "articles": count }),
            ),
            CategoryServiceError::CannotDeleteDefault => ApiError::conflict(err.to_string()),
            CategoryServiceError::ValidationError(msg) => ApiError::validation_error(msg),
            CategoryServiceError::InternalError(e) => ApiError::internal_error(format!("{:#}", e)),
        }
    }
}

impl From<ArticleServiceError> for ApiError {
    fn from(err: ArticleServiceError) -> Self {
        match err {
            ArticleServiceError::NotFound(id) => {
                ApiError::not_found(format!("Article not found: {}", id))
            }
            ArticleServiceError::CategoryNotFound(slug) => {
                ApiError::not_found(format!("Category not found: {}", slug))
            }
            ArticleServiceError::DuplicateSlug(_) => ApiError::conflict(err.to_string()),
            ArticleServiceError::ValidationError(msg) => ApiError::validation_error(msg),
            ArticleServiceError::InternalError(e) => ApiError::internal_error(format!("{:#}", e)),
        }
    }
}

impl From<CommentServiceError> for ApiError {
    fn from(err: CommentServiceError) -> Self {
        match err {
            CommentServiceError::ArticleNotFound(id) => {
                ApiError::not_found(format!("Article not found: {}", id))
            }
            CommentServiceError::NotFound(id) => {
                ApiError::not_found(format!("Comment not found: {}", id))
            }
            CommentServiceError::ValidationError(msg) => ApiError::validation_error(msg),
            CommentServiceError::InternalError(e) => ApiError::internal_error(format!("{:#}", e)),
        }
    }
}

impl From<TrendingServiceError> for ApiError {
    fn from(err: TrendingServiceError) -> Self {
        match err {
            TrendingServiceError::CategoryNotFound(slug) => {
                ApiError::not_found(format!("Category not found: {}", slug))
            }
            TrendingServiceError::InvalidConfig(e) => ApiError::internal_error(e.to_string()),
            TrendingServiceError::InternalError(e) => ApiError::internal_error(format!("{:#}", e)),
        }
    }
}
