//! Article API endpoints
//!
//! - GET    /api/v1/articles                - Paged list, newest first
//! - POST   /api/v1/articles                - Create an article
//! - GET    /api/v1/articles/breaking       - Breaking news
//! - GET    /api/v1/articles/slug/{slug}    - Article by slug
//! - GET    /api/v1/articles/{id}           - Article by ID
//! - DELETE /api/v1/articles/{id}           - Delete an article
//! - POST   /api/v1/articles/{id}/publish   - Publish
//! - PUT    /api/v1/articles/{id}/breaking  - Set or clear the breaking flag
//! - POST   /api/v1/articles/{id}/view      - Record a view

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::api::middleware::{ApiError, ApiJson, ApiQuery, AppState};
use crate::api::responses::{ArticlesResponse, PaginatedArticlesResponse};
use crate::models::{Article, CreateArticleInput, ListParams};

/// Query parameters for listing articles
#[derive(Debug, Deserialize)]
pub struct ListArticlesQuery {
    /// Category slug
    pub category: Option<String>,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    /// Include unpublished drafts
    #[serde(default)]
    pub include_drafts: bool,
}

fn default_page() -> u32 { 1 }
fn default_page_size() -> u32 { 10 }

#[derive(Debug, Deserialize)]
pub struct BreakingQuery {
    #[serde(default = "default_breaking_limit")]
    pub limit: i64,
}

fn default_breaking_limit() -> i64 { 5 }

#[derive(Debug, Deserialize)]
pub struct SetBreakingRequest {
    pub breaking: bool,
}

/// GET /api/v1/articles
pub async fn list_articles_handler(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ListArticlesQuery>,
) -> Result<Json<PaginatedArticlesResponse>, ApiError> {
    let params = ListParams::new(query.page, query.page_size);
    let category = query.category.as_deref().filter(|c| !c.is_empty());

    let result = state
        .article_service
        .list(category, !query.include_drafts, &params)
        .await?;

    Ok(Json(result.into()))
}

/// POST /api/v1/articles
pub async fn create_article_handler(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<CreateArticleInput>,
) -> Result<(StatusCode, Json<Article>), ApiError> {
    let article = state.article_service.create(input).await?;
    Ok((StatusCode::CREATED, Json(article)))
}

/// GET /api/v1/articles/breaking
pub async fn list_breaking_handler(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<BreakingQuery>,
) -> Result<Json<ArticlesResponse>, ApiError> {
    let articles = state.article_service.list_breaking(query.limit).await?;
    Ok(Json(ArticlesResponse { articles }))
}

/// GET /api/v1/articles/slug/{slug}
pub async fn get_article_by_slug_handler(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Article>, ApiError> {
    state
        .article_service
        .get_by_slug(&slug)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("Article not found: {}", slug)))
}

/// GET /api/v1/articles/{id}
pub async fn get_article_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Article>, ApiError> {
    state
        .article_service
        .get_by_id(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("Article not found: {}", id)))
}

/// DELETE /api/v1/articles/{id}
pub async fn delete_article_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.article_service.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/articles/{id}/publish
pub async fn publish_article_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Article>, ApiError> {
    let article = state.article_service.publish(&id).await?;
    Ok(Json(article))
}

/// PUT /api/v1/articles/{id}/breaking
pub async fn set_breaking_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<SetBreakingRequest>,
) -> Result<Json<Article>, ApiError> {
    let article = state.article_service.set_breaking(&id, req.breaking).await?;
    Ok(Json(article))
}

/// POST /api/v1/articles/{id}/view
pub async fn record_view_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.article_service.record_view(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
