//! Category API endpoints
//!
//! - GET    /api/v1/categories        - List categories
//! - POST   /api/v1/categories        - Create a category
//! - GET    /api/v1/categories/{slug} - Get a category
//! - PUT    /api/v1/categories/{slug} - Update a category
//! - DELETE /api/v1/categories/{slug} - Delete an empty category

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Serialize;

use crate::api::middleware::{ApiError, ApiJson, AppState};
use crate::models::{Category, CreateCategoryInput, UpdateCategoryInput};

/// Response for the category list
#[derive(Debug, Serialize)]
pub struct CategoryListResponse {
    pub categories: Vec<Category>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_categories).post(create_category))
        .route(
            "/{slug}",
            get(get_category).put(update_category).delete(delete_category),
        )
}

/// GET /api/v1/categories
async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<CategoryListResponse>, ApiError> {
    let categories = state.category_service.list().await?;
    Ok(Json(CategoryListResponse { categories }))
}

/// POST /api/v1/categories
async fn create_category(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<CreateCategoryInput>,
) -> Result<(StatusCode, Json<Category>), ApiError> {
    let category = state.category_service.create(input).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// GET /api/v1/categories/{slug}
async fn get_category(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Category>, ApiError> {
    state
        .category_service
        .get_by_slug(&slug)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("Category not found: {}", slug)))
}

/// PUT /api/v1/categories/{slug}
async fn update_category(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    ApiJson(input): ApiJson<UpdateCategoryInput>,
) -> Result<Json<Category>, ApiError> {
    let category = state.category_service.update(&slug, input).await?;
    Ok(Json(category))
}

/// DELETE /api/v1/categories/{slug}
async fn delete_category(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.category_service.delete(&slug).await?;
    Ok(StatusCode::NO_CONTENT)
}
