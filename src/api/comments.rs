//! Comment API endpoints
//!
//! - GET    /api/v1/articles/{id}/comments - Comments on an article
//! - POST   /api/v1/articles/{id}/comments - Post a comment
//! - DELETE /api/v1/comments/{id}          - Delete a comment

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;

use crate::api::middleware::{ApiError, ApiJson, AppState};
use crate::models::{Comment, CreateCommentInput};

#[derive(Debug, Serialize)]
pub struct CommentListResponse {
    pub comments: Vec<Comment>,
    pub total: usize,
}

/// GET /api/v1/articles/{id}/comments
pub async fn get_comments(
    State(state): State<AppState>,
    Path(article_id): Path<String>,
) -> Result<Json<CommentListResponse>, ApiError> {
    let comments = state.comment_service.list_for_article(&article_id).await?;
    let total = comments.len();
    Ok(Json(CommentListResponse { comments, total }))
}

/// POST /api/v1/articles/{id}/comments
pub async fn create_comment(
    State(state): State<AppState>,
    Path(article_id): Path<String>,
    ApiJson(input): ApiJson<CreateCommentInput>,
) -> Result<(StatusCode, Json<Comment>), ApiError> {
    let comment = state.comment_service.create(&article_id, input).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

/// DELETE /api/v1/comments/{id}
pub async fn delete_comment(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.comment_service.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
