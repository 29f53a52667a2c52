//! Trending API endpoint
//!
//! - GET /api/v1/trending?period=&category=&limit= - Ranked trending articles

use axum::{
    extract::State,
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::api::middleware::{ApiError, ApiQuery, AppState};
use crate::models::{Period, TrendingList};
use crate::services::TrendingQuery;

/// Query parameters for the trending list
#[derive(Debug, Deserialize)]
pub struct TrendingParams {
    /// `day`, `week` or `month`
    pub period: Option<String>,
    /// Category slug
    pub category: Option<String>,
    pub limit: Option<usize>,
}

impl TrendingParams {
    fn into_query(self) -> Result<TrendingQuery, ApiError> {
        let period = match self.period.as_deref() {
            Some(raw) => Some(Period::from_str(raw).ok_or_else(|| {
                ApiError::validation_error(format!(
                    "Invalid period '{}': expected day, week or month",
                    raw
                ))
            })?),
            None => None,
        };

        let category = self
            .category
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());

        Ok(TrendingQuery {
            period,
            category,
            limit: self.limit,
        })
    }
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(get_trending))
}

/// GET /api/v1/trending
async fn get_trending(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<TrendingParams>,
) -> Result<Json<TrendingList>, ApiError> {
    let query = params.into_query()?;
    let list = state.trending_service.trending(query).await?;
    Ok(Json(list))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_into_query() {
        let query = TrendingParams {
            period: Some("Day".into()),
            category: Some(" sport ".into()),
            limit: Some(5),
        }
        .into_query()
        .unwrap();
        assert_eq!(query.period, Some(Period::Day));
        assert_eq!(query.category.as_deref(), Some("sport"));
        assert_eq!(query.limit, Some(5));
    }

    #[test]
    fn test_empty_category_means_all() {
        let query = TrendingParams {
            period: None,
            category: Some("".into()),
            limit: None,
        }
        .into_query()
        .unwrap();
        assert!(query.category.is_none());
        assert!(query.period.is_none());
    }

    #[test]
    fn test_invalid_period_rejected() {
        let err = TrendingParams {
            period: Some("year".into()),
            category: None,
            limit: None,
        }
        .into_query()
        .unwrap_err();
        assert_eq!(err.error.code, "VALIDATION_ERROR");
    }
}
