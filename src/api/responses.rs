//! Shared API response types

use serde::{Deserialize, Serialize};

use crate::models::{Article, PagedResult};

/// Paginated article list response
#[derive(Debug, Serialize, Deserialize)]
pub struct PaginatedArticlesResponse {
    pub articles: Vec<Article>,
    pub total: i64,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u32,
}

impl From<PagedResult<Article>> for PaginatedArticlesResponse {
    fn from(result: PagedResult<Article>) -> Self {
        let total_pages = result.total_pages();
        Self {
            articles: result.items,
            total: result.total,
            page: result.page,
            page_size: result.per_page,
            total_pages,
        }
    }
}

/// Plain list wrapper, e.g. `{ "articles": [...] }`
#[derive(Debug, Serialize, Deserialize)]
pub struct ArticlesResponse {
    pub articles: Vec<Article>,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub database: String,
    pub uptime_seconds: u64,
    pub total_requests: u64,
    pub avg_response_time_us: f64,
}
