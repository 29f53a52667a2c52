//! API layer - HTTP handlers and routing
//!
//! Everything is served under `/api/v1`:
//! - Trending list
//! - Category endpoints
//! - Article endpoints, including breaking news and view counting
//! - Comment endpoints
//! - Health check

pub mod articles;
pub mod categories;
pub mod comments;
pub mod middleware;
pub mod responses;
pub mod trending;

use axum::{
    extract::State,
    http::{header, HeaderValue, Method, StatusCode},
    middleware as axum_middleware,
    routing::{delete, get, post, put},
    Json, Router,
};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

pub use middleware::{ApiError, ApiJson, ApiQuery, AppState, RequestStats};

use responses::HealthResponse;

/// Build the `/api/v1` router
pub fn build_api_router() -> Router<AppState> {
    Router::new()
        .nest("/trending", trending::router())
        .nest("/categories", categories::router())
        .route(
            "/articles",
            get(articles::list_articles_handler).post(articles::create_article_handler),
        )
        .route("/articles/breaking", get(articles::list_breaking_handler))
        .route("/articles/slug/{slug}", get(articles::get_article_by_slug_handler))
        .route(
            "/articles/{id}",
            get(articles::get_article_handler).delete(articles::delete_article_handler),
        )
        .route("/articles/{id}/publish", post(articles::publish_article_handler))
        .route("/articles/{id}/breaking", put(articles::set_breaking_handler))
        .route("/articles/{id}/view", post(articles::record_view_handler))
        .route(
            "/articles/{id}/comments",
            get(comments::get_comments).post(comments::create_comment),
        )
        .route("/comments/{id}", delete(comments::delete_comment))
        .route("/health", get(health))
}

fn cors_layer(cors_origin: &str) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE]);

    if cors_origin.trim() == "*" {
        return cors.allow_origin(AllowOrigin::any());
    }

    match cors_origin.parse::<HeaderValue>() {
        Ok(origin) => cors.allow_origin(origin),
        Err(_) => {
            tracing::warn!("Invalid CORS origin '{}', cross-origin requests disabled", cors_origin);
            cors
        }
    }
}

/// Build the complete router with middleware
pub fn build_router(state: AppState, cors_origin: &str) -> Router {
    Router::new()
        .nest("/api/v1", build_api_router())
        .layer(cors_layer(cors_origin))
        .layer(TraceLayer::new_for_http())
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::request_stats_middleware,
        ))
        .with_state(state)
}

/// GET /api/v1/health
async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let (status, database) = match crate::db::ping(&state.pool).await {
        Ok(()) => (StatusCode::OK, "ok"),
        Err(e) => {
            tracing::warn!("Health check database ping failed: {:#}", e);
            (StatusCode::SERVICE_UNAVAILABLE, "unavailable")
        }
    };

    let stats = &state.request_stats;
    (
        status,
        Json(HealthResponse {
            status: (if status == StatusCode::OK { "ok" } else { "degraded" }).to_string(),
            database: database.to_string(),
            uptime_seconds: stats.uptime_seconds(),
            total_requests: stats.total_requests(),
            avg_response_time_us: stats.avg_response_time_us(),
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::create_cache;
    use crate::config::{CacheConfig, TrendingConfig};
    use crate::db::{create_test_pool, migrations};
    use crate::trending::FixedClock;
    use axum::body::Body;
    use axum::http::Request;
    use chrono::{TimeZone, Utc};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    async fn test_app() -> Router {
        let pool = create_test_pool().await.unwrap();
        migrations::run_migrations(&pool).await.unwrap();
        let clock = Arc::new(FixedClock(Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()));
        let state = AppState::new(
            pool,
            create_cache(&CacheConfig::default()),
            clock,
            TrendingConfig::default(),
        );
        build_router(state, "http://localhost:3000")
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn send_raw(app: &Router, method: Method, uri: &str, body: &'static str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    async fn create_article(app: &Router, title: &str, category_id: Option<&str>) -> Value {
        let mut body = json!({ "title": title, "content": "Body", "publish": true });
        if let Some(id) = category_id {
            body["category_id"] = json!(id);
        }
        let (status, article) = send(app, Method::POST, "/api/v1/articles", Some(body)).await;
        assert_eq!(status, StatusCode::CREATED);
        article
    }

    #[tokio::test]
    async fn test_health() {
        let app = test_app().await;
        let (status, body) = send(&app, Method::GET, "/api/v1/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["database"], "ok");
    }

    #[tokio::test]
    async fn test_category_crud() {
        let app = test_app().await;

        let (status, created) = send(
            &app,
            Method::POST,
            "/api/v1/categories",
            Some(json!({ "name": "World News", "color": "#0055FF" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["slug"], "world-news");
        assert_eq!(created["color"], "#0055ff");

        let (status, _) = send(
            &app,
            Method::POST,
            "/api/v1/categories",
            Some(json!({ "name": "world news" })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, list) = send(&app, Method::GET, "/api/v1/categories", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(list["categories"].as_array().unwrap().len(), 2);

        let (status, updated) = send(
            &app,
            Method::PUT,
            "/api/v1/categories/world-news",
            Some(json!({ "color": "#abc" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["color"], "#abc");

        let (status, _) = send(&app, Method::DELETE, "/api/v1/categories/world-news", None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, body) = send(&app, Method::GET, "/api/v1/categories/world-news", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_default_category_cannot_be_deleted() {
        let app = test_app().await;
        let (status, body) = send(&app, Method::DELETE, "/api/v1/categories/general", None).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], "CONFLICT");
    }

    #[tokio::test]
    async fn test_article_lifecycle() {
        let app = test_app().await;

        let (status, draft) = send(
            &app,
            Method::POST,
            "/api/v1/articles",
            Some(json!({ "title": "Flood Warning", "content": "Rivers rising" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(draft["status"], "draft");
        let id = draft["id"].as_str().unwrap().to_string();

        let (_, listed) = send(&app, Method::GET, "/api/v1/articles", None).await;
        assert_eq!(listed["total"], 0);

        let (status, published) =
            send(&app, Method::POST, &format!("/api/v1/articles/{}/publish", id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(published["status"], "published");

        let (_, listed) = send(&app, Method::GET, "/api/v1/articles?page=1&page_size=5", None).await;
        assert_eq!(listed["total"], 1);
        assert_eq!(listed["page_size"], 5);

        let (status, by_slug) =
            send(&app, Method::GET, "/api/v1/articles/slug/flood-warning", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(by_slug["id"], id.as_str());

        let (status, _) =
            send(&app, Method::POST, &format!("/api/v1/articles/{}/view", id), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (_, fetched) = send(&app, Method::GET, &format!("/api/v1/articles/{}", id), None).await;
        assert_eq!(fetched["views_count"], 1);

        let (status, _) =
            send(&app, Method::DELETE, &format!("/api/v1/articles/{}", id), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = send(&app, Method::GET, &format!("/api/v1/articles/{}", id), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_article_validation_error() {
        let app = test_app().await;
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/v1/articles",
            Some(json!({ "title": "", "content": "x" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_article_empty_slug_rejected() {
        let app = test_app().await;
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/v1/articles",
            Some(json!({ "title": "Hello", "content": "b", "slug": "" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_malformed_json_body_is_json_error() {
        let app = test_app().await;

        let (status, body) =
            send_raw(&app, Method::POST, "/api/v1/articles", "{\"title\": \"Hello\",").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert!(body["error"]["message"].as_str().is_some());

        let (status, body) =
            send_raw(&app, Method::POST, "/api/v1/categories", "{\"name\": 42}").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_breaking_news() {
        let app = test_app().await;
        let article = create_article(&app, "Market Crash", None).await;
        let id = article["id"].as_str().unwrap();

        let (status, flagged) = send(
            &app,
            Method::PUT,
            &format!("/api/v1/articles/{}/breaking", id),
            Some(json!({ "breaking": true })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(flagged["is_breaking"], true);

        let (status, breaking) = send(&app, Method::GET, "/api/v1/articles/breaking", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(breaking["articles"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_comments() {
        let app = test_app().await;
        let article = create_article(&app, "Debate Tonight", None).await;
        let id = article["id"].as_str().unwrap();
        let uri = format!("/api/v1/articles/{}/comments", id);

        let (status, comment) = send(
            &app,
            Method::POST,
            &uri,
            Some(json!({ "author_name": "Sam", "body": "Looking forward to it" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, too_long) = send(
            &app,
            Method::POST,
            &uri,
            Some(json!({ "author_name": "Sam", "body": "x".repeat(2001) })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(too_long["error"]["code"], "VALIDATION_ERROR");

        let (_, listed) = send(&app, Method::GET, &uri, None).await;
        assert_eq!(listed["total"], 1);

        let comment_id = comment["id"].as_str().unwrap();
        let (status, _) = send(
            &app,
            Method::DELETE,
            &format!("/api/v1/comments/{}", comment_id),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = send(&app, Method::GET, "/api/v1/articles/missing/comments", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_trending_endpoint() {
        let app = test_app().await;
        let (_, sport) = send(
            &app,
            Method::POST,
            "/api/v1/categories",
            Some(json!({ "name": "Sport" })),
        )
        .await;
        let sport_id = sport["id"].as_str().unwrap();

        let first = create_article(&app, "Cup Final", Some(sport_id)).await;
        create_article(&app, "Tax Reform", None).await;
        let first_id = first["id"].as_str().unwrap();
        send(&app, Method::POST, &format!("/api/v1/articles/{}/view", first_id), None).await;

        let (status, all) = send(&app, Method::GET, "/api/v1/trending?period=day", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(all["period"], "day");
        let articles = all["articles"].as_array().unwrap();
        assert_eq!(articles.len(), 2);
        assert_eq!(articles[0]["rank"], 1);
        assert_eq!(articles[0]["id"], first_id);
        assert!(articles[0]["trendScore"].as_u64().unwrap() <= 100);
        assert!(articles[0]["scoreBreakdown"]["recencyScore"].is_number());

        let (status, sport_only) =
            send(&app, Method::GET, "/api/v1/trending?category=sport&limit=5", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(sport_only["category"], "sport");
        assert_eq!(sport_only["articles"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_trending_errors() {
        let app = test_app().await;

        let (status, body) = send(&app, Method::GET, "/api/v1/trending?period=year", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

        let (status, body) =
            send(&app, Method::GET, "/api/v1/trending?category=unknown", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");

        let (status, body) = send(&app, Method::GET, "/api/v1/trending?limit=abc", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

        let (status, body) =
            send(&app, Method::GET, "/api/v1/articles?page=first", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[test]
    fn test_cors_layer_accepts_wildcard_and_bad_origin() {
        let _ = cors_layer("*");
        let _ = cors_layer("http://localhost:3000");
        let _ = cors_layer("bad\norigin");
    }
}
