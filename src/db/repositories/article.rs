//! Article repository
//!
//! Database operations for articles.
//!
//! This module provides:
//! - `ArticleRepository` trait defining the interface for article data access
//! - `SqlxArticleRepository` implementing the trait for SQLite
//!
//! Besides plain CRUD it produces the `ArticleSnapshot` read projection used
//! by trending: published articles joined with their category and with the
//! comment count aggregated from the comments table.

use crate::db::DbPool;
use crate::models::{Article, ArticleSnapshot, ArticleStatus, CategoryRef};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::Row;
use std::sync::Arc;

/// Article listing filter
#[derive(Debug, Clone, Default)]
pub struct ArticleFilter {
    /// Only articles in this category
    pub category_id: Option<String>,
    /// Only published articles
    pub published_only: bool,
}

/// Article repository trait
#[async_trait]
pub trait ArticleRepository: Send + Sync {
    /// Insert an article
    async fn create(&self, article: &Article) -> Result<Article>;

    /// Get article by ID
    async fn get_by_id(&self, id: &str) -> Result<Option<Article>>;

    /// Get article by slug
    async fn get_by_slug(&self, slug: &str) -> Result<Option<Article>>;

    /// List articles, newest first
    async fn list(&self, filter: &ArticleFilter, offset: i64, limit: i64) -> Result<Vec<Article>>;

    /// Count articles matching a filter
    async fn count(&self, filter: &ArticleFilter) -> Result<i64>;

    /// Mark an article published at `at`
    async fn publish(&self, id: &str, at: DateTime<Utc>) -> Result<Option<Article>>;

    /// Set or clear the breaking-news flag
    async fn set_breaking(&self, id: &str, breaking: bool, at: DateTime<Utc>) -> Result<Option<Article>>;

    /// Published breaking-news articles, most recently published first
    async fn list_breaking(&self, limit: i64) -> Result<Vec<Article>>;

    /// Add one view, returning whether the article exists
    async fn increment_views(&self, id: &str) -> Result<bool>;

    /// Delete an article, returning whether a row was removed
    async fn delete(&self, id: &str) -> Result<bool>;

    /// Check if a slug already exists
    async fn exists_by_slug(&self, slug: &str) -> Result<bool>;

    /// Published articles eligible for trending, optionally limited to those
    /// published at or after `published_after`
    async fn list_trending_candidates(
        &self,
        published_after: Option<DateTime<Utc>>,
    ) -> Result<Vec<ArticleSnapshot>>;
}

/// SQLx-based article repository implementation
pub struct SqlxArticleRepository {
    pool: DbPool,
}

impl SqlxArticleRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DbPool) -> Arc<dyn ArticleRepository> {
        Arc::new(Self::new(pool))
    }
}

const ARTICLE_COLUMNS: &str = "id, slug, title, summary, content, category_id, status, is_breaking, views_count, published_at, created_at, updated_at";

fn where_clause(filter: &ArticleFilter) -> String {
    let mut conditions = Vec::new();
    if filter.category_id.is_some() {
        conditions.push("category_id = ?");
    }
    if filter.published_only {
        conditions.push("status = 'published' AND published_at IS NOT NULL");
    }
    if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    }
}

#[async_trait]
impl ArticleRepository for SqlxArticleRepository {
    async fn create(&self, article: &Article) -> Result<Article> {
        sqlx::query(
            r#"
            INSERT INTO articles (id, slug, title, summary, content, category_id, status, is_breaking, views_count, published_at, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&article.id)
        .bind(&article.slug)
        .bind(&article.title)
        .bind(&article.summary)
        .bind(&article.content)
        .bind(&article.category_id)
        .bind(article.status.as_str())
        .bind(article.is_breaking)
        .bind(article.views_count)
        .bind(article.published_at)
        .bind(article.created_at)
        .bind(article.updated_at)
        .execute(&self.pool)
        .await
        .context("Failed to create article")?;

        Ok(article.clone())
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Article>> {
        let row = sqlx::query(&format!("SELECT {} FROM articles WHERE id = ?", ARTICLE_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to get article by ID")?;

        row.as_ref().map(row_to_article).transpose()
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Article>> {
        let row = sqlx::query(&format!("SELECT {} FROM articles WHERE slug = ?", ARTICLE_COLUMNS))
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to get article by slug")?;

        row.as_ref().map(row_to_article).transpose()
    }

    async fn list(&self, filter: &ArticleFilter, offset: i64, limit: i64) -> Result<Vec<Article>> {
        let sql = format!(
            "SELECT {} FROM articles {} ORDER BY COALESCE(published_at, created_at) DESC, id ASC LIMIT ? OFFSET ?",
            ARTICLE_COLUMNS,
            where_clause(filter)
        );

        let mut query = sqlx::query(&sql);
        if let Some(category_id) = &filter.category_id {
            query = query.bind(category_id);
        }
        let rows = query
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .context("Failed to list articles")?;

        rows.iter().map(row_to_article).collect()
    }

    async fn count(&self, filter: &ArticleFilter) -> Result<i64> {
        let sql = format!("SELECT COUNT(*) FROM articles {}", where_clause(filter));

        let mut query = sqlx::query_scalar::<_, i64>(&sql);
        if let Some(category_id) = &filter.category_id {
            query = query.bind(category_id);
        }
        let count = query
            .fetch_one(&self.pool)
            .await
            .context("Failed to count articles")?;
        Ok(count)
    }

    async fn publish(&self, id: &str, at: DateTime<Utc>) -> Result<Option<Article>> {
        let result = sqlx::query(
            "UPDATE articles SET status = 'published', published_at = COALESCE(published_at, ?), updated_at = ? WHERE id = ?",
        )
        .bind(at)
        .bind(at)
        .bind(id)
        .execute(&self.pool)
        .await
        .context("Failed to publish article")?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_by_id(id).await
    }

    async fn set_breaking(&self, id: &str, breaking: bool, at: DateTime<Utc>) -> Result<Option<Article>> {
        let result = sqlx::query("UPDATE articles SET is_breaking = ?, updated_at = ? WHERE id = ?")
            .bind(breaking)
            .bind(at)
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to update breaking flag")?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_by_id(id).await
    }

    async fn list_breaking(&self, limit: i64) -> Result<Vec<Article>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {} FROM articles
            WHERE is_breaking = 1 AND status = 'published' AND published_at IS NOT NULL
            ORDER BY published_at DESC, id ASC
            LIMIT ?
            "#,
            ARTICLE_COLUMNS
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list breaking news")?;

        rows.iter().map(row_to_article).collect()
    }

    async fn increment_views(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("UPDATE articles SET views_count = views_count + 1 WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to increment view count")?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM articles WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete article")?;
        Ok(result.rows_affected() > 0)
    }

    async fn exists_by_slug(&self, slug: &str) -> Result<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM articles WHERE slug = ?")
            .bind(slug)
            .fetch_one(&self.pool)
            .await
            .context("Failed to check article slug")?;
        Ok(count > 0)
    }

    async fn list_trending_candidates(
        &self,
        published_after: Option<DateTime<Utc>>,
    ) -> Result<Vec<ArticleSnapshot>> {
        let window = if published_after.is_some() {
            "AND a.published_at >= ?"
        } else {
            ""
        };
        let sql = format!(
            r#"
            SELECT a.id, a.slug, a.title, a.views_count, a.published_at,
                   c.id AS category_id, c.name AS category_name,
                   c.slug AS category_slug, c.color AS category_color,
                   (SELECT COUNT(*) FROM comments m WHERE m.article_id = a.id) AS comments_count
            FROM articles a
            INNER JOIN categories c ON c.id = a.category_id
            WHERE a.status = 'published' AND a.published_at IS NOT NULL {}
            "#,
            window
        );

        let mut query = sqlx::query(&sql);
        if let Some(after) = published_after {
            query = query.bind(after);
        }
        let rows = query
            .fetch_all(&self.pool)
            .await
            .context("Failed to load trending candidates")?;

        rows.iter().map(row_to_snapshot).collect()
    }
}

fn row_to_article(row: &sqlx::sqlite::SqliteRow) -> Result<Article> {
    let status_str: String = row.try_get("status")?;
    let status = ArticleStatus::from_str(&status_str)
        .ok_or_else(|| anyhow::anyhow!("Invalid article status: {}", status_str))?;

    Ok(Article {
        id: row.try_get("id")?,
        slug: row.try_get("slug")?,
        title: row.try_get("title")?,
        summary: row.try_get("summary")?,
        content: row.try_get("content")?,
        category_id: row.try_get("category_id")?,
        status,
        is_breaking: row.try_get("is_breaking")?,
        views_count: row.try_get("views_count")?,
        published_at: row.try_get("published_at")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn row_to_snapshot(row: &sqlx::sqlite::SqliteRow) -> Result<ArticleSnapshot> {
    Ok(ArticleSnapshot {
        id: row.try_get("id")?,
        slug: row.try_get("slug")?,
        title: row.try_get("title")?,
        views_count: row.try_get("views_count")?,
        comments_count: row.try_get("comments_count")?,
        published_at: row.try_get("published_at")?,
        category: CategoryRef {
            id: row.try_get("category_id")?,
            name: row.try_get("category_name")?,
            slug: row.try_get("category_slug")?,
            color: row.try_get("category_color")?,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{CategoryRepository, SqlxCategoryRepository};
    use crate::db::{create_test_pool, migrations};
    use crate::models::Category;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    async fn setup() -> (DbPool, SqlxArticleRepository, Category) {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        let categories = SqlxCategoryRepository::new(pool.clone());
        let category = categories
            .create(&Category::new("world".into(), "World".into(), "#0055ff".into()))
            .await
            .unwrap();
        (pool.clone(), SqlxArticleRepository::new(pool), category)
    }

    fn draft(slug: &str, category: &Category) -> Article {
        Article::new(
            slug.to_string(),
            format!("Title {}", slug),
            Some("Summary".to_string()),
            "Body".to_string(),
            category.id.clone(),
            now(),
        )
    }

    async fn add_comment(pool: &DbPool, article_id: &str) {
        sqlx::query("INSERT INTO comments (id, article_id, author_name, body) VALUES (?, ?, 'r', 'b')")
            .bind(uuid::Uuid::new_v4().to_string())
            .bind(article_id)
            .execute(pool)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_create_and_get_article() {
        let (_pool, repo, category) = setup().await;
        let article = repo.create(&draft("first", &category)).await.unwrap();

        let by_id = repo.get_by_id(&article.id).await.unwrap().expect("by id");
        assert_eq!(by_id, article);

        let by_slug = repo.get_by_slug("first").await.unwrap().expect("by slug");
        assert_eq!(by_slug.id, article.id);
        assert_eq!(by_slug.status, ArticleStatus::Draft);
    }

    #[tokio::test]
    async fn test_unknown_category_rejected() {
        let (_pool, repo, category) = setup().await;
        let mut article = draft("orphan", &category);
        article.category_id = "missing".to_string();
        assert!(repo.create(&article).await.is_err());
    }

    #[tokio::test]
    async fn test_publish_sets_timestamp_once() {
        let (_pool, repo, category) = setup().await;
        let article = repo.create(&draft("pub", &category)).await.unwrap();

        let published = repo.publish(&article.id, now()).await.unwrap().expect("exists");
        assert_eq!(published.status, ArticleStatus::Published);
        assert_eq!(published.published_at, Some(now()));

        let again = repo
            .publish(&article.id, now() + Duration::hours(5))
            .await
            .unwrap()
            .expect("exists");
        assert_eq!(again.published_at, Some(now()));

        assert!(repo.publish("missing", now()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_and_count_with_filters() {
        let (_pool, repo, category) = setup().await;
        let a = repo.create(&draft("a", &category)).await.unwrap();
        repo.create(&draft("b", &category)).await.unwrap();
        repo.publish(&a.id, now()).await.unwrap();

        let all = ArticleFilter::default();
        assert_eq!(repo.count(&all).await.unwrap(), 2);
        assert_eq!(repo.list(&all, 0, 10).await.unwrap().len(), 2);

        let published = ArticleFilter {
            published_only: true,
            ..Default::default()
        };
        assert_eq!(repo.count(&published).await.unwrap(), 1);
        assert_eq!(repo.list(&published, 0, 10).await.unwrap()[0].id, a.id);

        let other_category = ArticleFilter {
            category_id: Some("nope".to_string()),
            published_only: false,
        };
        assert_eq!(repo.count(&other_category).await.unwrap(), 0);

        assert_eq!(repo.list(&all, 1, 10).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_breaking_flag() {
        let (_pool, repo, category) = setup().await;
        let a = repo.create(&draft("breaking", &category)).await.unwrap();

        let flagged = repo.set_breaking(&a.id, true, now()).await.unwrap().unwrap();
        assert!(flagged.is_breaking);
        // Drafts never show up as breaking news
        assert!(repo.list_breaking(10).await.unwrap().is_empty());

        repo.publish(&a.id, now()).await.unwrap();
        let breaking = repo.list_breaking(10).await.unwrap();
        assert_eq!(breaking.len(), 1);

        repo.set_breaking(&a.id, false, now()).await.unwrap();
        assert!(repo.list_breaking(10).await.unwrap().is_empty());
        assert!(repo.set_breaking("missing", true, now()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_increment_views() {
        let (_pool, repo, category) = setup().await;
        let a = repo.create(&draft("viewed", &category)).await.unwrap();

        assert!(repo.increment_views(&a.id).await.unwrap());
        assert!(repo.increment_views(&a.id).await.unwrap());
        assert!(!repo.increment_views("missing").await.unwrap());

        let reloaded = repo.get_by_id(&a.id).await.unwrap().unwrap();
        assert_eq!(reloaded.views_count, 2);
    }

    #[tokio::test]
    async fn test_delete_article_cascades_comments() {
        let (pool, repo, category) = setup().await;
        let a = repo.create(&draft("gone", &category)).await.unwrap();
        add_comment(&pool, &a.id).await;

        assert!(repo.delete(&a.id).await.unwrap());
        assert!(!repo.delete(&a.id).await.unwrap());

        let comments: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM comments")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(comments, 0);
    }

    #[tokio::test]
    async fn test_trending_candidates_projection() {
        let (pool, repo, category) = setup().await;
        let fresh = repo.create(&draft("fresh", &category)).await.unwrap();
        let old = repo.create(&draft("old", &category)).await.unwrap();
        repo.create(&draft("unpublished", &category)).await.unwrap();

        repo.publish(&fresh.id, now()).await.unwrap();
        repo.publish(&old.id, now() - Duration::days(40)).await.unwrap();
        repo.increment_views(&fresh.id).await.unwrap();
        add_comment(&pool, &fresh.id).await;
        add_comment(&pool, &fresh.id).await;

        let all = repo.list_trending_candidates(None).await.unwrap();
        assert_eq!(all.len(), 2);

        let recent = repo
            .list_trending_candidates(Some(now() - Duration::days(7)))
            .await
            .unwrap();
        assert_eq!(recent.len(), 1);
        let snapshot = &recent[0];
        assert_eq!(snapshot.id, fresh.id);
        assert_eq!(snapshot.views_count, 1);
        assert_eq!(snapshot.comments_count, 2);
        assert_eq!(snapshot.published_at, Some(now()));
        assert_eq!(snapshot.category.slug, "world");
        assert_eq!(snapshot.category.color, "#0055ff");
    }
}
