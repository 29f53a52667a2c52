//! Category service
//!
//! Implements business logic for category management:
//! - Create, read, update, delete categories
//! - Name and slug uniqueness validation
//! - Slug generation from name
//! - Colour validation
//!
//! A category that still has articles cannot be deleted, and the default
//! category can never be deleted.

use crate::cache::{Cache, CacheLayer};
use crate::db::repositories::CategoryRepository;
use crate::models::{
    Category, CreateCategoryInput, UpdateCategoryInput, DEFAULT_CATEGORY_COLOR,
};
use crate::services::trending::invalidate_trending_cache;
use anyhow::Context;
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;
use std::time::Duration;

/// Default cache TTL for categories (1 hour)
const CATEGORY_CACHE_TTL_SECS: u64 = 3600;

const CACHE_KEY_CATEGORY_BY_SLUG: &str = "category:slug:";
const CACHE_KEY_CATEGORY_LIST: &str = "category:list";

const MAX_NAME_LENGTH: usize = 100;

static SLUG_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[\p{Ll}\p{Lo}\p{Nd}]+(?:-[\p{Ll}\p{Lo}\p{Nd}]+)*$").expect("valid slug regex")
});

static SLUG_CHAR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\p{Ll}\p{Lo}\p{Nd}]$").expect("valid slug char regex"));

static COLOR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^#(?:[0-9a-fA-F]{3}|[0-9a-fA-F]{6})$").expect("valid colour regex")
});

/// Error types for category service operations
#[derive(Debug, thiserror::Error)]
pub enum CategoryServiceError {
    #[error("Category name already exists: {0}")]
    DuplicateName(String),

    #[error("Category slug already exists: {0}")]
    DuplicateSlug(String),

    #[error("Category not found: {0}")]
    NotFound(String),

    #[error("Cannot delete the default category")]
    CannotDeleteDefault,

    /// Category still has articles filed under it
    #[error("Category {slug} still has {count} article(s)")]
    InUse { slug: String, count: i64 },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Category service for managing news sections
pub struct CategoryService {
    repo: Arc<dyn CategoryRepository>,
    cache: Arc<Cache>,
    cache_ttl: Duration,
}

impl CategoryService {
    pub fn new(repo: Arc<dyn CategoryRepository>, cache: Arc<Cache>) -> Self {
        Self::with_cache_ttl(repo, cache, Duration::from_secs(CATEGORY_CACHE_TTL_SECS))
    }

    pub fn with_cache_ttl(
        repo: Arc<dyn CategoryRepository>,
        cache: Arc<Cache>,
        cache_ttl: Duration,
    ) -> Self {
        Self {
            repo,
            cache,
            cache_ttl,
        }
    }

    /// Create a new category
    ///
    /// # Errors
    /// - `ValidationError` for an empty name, malformed slug or colour
    /// - `DuplicateName` / `DuplicateSlug` when either is taken
    pub async fn create(&self, input: CreateCategoryInput) -> Result<Category, CategoryServiceError> {
        let name = validate_name(&input.name)?;

        let slug = match input.slug {
            Some(slug) => validate_slug(&slug)?,
            None => {
                let generated = generate_slug(&name);
                if generated.is_empty() {
                    return Err(CategoryServiceError::ValidationError(
                        "Cannot derive a slug from the category name".to_string(),
                    ));
                }
                validate_slug(&generated)?
            }
        };

        let color = match input.color {
            Some(color) => validate_color(&color)?,
            None => DEFAULT_CATEGORY_COLOR.to_string(),
        };

        if self.repo.exists_by_name(&name).await.context("Failed to check name uniqueness")? {
            return Err(CategoryServiceError::DuplicateName(name));
        }
        if self.repo.exists_by_slug(&slug).await.context("Failed to check slug uniqueness")? {
            return Err(CategoryServiceError::DuplicateSlug(slug));
        }

        let created = self
            .repo
            .create(&Category::new(slug, name, color))
            .await
            .context("Failed to create category")?;

        tracing::info!(slug = %created.slug, "Category created");
        self.invalidate_cache().await;

        Ok(created)
    }

    /// Get category by slug
    pub async fn get_by_slug(&self, slug: &str) -> Result<Option<Category>, CategoryServiceError> {
        let cache_key = format!("{}{}", CACHE_KEY_CATEGORY_BY_SLUG, slug);
        if let Some(category) = self.cache.get::<Category>(&cache_key).await.ok().flatten() {
            return Ok(Some(category));
        }

        let category = self.repo.get_by_slug(slug).await.context("Failed to get category by slug")?;

        if let Some(ref cat) = category {
            let _ = self.cache.set(&cache_key, cat, self.cache_ttl).await;
        }

        Ok(category)
    }

    /// Get category by ID
    pub async fn get_by_id(&self, id: &str) -> Result<Option<Category>, CategoryServiceError> {
        self.repo
            .get_by_id(id)
            .await
            .context("Failed to get category by ID")
            .map_err(Into::into)
    }

    /// List all categories ordered by name
    pub async fn list(&self) -> Result<Vec<Category>, CategoryServiceError> {
        if let Some(list) = self.cache.get::<Vec<Category>>(CACHE_KEY_CATEGORY_LIST).await.ok().flatten() {
            tracing::debug!("Category list served from cache");
            return Ok(list);
        }

        let list = self.repo.list().await.context("Failed to list categories")?;
        let _ = self.cache.set(CACHE_KEY_CATEGORY_LIST, &list, self.cache_ttl).await;

        Ok(list)
    }

    /// Update a category identified by its current slug
    pub async fn update(
        &self,
        slug: &str,
        input: UpdateCategoryInput,
    ) -> Result<Category, CategoryServiceError> {
        let mut category = self
            .repo
            .get_by_slug(slug)
            .await
            .context("Failed to get category")?
            .ok_or_else(|| CategoryServiceError::NotFound(slug.to_string()))?;

        if !input.has_changes() {
            return Ok(category);
        }

        if let Some(ref new_name) = input.name {
            let new_name = validate_name(new_name)?;
            if !new_name.eq_ignore_ascii_case(&category.name)
                && self.repo.exists_by_name(&new_name).await.context("Failed to check name uniqueness")?
            {
                return Err(CategoryServiceError::DuplicateName(new_name));
            }
            category.name = new_name;
        }

        if let Some(ref new_slug) = input.slug {
            let new_slug = validate_slug(new_slug)?;
            if new_slug != category.slug {
                if category.is_default() {
                    return Err(CategoryServiceError::ValidationError(
                        "The default category slug cannot be changed".to_string(),
                    ));
                }
                if self.repo.exists_by_slug(&new_slug).await.context("Failed to check slug uniqueness")? {
                    return Err(CategoryServiceError::DuplicateSlug(new_slug));
                }
                category.slug = new_slug;
            }
        }

        if let Some(ref new_color) = input.color {
            category.color = validate_color(new_color)?;
        }

        let updated = self.repo.update(&category).await.context("Failed to update category")?;
        self.invalidate_cache().await;

        Ok(updated)
    }

    /// Delete a category
    ///
    /// # Errors
    /// - `NotFound` if the category doesn't exist
    /// - `CannotDeleteDefault` for the default category
    /// - `InUse` while articles are still filed under it
    pub async fn delete(&self, slug: &str) -> Result<(), CategoryServiceError> {
        let category = self
            .repo
            .get_by_slug(slug)
            .await
            .context("Failed to get category")?
            .ok_or_else(|| CategoryServiceError::NotFound(slug.to_string()))?;

        if category.is_default() {
            return Err(CategoryServiceError::CannotDeleteDefault);
        }

        let count = self
            .repo
            .count_articles(&category.id)
            .await
            .context("Failed to count category articles")?;
        if count > 0 {
            return Err(CategoryServiceError::InUse {
                slug: category.slug,
                count,
            });
        }

        self.repo.delete(&category.id).await.context("Failed to delete category")?;
        tracing::info!(slug = %category.slug, "Category deleted");
        self.invalidate_cache().await;

        Ok(())
    }

    /// Category and trending entries both embed category data
    async fn invalidate_cache(&self) {
        let _ = self.cache.delete_pattern(&format!("{}*", CACHE_KEY_CATEGORY_BY_SLUG)).await;
        let _ = self.cache.delete(CACHE_KEY_CATEGORY_LIST).await;
        invalidate_trending_cache(&self.cache).await;
    }
}

fn validate_name(name: &str) -> Result<String, CategoryServiceError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(CategoryServiceError::ValidationError(
            "Category name cannot be empty".to_string(),
        ));
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(CategoryServiceError::ValidationError(format!(
            "Category name must be at most {} characters",
            MAX_NAME_LENGTH
        )));
    }
    Ok(name.to_string())
}

/// Whether `slug` is lowercase letters or digits in hyphen-separated runs
pub fn is_valid_slug(slug: &str) -> bool {
    SLUG_RE.is_match(slug)
}

fn is_slug_char(c: char) -> bool {
    let mut buf = [0u8; 4];
    SLUG_CHAR_RE.is_match(c.encode_utf8(&mut buf))
}

fn validate_slug(slug: &str) -> Result<String, CategoryServiceError> {
    let slug = slug.trim();
    if !is_valid_slug(slug) {
        return Err(CategoryServiceError::ValidationError(format!(
            "Invalid slug '{}': use lowercase letters, digits and single hyphens",
            slug
        )));
    }
    Ok(slug.to_string())
}

fn validate_color(color: &str) -> Result<String, CategoryServiceError> {
    let color = color.trim();
    if !COLOR_RE.is_match(color) {
        return Err(CategoryServiceError::ValidationError(format!(
            "Invalid colour '{}': expected #RGB or #RRGGBB",
            color
        )));
    }
    Ok(color.to_ascii_lowercase())
}

/// Generate a URL-friendly slug from a name
///
/// Lowercases, turns every character a slug may not contain into a hyphen,
/// collapses runs of hyphens and keeps non-ASCII letters as they are. The
/// result is either empty or accepted by [`is_valid_slug`].
pub fn generate_slug(name: &str) -> String {
    let mut result = String::new();
    let mut prev_hyphen = false;

    for c in name.to_lowercase().chars() {
        if is_slug_char(c) {
            result.push(c);
            prev_hyphen = false;
        } else if !prev_hyphen && !result.is_empty() {
            result.push('-');
            prev_hyphen = true;
        }
    }

    result.trim_end_matches('-').to_string()
}
