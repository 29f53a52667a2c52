//! Category model
//!
//! Categories group articles into sections of the portal (politics, sport, ...).
//! Each carries a display colour used by the front end for badges.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::CategoryRef;

/// Slug of the category that new articles fall into by default
pub const DEFAULT_CATEGORY_SLUG: &str = "general";

/// Colour assigned when none is given
pub const DEFAULT_CATEGORY_COLOR: &str = "#6b7280";

/// Category entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    /// Unique identifier (UUID)
    pub id: String,
    /// URL-friendly slug
    pub slug: String,
    /// Display name
    pub name: String,
    /// Hex colour, `#RGB` or `#RRGGBB`
    pub color: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Category {
    /// Create a new category with a fresh identifier
    pub fn new(slug: String, name: String, color: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            slug,
            name,
            color,
            created_at: Utc::now(),
        }
    }

    /// Check if this category is the default one
    pub fn is_default(&self) -> bool {
        self.slug == DEFAULT_CATEGORY_SLUG
    }

    /// Reference embedded in article snapshots
    pub fn to_ref(&self) -> CategoryRef {
        CategoryRef {
            id: self.id.clone(),
            name: self.name.clone(),
            slug: self.slug.clone(),
            color: self.color.clone(),
        }
    }
}

/// Input for creating a new category
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateCategoryInput {
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
}

/// Input for updating a category
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCategoryInput {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
}

impl UpdateCategoryInput {
    pub fn has_changes(&self) -> bool {
        self.name.is_some() || self.slug.is_some() || self.color.is_some()
    }
}
