//! # Domain Models
//!
//! These structs represent the core entities of Quill: a minimal user record
//! refreshed from an external auth provider, and the blog post itself.
//! Wire names are camelCase to stay compatible with the existing clients.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Authorization role attached to a [`User`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }

    /// Lenient parse for values coming back from the store; anything
    /// unrecognized is treated as the unprivileged role.
    pub fn parse(value: &str) -> Role {
        match value {
            "admin" => Role::Admin,
            _ => Role::User,
        }
    }
}

/// An identity record, created or refreshed on every successful login.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    /// Stable identifier assigned by the external auth provider
    pub open_id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub login_method: Option<String>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_signed_in: DateTime<Utc>,
}

/// A single blog post.
///
/// `published` is kept as a two-valued integer rather than a boolean so the
/// stored representation stays bit-exact with the existing data.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPost {
    pub id: i64,
    pub title: String,
    /// URL-safe identifier used for public lookup in place of the numeric id
    pub slug: String,
    pub content: String,
    pub excerpt: Option<String>,
    pub cover_image: Option<String>,
    /// Free-text, comma-separated tags
    pub tags: Option<String>,
    pub category: Option<String>,
    pub series_name: Option<String>,
    /// Position of the post within its series
    pub series_order: Option<i64>,
    /// 0 = draft, 1 = published
    pub published: i64,
    /// Set once, on first publish; never cleared or overwritten afterwards
    pub published_at: Option<DateTime<Utc>>,
    pub author_id: Option<i64>,
    pub view_count: i64,
    pub created_at: DateTime<Utc>,
}

/// Field set for inserting a new post. Ids and counters are store-generated.
#[derive(Debug, Clone)]
pub struct NewBlogPost {
    pub title: String,
    pub slug: String,
    pub content: String,
    pub excerpt: Option<String>,
    pub cover_image: Option<String>,
    pub tags: Option<String>,
    pub category: Option<String>,
    pub series_name: Option<String>,
    pub series_order: Option<i64>,
    pub published: i64,
    pub published_at: Option<DateTime<Utc>>,
    pub author_id: Option<i64>,
}

/// Partial update for a [`BlogPost`].
///
/// The outer `Option` means "leave unchanged if absent". Nullable columns use
/// `Option<Option<T>>` so an explicit null is distinguishable from absence.
#[derive(Debug, Clone, Default)]
pub struct BlogPostPatch {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub content: Option<String>,
    pub excerpt: Option<Option<String>>,
    pub cover_image: Option<Option<String>>,
    pub tags: Option<Option<String>>,
    pub category: Option<Option<String>>,
    pub series_name: Option<Option<String>>,
    pub series_order: Option<Option<i64>>,
    pub published: Option<i64>,
    pub published_at: Option<Option<DateTime<Utc>>>,
}

impl BlogPostPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.slug.is_none()
            && self.content.is_none()
            && self.excerpt.is_none()
            && self.cover_image.is_none()
            && self.tags.is_none()
            && self.category.is_none()
            && self.series_name.is_none()
            && self.series_order.is_none()
            && self.published.is_none()
            && self.published_at.is_none()
    }
}

/// Identity assertion merged into the user table on login.
///
/// Same absent/explicit-null convention as [`BlogPostPatch`]: absent fields
/// leave an existing row untouched, `Some(None)` writes null.
#[derive(Debug, Clone, Default)]
pub struct UserUpsert {
    pub open_id: String,
    pub name: Option<Option<String>>,
    pub email: Option<Option<String>>,
    pub login_method: Option<Option<String>>,
    pub role: Option<Role>,
    pub last_signed_in: Option<DateTime<Utc>>,
}

impl UserUpsert {
    pub fn new(open_id: impl Into<String>) -> Self {
        Self {
            open_id: open_id.into(),
            ..Self::default()
        }
    }
}
