//! Procedure contracts: input validation, the two authorization tiers, and
//! the calls into the storage ports.
//!
//! Each procedure is a plain async function over the core trait objects so
//! the contracts are testable without HTTP plumbing; `handlers` adapts them
//! to actix-web.

use chrono::Utc;
use quill_core::error::{AppError, Result};
use quill_core::models::{BlogPost, BlogPostPatch, NewBlogPost};
use quill_core::policy::Caller;
use quill_core::traits::BlogStore;
use serde::Deserialize;

const NOT_FOUND_MESSAGE: &str = "Blog post not found";
const MAX_TITLE_LEN: usize = 255;
const MAX_SLUG_LEN: usize = 255;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListInput {
    pub include_unpublished: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchInput {
    pub query: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostInput {
    pub title: String,
    pub slug: String,
    pub content: String,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub tags: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub series_name: Option<String>,
    #[serde(default)]
    pub series_order: Option<i64>,
    /// 0 = draft (the default), 1 = published
    #[serde(default)]
    pub published: i64,
}

impl CreatePostInput {
    fn validate(&self) -> Result<()> {
        validate_length("title", &self.title, MAX_TITLE_LEN)?;
        validate_length("slug", &self.slug, MAX_SLUG_LEN)?;
        if self.content.is_empty() {
            return Err(AppError::Validation("content must not be empty".into()));
        }
        validate_published(self.published)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePostInput {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub content: Option<String>,
    pub excerpt: Option<String>,
    pub cover_image: Option<String>,
    pub tags: Option<String>,
    pub category: Option<String>,
    pub series_name: Option<String>,
    pub series_order: Option<i64>,
    pub published: Option<i64>,
}

impl UpdatePostInput {
    fn validate(&self) -> Result<()> {
        if let Some(title) = &self.title {
            validate_length("title", title, MAX_TITLE_LEN)?;
        }
        if let Some(slug) = &self.slug {
            validate_length("slug", slug, MAX_SLUG_LEN)?;
        }
        if let Some(content) = &self.content {
            if content.is_empty() {
                return Err(AppError::Validation("content must not be empty".into()));
            }
        }
        if let Some(published) = self.published {
            validate_published(published)?;
        }
        Ok(())
    }

    fn into_patch(self) -> BlogPostPatch {
        BlogPostPatch {
            title: self.title,
            slug: self.slug,
            content: self.content,
            excerpt: self.excerpt.map(Some),
            cover_image: self.cover_image.map(Some),
            tags: self.tags.map(Some),
            category: self.category.map(Some),
            series_name: self.series_name.map(Some),
            series_order: self.series_order.map(Some),
            published: self.published,
            published_at: None,
        }
    }
}

fn validate_length(field: &str, value: &str, max: usize) -> Result<()> {
    // The limit is in characters, not bytes, so multibyte text is not
    // penalized for its encoding.
    let length = value.chars().count();
    if length == 0 || length > max {
        return Err(AppError::Validation(format!(
            "{field} must be between 1 and {max} characters"
        )));
    }
    Ok(())
}

fn validate_published(published: i64) -> Result<()> {
    if !(0..=1).contains(&published) {
        return Err(AppError::Validation("published must be 0 or 1".into()));
    }
    Ok(())
}

/// blog.list — the opt-in draft flag is honored only for admins.
pub async fn list_posts(
    store: &dyn BlogStore,
    caller: &Caller,
    input: ListInput,
) -> Result<Vec<BlogPost>> {
    let include_unpublished =
        caller.can_view_unpublished() && input.include_unpublished.unwrap_or(false);
    store.all_posts(include_unpublished).await
}

/// blog.getBySlug — admins implicitly see drafts. A successful read of a
/// *published* post bumps its view counter; admin draft previews and failed
/// lookups never do. The slug path is deliberately the only view-counting
/// read in the system.
pub async fn get_by_slug(store: &dyn BlogStore, caller: &Caller, slug: &str) -> Result<BlogPost> {
    let post = store
        .post_by_slug(slug, caller.can_view_unpublished())
        .await?
        .ok_or_else(|| AppError::NotFound(NOT_FOUND_MESSAGE.into()))?;

    if post.published == 1 {
        store.increment_views(post.id).await?;
    }

    Ok(post)
}

/// blog.search — empty result is never an error.
pub async fn search(
    store: &dyn BlogStore,
    caller: &Caller,
    input: SearchInput,
) -> Result<Vec<BlogPost>> {
    store
        .search_posts(&input.query, caller.can_view_unpublished())
        .await
}

/// blog.getByCategory
pub async fn by_category(
    store: &dyn BlogStore,
    caller: &Caller,
    category: &str,
) -> Result<Vec<BlogPost>> {
    store
        .posts_by_category(category, caller.can_view_unpublished())
        .await
}

/// blog.getBySeries — ordered by series position, not recency.
pub async fn by_series(
    store: &dyn BlogStore,
    caller: &Caller,
    series_name: &str,
) -> Result<Vec<BlogPost>> {
    store
        .posts_by_series(series_name, caller.can_view_unpublished())
        .await
}

/// blog.getCategories — unrestricted; derived from published posts only.
pub async fn categories(store: &dyn BlogStore) -> Result<Vec<String>> {
    store.categories().await
}

/// blog.getSeries — unrestricted; derived from published posts only.
pub async fn series(store: &dyn BlogStore) -> Result<Vec<String>> {
    store.series().await
}

/// blog.create — admin only. `published_at` is stamped at creation iff the
/// post is born published.
pub async fn create_post(
    store: &dyn BlogStore,
    caller: &Caller,
    input: CreatePostInput,
) -> Result<i64> {
    let author = caller.require_admin()?;
    input.validate()?;

    let published_at = (input.published == 1).then(Utc::now);
    store
        .create_post(NewBlogPost {
            title: input.title,
            slug: input.slug,
            content: input.content,
            excerpt: input.excerpt,
            cover_image: input.cover_image,
            tags: input.tags,
            category: input.category,
            series_name: input.series_name,
            series_order: input.series_order,
            published: input.published,
            published_at,
            author_id: Some(author.id),
        })
        .await
}

/// blog.update — admin only. Publishing a post whose `published_at` is still
/// null stamps it now; this is the only post-creation write path for that
/// column and it never overwrites an existing stamp, so an
/// unpublish/republish cycle keeps the original date.
pub async fn update_post(
    store: &dyn BlogStore,
    caller: &Caller,
    id: i64,
    input: UpdatePostInput,
) -> Result<()> {
    caller.require_admin()?;
    input.validate()?;

    let mut patch = input.into_patch();
    if patch.published == Some(1) {
        if let Some(existing) = store.post_by_id(id).await? {
            if existing.published_at.is_none() {
                patch.published_at = Some(Some(Utc::now()));
            }
        }
    }

    store.update_post(id, patch).await
}

/// blog.delete — admin only, unconditional, idempotent.
pub async fn delete_post(store: &dyn BlogStore, caller: &Caller, id: i64) -> Result<()> {
    caller.require_admin()?;
    store.delete_post(id).await
}

/// blog.getById — admin only; ignores publish state entirely.
pub async fn get_by_id(store: &dyn BlogStore, caller: &Caller, id: i64) -> Result<BlogPost> {
    caller.require_admin()?;
    store
        .post_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(NOT_FOUND_MESSAGE.into()))
}
