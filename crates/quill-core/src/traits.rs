//! # Core Traits (Ports)
//!
//! Any storage or auth plugin must implement these traits to be used by the
//! binary. The procedure layer only ever talks to trait objects, so tests can
//! substitute an in-memory store without process-global state.

use crate::error::Result;
use crate::models::{BlogPost, BlogPostPatch, NewBlogPost, User, UserUpsert};
use async_trait::async_trait;

/// Persistence contract for the user/identity table.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Creates or refreshes the row keyed by `open_id`. Best-effort: with no
    /// database configured this logs and returns `Ok(())`.
    async fn upsert_user(&self, user: UserUpsert) -> Result<()>;

    /// Exact-match lookup by the external identity id.
    async fn get_user_by_open_id(&self, open_id: &str) -> Result<Option<User>>;
}

/// Persistence contract for the blog post table.
///
/// Reads degrade to empty results when no database is configured; the three
/// hard mutations (`create_post`, `update_post`, `delete_post`) fail with
/// `AppError::StoreUnavailable` instead, since silently dropping a write the
/// caller believes succeeded is unacceptable.
#[async_trait]
pub trait BlogStore: Send + Sync {
    /// All posts, newest first. Drafts only when `include_unpublished`.
    async fn all_posts(&self, include_unpublished: bool) -> Result<Vec<BlogPost>>;

    /// Exact slug match, same publish filter as [`Self::all_posts`].
    async fn post_by_slug(&self, slug: &str, include_unpublished: bool)
        -> Result<Option<BlogPost>>;

    /// Exact id match. Never publish-filtered; callers gate access themselves.
    async fn post_by_id(&self, id: i64) -> Result<Option<BlogPost>>;

    /// Inserts a new post and returns the generated id.
    async fn create_post(&self, post: NewBlogPost) -> Result<i64>;

    /// Applies a partial patch. An empty patch is a no-op success.
    async fn update_post(&self, id: i64, patch: BlogPostPatch) -> Result<()>;

    /// Unconditional hard delete by id.
    async fn delete_post(&self, id: i64) -> Result<()>;

    /// Atomic `view_count + 1`. Best-effort: no-ops without a database.
    async fn increment_views(&self, id: i64) -> Result<()>;

    /// Case-insensitive substring match on title OR content OR tags,
    /// newest first.
    async fn search_posts(&self, query: &str, include_unpublished: bool)
        -> Result<Vec<BlogPost>>;

    /// Exact category match, newest first.
    async fn posts_by_category(
        &self,
        category: &str,
        include_unpublished: bool,
    ) -> Result<Vec<BlogPost>>;

    /// Exact series match, ordered by `series_order` ascending so a series
    /// reads in authored sequence.
    async fn posts_by_series(
        &self,
        series_name: &str,
        include_unpublished: bool,
    ) -> Result<Vec<BlogPost>>;

    /// Distinct non-null categories drawn only from published posts.
    async fn categories(&self) -> Result<Vec<String>>;

    /// Distinct non-null series names drawn only from published posts.
    async fn series(&self) -> Result<Vec<String>>;
}

/// Session-token contract between the API layer and the auth plugin.
pub trait IdentityProvider: Send + Sync {
    /// Mints a session token binding the given external identity id.
    fn issue(&self, open_id: &str) -> String;

    /// Returns the embedded identity id if the token is authentic.
    fn verify(&self, token: &str) -> Option<String>;
}
