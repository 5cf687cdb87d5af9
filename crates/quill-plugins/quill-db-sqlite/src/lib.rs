//! # quill-db-sqlite
//!
//! SQLite implementation of the `quill-core` storage ports, mapping between
//! the relational schema and the domain models.
//!
//! The connection pool is owned by the store value and created lazily, at
//! most once, on first use. Running without a configured database is a
//! supported mode: reads return empty results, best-effort writes no-op with
//! a warning, and the hard mutations fail with `StoreUnavailable`.

use async_trait::async_trait;
use chrono::Utc;
use log::warn;
use quill_core::error::{AppError, Result};
use quill_core::models::{BlogPost, BlogPostPatch, NewBlogPost, Role, User, UserUpsert};
use quill_core::traits::{BlogStore, UserStore};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{QueryBuilder, Row, Sqlite};
use tokio::sync::OnceCell;

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        open_id TEXT NOT NULL UNIQUE,
        name TEXT,
        email TEXT,
        login_method TEXT,
        role TEXT NOT NULL DEFAULT 'user',
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        last_signed_in TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS blog_posts (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL,
        slug TEXT NOT NULL,
        content TEXT NOT NULL,
        excerpt TEXT,
        cover_image TEXT,
        tags TEXT,
        category TEXT,
        series_name TEXT,
        series_order INTEGER,
        published INTEGER NOT NULL DEFAULT 0,
        published_at TEXT,
        author_id INTEGER,
        view_count INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_blog_posts_slug ON blog_posts (slug)",
];

/// Lazily-connected SQLite store implementing both storage ports.
pub struct SqliteStore {
    database_url: Option<String>,
    owner_open_id: Option<String>,
    pool: OnceCell<Option<SqlitePool>>,
}

impl SqliteStore {
    /// `database_url: None` puts the store in degraded (no-database) mode.
    /// `owner_open_id` is the identity auto-granted admin on first upsert.
    pub fn new(database_url: Option<String>, owner_open_id: Option<String>) -> Self {
        Self {
            database_url,
            owner_open_id,
            pool: OnceCell::new(),
        }
    }

    /// Returns the pool, connecting on first call. The outcome of the first
    /// attempt is cached for the lifetime of the store.
    async fn pool(&self) -> Option<&SqlitePool> {
        self.pool
            .get_or_init(|| async {
                let url = self.database_url.as_deref()?;
                match open_pool(url).await {
                    Ok(pool) => Some(pool),
                    Err(err) => {
                        warn!("failed to connect to database: {err}");
                        None
                    }
                }
            })
            .await
            .as_ref()
    }

    fn is_owner(&self, open_id: &str) -> bool {
        self.owner_open_id.as_deref() == Some(open_id)
    }
}

async fn open_pool(url: &str) -> sqlx::Result<SqlitePool> {
    // An in-memory sqlite database exists per connection; a single
    // connection keeps it alive across queries.
    let max_connections = if url.contains(":memory:") { 1 } else { 5 };
    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect(url)
        .await?;
    for statement in SCHEMA {
        sqlx::query(statement).execute(&pool).await?;
    }
    Ok(pool)
}

fn db_err(err: sqlx::Error) -> AppError {
    AppError::Internal(err.to_string())
}

fn user_from_row(row: &SqliteRow) -> User {
    User {
        id: row.get("id"),
        open_id: row.get("open_id"),
        name: row.get("name"),
        email: row.get("email"),
        login_method: row.get("login_method"),
        role: Role::parse(&row.get::<String, _>("role")),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
        last_signed_in: row.get("last_signed_in"),
    }
}

fn post_from_row(row: &SqliteRow) -> BlogPost {
    BlogPost {
        id: row.get("id"),
        title: row.get("title"),
        slug: row.get("slug"),
        content: row.get("content"),
        excerpt: row.get("excerpt"),
        cover_image: row.get("cover_image"),
        tags: row.get("tags"),
        category: row.get("category"),
        series_name: row.get("series_name"),
        series_order: row.get("series_order"),
        published: row.get("published"),
        published_at: row.get("published_at"),
        author_id: row.get("author_id"),
        view_count: row.get("view_count"),
        created_at: row.get("created_at"),
    }
}

#[async_trait]
impl UserStore for SqliteStore {
    /// Single-statement merge keyed by `open_id`. Only fields present in the
    /// assertion land in the conflict update set, so concurrent refreshes of
    /// the same identity cannot interleave a read-modify-write.
    async fn upsert_user(&self, user: UserUpsert) -> Result<()> {
        if user.open_id.is_empty() {
            return Err(AppError::Validation(
                "user openId is required for upsert".into(),
            ));
        }

        let Some(pool) = self.pool().await else {
            warn!("cannot upsert user: database not available");
            return Ok(());
        };

        let UserUpsert {
            open_id,
            name,
            email,
            login_method,
            role,
            last_signed_in,
        } = user;

        let mut update_set: Vec<&str> = Vec::new();
        if name.is_some() {
            update_set.push("name = excluded.name");
        }
        if email.is_some() {
            update_set.push("email = excluded.email");
        }
        if login_method.is_some() {
            update_set.push("login_method = excluded.login_method");
        }

        let role = match role {
            Some(role) => {
                update_set.push("role = excluded.role");
                role
            }
            None if self.is_owner(&open_id) => {
                update_set.push("role = excluded.role");
                Role::Admin
            }
            None => Role::User,
        };

        if last_signed_in.is_some() || update_set.is_empty() {
            // An assertion carrying nothing else still advances the
            // sign-in timestamp, so every upsert changes something.
            update_set.push("last_signed_in = excluded.last_signed_in");
        }
        update_set.push("updated_at = excluded.updated_at");

        let now = Utc::now();
        let sql = format!(
            "INSERT INTO users (open_id, name, email, login_method, role, \
             created_at, updated_at, last_signed_in) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?) \
             ON CONFLICT(open_id) DO UPDATE SET {}",
            update_set.join(", ")
        );

        sqlx::query(&sql)
            .bind(&open_id)
            .bind(name.flatten())
            .bind(email.flatten())
            .bind(login_method.flatten())
            .bind(role.as_str())
            .bind(now)
            .bind(now)
            .bind(last_signed_in.unwrap_or(now))
            .execute(pool)
            .await
            .map_err(db_err)?;

        Ok(())
    }

    async fn get_user_by_open_id(&self, open_id: &str) -> Result<Option<User>> {
        let Some(pool) = self.pool().await else {
            warn!("cannot get user: database not available");
            return Ok(None);
        };

        let row = sqlx::query("SELECT * FROM users WHERE open_id = ? LIMIT 1")
            .bind(open_id)
            .fetch_optional(pool)
            .await
            .map_err(db_err)?;

        Ok(row.as_ref().map(user_from_row))
    }
}

#[async_trait]
impl BlogStore for SqliteStore {
    async fn all_posts(&self, include_unpublished: bool) -> Result<Vec<BlogPost>> {
        let Some(pool) = self.pool().await else {
            return Ok(Vec::new());
        };

        let sql = if include_unpublished {
            "SELECT * FROM blog_posts ORDER BY created_at DESC"
        } else {
            "SELECT * FROM blog_posts WHERE published = 1 ORDER BY created_at DESC"
        };

        let rows = sqlx::query(sql).fetch_all(pool).await.map_err(db_err)?;
        Ok(rows.iter().map(post_from_row).collect())
    }

    async fn post_by_slug(
        &self,
        slug: &str,
        include_unpublished: bool,
    ) -> Result<Option<BlogPost>> {
        let Some(pool) = self.pool().await else {
            return Ok(None);
        };

        let sql = if include_unpublished {
            "SELECT * FROM blog_posts WHERE slug = ? LIMIT 1"
        } else {
            "SELECT * FROM blog_posts WHERE slug = ? AND published = 1 LIMIT 1"
        };

        let row = sqlx::query(sql)
            .bind(slug)
            .fetch_optional(pool)
            .await
            .map_err(db_err)?;
        Ok(row.as_ref().map(post_from_row))
    }

    async fn post_by_id(&self, id: i64) -> Result<Option<BlogPost>> {
        let Some(pool) = self.pool().await else {
            return Ok(None);
        };

        let row = sqlx::query("SELECT * FROM blog_posts WHERE id = ? LIMIT 1")
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(db_err)?;
        Ok(row.as_ref().map(post_from_row))
    }

    async fn create_post(&self, post: NewBlogPost) -> Result<i64> {
        let Some(pool) = self.pool().await else {
            return Err(AppError::StoreUnavailable);
        };

        let result = sqlx::query(
            "INSERT INTO blog_posts (title, slug, content, excerpt, cover_image, \
             tags, category, series_name, series_order, published, published_at, \
             author_id, view_count, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 0, ?)",
        )
        .bind(&post.title)
        .bind(&post.slug)
        .bind(&post.content)
        .bind(&post.excerpt)
        .bind(&post.cover_image)
        .bind(&post.tags)
        .bind(&post.category)
        .bind(&post.series_name)
        .bind(post.series_order)
        .bind(post.published)
        .bind(post.published_at)
        .bind(post.author_id)
        .bind(Utc::now())
        .execute(pool)
        .await
        .map_err(db_err)?;

        Ok(result.last_insert_rowid())
    }

    async fn update_post(&self, id: i64, patch: BlogPostPatch) -> Result<()> {
        let Some(pool) = self.pool().await else {
            return Err(AppError::StoreUnavailable);
        };

        if patch.is_empty() {
            return Ok(());
        }

        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE blog_posts SET ");
        {
            let mut set = builder.separated(", ");
            if let Some(title) = patch.title {
                set.push("title = ");
                set.push_bind_unseparated(title);
            }
            if let Some(slug) = patch.slug {
                set.push("slug = ");
                set.push_bind_unseparated(slug);
            }
            if let Some(content) = patch.content {
                set.push("content = ");
                set.push_bind_unseparated(content);
            }
            if let Some(excerpt) = patch.excerpt {
                set.push("excerpt = ");
                set.push_bind_unseparated(excerpt);
            }
            if let Some(cover_image) = patch.cover_image {
                set.push("cover_image = ");
                set.push_bind_unseparated(cover_image);
            }
            if let Some(tags) = patch.tags {
                set.push("tags = ");
                set.push_bind_unseparated(tags);
            }
            if let Some(category) = patch.category {
                set.push("category = ");
                set.push_bind_unseparated(category);
            }
            if let Some(series_name) = patch.series_name {
                set.push("series_name = ");
                set.push_bind_unseparated(series_name);
            }
            if let Some(series_order) = patch.series_order {
                set.push("series_order = ");
                set.push_bind_unseparated(series_order);
            }
            if let Some(published) = patch.published {
                set.push("published = ");
                set.push_bind_unseparated(published);
            }
            if let Some(published_at) = patch.published_at {
                set.push("published_at = ");
                set.push_bind_unseparated(published_at);
            }
        }
        builder.push(" WHERE id = ");
        builder.push_bind(id);

        builder.build().execute(pool).await.map_err(db_err)?;
        Ok(())
    }

    async fn delete_post(&self, id: i64) -> Result<()> {
        let Some(pool) = self.pool().await else {
            return Err(AppError::StoreUnavailable);
        };

        sqlx::query("DELETE FROM blog_posts WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn increment_views(&self, id: i64) -> Result<()> {
        let Some(pool) = self.pool().await else {
            return Ok(());
        };

        sqlx::query("UPDATE blog_posts SET view_count = view_count + 1 WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn search_posts(
        &self,
        query: &str,
        include_unpublished: bool,
    ) -> Result<Vec<BlogPost>> {
        let Some(pool) = self.pool().await else {
            return Ok(Vec::new());
        };

        // sqlite LIKE is case-insensitive for ASCII, which matches the
        // intended unanchored substring semantics.
        let pattern = format!("%{query}%");
        let sql = if include_unpublished {
            "SELECT * FROM blog_posts \
             WHERE (title LIKE ? OR content LIKE ? OR tags LIKE ?) \
             ORDER BY created_at DESC"
        } else {
            "SELECT * FROM blog_posts \
             WHERE (title LIKE ? OR content LIKE ? OR tags LIKE ?) \
             AND published = 1 ORDER BY created_at DESC"
        };

        let rows = sqlx::query(sql)
            .bind(&pattern)
            .bind(&pattern)
            .bind(&pattern)
            .fetch_all(pool)
            .await
            .map_err(db_err)?;
        Ok(rows.iter().map(post_from_row).collect())
    }

    async fn posts_by_category(
        &self,
        category: &str,
        include_unpublished: bool,
    ) -> Result<Vec<BlogPost>> {
        let Some(pool) = self.pool().await else {
            return Ok(Vec::new());
        };

        let sql = if include_unpublished {
            "SELECT * FROM blog_posts WHERE category = ? ORDER BY created_at DESC"
        } else {
            "SELECT * FROM blog_posts WHERE category = ? AND published = 1 \
             ORDER BY created_at DESC"
        };

        let rows = sqlx::query(sql)
            .bind(category)
            .fetch_all(pool)
            .await
            .map_err(db_err)?;
        Ok(rows.iter().map(post_from_row).collect())
    }

    async fn posts_by_series(
        &self,
        series_name: &str,
        include_unpublished: bool,
    ) -> Result<Vec<BlogPost>> {
        let Some(pool) = self.pool().await else {
            return Ok(Vec::new());
        };

        // Ordered by series_order, not recency: a series reads front to back.
        let sql = if include_unpublished {
            "SELECT * FROM blog_posts WHERE series_name = ? ORDER BY series_order ASC"
        } else {
            "SELECT * FROM blog_posts WHERE series_name = ? AND published = 1 \
             ORDER BY series_order ASC"
        };

        let rows = sqlx::query(sql)
            .bind(series_name)
            .fetch_all(pool)
            .await
            .map_err(db_err)?;
        Ok(rows.iter().map(post_from_row).collect())
    }

    async fn categories(&self) -> Result<Vec<String>> {
        let Some(pool) = self.pool().await else {
            return Ok(Vec::new());
        };

        let rows = sqlx::query(
            "SELECT DISTINCT category FROM blog_posts \
             WHERE published = 1 AND category IS NOT NULL ORDER BY category",
        )
        .fetch_all(pool)
        .await
        .map_err(db_err)?;

        Ok(rows.iter().map(|row| row.get("category")).collect())
    }

    async fn series(&self) -> Result<Vec<String>> {
        let Some(pool) = self.pool().await else {
            return Ok(Vec::new());
        };

        let rows = sqlx::query(
            "SELECT DISTINCT series_name FROM blog_posts \
             WHERE published = 1 AND series_name IS NOT NULL ORDER BY series_name",
        )
        .fetch_all(pool)
        .await
        .map_err(db_err)?;

        Ok(rows.iter().map(|row| row.get("series_name")).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    const OWNER: &str = "owner-open-id";

    fn store() -> SqliteStore {
        SqliteStore::new(Some("sqlite::memory:".into()), Some(OWNER.into()))
    }

    fn new_post(slug: &str, published: i64) -> NewBlogPost {
        NewBlogPost {
            title: format!("Post {slug}"),
            slug: slug.into(),
            content: "content".into(),
            excerpt: None,
            cover_image: None,
            tags: None,
            category: None,
            series_name: None,
            series_order: None,
            published,
            published_at: (published == 1).then(Utc::now),
            author_id: Some(1),
        }
    }

    #[tokio::test]
    async fn upsert_rejects_empty_open_id() {
        let store = store();
        let err = store.upsert_user(UserUpsert::new("")).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn upsert_merges_only_present_fields() {
        let store = store();
        store
            .upsert_user(UserUpsert {
                open_id: "u1".into(),
                name: Some(Some("First".into())),
                email: Some(Some("first@example.com".into())),
                ..Default::default()
            })
            .await
            .unwrap();

        let created = store.get_user_by_open_id("u1").await.unwrap().unwrap();

        store
            .upsert_user(UserUpsert {
                open_id: "u1".into(),
                login_method: Some(Some("oauth".into())),
                ..Default::default()
            })
            .await
            .unwrap();

        let refreshed = store.get_user_by_open_id("u1").await.unwrap().unwrap();
        assert_eq!(refreshed.id, created.id, "upsert must not create a second row");
        assert_eq!(refreshed.name.as_deref(), Some("First"));
        assert_eq!(refreshed.email.as_deref(), Some("first@example.com"));
        assert_eq!(refreshed.login_method.as_deref(), Some("oauth"));
    }

    #[tokio::test]
    async fn upsert_writes_explicit_null() {
        let store = store();
        store
            .upsert_user(UserUpsert {
                open_id: "u2".into(),
                name: Some(Some("Named".into())),
                ..Default::default()
            })
            .await
            .unwrap();
        store
            .upsert_user(UserUpsert {
                open_id: "u2".into(),
                name: Some(None),
                ..Default::default()
            })
            .await
            .unwrap();

        let user = store.get_user_by_open_id("u2").await.unwrap().unwrap();
        assert_eq!(user.name, None);
    }

    #[tokio::test]
    async fn owner_identity_defaults_to_admin() {
        let store = store();
        store.upsert_user(UserUpsert::new(OWNER)).await.unwrap();
        store.upsert_user(UserUpsert::new("regular")).await.unwrap();
        store
            .upsert_user(UserUpsert {
                open_id: "demoted-owner".into(),
                role: Some(Role::User),
                ..Default::default()
            })
            .await
            .unwrap();

        let owner = store.get_user_by_open_id(OWNER).await.unwrap().unwrap();
        let regular = store.get_user_by_open_id("regular").await.unwrap().unwrap();
        let demoted = store
            .get_user_by_open_id("demoted-owner")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(owner.role, Role::Admin);
        assert_eq!(regular.role, Role::User);
        // An explicit role always wins over the owner default.
        assert_eq!(demoted.role, Role::User);
    }

    #[tokio::test]
    async fn bare_upsert_advances_last_signed_in() {
        let store = store();
        let old = Utc::now() - Duration::days(30);
        store
            .upsert_user(UserUpsert {
                open_id: "u3".into(),
                last_signed_in: Some(old),
                ..Default::default()
            })
            .await
            .unwrap();

        store.upsert_user(UserUpsert::new("u3")).await.unwrap();

        let user = store.get_user_by_open_id("u3").await.unwrap().unwrap();
        assert!(user.last_signed_in > old);
    }

    #[tokio::test]
    async fn missing_database_degrades_per_operation() {
        let store = SqliteStore::new(None, None);

        // Best-effort paths succeed quietly.
        store.upsert_user(UserUpsert::new("u")).await.unwrap();
        store.increment_views(1).await.unwrap();

        // Reads degrade to empty.
        assert!(store.get_user_by_open_id("u").await.unwrap().is_none());
        assert!(store.all_posts(true).await.unwrap().is_empty());
        assert!(store.post_by_slug("s", true).await.unwrap().is_none());
        assert!(store.search_posts("q", false).await.unwrap().is_empty());
        assert!(store.categories().await.unwrap().is_empty());

        // Hard mutations fail loudly.
        assert!(matches!(
            store.create_post(new_post("s", 0)).await.unwrap_err(),
            AppError::StoreUnavailable
        ));
        assert!(matches!(
            store
                .update_post(1, BlogPostPatch {
                    title: Some("t".into()),
                    ..Default::default()
                })
                .await
                .unwrap_err(),
            AppError::StoreUnavailable
        ));
        assert!(matches!(
            store.delete_post(1).await.unwrap_err(),
            AppError::StoreUnavailable
        ));
    }

    #[tokio::test]
    async fn reads_filter_unpublished_unless_asked() {
        let store = store();
        store.create_post(new_post("live", 1)).await.unwrap();
        let draft_id = store.create_post(new_post("draft", 0)).await.unwrap();

        let public = store.all_posts(false).await.unwrap();
        assert_eq!(public.len(), 1);
        assert_eq!(public[0].slug, "live");

        let all = store.all_posts(true).await.unwrap();
        assert_eq!(all.len(), 2);

        assert!(store.post_by_slug("draft", false).await.unwrap().is_none());
        assert!(store.post_by_slug("draft", true).await.unwrap().is_some());

        // Lookup by id never filters on publish state.
        assert!(store.post_by_id(draft_id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn search_matches_title_content_and_tags() {
        let store = store();
        let mut by_title = new_post("by-title", 1);
        by_title.title = "All About React Hooks".into();
        let mut by_content = new_post("by-content", 1);
        by_content.content = "react is discussed here".into();
        let mut by_tags = new_post("by-tags", 1);
        by_tags.tags = Some("rust,react,web".into());
        let mut hidden = new_post("hidden-draft", 0);
        hidden.title = "React draft".into();

        for post in [by_title, by_content, by_tags, hidden] {
            store.create_post(post).await.unwrap();
        }

        let hits = store.search_posts("React", false).await.unwrap();
        let slugs: Vec<_> = hits.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(hits.len(), 3, "case-insensitive match across all three columns");
        assert!(!slugs.contains(&"hidden-draft"));

        let with_drafts = store.search_posts("react", true).await.unwrap();
        assert_eq!(with_drafts.len(), 4);

        assert!(store
            .search_posts("nonexistentquery12345", true)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn series_reads_in_authored_order() {
        let store = store();
        for (slug, order) in [("part-two", 2), ("part-one", 1), ("part-three", 3)] {
            let mut post = new_post(slug, 1);
            post.series_name = Some("Learning Rust".into());
            post.series_order = Some(order);
            store.create_post(post).await.unwrap();
        }

        let posts = store.posts_by_series("Learning Rust", false).await.unwrap();
        let slugs: Vec<_> = posts.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, vec!["part-one", "part-two", "part-three"]);
    }

    #[tokio::test]
    async fn category_is_exact_match() {
        let store = store();
        let mut rust = new_post("rust-post", 1);
        rust.category = Some("rust".into());
        let mut rustacean = new_post("rustacean-post", 1);
        rustacean.category = Some("rustaceans".into());
        store.create_post(rust).await.unwrap();
        store.create_post(rustacean).await.unwrap();

        let posts = store.posts_by_category("rust", false).await.unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].slug, "rust-post");
    }

    #[tokio::test]
    async fn categories_and_series_come_from_published_posts_only() {
        let store = store();
        let mut a = new_post("a", 1);
        a.category = Some("rust".into());
        a.series_name = Some("Series A".into());
        let mut b = new_post("b", 1);
        b.category = Some("rust".into());
        let mut draft = new_post("c", 0);
        draft.category = Some("drafts-only".into());
        draft.series_name = Some("Hidden Series".into());
        let bare = new_post("d", 1);

        for post in [a, b, draft, bare] {
            store.create_post(post).await.unwrap();
        }

        assert_eq!(store.categories().await.unwrap(), vec!["rust".to_string()]);
        assert_eq!(store.series().await.unwrap(), vec!["Series A".to_string()]);
    }

    #[tokio::test]
    async fn view_counter_increments_atomically() {
        let store = store();
        let id = store.create_post(new_post("counted", 1)).await.unwrap();

        store.increment_views(id).await.unwrap();
        store.increment_views(id).await.unwrap();

        let post = store.post_by_id(id).await.unwrap().unwrap();
        assert_eq!(post.view_count, 2);
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let store = store();
        let id = store.create_post(new_post("doomed", 0)).await.unwrap();

        store.delete_post(id).await.unwrap();
        assert!(store.post_by_id(id).await.unwrap().is_none());

        // Deleting an id that is already gone still succeeds.
        store.delete_post(id).await.unwrap();
    }

    #[tokio::test]
    async fn patch_touches_only_supplied_fields() {
        let store = store();
        let mut post = new_post("patched", 0);
        post.excerpt = Some("original excerpt".into());
        let id = store.create_post(post).await.unwrap();

        store
            .update_post(
                id,
                BlogPostPatch {
                    title: Some("Renamed".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let after = store.post_by_id(id).await.unwrap().unwrap();
        assert_eq!(after.title, "Renamed");
        assert_eq!(after.excerpt.as_deref(), Some("original excerpt"));
        assert_eq!(after.content, "content");

        // Explicit null clears a nullable column.
        store
            .update_post(
                id,
                BlogPostPatch {
                    excerpt: Some(None),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let cleared = store.post_by_id(id).await.unwrap().unwrap();
        assert_eq!(cleared.excerpt, None);
    }

    #[tokio::test]
    async fn empty_patch_is_a_noop() {
        let store = store();
        let id = store.create_post(new_post("untouched", 0)).await.unwrap();
        store.update_post(id, BlogPostPatch::default()).await.unwrap();
        let post = store.post_by_id(id).await.unwrap().unwrap();
        assert_eq!(post.title, "Post untouched");
    }
}
