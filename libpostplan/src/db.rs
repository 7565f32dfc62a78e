//! Database operations for Postplan
//!
//! Sqlite-backed store for posts and the mirrored connections list. Post
//! updates are optimistic: every committed write bumps the row's version,
//! and a write against a stale version fails with `VersionConflict` so the
//! caller can re-read and retry. Reads are plain snapshots and never block
//! writers.

use async_trait::async_trait;
use chrono::FixedOffset;
use sqlx::sqlite::SqlitePool;
use sqlx::Row;
use std::path::Path;

use crate::calendar::day_bounds;
use crate::connections::ConnectionsProvider;
use crate::error::{PostplanError, Result, StoreError};
use crate::types::{Connection, Post, PostStatus};

#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Create a new database connection
    pub async fn new(db_path: &str) -> Result<Self> {
        // Expand path and create parent directories
        let expanded_path = shellexpand::tilde(db_path).to_string();
        let path = Path::new(&expanded_path);

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(StoreError::Io)?;
        }

        // Forward slashes work on both Windows and Unix in sqlite URLs;
        // mode=rwc creates the file when missing.
        let db_url = format!("sqlite://{}?mode=rwc", expanded_path.replace('\\', "/"));

        let pool = SqlitePool::connect(&db_url)
            .await
            .map_err(StoreError::Sqlx)?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(StoreError::Migration)?;

        Ok(Self { pool })
    }

    /// Insert a freshly created post. Fails with `DuplicateId` when the id
    /// is already present.
    pub async fn insert_post(&self, post: &Post) -> Result<()> {
        let media_urls =
            serde_json::to_string(&post.media_urls).unwrap_or_else(|_| "[]".to_string());

        sqlx::query(
            r#"
            INSERT INTO posts (id, owner_id, platform, content, media_urls,
                               scheduled_at, status, failure_reason, version,
                               created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&post.id)
        .bind(&post.owner_id)
        .bind(&post.platform)
        .bind(&post.content)
        .bind(media_urls)
        .bind(post.scheduled_at)
        .bind(post.status.as_str())
        .bind(&post.failure_reason)
        .bind(post.version)
        .bind(post.created_at)
        .bind(post.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if matches!(&e, sqlx::Error::Database(db) if db.is_unique_violation()) {
                PostplanError::DuplicateId(post.id.clone())
            } else {
                PostplanError::Store(StoreError::Sqlx(e))
            }
        })?;

        Ok(())
    }

    /// Get a post by ID, scoped to its owner
    pub async fn get_post(&self, owner_id: &str, post_id: &str) -> Result<Option<Post>> {
        let row = sqlx::query(
            r#"
            SELECT id, owner_id, platform, content, media_urls, scheduled_at,
                   status, failure_reason, version, created_at, updated_at
            FROM posts WHERE id = ? AND owner_id = ?
            "#,
        )
        .bind(post_id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::Sqlx)?;

        Ok(row.map(|r| row_to_post(&r)))
    }

    /// All of an owner's posts, ascending by scheduled time with drafts
    /// slotted at their creation time (queue and calendar order).
    pub async fn list_posts_by_owner(&self, owner_id: &str) -> Result<Vec<Post>> {
        let rows = sqlx::query(
            r#"
            SELECT id, owner_id, platform, content, media_urls, scheduled_at,
                   status, failure_reason, version, created_at, updated_at
            FROM posts
            WHERE owner_id = ?
            ORDER BY COALESCE(scheduled_at, created_at) ASC, created_at ASC
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::Sqlx)?;

        Ok(rows.iter().map(row_to_post).collect())
    }

    /// Posts whose effective instant falls on one local calendar day.
    pub async fn list_posts_by_day(
        &self,
        owner_id: &str,
        year: i32,
        month: u32,
        day: u32,
        offset: FixedOffset,
    ) -> Result<Vec<Post>> {
        let (start, end) = day_bounds(year, month, day, offset)?;

        let rows = sqlx::query(
            r#"
            SELECT id, owner_id, platform, content, media_urls, scheduled_at,
                   status, failure_reason, version, created_at, updated_at
            FROM posts
            WHERE owner_id = ?
              AND COALESCE(scheduled_at, created_at) >= ?
              AND COALESCE(scheduled_at, created_at) < ?
            ORDER BY COALESCE(scheduled_at, created_at) ASC, created_at ASC
            "#,
        )
        .bind(owner_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::Sqlx)?;

        Ok(rows.iter().map(row_to_post).collect())
    }

    /// Persist a mutated post. The write only lands when the stored version
    /// still matches the one the post was read at; otherwise the post was
    /// changed concurrently and `VersionConflict` is returned.
    pub async fn update_post(&self, post: &Post) -> Result<Post> {
        let media_urls =
            serde_json::to_string(&post.media_urls).unwrap_or_else(|_| "[]".to_string());

        let result = sqlx::query(
            r#"
            UPDATE posts
            SET content = ?, media_urls = ?, scheduled_at = ?, status = ?,
                failure_reason = ?, version = version + 1, updated_at = ?
            WHERE id = ? AND owner_id = ? AND version = ?
            "#,
        )
        .bind(&post.content)
        .bind(media_urls)
        .bind(post.scheduled_at)
        .bind(post.status.as_str())
        .bind(&post.failure_reason)
        .bind(post.updated_at)
        .bind(&post.id)
        .bind(&post.owner_id)
        .bind(post.version)
        .execute(&self.pool)
        .await
        .map_err(StoreError::Sqlx)?;

        if result.rows_affected() == 0 {
            // Distinguish a missing row from a stale version
            return match self.get_post(&post.owner_id, &post.id).await? {
                None => Err(PostplanError::NotFound(post.id.clone())),
                Some(_) => Err(StoreError::VersionConflict(post.id.clone()).into()),
            };
        }

        let mut saved = post.clone();
        saved.version += 1;
        Ok(saved)
    }

    /// Hard-delete a post, scoped to its owner
    pub async fn remove_post(&self, owner_id: &str, post_id: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM posts WHERE id = ? AND owner_id = ?")
            .bind(post_id)
            .bind(owner_id)
            .execute(&self.pool)
            .await
            .map_err(StoreError::Sqlx)?;

        if result.rows_affected() == 0 {
            return Err(PostplanError::NotFound(post_id.to_string()));
        }
        Ok(())
    }

    /// Post counts per status for an owner (queue statistics)
    pub async fn status_counts(&self, owner_id: &str) -> Result<Vec<(String, i64)>> {
        let rows = sqlx::query(
            r#"
            SELECT status, COUNT(*) AS count
            FROM posts WHERE owner_id = ?
            GROUP BY status ORDER BY status
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::Sqlx)?;

        Ok(rows
            .iter()
            .map(|r| (r.get("status"), r.get("count")))
            .collect())
    }

    /// Add or refresh a mirrored connection record
    pub async fn upsert_connection(&self, connection: &Connection) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO connections (owner_id, platform, platform_username,
                                     profile_picture_url, updated_at)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT (owner_id, platform) DO UPDATE SET
                platform_username = excluded.platform_username,
                profile_picture_url = excluded.profile_picture_url,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&connection.owner_id)
        .bind(&connection.platform)
        .bind(&connection.platform_username)
        .bind(&connection.profile_picture_url)
        .bind(connection.updated_at)
        .execute(&self.pool)
        .await
        .map_err(StoreError::Sqlx)?;

        Ok(())
    }

    /// Drop a mirrored connection record
    pub async fn remove_connection(&self, owner_id: &str, platform: &str) -> Result<()> {
        sqlx::query("DELETE FROM connections WHERE owner_id = ? AND platform = ?")
            .bind(owner_id)
            .bind(platform)
            .execute(&self.pool)
            .await
            .map_err(StoreError::Sqlx)?;

        Ok(())
    }

    /// List an owner's mirrored connections
    pub async fn get_connections(&self, owner_id: &str) -> Result<Vec<Connection>> {
        let rows = sqlx::query(
            r#"
            SELECT owner_id, platform, platform_username, profile_picture_url, updated_at
            FROM connections WHERE owner_id = ? ORDER BY platform
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::Sqlx)?;

        Ok(rows
            .iter()
            .map(|r| Connection {
                owner_id: r.get("owner_id"),
                platform: r.get("platform"),
                platform_username: r.get("platform_username"),
                profile_picture_url: r.get("profile_picture_url"),
                updated_at: r.get("updated_at"),
            })
            .collect())
    }
}

#[async_trait]
impl ConnectionsProvider for Database {
    async fn list_connections(&self, owner_id: &str) -> Result<Vec<Connection>> {
        self.get_connections(owner_id).await
    }
}

fn row_to_post(r: &sqlx::sqlite::SqliteRow) -> Post {
    Post {
        id: r.get("id"),
        owner_id: r.get("owner_id"),
        platform: r.get("platform"),
        content: r.get("content"),
        media_urls: serde_json::from_str(&r.get::<String, _>("media_urls")).unwrap_or_default(),
        scheduled_at: r.get("scheduled_at"),
        status: PostStatus::parse(&r.get::<String, _>("status")).unwrap_or(PostStatus::Draft),
        failure_reason: r.get("failure_reason"),
        version: r.get("version"),
        created_at: r.get("created_at"),
        updated_at: r.get("updated_at"),
    }
}
