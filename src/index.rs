//! Best-effort secondary content index.
//!
//! A per-project SQLite FTS5 database over Markdown artifact content,
//! updated after each successful upsert. This is an at-most-effort
//! collaborator: every failure here is swallowed at the call site and
//! logged at warn — an index problem must never fail a sweep. That policy
//! is deliberate, not an oversight.

use anyhow::Result;
use chrono::Utc;
use sha2::{Digest, Sha256};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;

pub struct ContentIndex {
    pool: SqlitePool,
}

impl ContentIndex {
    /// Open (and if necessary create) the index database.
    pub async fn open(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", db_path.display()))?
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS artifacts (
                path TEXT PRIMARY KEY,
                content_hash TEXT NOT NULL,
                indexed_at INTEGER NOT NULL
            )
            "#,
        )
        .execute(&pool)
        .await?;

        // FTS5 CREATE is not idempotent natively, so we check first
        let fts_exists: bool = sqlx::query_scalar(
            "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type='table' AND name='artifacts_fts'",
        )
        .fetch_one(&pool)
        .await?;

        if !fts_exists {
            sqlx::query(
                r#"
                CREATE VIRTUAL TABLE artifacts_fts USING fts5(
                    path UNINDEXED,
                    content
                )
                "#,
            )
            .execute(&pool)
            .await?;
        }

        Ok(Self { pool })
    }

    /// Index one Markdown artifact. A file whose content hash is unchanged
    /// is skipped.
    pub async fn index_markdown(&self, file_path: &str, content: &str) -> Result<()> {
        let mut hasher = Sha256::new();
        hasher.update(content.as_bytes());
        let content_hash = format!("{:x}", hasher.finalize());

        let existing: Option<String> =
            sqlx::query_scalar("SELECT content_hash FROM artifacts WHERE path = ?")
                .bind(file_path)
                .fetch_optional(&self.pool)
                .await?;
        if existing.as_deref() == Some(content_hash.as_str()) {
            return Ok(());
        }

        sqlx::query(
            r#"
            INSERT INTO artifacts (path, content_hash, indexed_at) VALUES (?, ?, ?)
            ON CONFLICT(path) DO UPDATE SET
                content_hash = excluded.content_hash,
                indexed_at = excluded.indexed_at
            "#,
        )
        .bind(file_path)
        .bind(&content_hash)
        .bind(Utc::now().timestamp_millis())
        .execute(&self.pool)
        .await?;

        sqlx::query("DELETE FROM artifacts_fts WHERE path = ?")
            .bind(file_path)
            .execute(&self.pool)
            .await?;
        sqlx::query("INSERT INTO artifacts_fts (path, content) VALUES (?, ?)")
            .bind(file_path)
            .bind(content)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn close(self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn indexes_and_skips_unchanged_content() {
        let dir = tempfile::tempdir().unwrap();
        let index = ContentIndex::open(&dir.path().join("cache/context.db"))
            .await
            .unwrap();

        index.index_markdown("/p/a.md", "first version").await.unwrap();
        let first: i64 = sqlx::query_scalar("SELECT indexed_at FROM artifacts")
            .fetch_one(&index.pool)
            .await
            .unwrap();

        // Unchanged content: no rewrite, indexed_at untouched.
        index.index_markdown("/p/a.md", "first version").await.unwrap();
        let second: i64 = sqlx::query_scalar("SELECT indexed_at FROM artifacts")
            .fetch_one(&index.pool)
            .await
            .unwrap();
        assert_eq!(first, second);

        index.index_markdown("/p/a.md", "second version").await.unwrap();
        let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM artifacts")
            .fetch_one(&index.pool)
            .await
            .unwrap();
        assert_eq!(rows, 1);

        let fts_rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM artifacts_fts")
            .fetch_one(&index.pool)
            .await
            .unwrap();
        assert_eq!(fts_rows, 1);

        index.close().await;
    }

    #[tokio::test]
    async fn content_is_searchable() {
        let dir = tempfile::tempdir().unwrap();
        let index = ContentIndex::open(&dir.path().join("context.db"))
            .await
            .unwrap();

        index
            .index_markdown("/p/a.md", "notes about the caching fix")
            .await
            .unwrap();

        let hits: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM artifacts_fts WHERE artifacts_fts MATCH ?")
                .bind("caching")
                .fetch_one(&index.pool)
                .await
                .unwrap();
        assert_eq!(hits, 1);

        index.close().await;
    }
}
