use anyhow::Result;
use sqlx::SqlitePool;

use crate::config::Config;
use crate::db;

pub async fn run_migrations(config: &Config) -> Result<()> {
    let pool = db::connect(&config.db.path).await?;
    ensure_schema(&pool).await?;
    pool.close().await;
    Ok(())
}

/// Create the store schema. Idempotent.
pub async fn ensure_schema(pool: &SqlitePool) -> Result<()> {
    // One row per distinct file_path; every column overwritten on re-ingest.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS handoffs (
            file_path TEXT PRIMARY KEY,
            session_name TEXT NOT NULL,
            format TEXT NOT NULL,
            session_id TEXT,
            agent_id TEXT,
            root_span_id TEXT,
            goal TEXT,
            what_worked TEXT,
            what_failed TEXT,
            key_decisions TEXT,
            outcome TEXT,
            content TEXT NOT NULL,
            indexed_at INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_handoffs_session_name ON handoffs(session_name)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_handoffs_indexed_at ON handoffs(indexed_at DESC)")
        .execute(pool)
        .await?;

    Ok(())
}
