//! The upsert protocol and store-side reads.
//!
//! The store holds exactly one row per distinct `file_path`. An upsert is
//! a single conflict-target statement: insert, or overwrite every column
//! of the existing row — including `content` and `indexed_at`. No history
//! is retained, and no column-level merge happens; a partial patch would
//! silently resurrect stale field values when a new document version
//! genuinely omits a section.

use anyhow::Result;
use chrono::Utc;
use sqlx::Row;
use std::path::Path;

use crate::models::ArtifactRecord;

/// A store row projected down to the fields reconciliation needs.
#[derive(Debug, Clone)]
pub struct StoredArtifact {
    pub file_path: String,
    pub session_name: String,
    pub agent_id: Option<String>,
}

/// Insert-or-overwrite one record, advancing `indexed_at`. Idempotent and
/// safe to call any number of times for the same `file_path`; the whole
/// statement succeeds or fails atomically.
pub async fn upsert_artifact<'e, E>(executor: E, record: &ArtifactRecord) -> Result<()>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    let indexed_at = Utc::now().timestamp_millis();

    sqlx::query(
        r#"
        INSERT INTO handoffs (
            file_path,
            session_name,
            format,
            session_id,
            agent_id,
            root_span_id,
            goal,
            what_worked,
            what_failed,
            key_decisions,
            outcome,
            content,
            indexed_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(file_path) DO UPDATE SET
            session_name  = excluded.session_name,
            format        = excluded.format,
            session_id    = excluded.session_id,
            agent_id      = excluded.agent_id,
            root_span_id  = excluded.root_span_id,
            goal          = excluded.goal,
            what_worked   = excluded.what_worked,
            what_failed   = excluded.what_failed,
            key_decisions = excluded.key_decisions,
            outcome       = excluded.outcome,
            content       = excluded.content,
            indexed_at    = excluded.indexed_at
        "#,
    )
    .bind(&record.file_path)
    .bind(&record.session_name)
    .bind(record.format.as_str())
    .bind(record.session_id.as_deref())
    .bind(record.agent_id.as_deref())
    .bind(record.root_span_id.as_deref())
    .bind(record.goal.as_deref())
    .bind(record.what_worked.as_deref())
    .bind(record.what_failed.as_deref())
    .bind(record.key_decisions.as_deref())
    .bind(record.outcome.map(|outcome| outcome.as_str()))
    .bind(&record.content)
    .bind(indexed_at)
    .execute(executor)
    .await?;

    Ok(())
}

/// Fetch the rows whose `file_path` sits under an artifacts directory.
pub async fn artifacts_under(pool: &sqlx::SqlitePool, dir: &Path) -> Result<Vec<StoredArtifact>> {
    let prefix = format!("{}{}", dir.display(), std::path::MAIN_SEPARATOR);

    let rows = sqlx::query(
        "SELECT file_path, session_name, agent_id FROM handoffs WHERE file_path LIKE ?",
    )
    .bind(format!("{prefix}%"))
    .fetch_all(pool)
    .await?;

    Ok(rows
        .iter()
        .map(|row| StoredArtifact {
            file_path: row.get("file_path"),
            session_name: row.get("session_name"),
            agent_id: row.get("agent_id"),
        })
        .collect())
}
