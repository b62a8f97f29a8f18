//! Read-only health check: reconcile disk against the store.
//!
//! For each project the disk census and the store census are projected two
//! ways — absolute file path and session name — and diffed independently.
//! A path can be missing while its session is already known because
//! another file for the same session was ingested earlier, so both diffs
//! are reported. Nothing here mutates either side; a stale row is
//! reported, never deleted.

use anyhow::Result;
use sqlx::SqlitePool;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::Config;
use crate::db;
use crate::document;
use crate::fields;
use crate::reconcile;
use crate::report::{DiffSummary, DiskCensus, FormatCounts, LegacyFileCounts, ProjectHealth, StoreCensus};
use crate::scan;
use crate::store;

#[derive(Debug, Clone)]
pub struct HealthOptions {
    /// Include the literal missing/stale lists, bounded by `limit`.
    pub include_files: bool,
    pub limit: usize,
}

impl Default for HealthOptions {
    fn default() -> Self {
        Self {
            include_files: false,
            limit: 25,
        }
    }
}

/// Health-check all selected projects. Never requires a store write, so an
/// unreachable store degrades to a disk-only report instead of failing.
pub async fn run_health(
    config: &Config,
    projects: &[PathBuf],
    opts: &HealthOptions,
) -> Result<Vec<ProjectHealth>> {
    let pool = match db::connect(&config.db.path).await {
        Ok(pool) => Some(pool),
        Err(err) => {
            tracing::warn!(error = %err, "store unavailable; reporting disk side only");
            None
        }
    };

    let mut results = Vec::new();
    for project_root in projects {
        results.push(health_project(config, project_root, pool.as_ref(), opts).await);
    }

    if let Some(pool) = pool {
        pool.close().await;
    }

    Ok(results)
}

async fn health_project(
    config: &Config,
    project_root: &Path,
    pool: Option<&SqlitePool>,
    opts: &HealthOptions,
) -> ProjectHealth {
    let artifacts_dir = project_root.join(&config.artifacts.dir);
    let artifacts_dir = artifacts_dir.canonicalize().unwrap_or(artifacts_dir);

    let files = if artifacts_dir.exists() {
        match scan::scan_artifacts(&artifacts_dir, &config.artifacts) {
            Ok(files) => files,
            Err(err) => {
                tracing::warn!(
                    project = %project_root.display(),
                    error = %err,
                    "artifact scan failed"
                );
                Vec::new()
            }
        }
    } else {
        Vec::new()
    };

    let disk_paths: BTreeSet<String> = files
        .iter()
        .map(|path| path.to_string_lossy().into_owned())
        .collect();
    let disk_sessions: BTreeSet<String> = files
        .iter()
        .filter_map(|path| disk_session_name(path, &config.artifacts.marker))
        .collect();

    let mut store_census = StoreCensus::default();
    let mut store_paths = BTreeSet::new();
    let mut store_sessions = BTreeSet::new();

    if let Some(pool) = pool {
        match store::artifacts_under(pool, &artifacts_dir).await {
            Ok(rows) => {
                store_census.rows = rows.len();
                for row in rows {
                    store_paths.insert(row.file_path);
                    store_sessions.insert(row.session_name);
                    let agent = row.agent_id.unwrap_or_else(|| "unknown".to_string());
                    *store_census.agents.entry(agent).or_insert(0) += 1;
                }
                store_census.sessions = store_sessions.len();
                store_census.unknown_agents =
                    store_census.agents.get("unknown").copied().unwrap_or(0);
            }
            Err(err) => {
                tracing::warn!(
                    project = %project_root.display(),
                    error = %err,
                    "store census failed"
                );
                store_census.error = Some(err.to_string());
            }
        }
    }

    let paths = reconcile::diff(&disk_paths, &store_paths);
    let sessions = reconcile::diff(&disk_sessions, &store_sessions);

    ProjectHealth {
        project: project_root.to_string_lossy().into_owned(),
        disk: DiskCensus {
            files: files.len(),
            by_format: FormatCounts::tally(&files),
            sessions: disk_sessions.len(),
            legacy: LegacyFileCounts {
                handoff: count_files(&project_root.join(".handoff")),
                checkpoint: count_files(&project_root.join(".checkpoint")),
            },
        },
        store: store_census,
        diff: DiffSummary {
            missing_files_count: paths.missing.len(),
            stale_files_count: paths.stale.len(),
            missing_sessions_count: sessions.missing.len(),
            stale_sessions_count: sessions.stale.len(),
            missing_files: bounded(&paths.missing, opts),
            stale_files: bounded(&paths.stale, opts),
            missing_sessions: bounded(&sessions.missing, opts),
            stale_sessions: bounded(&sessions.stale, opts),
        },
    }
}

/// Session identity for a disk file: the header chain when the file is
/// readable, the path-derived fallback otherwise.
fn disk_session_name(path: &Path, marker: &str) -> Option<String> {
    match std::fs::read_to_string(path) {
        Ok(raw) => fields::session_name(&document::parse(path.to_path_buf(), raw), marker),
        Err(_) => fields::derive_session_name(path, marker),
    }
}

fn bounded(set: &BTreeSet<String>, opts: &HealthOptions) -> Option<Vec<String>> {
    if !opts.include_files {
        return None;
    }
    Some(set.iter().take(opts.limit).cloned().collect())
}

fn count_files(path: &Path) -> usize {
    if !path.exists() {
        return 0;
    }
    WalkDir::new(path)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .count()
}
