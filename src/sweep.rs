//! Sweep orchestration: ingest every artifact of every selected project.
//!
//! Per project: optionally run the legacy migration, enumerate artifact
//! files, then parse → extract → upsert each document inside a single
//! transaction. Parsing-layer problems degrade to skipped-and-counted
//! documents; only store-layer problems abort a project, and a failed
//! project never prevents the remaining projects from being processed.

use anyhow::Result;
use sqlx::SqlitePool;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::db;
use crate::document;
use crate::fields;
use crate::index::ContentIndex;
use crate::legacy::LegacyMigration;
use crate::models::{ArtifactFormat, Document};
use crate::report::{FormatCounts, LegacyDirs, ProjectSweep, SweepStatus};
use crate::scan;
use crate::store;

#[derive(Debug, Clone, Default)]
pub struct SweepOptions {
    pub migrate_legacy: bool,
    pub dry_run: bool,
    pub verbose: bool,
    /// Cap on verbose per-file output; 0 means unlimited.
    pub limit: usize,
    pub no_index: bool,
}

/// Sweep all selected projects. Errs only when the store connection for a
/// required write cannot be established at all; everything else is
/// reported in the summaries.
pub async fn run_sweep(
    config: &Config,
    projects: &[PathBuf],
    migration: &dyn LegacyMigration,
    opts: &SweepOptions,
) -> Result<Vec<ProjectSweep>> {
    let pool = if opts.dry_run {
        None
    } else {
        Some(db::connect(&config.db.path).await?)
    };

    let mut results = Vec::new();
    for project_root in projects {
        results.push(sweep_project(config, project_root, pool.as_ref(), migration, opts).await);
    }

    if let Some(pool) = pool {
        pool.close().await;
    }

    Ok(results)
}

async fn sweep_project(
    config: &Config,
    project_root: &Path,
    pool: Option<&SqlitePool>,
    migration: &dyn LegacyMigration,
    opts: &SweepOptions,
) -> ProjectSweep {
    let mut summary = ProjectSweep::new(project_root);

    if opts.migrate_legacy {
        summary.migration = Some(migration.run(project_root, opts.dry_run).await);
    }

    summary.legacy = LegacyDirs {
        handoff: project_root.join(".handoff").exists(),
        checkpoint: project_root.join(".checkpoint").exists(),
    };

    let artifacts_dir = project_root.join(&config.artifacts.dir);
    if !artifacts_dir.exists() {
        summary.status = SweepStatus::MissingArtifactsDir;
        return summary;
    }
    let artifacts_dir = artifacts_dir.canonicalize().unwrap_or(artifacts_dir);

    let files = match scan::scan_artifacts(&artifacts_dir, &config.artifacts) {
        Ok(files) => files,
        Err(err) => {
            summary.status = SweepStatus::Failed;
            summary.error = Some(format!("scan failed: {err}"));
            return summary;
        }
    };
    summary.files = files.len();
    summary.by_format = FormatCounts::tally(&files);

    // Dry run: parse and count, write nothing.
    let Some(pool) = pool else {
        for (position, file) in files.iter().enumerate() {
            print_verbose(opts, position, file);
            match read_document(file) {
                Some(doc) => match fields::build_record(&doc, &config.artifacts.marker) {
                    Ok(_) => summary.ingested += 1,
                    Err(reason) => summary
                        .rejected
                        .push(format!("{}: {}", file.display(), reason)),
                },
                None => summary.unreadable.push(file.display().to_string()),
            }
        }
        return summary;
    };

    let index = if config.index.enabled && !opts.no_index {
        match ContentIndex::open(&project_root.join(&config.index.path)).await {
            Ok(index) => Some(index),
            Err(err) => {
                tracing::warn!(
                    project = %project_root.display(),
                    error = %err,
                    "content index unavailable"
                );
                None
            }
        }
    } else {
        None
    };

    let mut tx = match pool.begin().await {
        Ok(tx) => tx,
        Err(err) => {
            summary.status = SweepStatus::Failed;
            summary.error = Some(err.to_string());
            if let Some(index) = index {
                index.close().await;
            }
            return summary;
        }
    };

    let mut store_error: Option<String> = None;
    for (position, file) in files.iter().enumerate() {
        print_verbose(opts, position, file);

        let Some(doc) = read_document(file) else {
            summary.unreadable.push(file.display().to_string());
            continue;
        };

        let record = match fields::build_record(&doc, &config.artifacts.marker) {
            Ok(record) => record,
            Err(reason) => {
                summary
                    .rejected
                    .push(format!("{}: {}", file.display(), reason));
                continue;
            }
        };

        if let Err(err) = store::upsert_artifact(&mut *tx, &record).await {
            store_error = Some(err.to_string());
            break;
        }
        summary.ingested += 1;
        tracing::debug!(
            path = %record.file_path,
            session = %record.session_name,
            "upserted artifact"
        );

        if record.format == ArtifactFormat::Markdown {
            if let Some(index) = &index {
                if let Err(err) = index.index_markdown(&record.file_path, &record.content).await {
                    // Deliberately non-propagating: the index is best-effort.
                    tracing::warn!(
                        path = %record.file_path,
                        error = %err,
                        "content index update failed"
                    );
                }
            }
        }
    }

    match store_error {
        Some(err) => {
            let _ = tx.rollback().await;
            summary.status = SweepStatus::Failed;
            summary.error = Some(err);
            summary.ingested = 0;
        }
        None => {
            if let Err(err) = tx.commit().await {
                summary.status = SweepStatus::Failed;
                summary.error = Some(err.to_string());
                summary.ingested = 0;
            }
        }
    }

    if let Some(index) = index {
        index.close().await;
    }

    summary
}

fn read_document(path: &Path) -> Option<Document> {
    let raw = std::fs::read_to_string(path).ok()?;
    Some(document::parse(path.to_path_buf(), raw))
}

fn print_verbose(opts: &SweepOptions, position: usize, file: &Path) {
    if opts.verbose && (opts.limit == 0 || position < opts.limit) {
        println!("{}", file.display());
    }
}
