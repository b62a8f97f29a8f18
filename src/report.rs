//! Structured summaries for sweeps and health checks.
//!
//! Summaries are the sole observable output of the engine; the text and
//! JSON renderings here are presentation only. JSON output carries the
//! full structures under a `results` envelope.

use anyhow::Result;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::models::ArtifactFormat;

/// File counts by detected format.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct FormatCounts {
    pub yaml: usize,
    pub markdown: usize,
}

impl FormatCounts {
    pub fn tally(paths: &[PathBuf]) -> Self {
        let mut counts = FormatCounts::default();
        for path in paths {
            match ArtifactFormat::from_path(path) {
                ArtifactFormat::Yaml => counts.yaml += 1,
                ArtifactFormat::Markdown => counts.markdown += 1,
            }
        }
        counts
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SweepStatus {
    Ok,
    MissingArtifactsDir,
    Failed,
}

/// Presence of pre-unified legacy artifact directories.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct LegacyDirs {
    pub handoff: bool,
    pub checkpoint: bool,
}

/// Per-project result of one sweep.
#[derive(Debug, Serialize)]
pub struct ProjectSweep {
    pub project: String,
    pub status: SweepStatus,
    pub files: usize,
    pub by_format: FormatCounts,
    pub ingested: usize,
    pub rejected: Vec<String>,
    pub unreadable: Vec<String>,
    pub legacy: LegacyDirs,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub migration: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProjectSweep {
    pub fn new(project: &Path) -> Self {
        Self {
            project: project.to_string_lossy().into_owned(),
            status: SweepStatus::Ok,
            files: 0,
            by_format: FormatCounts::default(),
            ingested: 0,
            rejected: Vec::new(),
            unreadable: Vec::new(),
            legacy: LegacyDirs::default(),
            migration: None,
            error: None,
        }
    }
}

/// Disk side of a health check.
#[derive(Debug, Serialize)]
pub struct DiskCensus {
    pub files: usize,
    pub by_format: FormatCounts,
    pub sessions: usize,
    pub legacy: LegacyFileCounts,
}

#[derive(Debug, Default, Serialize)]
pub struct LegacyFileCounts {
    pub handoff: usize,
    pub checkpoint: usize,
}

/// Store side of a health check.
#[derive(Debug, Default, Serialize)]
pub struct StoreCensus {
    pub rows: usize,
    pub sessions: usize,
    pub agents: BTreeMap<String, usize>,
    pub unknown_agents: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Both reconciliation projections. Counts are always present; literal
/// lists appear only on request and are bounded by the caller's limit.
#[derive(Debug, Default, Serialize)]
pub struct DiffSummary {
    pub missing_files_count: usize,
    pub stale_files_count: usize,
    pub missing_sessions_count: usize,
    pub stale_sessions_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub missing_files: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stale_files: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub missing_sessions: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stale_sessions: Option<Vec<String>>,
}

/// Per-project result of one health check.
#[derive(Debug, Serialize)]
pub struct ProjectHealth {
    pub project: String,
    pub disk: DiskCensus,
    pub store: StoreCensus,
    pub diff: DiffSummary,
}

pub fn print_sweep(results: &[ProjectSweep], dry_run: bool, json: bool) -> Result<()> {
    if json {
        let envelope = serde_json::json!({ "results": results });
        println!("{}", serde_json::to_string_pretty(&envelope)?);
        return Ok(());
    }

    for row in results {
        println!("Project: {}", row.project);
        if row.status == SweepStatus::MissingArtifactsDir {
            println!("  Missing artifacts directory");
            continue;
        }
        println!(
            "  Files: {} (yaml: {}, markdown: {})",
            row.files, row.by_format.yaml, row.by_format.markdown
        );
        println!("  Ingested: {}", row.ingested);
        if !row.rejected.is_empty() {
            println!("  Rejected: {}", row.rejected.len());
        }
        if !row.unreadable.is_empty() {
            println!("  Unreadable: {}", row.unreadable.len());
        }
        if row.legacy.handoff || row.legacy.checkpoint {
            println!(
                "  Legacy dirs: .handoff={} .checkpoint={}",
                row.legacy.handoff, row.legacy.checkpoint
            );
        }
        if let Some(migrated) = row.migration {
            println!("  Migration: {}", if migrated { "ok" } else { "failed" });
        }
        if let Some(ref error) = row.error {
            println!("  Error: {}", error);
        }
    }

    if dry_run {
        println!("Dry run only - no store writes");
    }

    Ok(())
}

pub fn print_health(results: &[ProjectHealth], json: bool) -> Result<()> {
    if json {
        let envelope = serde_json::json!({ "results": results });
        println!("{}", serde_json::to_string_pretty(&envelope)?);
        return Ok(());
    }

    for row in results {
        println!("Project: {}", row.project);
        println!(
            "  Disk: {} (yaml: {}, markdown: {})",
            row.disk.files, row.disk.by_format.yaml, row.disk.by_format.markdown
        );
        println!("  Disk sessions: {}", row.disk.sessions);
        println!(
            "  Legacy files: .handoff={} .checkpoint={}",
            row.disk.legacy.handoff, row.disk.legacy.checkpoint
        );
        println!("  Store rows: {}", row.store.rows);
        println!("  Store sessions: {}", row.store.sessions);
        println!(
            "  Store agents: {} (unknown: {})",
            row.store.agents.len(),
            row.store.unknown_agents
        );
        if let Some(ref error) = row.store.error {
            println!("  Store error: {}", error);
        }
        println!(
            "  Missing files: {} | Stale files: {}",
            row.diff.missing_files_count, row.diff.stale_files_count
        );
        println!(
            "  Missing sessions: {} | Stale sessions: {}",
            row.diff.missing_sessions_count, row.diff.stale_sessions_count
        );
        print_sample("Missing files", row.diff.missing_files.as_deref());
        print_sample("Stale files", row.diff.stale_files.as_deref());
        print_sample("Missing sessions", row.diff.missing_sessions.as_deref());
        print_sample("Stale sessions", row.diff.stale_sessions.as_deref());
    }

    Ok(())
}

fn print_sample(label: &str, items: Option<&[String]>) {
    let Some(items) = items else {
        return;
    };
    if items.is_empty() {
        return;
    }
    println!("  {} (sample):", label);
    for item in items {
        println!("    - {}", item);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tally_counts_by_extension() {
        let paths = vec![
            PathBuf::from("/a/x.yaml"),
            PathBuf::from("/a/y.yml"),
            PathBuf::from("/a/z.md"),
        ];
        let counts = FormatCounts::tally(&paths);
        assert_eq!(counts.yaml, 2);
        assert_eq!(counts.markdown, 1);
    }

    #[test]
    fn sweep_status_serializes_snake_case() {
        let json = serde_json::to_string(&SweepStatus::MissingArtifactsDir).unwrap();
        assert_eq!(json, "\"missing_artifacts_dir\"");
    }
}
