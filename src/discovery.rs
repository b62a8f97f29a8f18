//! Project discovery from session logs.
//!
//! Each session log directory holds JSONL transcripts whose entries carry a
//! `cwd` field naming the working directory of the session. The first such
//! entry per project directory nominates a candidate, which is resolved to
//! its enclosing version-control root. Discovery is read-only glue: the
//! engine only consumes the resulting path list.

use anyhow::Result;
use std::collections::BTreeSet;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::config::DiscoveryConfig;

/// Discover candidate project roots from the configured session-logs
/// directory. A missing directory yields an empty list, not an error.
pub fn discover_projects(config: &DiscoveryConfig) -> Result<Vec<PathBuf>> {
    let base = &config.session_logs;
    if !base.exists() {
        return Ok(Vec::new());
    }

    let mut projects = BTreeSet::new();

    for entry in std::fs::read_dir(base)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }

        let mut logs: Vec<PathBuf> = std::fs::read_dir(entry.path())?
            .filter_map(|log| log.ok())
            .map(|log| log.path())
            .filter(|path| path.extension().and_then(|ext| ext.to_str()) == Some("jsonl"))
            .collect();
        logs.sort();

        for log in logs {
            if let Some(cwd) = project_cwd_from_log(&log) {
                projects.insert(find_git_root(Path::new(&cwd)));
                break;
            }
        }
    }

    Ok(projects.into_iter().collect())
}

/// Pull the first `cwd` value out of a JSONL transcript. Unreadable files
/// and malformed lines are skipped, not errors.
fn project_cwd_from_log(path: &Path) -> Option<String> {
    let file = std::fs::File::open(path).ok()?;
    for line in BufReader::new(file).lines() {
        let line = line.ok()?;
        if !line.contains("\"cwd\"") {
            continue;
        }
        let Ok(payload) = serde_json::from_str::<serde_json::Value>(&line) else {
            continue;
        };
        if let Some(cwd) = payload.get("cwd").and_then(|value| value.as_str()) {
            if !cwd.is_empty() {
                return Some(cwd.to_string());
            }
        }
    }
    None
}

/// Walk up from `start` to the nearest ancestor containing `.git`. Falls
/// back to `start` itself when no repository is found.
pub fn find_git_root(start: &Path) -> PathBuf {
    let start = start
        .canonicalize()
        .unwrap_or_else(|_| start.to_path_buf());
    for ancestor in start.ancestors() {
        if ancestor.join(".git").exists() {
            return ancestor.to_path_buf();
        }
    }
    start
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_git_root_from_nested_path() {
        let dir = tempfile::tempdir().unwrap();
        let repo = dir.path().join("repo");
        std::fs::create_dir_all(repo.join(".git")).unwrap();
        std::fs::create_dir_all(repo.join("a/b")).unwrap();

        let root = find_git_root(&repo.join("a/b"));
        assert_eq!(root, repo.canonicalize().unwrap());
    }

    #[test]
    fn falls_back_to_start_without_git() {
        let dir = tempfile::tempdir().unwrap();
        let root = find_git_root(dir.path());
        assert_eq!(root, dir.path().canonicalize().unwrap());
    }

    #[test]
    fn discovers_projects_from_session_logs() {
        let dir = tempfile::tempdir().unwrap();
        let repo = dir.path().join("workspace/repo");
        std::fs::create_dir_all(repo.join(".git")).unwrap();

        let logs = dir.path().join("logs/proj-a");
        std::fs::create_dir_all(&logs).unwrap();
        std::fs::write(
            logs.join("session.jsonl"),
            format!(
                "{{\"type\":\"noise\"}}\n{{\"cwd\":\"{}\"}}\n",
                repo.display()
            ),
        )
        .unwrap();

        let config = DiscoveryConfig {
            session_logs: dir.path().join("logs"),
        };
        let projects = discover_projects(&config).unwrap();
        assert_eq!(projects, vec![repo.canonicalize().unwrap()]);
    }

    #[test]
    fn missing_logs_directory_is_empty_not_error() {
        let config = DiscoveryConfig {
            session_logs: PathBuf::from("/nonexistent/for/sure"),
        };
        assert!(discover_projects(&config).unwrap().is_empty());
    }

    #[test]
    fn malformed_lines_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let logs = dir.path().join("proj-a");
        std::fs::create_dir_all(&logs).unwrap();
        std::fs::write(logs.join("x.jsonl"), "not json with \"cwd\" inside\n").unwrap();

        let config = DiscoveryConfig {
            session_logs: dir.path().to_path_buf(),
        };
        assert!(discover_projects(&config).unwrap().is_empty());
    }
}
