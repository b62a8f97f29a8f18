use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub db: DbConfig,
    #[serde(default)]
    pub artifacts: ArtifactsConfig,
    #[serde(default)]
    pub discovery: DiscoveryConfig,
    #[serde(default)]
    pub index: IndexConfig,
    #[serde(default)]
    pub migration: MigrationConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
}

/// Where artifacts live inside a project and how they are recognized.
#[derive(Debug, Deserialize, Clone)]
pub struct ArtifactsConfig {
    /// Artifacts directory, relative to each project root.
    #[serde(default = "default_artifacts_dir")]
    pub dir: PathBuf,
    /// Directory name whose immediate child names the session when a
    /// document carries no explicit identifier.
    #[serde(default = "default_marker")]
    pub marker: String,
    #[serde(default = "default_include_globs")]
    pub include_globs: Vec<String>,
    #[serde(default)]
    pub exclude_globs: Vec<String>,
    #[serde(default)]
    pub follow_symlinks: bool,
}

impl Default for ArtifactsConfig {
    fn default() -> Self {
        Self {
            dir: default_artifacts_dir(),
            marker: default_marker(),
            include_globs: default_include_globs(),
            exclude_globs: Vec::new(),
            follow_symlinks: false,
        }
    }
}

fn default_artifacts_dir() -> PathBuf {
    PathBuf::from("thoughts/shared/handoffs")
}

fn default_marker() -> String {
    "handoffs".to_string()
}

fn default_include_globs() -> Vec<String> {
    vec![
        "**/*.yaml".to_string(),
        "**/*.yml".to_string(),
        "**/*.md".to_string(),
    ]
}

/// Where project discovery looks for session logs.
#[derive(Debug, Deserialize, Clone)]
pub struct DiscoveryConfig {
    #[serde(default = "default_session_logs")]
    pub session_logs: PathBuf,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            session_logs: default_session_logs(),
        }
    }
}

fn default_session_logs() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(".claude").join("projects"))
        .unwrap_or_else(|| PathBuf::from(".claude/projects"))
}

/// Secondary full-text content index, best-effort and per project.
#[derive(Debug, Deserialize, Clone)]
pub struct IndexConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Index database path, relative to each project root.
    #[serde(default = "default_index_path")]
    pub path: PathBuf,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: default_index_path(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_index_path() -> PathBuf {
    PathBuf::from(".claude/cache/artifact-index/context.db")
}

/// External legacy-migration command, run per project before a sweep when
/// requested.
#[derive(Debug, Deserialize, Clone)]
pub struct MigrationConfig {
    #[serde(default = "default_migration_program")]
    pub program: String,
    #[serde(default = "default_migration_args")]
    pub args: Vec<String>,
    #[serde(default = "default_migration_dry_run_args")]
    pub dry_run_args: Vec<String>,
    /// Working directory for the command, relative to each project root.
    #[serde(default = "default_migration_workdir")]
    pub workdir: PathBuf,
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            program: default_migration_program(),
            args: default_migration_args(),
            dry_run_args: default_migration_dry_run_args(),
            workdir: default_migration_workdir(),
        }
    }
}

fn default_migration_program() -> String {
    "npm".to_string()
}

fn default_migration_args() -> Vec<String> {
    vec![
        "run".to_string(),
        "--silent".to_string(),
        "migrate".to_string(),
    ]
}

fn default_migration_dry_run_args() -> Vec<String> {
    vec![
        "run".to_string(),
        "--silent".to_string(),
        "migrate:dry-run".to_string(),
    ]
}

fn default_migration_workdir() -> PathBuf {
    PathBuf::from(".claude/hooks")
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    if config.artifacts.marker.is_empty() {
        anyhow::bail!("artifacts.marker must not be empty");
    }
    if config.artifacts.marker.contains('/') || config.artifacts.marker.contains('\\') {
        anyhow::bail!("artifacts.marker must be a single path component");
    }
    if config.artifacts.include_globs.is_empty() {
        anyhow::bail!("artifacts.include_globs must not be empty");
    }
    if config.migration.program.is_empty() {
        anyhow::bail!("migration.program must not be empty");
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config_gets_defaults() {
        let config: Config = toml::from_str("[db]\npath = \"data/handoffs.sqlite\"\n").unwrap();
        assert_eq!(config.artifacts.dir, PathBuf::from("thoughts/shared/handoffs"));
        assert_eq!(config.artifacts.marker, "handoffs");
        assert_eq!(config.artifacts.include_globs.len(), 3);
        assert!(config.index.enabled);
        assert_eq!(config.migration.program, "npm");
    }

    #[test]
    fn marker_with_separator_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hix.toml");
        std::fs::write(
            &path,
            "[db]\npath = \"x.sqlite\"\n[artifacts]\nmarker = \"a/b\"\n",
        )
        .unwrap();
        assert!(load_config(&path).is_err());
    }
}
