//! Legacy artifact migration, modeled as an injected capability.
//!
//! Some projects still carry pre-unified artifact layouts (`.handoff`,
//! `.checkpoint`). Converting them is the job of an external, opaque
//! command; the sweep only needs a boolean success signal. Keeping the
//! capability behind a trait lets the sweep be exercised in tests without
//! spawning any real process.

use async_trait::async_trait;
use std::path::Path;
use tokio::process::Command;

use crate::config::MigrationConfig;

/// One-shot migration of a project's legacy artifacts into the
/// conventional layout.
#[async_trait]
pub trait LegacyMigration: Send + Sync {
    /// Returns whether the migration ran and succeeded. Failure is
    /// reported, never fatal to the sweep.
    async fn run(&self, project_root: &Path, dry_run: bool) -> bool;
}

/// Production implementation: runs the configured command in the
/// configured working directory under the project root.
pub struct CommandMigration {
    config: MigrationConfig,
}

impl CommandMigration {
    pub fn new(config: MigrationConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl LegacyMigration for CommandMigration {
    async fn run(&self, project_root: &Path, dry_run: bool) -> bool {
        let workdir = project_root.join(&self.config.workdir);
        if !workdir.exists() {
            return false;
        }

        let args = if dry_run {
            &self.config.dry_run_args
        } else {
            &self.config.args
        };

        match Command::new(&self.config.program)
            .args(args)
            .current_dir(&workdir)
            .output()
            .await
        {
            Ok(output) if output.status.success() => true,
            Ok(output) => {
                tracing::warn!(
                    project = %project_root.display(),
                    stderr = %String::from_utf8_lossy(&output.stderr),
                    "legacy migration command failed"
                );
                false
            }
            Err(err) => {
                tracing::warn!(
                    project = %project_root.display(),
                    error = %err,
                    "legacy migration command could not be spawned"
                );
                false
            }
        }
    }
}

/// No-op migration used when `--migrate-legacy` is not requested and in
/// tests.
pub struct NoMigration;

#[async_trait]
impl LegacyMigration for NoMigration {
    async fn run(&self, _project_root: &Path, _dry_run: bool) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_workdir_reports_failure_without_spawning() {
        let dir = tempfile::tempdir().unwrap();
        let migration = CommandMigration::new(MigrationConfig::default());
        assert!(!migration.run(dir.path(), false).await);
    }

    #[tokio::test]
    async fn command_success_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("hooks")).unwrap();

        let migration = CommandMigration::new(MigrationConfig {
            program: "true".to_string(),
            args: vec![],
            dry_run_args: vec![],
            workdir: "hooks".into(),
        });
        assert!(migration.run(dir.path(), false).await);
    }

    #[tokio::test]
    async fn command_failure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("hooks")).unwrap();

        let migration = CommandMigration::new(MigrationConfig {
            program: "false".to_string(),
            args: vec![],
            dry_run_args: vec![],
            workdir: "hooks".into(),
        });
        assert!(!migration.run(dir.path(), false).await);
    }
}
