//! # Handoff Index CLI (`hix`)
//!
//! The `hix` binary keeps a relational store synchronized with on-disk
//! handoff artifacts and reports divergence between the two.
//!
//! ## Usage
//!
//! ```bash
//! hix --config ./config/hix.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `hix init` | Create the SQLite store and its schema |
//! | `hix projects` | List discovered project roots |
//! | `hix sweep` | Ingest artifacts into the store |
//! | `hix health` | Diff disk artifacts against store rows |
//!
//! ## Examples
//!
//! ```bash
//! # Initialize the store
//! hix init --config ./config/hix.toml
//!
//! # Sweep the current repository
//! hix sweep
//!
//! # Sweep every discovered project, migrating legacy layouts first
//! hix sweep --all-projects --migrate-legacy
//!
//! # Count what a sweep would ingest without writing
//! hix sweep --dry-run --json
//!
//! # Reconcile and list up to ten missing/stale identifiers
//! hix health --include-files --limit 10
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use handoff_index::config::{self, Config};
use handoff_index::discovery;
use handoff_index::health::{self, HealthOptions};
use handoff_index::legacy::CommandMigration;
use handoff_index::migrate;
use handoff_index::report;
use handoff_index::sweep::{self, SweepOptions};

/// Handoff Index — reconcile on-disk handoff artifacts with an
/// authoritative relational store.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/hix.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "hix",
    about = "Handoff Index — reconcile on-disk handoff artifacts with a relational store",
    version,
    long_about = "Handoff Index ingests handoff artifacts (YAML/Markdown documents with a \
    frontmatter header) into a SQLite store keyed by absolute file path, and reconciles \
    disk against store: per project it reports artifacts missing from the store and store \
    rows no longer backed by a disk document, under both the file-path and session-name \
    projections."
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/hix.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Initialize the store schema.
    ///
    /// Creates the SQLite database file and the handoffs table. This
    /// command is idempotent — running it multiple times is safe.
    Init,

    /// List discovered project roots.
    ///
    /// Scans the configured session-logs directory and prints every
    /// candidate project with the status of its artifacts directory.
    Projects,

    /// Ingest artifacts into the store.
    ///
    /// Per project: enumerates artifact files, parses and normalizes each
    /// document, and upserts it keyed by absolute file path. A document
    /// with no derivable session identity is skipped and counted, never
    /// written.
    Sweep {
        /// Project root to sweep. Defaults to the enclosing repository of
        /// the current directory.
        #[arg(long)]
        project: Option<PathBuf>,

        /// Sweep every project discovered from session logs.
        #[arg(long)]
        all_projects: bool,

        /// Run the legacy artifact migration before sweeping each project.
        #[arg(long)]
        migrate_legacy: bool,

        /// Parse and count artifacts without writing to the store.
        #[arg(long)]
        dry_run: bool,

        /// Print each artifact file as it is processed.
        #[arg(long)]
        verbose: bool,

        /// Cap verbose output at this many files (0 = unlimited).
        #[arg(long, default_value_t = 0)]
        limit: usize,

        /// Skip secondary content-index updates for Markdown artifacts.
        #[arg(long)]
        no_index: bool,

        /// Emit the summary as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Diff disk artifacts against store rows.
    ///
    /// Read-only: reports per project the file counts on disk, the row
    /// counts in the store, and the missing/stale sets under both the
    /// file-path and session-name projections. Detecting a stale row does
    /// not delete it.
    Health {
        /// Project root to check. Defaults to the enclosing repository of
        /// the current directory.
        #[arg(long)]
        project: Option<PathBuf>,

        /// Check every project discovered from session logs.
        #[arg(long)]
        all_projects: bool,

        /// Include the literal missing/stale lists in the report.
        #[arg(long)]
        include_files: bool,

        /// Max items to list for each missing/stale set.
        #[arg(long, default_value_t = 25)]
        limit: usize,

        /// Emit the summary as JSON.
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("Store initialized successfully.");
        }
        Commands::Projects => {
            list_projects(&cfg)?;
        }
        Commands::Sweep {
            project,
            all_projects,
            migrate_legacy,
            dry_run,
            verbose,
            limit,
            no_index,
            json,
        } => {
            let projects = select_projects(&cfg, project, all_projects)?;
            let migration = CommandMigration::new(cfg.migration.clone());
            let opts = SweepOptions {
                migrate_legacy,
                dry_run,
                verbose,
                limit,
                no_index,
            };
            let results = sweep::run_sweep(&cfg, &projects, &migration, &opts).await?;
            report::print_sweep(&results, dry_run, json)?;
        }
        Commands::Health {
            project,
            all_projects,
            include_files,
            limit,
            json,
        } => {
            let projects = select_projects(&cfg, project, all_projects)?;
            let opts = HealthOptions {
                include_files,
                limit,
            };
            let results = health::run_health(&cfg, &projects, &opts).await?;
            report::print_health(&results, json)?;
        }
    }

    Ok(())
}

/// Resolve the set of project roots a command operates on: everything
/// discovered from session logs, or the single project named on the
/// command line (defaulting to the repository enclosing the current
/// directory).
fn select_projects(
    config: &Config,
    project: Option<PathBuf>,
    all_projects: bool,
) -> Result<Vec<PathBuf>> {
    if all_projects {
        return discovery::discover_projects(&config.discovery);
    }

    let start = match project {
        Some(path) => path,
        None => std::env::current_dir()?,
    };
    Ok(vec![discovery::find_git_root(&start)])
}

fn list_projects(config: &Config) -> Result<()> {
    let projects = discovery::discover_projects(&config.discovery)?;
    if projects.is_empty() {
        println!("No projects discovered under {}", config.discovery.session_logs.display());
        return Ok(());
    }

    println!("{:<60} ARTIFACTS", "PROJECT");
    for project in projects {
        let artifacts_dir = project.join(&config.artifacts.dir);
        let status = if artifacts_dir.exists() { "present" } else { "absent" };
        println!("{:<60} {}", project.display(), status);
    }

    Ok(())
}
