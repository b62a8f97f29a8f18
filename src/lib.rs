//! # Handoff Index
//!
//! Reconciles a filesystem corpus of handoff artifacts (YAML/Markdown
//! documents with a frontmatter header and free-text sections) against an
//! authoritative relational store, and reports or repairs divergence
//! between the two.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   ┌──────────────┐   ┌──────────┐
//! │  Discovery  │──▶│   Pipeline   │──▶│  SQLite  │
//! │ session logs│   │ parse+extract│   │ handoffs │
//! └─────────────┘   └──────┬───────┘   └────┬─────┘
//!                          │                │
//!                          ▼                ▼
//!                    ┌──────────┐     ┌──────────┐
//!                    │  Sweep   │     │  Health  │
//!                    │ (upsert) │     │  (diff)  │
//!                    └──────────┘     └──────────┘
//! ```
//!
//! A sweep ingests every discovered artifact: the document is split into
//! header and body, fields resolve through fallback chains (with a
//! path-derived session identity as the last resort), and the record is
//! upserted keyed by absolute file path. A health check is the read-only
//! counterpart: it diffs disk against store under two projections (file
//! paths and session names) and reports missing and stale keys.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`document`] | Frontmatter and section parsing |
//! | [`fields`] | Fallback-chain field extraction |
//! | [`scan`] | Artifact file enumeration |
//! | [`discovery`] | Project discovery from session logs |
//! | [`store`] | Upsert protocol and store reads |
//! | [`reconcile`] | Disk/store set reconciliation |
//! | [`sweep`] | Ingestion orchestration |
//! | [`health`] | Read-only health checks |
//! | [`index`] | Best-effort secondary content index |
//! | [`legacy`] | Injected legacy-migration capability |
//! | [`report`] | Structured summaries and rendering |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema bootstrap |

pub mod config;
pub mod db;
pub mod discovery;
pub mod document;
pub mod fields;
pub mod health;
pub mod index;
pub mod legacy;
pub mod migrate;
pub mod models;
pub mod reconcile;
pub mod report;
pub mod scan;
pub mod store;
pub mod sweep;
