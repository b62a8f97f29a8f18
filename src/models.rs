//! Core data models for the ingestion and reconciliation pipeline.
//!
//! These types represent the documents read from disk, the normalized
//! records written to the store, and the rejection reasons produced when a
//! document cannot be assigned a session identity.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Detected artifact format, derived from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactFormat {
    Yaml,
    Markdown,
}

impl ArtifactFormat {
    /// `.yaml` and `.yml` are YAML; everything else is treated as Markdown.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                ArtifactFormat::Yaml
            }
            _ => ArtifactFormat::Markdown,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ArtifactFormat::Yaml => "yaml",
            ArtifactFormat::Markdown => "markdown",
        }
    }
}

/// A single on-disk artifact, split into header and body but not yet
/// normalized.
#[derive(Debug, Clone)]
pub struct Document {
    /// Absolute path; the unique identifier within a corpus.
    pub path: PathBuf,
    pub format: ArtifactFormat,
    /// Frontmatter key/value pairs. Empty when the document has no header.
    pub header: HashMap<String, String>,
    /// Everything after the header block, or the whole document if no
    /// header is present.
    pub body: String,
    /// The raw document as read from disk.
    pub raw: String,
}

/// Session outcome. Values outside this set are discarded during
/// extraction, not stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Succeeded,
    PartialPlus,
    PartialMinus,
    Failed,
}

impl Outcome {
    /// Permissive, case-insensitive parse. An unrecognized value is absent,
    /// never an error.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_ascii_uppercase().as_str() {
            "SUCCEEDED" => Some(Outcome::Succeeded),
            "PARTIAL_PLUS" => Some(Outcome::PartialPlus),
            "PARTIAL_MINUS" => Some(Outcome::PartialMinus),
            "FAILED" => Some(Outcome::Failed),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Succeeded => "SUCCEEDED",
            Outcome::PartialPlus => "PARTIAL_PLUS",
            Outcome::PartialMinus => "PARTIAL_MINUS",
            Outcome::Failed => "FAILED",
        }
    }
}

/// The normalized unit written to the store, keyed by `file_path`.
#[derive(Debug, Clone)]
pub struct ArtifactRecord {
    /// Never empty; a record without a session identity is rejected.
    pub session_name: String,
    pub file_path: String,
    pub format: ArtifactFormat,
    pub session_id: Option<String>,
    pub agent_id: Option<String>,
    pub root_span_id: Option<String>,
    pub goal: Option<String>,
    pub what_worked: Option<String>,
    pub what_failed: Option<String>,
    pub key_decisions: Option<String>,
    pub outcome: Option<Outcome>,
    /// The full raw document.
    pub content: String,
}

/// Why a document cannot be ingested. Non-fatal: rejected documents are
/// counted and skipped, never written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    MissingSession,
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rejection::MissingSession => write!(f, "missing session"),
        }
    }
}
