//! Field extraction: turning a parsed [`Document`] into an
//! [`ArtifactRecord`], or rejecting it.
//!
//! Every optional field resolves through an ordered chain of extractors —
//! first non-empty wins. Session identity is the only required field; when
//! neither the header nor the path convention yields one, the document is
//! rejected and never written.

use std::path::{Component, Path};

use crate::document;
use crate::models::{ArtifactRecord, Document, Outcome, Rejection};

/// Build the normalized record for one document. Pure: no I/O, no side
/// effects.
pub fn build_record(doc: &Document, marker: &str) -> Result<ArtifactRecord, Rejection> {
    let session_name = session_name(doc, marker).ok_or(Rejection::MissingSession)?;

    let outcome = header_value(doc, "outcome")
        .or_else(|| header_value(doc, "status"))
        .and_then(|raw| Outcome::parse(&raw));

    let goal = header_value(doc, "goal").or_else(|| document::extract_scalar(&doc.body, "goal"));

    let what_worked = document::extract_section(&doc.body, "worked");
    let what_failed = document::extract_section(&doc.body, "failed");
    let key_decisions = document::extract_section(&doc.body, "final_decisions")
        .or_else(|| document::extract_section(&doc.body, "decisions"));

    Ok(ArtifactRecord {
        session_name,
        file_path: doc.path.to_string_lossy().into_owned(),
        format: doc.format,
        session_id: header_value(doc, "session_id"),
        agent_id: header_value(doc, "agent_id"),
        root_span_id: header_value(doc, "root_span_id"),
        goal,
        what_worked,
        what_failed,
        key_decisions,
        outcome,
        content: doc.raw.clone(),
    })
}

/// Resolve the session identity for a document: header `session`, then
/// `session_name`, then `session_id`, then the path-derived fallback.
pub fn session_name(doc: &Document, marker: &str) -> Option<String> {
    header_value(doc, "session")
        .or_else(|| header_value(doc, "session_name"))
        .or_else(|| header_value(doc, "session_id"))
        .or_else(|| derive_session_name(&doc.path, marker))
}

/// Derive a session name from the path convention
/// `.../<marker>/<session>/...`: the component immediately following the
/// marker directory. Fails when the marker is absent or is the last
/// component.
pub fn derive_session_name(path: &Path, marker: &str) -> Option<String> {
    let parts: Vec<&str> = path
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => part.to_str(),
            _ => None,
        })
        .collect();

    let at = parts.iter().position(|part| *part == marker)?;
    parts.get(at + 1).map(|part| part.to_string())
}

/// Header lookup with empty values normalized to absent.
fn header_value(doc: &Document, key: &str) -> Option<String> {
    doc.header
        .get(key)
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}
