//! Frontmatter and body parsing for handoff artifacts.
//!
//! Artifacts are loosely formatted: an optional header block delimited by
//! `---` lines, followed by free text. Parsing never fails — a document
//! without a recognizable header is a document with an empty header, which
//! legacy and plain files rely on.
//!
//! Two scanners cover the body: [`extract_scalar`] for single-line
//! `key: value` fields and [`extract_section`] for sections written either
//! inline (`worked: [a, b]`) or block-form (`worked:` on its own line,
//! content below, terminated by the next top-level key). Both share the
//! same column-zero boundary rule, so there is exactly one definition of
//! what opens a new section.

use std::collections::HashMap;
use std::path::PathBuf;

use crate::models::{ArtifactFormat, Document};

/// Parse one raw artifact into a [`Document`].
pub fn parse(path: PathBuf, raw: String) -> Document {
    let (header, body) = split_frontmatter(&raw);
    Document {
        format: ArtifactFormat::from_path(&path),
        path,
        header,
        body,
        raw,
    }
}

/// Split the leading frontmatter block from the body.
///
/// The header must open with a `---` line at the very start of the text,
/// carry `key: value` lines, and close with another `---` line that is
/// itself followed by the body. Anything else yields an empty header and
/// the entire input as body. Line endings are normalized (CR-LF to LF)
/// first, so detection is platform-independent.
///
/// Header lines without a separator are ignored; keys and values are
/// trimmed, one layer of surrounding quotes is stripped from values, and a
/// duplicated key keeps its last occurrence.
pub fn split_frontmatter(raw: &str) -> (HashMap<String, String>, String) {
    let text = raw.replace("\r\n", "\n");
    let lines: Vec<&str> = text.split('\n').collect();

    if lines.len() < 3 || !is_delimiter(lines[0]) {
        return (HashMap::new(), text);
    }

    // The closing delimiter must be followed by at least one more line,
    // i.e. the original text had a newline after it.
    let close = match lines[1..].iter().position(|line| is_delimiter(line)) {
        Some(offset) if offset + 2 < lines.len() => offset + 1,
        _ => return (HashMap::new(), text),
    };

    let mut header = HashMap::new();
    for line in &lines[1..close] {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        header.insert(key.trim().to_string(), unquote(value.trim()).to_string());
    }

    let body = lines[close + 1..].join("\n");
    (header, body)
}

/// Extract the value of a top-level `key: value` line.
///
/// The key must sit at column zero; nested occurrences do not match.
/// Returns the trimmed value of the first line carrying one, absent when
/// no such line exists.
pub fn extract_scalar(body: &str, key: &str) -> Option<String> {
    let text = body.replace("\r\n", "\n");
    for line in text.split('\n') {
        let Some(value) = line.strip_prefix(key).and_then(|rest| rest.strip_prefix(':')) else {
            continue;
        };
        let value = value.trim();
        if !value.is_empty() {
            return Some(value.to_string());
        }
    }
    None
}

/// Extract a top-level section as raw text.
///
/// If the `key:` line carries trailing content, that content (trimmed) is
/// the result. Otherwise every following line up to — but not including —
/// the next top-level key is collected, joined, and trimmed; an empty
/// result is absent. This supports both inline scalar/list syntax and
/// block syntax for the same key without a dedicated grammar.
pub fn extract_section(body: &str, key: &str) -> Option<String> {
    let text = body.replace("\r\n", "\n");
    let lines: Vec<&str> = text.split('\n').collect();

    let start = lines.iter().position(|line| {
        line.strip_prefix(key)
            .is_some_and(|rest| rest.starts_with(':'))
    })?;

    let inline = lines[start][key.len() + 1..].trim();
    if !inline.is_empty() {
        return Some(inline.to_string());
    }

    let mut collected = Vec::new();
    for line in &lines[start + 1..] {
        if is_top_level_key(line) {
            break;
        }
        collected.push(*line);
    }

    let joined = collected.join("\n");
    let trimmed = joined.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// A frontmatter delimiter: `---` alone on its line, trailing whitespace
/// allowed.
fn is_delimiter(line: &str) -> bool {
    line.trim_end() == "---"
}

/// A line that opens a new top-level section: an identifier
/// (`[A-Za-z_][A-Za-z0-9_]*`) immediately followed by a colon at column
/// zero.
fn is_top_level_key(line: &str) -> bool {
    let mut chars = line.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }
    for c in chars {
        if c == ':' {
            return true;
        }
        if !c.is_ascii_alphanumeric() && c != '_' {
            return false;
        }
    }
    false
}

/// Strip one layer of surrounding quotes when the value is wrapped in a
/// matching pair.
fn unquote(value: &str) -> &str {
    let bytes = value.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if first == last && (first == b'"' || first == b'\'') {
            return &value[1..value.len() - 1];
        }
    }
    value
}
