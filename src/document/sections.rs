//! Section splitting
//!
//! A raw BRD is a flat text blob in which every top-level section starts on a
//! line of the form `## <Section Name>`. The body runs until the next such
//! line or the end of the text.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Prefix introducing a top-level section header.
pub const SECTION_HEADER_PREFIX: &str = "## ";

/// Section name to trimmed body text, as found in a raw document.
///
/// Keys are exactly the headers present in the source. When a header appears
/// twice the later body wins. Lookups go through well-known names, so the
/// ordering of the underlying map carries no meaning.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParsedDocument {
    sections: BTreeMap<String, String>,
}

impl ParsedDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Body of the named section, if present.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.sections.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.sections.contains_key(name)
    }

    /// Number of sections with a non-empty body.
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Iterate over `(name, body)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.sections.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Section names present in the document.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }

    fn insert(&mut self, name: String, body: String) {
        self.sections.insert(name, body);
    }
}

/// If `line` is a section header, return the trimmed header name.
///
/// `### Sub` and `##NoSpace` are not section headers.
pub fn section_header(line: &str) -> Option<&str> {
    line.strip_prefix(SECTION_HEADER_PREFIX).map(str::trim)
}

/// Split raw text into sections.
///
/// Text before the first header is ignored. A header whose body is empty once
/// trimmed is dropped rather than stored as an empty string, so an empty result
/// means "no document" to callers.
pub fn split_sections(raw: &str) -> ParsedDocument {
    let mut doc = ParsedDocument::new();
    let mut current: Option<(&str, Vec<&str>)> = None;

    for line in raw.lines() {
        if let Some(name) = section_header(line) {
            if let Some((prev, body)) = current.take() {
                commit_section(&mut doc, prev, &body);
            }
            current = Some((name, Vec::new()));
        } else if let Some((_, body)) = current.as_mut() {
            body.push(line);
        }
    }
    if let Some((prev, body)) = current {
        commit_section(&mut doc, prev, &body);
    }

    tracing::debug!(sections = doc.len(), "split raw document into sections");
    doc
}

fn commit_section(doc: &mut ParsedDocument, name: &str, body: &[&str]) {
    let text = body.join("\n");
    let text = text.trim();
    if name.is_empty() || text.is_empty() {
        tracing::debug!(section = name, "dropping empty section");
        return;
    }
    doc.insert(name.to_string(), text.to_string());
}
