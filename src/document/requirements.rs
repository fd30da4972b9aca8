//! Requirement extraction
//!
//! Requirement bullets are expected to look like
//! `FR-01: Title - optional detail`, but the generator output is not schema
//! validated. Lines that do not follow the convention still become
//! requirements with a synthesized ID.

use super::bullets::parse_bullets;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// `(FR|NFR)-<digits>`, a separator, a title, and an optional detail clause.
///
/// The detail separator is a colon or en-dash (spacing optional) or a hyphen
/// surrounded by whitespace, so hyphenated words stay in the title.
static REQUIREMENT_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^((?:FR|NFR)-\d+)\s*[:\-–]\s*(.+?)(?:(?:\s*[:–]\s*|\s+-\s+)(.+))?$")
        .expect("requirement pattern compiles")
});

/// ID prefix used for synthesized functional requirement IDs.
pub const FUNCTIONAL_PREFIX: &str = "FR";

/// ID prefix used for synthesized non-functional requirement IDs.
pub const NON_FUNCTIONAL_PREFIX: &str = "NFR";

/// A single requirement bullet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirement {
    /// Upper-cased source ID (`FR-01`) or a synthesized one.
    pub id: String,
    pub title: String,
    /// Empty when the line carries no detail clause.
    pub detail: String,
}

impl Requirement {
    pub fn new(id: impl Into<String>, title: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            detail: detail.into(),
        }
    }

    pub fn has_detail(&self) -> bool {
        !self.detail.is_empty()
    }
}

/// Synthesize an ID from a 0-based position: `FR-01`, `FR-02`, ...
fn synthesized_id(prefix: &str, index: usize) -> String {
    format!("{}-{:02}", prefix, index + 1)
}

/// Parse one bullet line into a requirement.
///
/// `index` is the 0-based position of the line in its section and is only
/// used when the line has no recognizable ID.
pub fn parse_requirement_line(line: &str, index: usize, prefix: &str) -> Requirement {
    match REQUIREMENT_LINE.captures(line) {
        Some(caps) => {
            let id = caps.get(1).map_or("", |m| m.as_str()).to_uppercase();
            let title = caps.get(2).map_or("", |m| m.as_str()).trim();
            let detail = caps.get(3).map_or("", |m| m.as_str()).trim();
            Requirement::new(id, title, detail)
        }
        None => Requirement::new(synthesized_id(prefix, index), line, ""),
    }
}

/// Extract requirements from a section body, synthesizing `FR-NN` IDs.
pub fn extract_requirements(body: &str) -> Vec<Requirement> {
    extract_requirements_with_prefix(body, FUNCTIONAL_PREFIX)
}

/// Extract requirements from a section body, synthesizing `<prefix>-NN` IDs
/// for lines that carry none.
pub fn extract_requirements_with_prefix(body: &str, prefix: &str) -> Vec<Requirement> {
    parse_bullets(body)
        .iter()
        .enumerate()
        .map(|(index, line)| parse_requirement_line(line, index, prefix))
        .collect()
}
