//! Stakeholder table parsing
//!
//! Stakeholder bullets use pipe-delimited fields:
//! `Name | Role | Influence | Interest`.

use super::bullets::strip_bullet_marker;
use serde::{Deserialize, Serialize};

/// Value used when the influence or interest column is missing.
pub const DEFAULT_LEVEL: &str = "Medium";

/// One row of the stakeholder table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakeholderRow {
    pub name: String,
    pub role: String,
    pub influence: String,
    pub interest: String,
}

impl StakeholderRow {
    pub fn new(
        name: impl Into<String>,
        role: impl Into<String>,
        influence: impl Into<String>,
        interest: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            role: role.into(),
            influence: influence.into(),
            interest: interest.into(),
        }
    }
}

/// Parse a single line, returning `None` for lines that are not table rows.
fn parse_row(line: &str) -> Option<StakeholderRow> {
    let line = strip_bullet_marker(line);
    if !line.contains('|') {
        return None;
    }

    let fields: Vec<&str> = line.split('|').map(str::trim).collect();
    let field = |i: usize| fields.get(i).copied().unwrap_or("");
    let level = |i: usize| match field(i) {
        "" => DEFAULT_LEVEL,
        value => value,
    };

    let (name, role) = (field(0), field(1));
    if name.is_empty() || role.is_empty() {
        return None;
    }

    Some(StakeholderRow::new(name, role, level(2), level(3)))
}

/// Parse the body of the "Stakeholder Analysis" section.
///
/// Lines without a `|` are skipped, as are rows with an empty name or role.
/// Fields past the fourth are ignored.
pub fn parse_stakeholders(body: &str) -> Vec<StakeholderRow> {
    body.lines().filter_map(parse_row).collect()
}
