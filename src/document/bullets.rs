//! Bullet list parsing
//!
//! Section bodies from the generator are loosely formatted: some lines carry
//! a `-`, `*` or `•` marker, some carry none. Every non-blank line becomes an
//! item, in document order.

/// Markers recognised at the start of a bullet line.
const BULLET_MARKERS: [char; 3] = ['-', '*', '•'];

/// Strip a single leading bullet marker (and the whitespace around it).
///
/// Lines without a marker are returned trimmed but otherwise unchanged.
pub fn strip_bullet_marker(line: &str) -> &str {
    let trimmed = line.trim();
    match trimmed.strip_prefix(BULLET_MARKERS) {
        Some(rest) => rest.trim(),
        None => trimmed,
    }
}

/// Split a section body into bullet items.
///
/// Blank lines (and lines that are only a marker) are dropped. Order is
/// preserved, so timeline phases stay in sequence.
pub fn parse_bullets(body: &str) -> Vec<String> {
    body.lines()
        .map(strip_bullet_marker)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}
