//! Injection of chat-suggested content into the raw document
//!
//! Injections edit the raw text rather than the parsed view, so the next
//! normalization pass picks them up like any other generated content.

use crate::document::{section_header, SECTION_HEADER_PREFIX};

/// Byte offset just past the end of the header line that receives bullets
/// for `section`, or `None` if there is no such line.
///
/// Header names are read the same way the section splitter reads them. The
/// last exact match wins, as it does when splitting; failing that, the last
/// header whose name starts with `section`.
fn find_header_line_end(raw: &str, section: &str) -> Option<usize> {
    let mut exact = None;
    let mut prefixed = None;
    let mut offset = 0;
    for line in raw.split_inclusive('\n') {
        offset += line.len();
        if let Some(name) = section_header(line) {
            if name == section {
                exact = Some(offset);
            } else if name.starts_with(section) {
                prefixed = Some(offset);
            }
        }
    }
    exact.or(prefixed)
}

/// Add a `- <text>` bullet to `section`.
///
/// If a header line for the section exists, the bullet goes directly after
/// it (the last one, when the header repeats) and the rest of the text is
/// untouched. Otherwise a new section is appended. Repeated calls for the same section never duplicate the header.
pub fn apply_injection(raw: &str, section: &str, text: &str) -> String {
    let bullet = format!("- {}", text);

    match find_header_line_end(raw, section) {
        Some(end) => {
            let mut out = String::with_capacity(raw.len() + bullet.len() + 1);
            out.push_str(&raw[..end]);
            if !raw[..end].ends_with('\n') {
                // header is the final line with no terminator
                out.push('\n');
                out.push_str(&bullet);
            } else {
                out.push_str(&bullet);
                out.push('\n');
            }
            out.push_str(&raw[end..]);
            out
        }
        None => format!("{}\n\n{}{}\n{}", raw, SECTION_HEADER_PREFIX, section, bullet),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{parse_bullets, split_sections};

    #[test]
    fn inserts_directly_after_existing_header() {
        let raw = "## Executive Summary\nA platform.\n\n## Risks\n- old risk\n\n## Timeline\n- Phase 1";
        let out = apply_injection(raw, "Risks", "New risk");

        assert!(out.contains("## Risks\n- New risk\n- old risk\n"));
        assert_eq!(out.matches("## Risks").count(), 1);
        assert_eq!(out.replacen("- New risk\n", "", 1), raw);
    }

    #[test]
    fn appends_missing_section() {
        let raw = "## Executive Summary\nA platform.";
        let out = apply_injection(raw, "Risks", "X");

        assert_eq!(out, "## Executive Summary\nA platform.\n\n## Risks\n- X");
        let doc = split_sections(&out);
        assert_eq!(parse_bullets(doc.get("Risks").unwrap()), vec!["X"]);
    }

    #[test]
    fn header_on_last_line_without_newline() {
        let out = apply_injection("## Intro\ntext\n## Risks", "Risks", "X");
        assert_eq!(out, "## Intro\ntext\n## Risks\n- X");
    }

    #[test]
    fn header_with_trailing_characters_matches() {
        let out = apply_injection("## Risks (updated)\n- a\n", "Risks", "b");
        assert_eq!(out, "## Risks (updated)\n- b\n- a\n");
    }

    #[test]
    fn header_must_start_the_line() {
        let raw = "See ## Risks below\n";
        let out = apply_injection(raw, "Risks", "X");
        assert_eq!(out, "See ## Risks below\n\n\n## Risks\n- X");
    }

    #[test]
    fn two_injections_share_one_header() {
        let once = apply_injection("## Intro\ntext", "Success Metrics", "first");
        let twice = apply_injection(&once, "Success Metrics", "second");

        assert_eq!(twice.matches("## Success Metrics").count(), 1);
        let doc = split_sections(&twice);
        assert_eq!(
            parse_bullets(doc.get("Success Metrics").unwrap()),
            vec!["second", "first"]
        );
    }

    #[test]
    fn repeated_header_takes_bullet_under_the_last_one() {
        let raw = "## Risks\n- a\n\n## Risks\n- b";
        let out = apply_injection(raw, "Risks", "NEW");

        assert_eq!(out, "## Risks\n- a\n\n## Risks\n- NEW\n- b");
        let doc = split_sections(&out);
        assert_eq!(parse_bullets(doc.get("Risks").unwrap()), vec!["NEW", "b"]);
    }

    #[test]
    fn header_spacing_matches_the_splitter() {
        let out = apply_injection("##  Risks\n- old", "Risks", "NEW");

        assert_eq!(out, "##  Risks\n- NEW\n- old");
        let doc = split_sections(&out);
        assert_eq!(parse_bullets(doc.get("Risks").unwrap()), vec!["NEW", "old"]);
    }

    #[test]
    fn exact_header_beats_longer_name() {
        let raw = "## Risks\n- a\n\n## Risks and Issues\n- b\n";
        let out = apply_injection(raw, "Risks", "c");
        assert_eq!(out, "## Risks\n- c\n- a\n\n## Risks and Issues\n- b\n");
    }

    #[test]
    fn crlf_content_is_preserved() {
        let raw = "## Risks\r\n- old\r\n";
        let out = apply_injection(raw, "Risks", "new");
        assert_eq!(out, "## Risks\r\n- new\n- old\r\n");
    }

    #[test]
    fn empty_document_gets_a_new_section() {
        let out = apply_injection("", "Any Section", "works");
        assert_eq!(split_sections(&out).get("Any Section"), Some("- works"));
    }
}
