//! Display rendering for normalized documents
//!
//! Canonical sections are rendered in their fixed order and numbered as they
//! appear; absent ones are skipped. Headers outside the canonical set follow
//! at the end with their bodies verbatim.

use crate::document::{BrdDocument, DocumentState, Requirement, SectionName, StakeholderRow};
use pulldown_cmark::{html, Options, Parser};
use std::fmt::Write;
use thiserror::Error;

/// Shown when nothing has been generated in this session.
pub const NOT_GENERATED_MESSAGE: &str =
    "No BRD has been generated yet. Upload project artifacts and run generation first.";

/// Shown when generated text contains no `## ` sections.
pub const UNSTRUCTURED_MESSAGE: &str =
    "The generated document contains no recognizable sections.";

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderFormat {
    #[default]
    Text,
    Markdown,
    Html,
    Json,
}

/// Render a document state in the requested format.
pub fn render(state: &DocumentState, format: RenderFormat) -> Result<String, RenderError> {
    Ok(match format {
        RenderFormat::Json => serde_json::to_string_pretty(state)?,
        RenderFormat::Text => render_state(state, format, render_text),
        RenderFormat::Markdown => render_state(state, format, render_markdown),
        RenderFormat::Html => {
            render_state(state, format, |doc| markdown_to_html(&render_markdown(doc)))
        }
    })
}

fn render_state(state: &DocumentState, format: RenderFormat, f: fn(&BrdDocument) -> String) -> String {
    match state {
        DocumentState::NotGenerated => empty_state(NOT_GENERATED_MESSAGE, format),
        DocumentState::Unstructured => empty_state(UNSTRUCTURED_MESSAGE, format),
        DocumentState::Ready(doc) => f(doc),
    }
}

fn empty_state(message: &str, format: RenderFormat) -> String {
    match format {
        RenderFormat::Html => format!("<p class=\"empty-state\">{}</p>\n", message),
        _ => format!("{}\n", message),
    }
}

/// Convert Markdown to HTML with table support.
pub fn markdown_to_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    let parser = Parser::new_ext(markdown, options);

    let mut out = String::new();
    html::push_html(&mut out, parser);
    out
}

/// Canonical sections present in `doc`, in display order.
fn present_sections(doc: &BrdDocument) -> impl Iterator<Item = SectionName> + '_ {
    SectionName::ALL.into_iter().filter(move |s| doc.has_section(*s))
}

fn requirement_line(req: &Requirement) -> String {
    if req.has_detail() {
        format!("{}: {}", req.title, req.detail)
    } else {
        req.title.clone()
    }
}

/// Render as Markdown: stakeholders become a table, requirements carry
/// their IDs in bold.
pub fn render_markdown(doc: &BrdDocument) -> String {
    let mut out = String::from("# Business Requirements Document\n");

    for (number, section) in present_sections(doc).enumerate() {
        let _ = write!(out, "\n## {}. {}\n\n", number + 1, section);
        match section {
            SectionName::ExecutiveSummary => {
                out.push_str(doc.executive_summary.as_deref().unwrap_or(""));
                out.push('\n');
            }
            SectionName::StakeholderAnalysis => markdown_stakeholders(&mut out, &doc.stakeholders),
            SectionName::FunctionalRequirements => {
                markdown_requirements(&mut out, &doc.functional_requirements)
            }
            SectionName::NonFunctionalRequirements => {
                markdown_requirements(&mut out, &doc.non_functional_requirements)
            }
            _ => markdown_bullets(&mut out, bullets_for(doc, section)),
        }
    }

    for name in doc.extra_sections() {
        let _ = write!(out, "\n## {}\n\n{}\n", name, doc.sections.get(name).unwrap_or(""));
    }

    out
}

fn bullets_for(doc: &BrdDocument, section: SectionName) -> &[String] {
    match section {
        SectionName::BusinessObjectives => &doc.business_objectives,
        SectionName::Assumptions => &doc.assumptions,
        SectionName::Risks => &doc.risks,
        SectionName::Timeline => &doc.timeline,
        SectionName::SuccessMetrics => &doc.success_metrics,
        _ => &[],
    }
}

fn markdown_bullets(out: &mut String, items: &[String]) {
    if items.is_empty() {
        out.push_str("_No items._\n");
    }
    for item in items {
        let _ = writeln!(out, "- {}", item);
    }
}

fn markdown_stakeholders(out: &mut String, rows: &[StakeholderRow]) {
    if rows.is_empty() {
        out.push_str("_No stakeholders listed._\n");
        return;
    }
    out.push_str("| Name | Role | Influence | Interest |\n");
    out.push_str("| --- | --- | --- | --- |\n");
    for row in rows {
        let _ = writeln!(
            out,
            "| {} | {} | {} | {} |",
            row.name, row.role, row.influence, row.interest
        );
    }
}

fn markdown_requirements(out: &mut String, reqs: &[Requirement]) {
    if reqs.is_empty() {
        out.push_str("_No requirements listed._\n");
    }
    for req in reqs {
        let _ = writeln!(out, "- **{}** {}", req.id, requirement_line(req));
    }
}

/// Render as plain text for a terminal.
pub fn render_text(doc: &BrdDocument) -> String {
    let mut out = String::from("BUSINESS REQUIREMENTS DOCUMENT\n");

    for (number, section) in present_sections(doc).enumerate() {
        let title = format!("{}. {}", number + 1, section);
        let _ = write!(out, "\n{}\n{}\n", title, "-".repeat(title.chars().count()));
        match section {
            SectionName::ExecutiveSummary => {
                let _ = writeln!(out, "{}", doc.executive_summary.as_deref().unwrap_or(""));
            }
            SectionName::StakeholderAnalysis => text_stakeholders(&mut out, &doc.stakeholders),
            SectionName::FunctionalRequirements => {
                text_requirements(&mut out, &doc.functional_requirements)
            }
            SectionName::NonFunctionalRequirements => {
                text_requirements(&mut out, &doc.non_functional_requirements)
            }
            _ => {
                for item in bullets_for(doc, section) {
                    let _ = writeln!(out, "  * {}", item);
                }
            }
        }
    }

    for name in doc.extra_sections() {
        let _ = write!(out, "\n{}\n{}\n", name, "-".repeat(name.chars().count()));
        let _ = writeln!(out, "{}", doc.sections.get(name).unwrap_or(""));
    }

    out
}

fn text_stakeholders(out: &mut String, rows: &[StakeholderRow]) {
    let name_width = rows.iter().map(|r| r.name.chars().count()).max().unwrap_or(0).max(4);
    let role_width = rows.iter().map(|r| r.role.chars().count()).max().unwrap_or(0).max(4);

    let _ = writeln!(
        out,
        "  {:<nw$}  {:<rw$}  {:<9}  {}",
        "Name",
        "Role",
        "Influence",
        "Interest",
        nw = name_width,
        rw = role_width
    );
    for row in rows {
        let _ = writeln!(
            out,
            "  {:<nw$}  {:<rw$}  {:<9}  {}",
            row.name,
            row.role,
            row.influence,
            row.interest,
            nw = name_width,
            rw = role_width
        );
    }
}

fn text_requirements(out: &mut String, reqs: &[Requirement]) {
    for req in reqs {
        let _ = writeln!(out, "  [{}] {}", req.id, requirement_line(req));
    }
}
