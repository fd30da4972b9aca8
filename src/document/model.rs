//! Normalized BRD model
//!
//! `normalize` turns the stored raw text (if any) into the structure the
//! view renders. It is pure and cheap enough to run on every render.

use super::bullets::parse_bullets;
use super::requirements::{extract_requirements, extract_requirements_with_prefix, Requirement, NON_FUNCTIONAL_PREFIX};
use super::sections::{split_sections, ParsedDocument};
use super::stakeholders::{parse_stakeholders, StakeholderRow};
use serde::{Deserialize, Serialize};

/// The canonical BRD sections, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SectionName {
    ExecutiveSummary,
    BusinessObjectives,
    StakeholderAnalysis,
    FunctionalRequirements,
    NonFunctionalRequirements,
    Assumptions,
    Risks,
    Timeline,
    SuccessMetrics,
}

impl SectionName {
    pub const ALL: [SectionName; 9] = [
        SectionName::ExecutiveSummary,
        SectionName::BusinessObjectives,
        SectionName::StakeholderAnalysis,
        SectionName::FunctionalRequirements,
        SectionName::NonFunctionalRequirements,
        SectionName::Assumptions,
        SectionName::Risks,
        SectionName::Timeline,
        SectionName::SuccessMetrics,
    ];

    /// The exact header text used in raw documents.
    pub fn as_str(&self) -> &'static str {
        match self {
            SectionName::ExecutiveSummary => "Executive Summary",
            SectionName::BusinessObjectives => "Business Objectives",
            SectionName::StakeholderAnalysis => "Stakeholder Analysis",
            SectionName::FunctionalRequirements => "Functional Requirements",
            SectionName::NonFunctionalRequirements => "Non-Functional Requirements",
            SectionName::Assumptions => "Assumptions",
            SectionName::Risks => "Risks",
            SectionName::Timeline => "Timeline",
            SectionName::SuccessMetrics => "Success Metrics",
        }
    }

    /// Look up a canonical section by its exact header text.
    pub fn from_header(header: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == header)
    }
}

impl std::fmt::Display for SectionName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A BRD with every canonical section parsed into its display shape.
///
/// Missing sections show up as `None` / empty lists. `sections` keeps the
/// raw split, including any non-canonical headers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrdDocument {
    pub sections: ParsedDocument,
    pub executive_summary: Option<String>,
    pub business_objectives: Vec<String>,
    pub stakeholders: Vec<StakeholderRow>,
    pub functional_requirements: Vec<Requirement>,
    pub non_functional_requirements: Vec<Requirement>,
    pub assumptions: Vec<String>,
    pub risks: Vec<String>,
    pub timeline: Vec<String>,
    pub success_metrics: Vec<String>,
}

impl BrdDocument {
    /// Build the typed view from an already split document.
    pub fn from_sections(sections: ParsedDocument) -> Self {
        let body = |name: SectionName| sections.get(name.as_str()).unwrap_or("");
        let bullets = |name: SectionName| parse_bullets(body(name));

        Self {
            executive_summary: sections
                .get(SectionName::ExecutiveSummary.as_str())
                .map(str::to_string),
            business_objectives: bullets(SectionName::BusinessObjectives),
            stakeholders: parse_stakeholders(body(SectionName::StakeholderAnalysis)),
            functional_requirements: extract_requirements(body(SectionName::FunctionalRequirements)),
            non_functional_requirements: extract_requirements_with_prefix(
                body(SectionName::NonFunctionalRequirements),
                NON_FUNCTIONAL_PREFIX,
            ),
            assumptions: bullets(SectionName::Assumptions),
            risks: bullets(SectionName::Risks),
            timeline: bullets(SectionName::Timeline),
            success_metrics: bullets(SectionName::SuccessMetrics),
            sections,
        }
    }

    /// Number of sections found in the source text.
    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    pub fn has_section(&self, name: SectionName) -> bool {
        self.sections.contains(name.as_str())
    }

    /// Canonical sections absent from the source text.
    pub fn missing_sections(&self) -> Vec<SectionName> {
        SectionName::ALL
            .into_iter()
            .filter(|s| !self.has_section(*s))
            .collect()
    }

    /// Headers present in the source that are not canonical sections.
    pub fn extra_sections(&self) -> Vec<&str> {
        self.sections
            .names()
            .filter(|name| SectionName::from_header(name).is_none())
            .collect()
    }
}

/// What the view has to render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "document", rename_all = "snake_case")]
pub enum DocumentState {
    /// Nothing has been generated yet.
    NotGenerated,
    /// Text exists but contains no usable `## ` sections.
    Unstructured,
    /// At least one section was found.
    Ready(Box<BrdDocument>),
}

impl DocumentState {
    pub fn is_ready(&self) -> bool {
        matches!(self, DocumentState::Ready(_))
    }

    pub fn document(&self) -> Option<&BrdDocument> {
        match self {
            DocumentState::Ready(doc) => Some(doc),
            _ => None,
        }
    }
}

/// Normalize the stored raw document for display.
///
/// `None` means no document exists yet; it is reported separately from a
/// document that yields no sections.
pub fn normalize(raw: Option<&str>) -> DocumentState {
    let Some(raw) = raw else {
        return DocumentState::NotGenerated;
    };

    let sections = split_sections(raw);
    if sections.is_empty() {
        tracing::debug!(bytes = raw.len(), "document has no sections");
        return DocumentState::Unstructured;
    }

    DocumentState::Ready(Box::new(BrdDocument::from_sections(sections)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
## Executive Summary
This project builds a food delivery platform.

## Stakeholder Analysis
- Jane Doe | PM | High | Medium

## Functional Requirements
- FR-01: User login - email and password
- Order food

## Non-Functional Requirements
- Encrypt payment data

## Timeline
- Phase 1: Upload
- Phase 2: Processing

## Appendix
Glossary
";

    #[test]
    fn missing_document_is_not_generated() {
        assert_eq!(normalize(None), DocumentState::NotGenerated);
    }

    #[test]
    fn headerless_text_is_unstructured() {
        assert_eq!(normalize(Some("")), DocumentState::Unstructured);
        assert_eq!(
            normalize(Some("Executive Summary:\nThis project builds a platform.")),
            DocumentState::Unstructured
        );
    }

    #[test]
    fn sections_are_parsed_into_typed_fields() {
        let state = normalize(Some(SAMPLE));
        let doc = state.document().unwrap();

        assert_eq!(
            doc.executive_summary.as_deref(),
            Some("This project builds a food delivery platform.")
        );
        assert_eq!(doc.stakeholders.len(), 1);
        assert_eq!(doc.functional_requirements.len(), 2);
        assert_eq!(doc.functional_requirements[0].detail, "email and password");
        assert_eq!(doc.functional_requirements[1].id, "FR-02");
        assert_eq!(doc.non_functional_requirements[0].id, "NFR-01");
        assert_eq!(doc.timeline, vec!["Phase 1: Upload", "Phase 2: Processing"]);
        assert!(doc.business_objectives.is_empty());
    }

    #[test]
    fn missing_and_extra_sections() {
        let state = normalize(Some(SAMPLE));
        let doc = state.document().unwrap();

        assert_eq!(doc.section_count(), 6);
        assert_eq!(doc.extra_sections(), vec!["Appendix"]);
        assert_eq!(
            doc.missing_sections(),
            vec![
                SectionName::BusinessObjectives,
                SectionName::Assumptions,
                SectionName::Risks,
                SectionName::SuccessMetrics,
            ]
        );
    }

    #[test]
    fn section_names_round_trip_through_headers() {
        for name in SectionName::ALL {
            assert_eq!(SectionName::from_header(name.as_str()), Some(name));
        }
        assert_eq!(SectionName::from_header("risks"), None);
    }

    #[test]
    fn normalize_is_repeatable() {
        assert_eq!(normalize(Some(SAMPLE)), normalize(Some(SAMPLE)));
    }
}
