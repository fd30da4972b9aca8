//! Document normalizer
//!
//! Turns generator output (a text blob using `## Section` headers) into a
//! structured BRD. Every function here is total: malformed input degrades to
//! a partial or empty structure, never an error.

mod bullets;
mod model;
mod requirements;
mod sections;
mod stakeholders;

pub use bullets::{parse_bullets, strip_bullet_marker};
pub use model::{normalize, BrdDocument, DocumentState, SectionName};
pub use requirements::{
    extract_requirements, extract_requirements_with_prefix, parse_requirement_line, Requirement,
    FUNCTIONAL_PREFIX, NON_FUNCTIONAL_PREFIX,
};
pub use sections::{section_header, split_sections, ParsedDocument, SECTION_HEADER_PREFIX};
pub use stakeholders::{parse_stakeholders, StakeholderRow, DEFAULT_LEVEL};
