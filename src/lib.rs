//! Structify: business requirements document normalizer and chat assistant
//!
//! Turns generator output into a structured Business Requirements Document
//! (BRD) and drives a keyword-rule chat assistant that can edit it.
//!
//! # Core Concepts
//!
//! - **Raw document**: a text blob with `## Section` headers, held in a
//!   [`SessionStore`]
//! - **Normalization**: [`normalize`] splits the raw text into sections and
//!   parses bullets, stakeholder rows and requirements
//! - **Injection**: chat rules may append a bullet to a section of the raw
//!   document; views re-normalize on the store's change signal
//!
//! # Example
//!
//! ```
//! use structify::{normalize, DocumentState};
//!
//! let state = normalize(Some("## Risks\n- Payment failures"));
//! let doc = state.document().unwrap();
//! assert_eq!(doc.risks, vec!["Payment failures"]);
//!
//! assert_eq!(normalize(None), DocumentState::NotGenerated);
//! ```

pub mod chat;
pub mod document;
pub mod generate;
pub mod render;
pub mod session;

pub use chat::{
    apply_injection, ChatEngine, ChatMessage, ChatState, Injection, InjectionRule, RejectReason,
    ResponseDelay, RuleTable, RuleTableError, Sender, TurnOutcome,
};
pub use document::{
    extract_requirements, normalize, parse_bullets, parse_stakeholders, split_sections,
    BrdDocument, DocumentState, ParsedDocument, Requirement, SectionName, StakeholderRow,
};
pub use generate::{
    ArtifactKind, DemoGenerator, GenerationError, GenerationPipeline, GenerationReport, Generator,
    SourceArtifact, SourceBundle,
};
pub use render::{render, RenderError, RenderFormat};
pub use session::{DocumentChanged, DocumentOrigin, SessionSnapshot, SessionStore};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
