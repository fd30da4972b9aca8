//! Collection and generation stage
//!
//! Uploaded artifacts are bundled into a prompt, handed to a [`Generator`],
//! and the returned text becomes the session's raw document.

mod generator;
mod pipeline;
mod sources;

pub use generator::{DemoGenerator, GenerationError, Generator, DEMO_BRD};
pub use pipeline::{GenerationPipeline, GenerationReport};
pub use sources::{ArtifactKind, SourceArtifact, SourceBundle};
