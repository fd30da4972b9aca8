//! Uploaded project artifacts
//!
//! The collection stage gathers three kinds of input: meeting transcripts,
//! emails, and documents. The generator sees them as one prompt text.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Category an artifact was uploaded under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    Transcript,
    Email,
    Document,
}

impl ArtifactKind {
    pub fn label(&self) -> &'static str {
        match self {
            ArtifactKind::Transcript => "Meeting transcript",
            ArtifactKind::Email => "Email",
            ArtifactKind::Document => "Document",
        }
    }
}

/// One uploaded file's extracted text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceArtifact {
    pub kind: ArtifactKind,
    pub name: String,
    pub text: String,
}

impl SourceArtifact {
    pub fn new(kind: ArtifactKind, name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            text: text.into(),
        }
    }

    /// Read an artifact from disk, naming it after the file.
    pub fn from_path(kind: ArtifactKind, path: &Path) -> std::io::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::new(kind, name, text))
    }

    /// Size label as shown in the upload list, e.g. `1.5 KB`.
    pub fn size_label(&self) -> String {
        format!("{:.1} KB", self.text.len() as f64 / 1024.0)
    }
}

/// The artifacts collected for a single generation request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceBundle {
    artifacts: Vec<SourceArtifact>,
}

impl SourceBundle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, artifact: SourceArtifact) -> Self {
        self.push(artifact);
        self
    }

    pub fn push(&mut self, artifact: SourceArtifact) {
        self.artifacts.push(artifact);
    }

    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    /// True when there is nothing to generate from. Artifacts whose text is
    /// blank do not count.
    pub fn is_empty(&self) -> bool {
        self.artifacts.iter().all(|a| a.text.trim().is_empty())
    }

    /// Join all artifacts into one prompt, each under a banner naming its
    /// category and file. Blank artifacts are skipped.
    pub fn prompt_text(&self) -> String {
        self.artifacts
            .iter()
            .filter(|a| !a.text.trim().is_empty())
            .map(|a| format!("=== {}: {} ===\n{}", a.kind.label(), a.name, a.text.trim()))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}
