//! Generation pipeline
//!
//! Single write path from collected sources to the session store:
//! 1. Reject empty bundles before calling out
//! 2. Call the generator with the joined prompt
//! 3. Store the result, tagged live or demo

use super::generator::{DemoGenerator, GenerationError, Generator};
use super::sources::SourceBundle;
use crate::session::{DocumentOrigin, SessionStore};
use std::sync::Arc;

/// What a successful run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationReport {
    pub origin: DocumentOrigin,
    pub generator_id: String,
    pub bytes: usize,
    /// Upstream failure that caused a demo fallback, if any.
    pub fallback_reason: Option<String>,
}

/// Runs a generator and writes its output into the session store.
pub struct GenerationPipeline {
    store: Arc<SessionStore>,
    generator: Arc<dyn Generator>,
    fallback: Option<Arc<dyn Generator>>,
}

impl GenerationPipeline {
    pub fn new(store: Arc<SessionStore>, generator: Arc<dyn Generator>) -> Self {
        Self {
            store,
            generator,
            fallback: None,
        }
    }

    /// Pipeline that only ever produces the demo document.
    pub fn demo(store: Arc<SessionStore>) -> Self {
        Self::new(store, Arc::new(DemoGenerator))
    }

    /// Generator to use when the primary one fails.
    pub fn with_fallback(mut self, fallback: Arc<dyn Generator>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    /// Generate from `sources` and store the result.
    ///
    /// Upstream failures are returned as-is and leave the store untouched.
    pub async fn run(&self, sources: &SourceBundle) -> Result<GenerationReport, GenerationError> {
        if sources.is_empty() {
            return Err(GenerationError::NoSources);
        }

        let prompt = sources.prompt_text();
        tracing::info!(
            generator = self.generator.id(),
            artifacts = sources.len(),
            prompt_bytes = prompt.len(),
            "generating BRD"
        );

        let text = self.generator.generate(&prompt).await?;
        Ok(self.store_output(self.generator.as_ref(), text, None))
    }

    /// Like [`run`](Self::run), but an upstream failure switches to the
    /// fallback generator (the demo document when none is configured).
    ///
    /// The report carries the upstream error message. `NoSources` is still
    /// returned as an error.
    pub async fn run_with_fallback(
        &self,
        sources: &SourceBundle,
    ) -> Result<GenerationReport, GenerationError> {
        match self.run(sources).await {
            Err(GenerationError::Upstream(reason)) => {
                let fallback: Arc<dyn Generator> = self
                    .fallback
                    .clone()
                    .unwrap_or_else(|| Arc::new(DemoGenerator) as Arc<dyn Generator>);
                tracing::warn!(%reason, fallback = fallback.id(), "generation failed, using fallback");

                let text = fallback.generate(&sources.prompt_text()).await?;
                Ok(self.store_output(fallback.as_ref(), text, Some(reason)))
            }
            other => other,
        }
    }

    fn store_output(
        &self,
        generator: &dyn Generator,
        text: String,
        fallback_reason: Option<String>,
    ) -> GenerationReport {
        let origin = if fallback_reason.is_some() || generator.id() == DemoGenerator.id() {
            DocumentOrigin::Demo
        } else {
            DocumentOrigin::Live
        };
        let bytes = text.len();
        self.store.replace(text, origin);

        GenerationReport {
            origin,
            generator_id: generator.id().to_string(),
            bytes,
            fallback_reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::sources::{ArtifactKind, SourceArtifact};
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct EchoGenerator {
        prompts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Generator for EchoGenerator {
        fn id(&self) -> &str {
            "echo"
        }

        async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok(format!("## Executive Summary\n{}", prompt))
        }
    }

    struct FailingGenerator;

    #[async_trait]
    impl Generator for FailingGenerator {
        fn id(&self) -> &str {
            "failing"
        }

        async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
            Err(GenerationError::Upstream("503 Service Unavailable".into()))
        }
    }

    fn sources() -> SourceBundle {
        SourceBundle::new().with(SourceArtifact::new(
            ArtifactKind::Transcript,
            "kickoff.txt",
            "Build a food delivery platform",
        ))
    }

    #[tokio::test]
    async fn live_output_is_stored() {
        let store = Arc::new(SessionStore::new());
        let generator = Arc::new(EchoGenerator { prompts: Mutex::new(Vec::new()) });
        let pipeline = GenerationPipeline::new(store.clone(), generator.clone());

        let report = pipeline.run(&sources()).await.unwrap();

        assert_eq!(report.origin, DocumentOrigin::Live);
        assert_eq!(report.generator_id, "echo");
        assert!(report.fallback_reason.is_none());
        assert_eq!(store.origin(), Some(DocumentOrigin::Live));
        assert!(generator.prompts.lock().unwrap()[0].contains("kickoff.txt"));
    }

    #[tokio::test]
    async fn empty_sources_are_rejected_before_generation() {
        let store = Arc::new(SessionStore::new());
        let generator = Arc::new(EchoGenerator { prompts: Mutex::new(Vec::new()) });
        let pipeline = GenerationPipeline::new(store.clone(), generator.clone());

        let err = pipeline.run_with_fallback(&SourceBundle::new()).await.unwrap_err();
        assert!(matches!(err, GenerationError::NoSources));
        assert!(generator.prompts.lock().unwrap().is_empty());
        assert!(!store.has_document());
    }

    #[tokio::test]
    async fn upstream_failure_propagates_and_keeps_store() {
        let store = Arc::new(SessionStore::new());
        store.replace("## Risks\n- previous", DocumentOrigin::Live);
        let pipeline = GenerationPipeline::new(store.clone(), Arc::new(FailingGenerator));

        let err = pipeline.run(&sources()).await.unwrap_err();
        assert_eq!(err.to_string(), "generation service failed: 503 Service Unavailable");
        assert_eq!(store.raw().as_deref(), Some("## Risks\n- previous"));
    }

    #[tokio::test]
    async fn fallback_stores_demo_document() {
        let store = Arc::new(SessionStore::new());
        let pipeline = GenerationPipeline::new(store.clone(), Arc::new(FailingGenerator));

        let report = pipeline.run_with_fallback(&sources()).await.unwrap();

        assert_eq!(report.origin, DocumentOrigin::Demo);
        assert_eq!(report.generator_id, "demo");
        assert_eq!(report.fallback_reason.as_deref(), Some("503 Service Unavailable"));
        assert!(store.is_demo());
        assert!(store.normalize().is_ready());
    }

    #[tokio::test]
    async fn demo_pipeline_marks_demo_origin() {
        let store = Arc::new(SessionStore::new());
        let report = GenerationPipeline::demo(store.clone()).run(&sources()).await.unwrap();
        assert_eq!(report.origin, DocumentOrigin::Demo);
        assert!(store.is_demo());
    }
}
