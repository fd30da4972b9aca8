//! Generator seam
//!
//! The generation service is a black box: prompt text in, BRD text out.
//! Implementations wrap whatever backend is available. The crate ships only
//! the demo generator.

use async_trait::async_trait;
use thiserror::Error;

/// Errors from the generation stage.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("no source material to generate from")]
    NoSources,

    #[error("generation service failed: {0}")]
    Upstream(String),
}

/// A backend that turns collected source text into BRD text.
///
/// Output is expected (not required) to use `## <Section>` headers.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Identifier used in logs.
    fn id(&self) -> &str;

    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}

/// The canned demonstration BRD.
pub const DEMO_BRD: &str = "\
## Executive Summary
Project Alpha overhauls the current monolithic application into a scalable, microservices-based system. The transformation targets a 40% reduction in downtime, more frequent deployments, and independent scaling of critical business domains, starting with user authentication and payment processing.

## Business Objectives
- Reduce deployment time: decrease average deployment time from 4 hours to under 30 minutes
- Improve system reliability: achieve 99.99% uptime for core services
- Enable independent scaling of the authentication and payment domains

## Stakeholder Analysis
- Sarah Jenkins | Chief Technology Officer | High | High
- David Chen | Lead Architect | High | Medium
- Emily Ross | Product Manager | Medium | High

## Functional Requirements
- FR-01: User Authentication Service Migration - authenticate users via OAuth 2.0 and accept existing basic auth tokens during the transition
- FR-02: Payment Gateway Integration - integrate the payment service with Stripe API v3 with idempotent transaction requests
- FR-03: Order Tracking - customers can track delivery status in real time

## Non-Functional Requirements
- NFR-01: Availability - 99.99% uptime for authentication and payments
- NFR-02: Latency - p95 API response under 300 ms

## Assumptions
- Existing basic auth tokens remain valid for the transitional phase
- Stripe API v3 remains available without breaking changes

## Risks
- Payment failures during migration cutover
- Duration of the authentication transition is not specified in source documents

## Timeline
- Phase 1: Upload and collection of project artifacts
- Phase 2: Processing and service extraction
- Phase 3: BRD generation and sign-off

## Success Metrics
- Deployment time under 30 minutes for 95% of releases
- Zero payment data incidents during migration
";

/// Returns [`DEMO_BRD`] for any prompt.
#[derive(Debug, Clone, Copy, Default)]
pub struct DemoGenerator;

#[async_trait]
impl Generator for DemoGenerator {
    fn id(&self) -> &str {
        "demo"
    }

    async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
        Ok(DEMO_BRD.to_string())
    }
}
