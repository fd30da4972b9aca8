//! Common test utilities for BRD integration tests
//!
//! Builds raw BRD text with a chosen set of canonical sections.

#![allow(dead_code)]

use structify::SectionName;

/// Sample body for each canonical section.
pub fn sample_body(section: SectionName) -> &'static str {
    match section {
        SectionName::ExecutiveSummary => "A food delivery platform connecting restaurants and couriers.",
        SectionName::BusinessObjectives => "- Launch in three cities\n- Reach 10,000 weekly orders",
        SectionName::StakeholderAnalysis => {
            "- Jane Doe | Product Manager | High | High\n- Raj Patel | Ops Lead | Medium | High"
        }
        SectionName::FunctionalRequirements => {
            "- FR-01: Login - allow sign in with email\n- FR-02: Ordering – place an order\n- Track couriers live"
        }
        SectionName::NonFunctionalRequirements => "- NFR-01: Latency - p95 under 300 ms",
        SectionName::Assumptions => "- Restaurants provide menus in advance",
        SectionName::Risks => "- Payment failures",
        SectionName::Timeline => "- Phase 1: Pilot\n- Phase 2: Rollout",
        SectionName::SuccessMetrics => "- 95% on-time deliveries",
    }
}

/// Builder for raw BRD text.
#[derive(Debug, Clone)]
pub struct BrdFixture {
    sections: Vec<SectionName>,
    preamble: Option<String>,
}

impl Default for BrdFixture {
    fn default() -> Self {
        Self {
            sections: SectionName::ALL.to_vec(),
            preamble: None,
        }
    }
}

impl BrdFixture {
    /// All nine canonical sections.
    pub fn full() -> Self {
        Self::default()
    }

    pub fn without(mut self, section: SectionName) -> Self {
        self.sections.retain(|s| *s != section);
        self
    }

    pub fn only(sections: &[SectionName]) -> Self {
        Self {
            sections: sections.to_vec(),
            preamble: None,
        }
    }

    pub fn with_preamble(mut self, text: impl Into<String>) -> Self {
        self.preamble = Some(text.into());
        self
    }

    pub fn build(&self) -> String {
        let mut out = String::new();
        if let Some(preamble) = &self.preamble {
            out.push_str(preamble);
            out.push_str("\n\n");
        }
        for section in &self.sections {
            out.push_str(&format!("## {}\n{}\n\n", section, sample_body(*section)));
        }
        out
    }
}
