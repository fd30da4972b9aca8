//! Keyword rule table
//!
//! An ordered list of rules, each a set of keywords with a canned response
//! and an optional injection. Matching is a case-insensitive substring test
//! and the first matching rule wins, so declaration order is significant.
//! Input that matches nothing gets the fallback rule.

use crate::document::SectionName;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors loading a custom rule table.
#[derive(Debug, Error)]
pub enum RuleTableError {
    #[error("cannot read rule table {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid rule table: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("rule {index}: {reason}")]
    InvalidRule { index: usize, reason: String },

    #[error("fallback rule: {0}")]
    InvalidFallback(String),
}

/// Content a rule adds to the document when it fires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Injection {
    /// Target section header. Any name is accepted; unknown sections are
    /// created on injection.
    pub section: String,
    /// Bullet text, without the leading marker.
    pub text: String,
}

impl Injection {
    pub fn new(section: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            section: section.into(),
            text: text.into(),
        }
    }
}

/// A keyword-to-response mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InjectionRule {
    /// Lower-cased, de-duplicated keywords.
    pub keywords: Vec<String>,
    pub response: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inject: Option<Injection>,
}

impl InjectionRule {
    pub fn new<I, S>(keywords: I, response: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut normalized: Vec<String> = Vec::new();
        for keyword in keywords {
            let keyword = keyword.as_ref().trim().to_lowercase();
            if !normalized.contains(&keyword) {
                normalized.push(keyword);
            }
        }
        Self {
            keywords: normalized,
            response: response.into(),
            inject: None,
        }
    }

    pub fn with_injection(mut self, section: impl Into<String>, text: impl Into<String>) -> Self {
        self.inject = Some(Injection::new(section, text));
        self
    }

    /// Whether any keyword occurs in `input`. `input` must already be
    /// lower-cased.
    fn matches_lowercase(&self, input: &str) -> bool {
        self.keywords.iter().any(|k| input.contains(k.as_str()))
    }

    fn validate(&self) -> Result<(), String> {
        if self.keywords.is_empty() {
            return Err("at least one keyword is required".to_string());
        }
        if self.keywords.iter().any(|k| k.is_empty()) {
            return Err("keywords must not be empty".to_string());
        }
        self.validate_reply()
    }

    fn validate_reply(&self) -> Result<(), String> {
        if self.response.trim().is_empty() {
            return Err("response must not be empty".to_string());
        }
        if let Some(inject) = &self.inject {
            if inject.section.trim().is_empty() {
                return Err("injection section must not be empty".to_string());
            }
            if inject.text.trim().is_empty() {
                return Err("injection text must not be empty".to_string());
            }
        }
        Ok(())
    }
}

/// On-disk shape of a rule table.
#[derive(Debug, Deserialize)]
struct RuleTableFile {
    rules: Vec<RuleFileEntry>,
    #[serde(default)]
    fallback: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RuleFileEntry {
    keywords: Vec<String>,
    response: String,
    #[serde(default)]
    inject: Option<Injection>,
}

/// Response given when no rule matches.
pub const FALLBACK_RESPONSE: &str = "I can help refine this BRD. Try asking me to improve the \
business objectives, add security or scalability requirements, identify risks, tighten the \
timeline, or define success metrics.";

/// Greeting shown at the top of a fresh conversation.
pub const GREETING: &str =
    "Hi! I am your Structify AI Assistant. How can I help you refine or understand this BRD?";

/// Ordered rules plus the fallback used when none match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleTable {
    rules: Vec<InjectionRule>,
    fallback: InjectionRule,
}

impl RuleTable {
    /// Build a table from ordered rules and the default fallback.
    pub fn new(rules: Vec<InjectionRule>) -> Self {
        Self {
            rules,
            fallback: InjectionRule::new(Vec::<String>::new(), FALLBACK_RESPONSE),
        }
    }

    pub fn with_fallback_response(mut self, response: impl Into<String>) -> Self {
        self.fallback = InjectionRule::new(Vec::<String>::new(), response);
        self
    }

    pub fn rules(&self) -> &[InjectionRule] {
        &self.rules
    }

    pub fn fallback(&self) -> &InjectionRule {
        &self.fallback
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Index of the first rule matching `input`, or `None` for the fallback.
    pub fn position(&self, input: &str) -> Option<usize> {
        let input = input.trim().to_lowercase();
        self.rules.iter().position(|r| r.matches_lowercase(&input))
    }

    /// The first rule whose keywords occur in `input`, or the fallback.
    ///
    /// Never fails. Earlier rules take precedence over later ones.
    pub fn find_match(&self, input: &str) -> &InjectionRule {
        self.rule_at(self.position(input))
    }

    /// The rule at a [`position`](Self::position) result.
    pub fn rule_at(&self, position: Option<usize>) -> &InjectionRule {
        position
            .and_then(|index| self.rules.get(index))
            .unwrap_or(&self.fallback)
    }

    /// Parse and validate a YAML rule table.
    ///
    /// ```yaml
    /// rules:
    ///   - keywords: [security, secure]
    ///     response: Added a security requirement.
    ///     inject:
    ///       section: Non-Functional Requirements
    ///       text: Encrypt all data at rest
    /// fallback: Ask me about security.
    /// ```
    pub fn from_yaml(yaml: &str) -> Result<Self, RuleTableError> {
        let file: RuleTableFile = serde_yaml::from_str(yaml)?;

        let mut rules = Vec::with_capacity(file.rules.len());
        for (index, entry) in file.rules.into_iter().enumerate() {
            let mut rule = InjectionRule::new(entry.keywords, entry.response);
            rule.inject = entry.inject;
            rule.validate()
                .map_err(|reason| RuleTableError::InvalidRule { index, reason })?;
            rules.push(rule);
        }

        let mut table = RuleTable::new(rules);
        if let Some(response) = file.fallback {
            table = table.with_fallback_response(response);
            table
                .fallback
                .validate_reply()
                .map_err(RuleTableError::InvalidFallback)?;
        }

        tracing::debug!(rules = table.len(), "loaded rule table");
        Ok(table)
    }

    /// Load a YAML rule table from disk.
    pub fn from_path(path: &Path) -> Result<Self, RuleTableError> {
        let yaml = std::fs::read_to_string(path).map_err(|source| RuleTableError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml(&yaml)
    }
}

impl Default for RuleTable {
    fn default() -> Self {
        builtin_rules()
    }
}

/// The built-in assistant rules.
///
/// Specific topics come before the generic "improve" rule so that
/// "improve scalability" resolves to the scalability rule.
pub fn builtin_rules() -> RuleTable {
    RuleTable::new(vec![
        InjectionRule::new(
            ["security", "secure", "encrypt", "compliance", "gdpr"],
            "Security was under-specified. I've added a non-functional requirement covering \
             encryption and access control to the BRD.",
        )
        .with_injection(
            SectionName::NonFunctionalRequirements.as_str(),
            "NFR-90: Data protection - all customer data must be encrypted in transit (TLS 1.2+) \
             and at rest (AES-256), with role-based access control for administrative functions",
        ),
        InjectionRule::new(
            ["scalability", "scalable", "scale", "performance", "throughput"],
            "I've added a scalability requirement so the platform can absorb peak traffic \
             without degrading response times.",
        )
        .with_injection(
            SectionName::NonFunctionalRequirements.as_str(),
            "NFR-91: Horizontal scaling - the system must handle 10x average peak load \
             with p95 response times under 300 ms",
        ),
        InjectionRule::new(
            ["risk", "mitigat", "what could go wrong"],
            "I've flagged an additional delivery risk around third-party integrations and \
             added it to the Risks section with a suggested mitigation.",
        )
        .with_injection(
            SectionName::Risks.as_str(),
            "Third-party API changes may break integrations; mitigate with contract tests \
             and versioned adapters",
        ),
        InjectionRule::new(
            ["metric", "kpi", "measure", "success criteria"],
            "I've added a measurable success metric so progress can be tracked after launch.",
        )
        .with_injection(
            SectionName::SuccessMetrics.as_str(),
            "Reduce average deployment time from 4 hours to under 30 minutes within two quarters",
        ),
        InjectionRule::new(
            ["assumption", "assume"],
            "I've recorded an explicit assumption about stakeholder availability.",
        )
        .with_injection(
            SectionName::Assumptions.as_str(),
            "Key stakeholders are available for a weekly review during the project",
        ),
        InjectionRule::new(
            ["timeline", "deadline", "schedule", "milestone"],
            "The timeline lists phases in delivery order. I'd recommend confirming the \
             processing phase estimate with the lead architect before committing dates.",
        ),
        InjectionRule::new(
            ["stakeholder", "who is involved", "owner"],
            "The stakeholder table ranks each person by influence and interest. High-influence, \
             high-interest stakeholders should sign off on every requirement change.",
        ),
        InjectionRule::new(
            ["summary", "summarize", "overview", "explain"],
            "This BRD captures the project's goals, stakeholders, functional and \
             non-functional requirements, risks, timeline and success metrics. Ask me about \
             any section for details.",
        ),
        InjectionRule::new(
            ["improve", "objective", "suggest", "better", "refine"],
            "I've analyzed the Business Objectives and suggested additions based on best \
             practices. The BRD has been updated.",
        )
        .with_injection(
            SectionName::BusinessObjectives.as_str(),
            "Improve system reliability: achieve 99.99% uptime for core services",
        ),
    ])
}
