#![warn(missing_docs)]
//! # sentinel-core
//!
//! ## Purpose
//! Defines the pure data model shared across the `sentinel-llm` workspace.
//!
//! ## Responsibilities
//! - Represent threats, benchmark scores, and completed model evaluations.
//! - Classify overall risk and benchmark scores into display tiers.
//! - Encode/decode the persisted history blob.
//!
//! ## Data flow
//! The analysis contract decodes provider output into [`Threat`] and
//! [`BenchmarkScore`] values. The store wraps them, together with the
//! submitted [`EvaluationInputs`], into an immutable [`ModelEvaluation`] and
//! persists the history through [`encode_history`].
//!
//! ## Ownership and lifetimes
//! All records own their strings. Evaluations are cloned into the "current"
//! slot instead of borrowed from history, so deleting a history entry never
//! invalidates what is on screen.
//!
//! ## Error model
//! Codec failures return [`CoreError`]. Domain values themselves are not
//! range-checked: scores outside `[0, 100]` are kept as received.
//!
//! ## Example
//! ```rust
//! use sentinel_core::{RiskTier, Severity};
//!
//! assert_eq!(RiskTier::from_score(75.0), RiskTier::High);
//! assert!(Severity::Critical.weight() > Severity::Low.weight());
//! assert_eq!(Severity::from("Catastrophic".to_string()).weight(), 0);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fixed, versionless storage key for the persisted history blob.
pub const HISTORY_STORAGE_KEY: &str = "sentinel_history";

/// Threat severity as reported by the analysis provider.
///
/// Labels outside the four known values are preserved in [`Severity::Other`]
/// so that foreign or hand-edited history blobs survive a load/save cycle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Severity {
    /// Highest severity.
    Critical,
    /// High severity.
    High,
    /// Medium severity.
    Medium,
    /// Lowest known severity.
    Low,
    /// Unrecognized label, kept verbatim.
    Other(String),
}

impl Severity {
    /// Known severities, highest first.
    pub const KNOWN: [Severity; 4] = [
        Severity::Critical,
        Severity::High,
        Severity::Medium,
        Severity::Low,
    ];

    /// Sort weight: Critical 4, High 3, Medium 2, Low 1, anything else 0.
    pub fn weight(&self) -> u8 {
        match self {
            Severity::Critical => 4,
            Severity::High => 3,
            Severity::Medium => 2,
            Severity::Low => 1,
            Severity::Other(_) => 0,
        }
    }

    /// Wire label.
    pub fn label(&self) -> &str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
            Severity::Other(label) => label,
        }
    }
}

impl From<String> for Severity {
    fn from(label: String) -> Self {
        match label.as_str() {
            "Critical" => Severity::Critical,
            "High" => Severity::High,
            "Medium" => Severity::Medium,
            "Low" => Severity::Low,
            _ => Severity::Other(label),
        }
    }
}

impl From<Severity> for String {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Other(label) => label,
            known => known.label().to_string(),
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One identified vulnerability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Threat {
    /// Identifier, unique within one evaluation.
    pub id: String,
    /// Category label, typically an OWASP LLM Top 10 tag.
    pub category: String,
    /// Short title.
    pub title: String,
    /// Free-text description.
    pub description: String,
    /// Reported severity.
    pub severity: Severity,
    /// Suggested mitigation.
    pub mitigation: String,
    /// Expected impact.
    pub impact: String,
}

/// One benchmark category rating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkScore {
    /// Category label.
    pub category: String,
    /// Score, nominally in `[0, 100]`.
    pub score: f64,
    /// Supporting detail text.
    pub details: String,
}

/// The three free-text deployment descriptors a user submits.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationInputs {
    /// Target model description.
    pub model_name: String,
    /// Deployment architecture context.
    pub architecture: String,
    /// Intended use case.
    pub use_case: String,
}

impl EvaluationInputs {
    /// Creates inputs from the three descriptors, passed through verbatim.
    pub fn new(
        model_name: impl Into<String>,
        architecture: impl Into<String>,
        use_case: impl Into<String>,
    ) -> Self {
        Self {
            model_name: model_name.into(),
            architecture: architecture.into(),
            use_case: use_case.into(),
        }
    }

    /// Returns `true` when every descriptor has non-whitespace content.
    ///
    /// This is a convenience for front ends; nothing downstream requires it.
    pub fn is_complete(&self) -> bool {
        !self.model_name.trim().is_empty()
            && !self.architecture.trim().is_empty()
            && !self.use_case.trim().is_empty()
    }
}

/// One completed security analysis run.
///
/// Created once when an analysis completes and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelEvaluation {
    /// Locally generated identifier, unique within history.
    pub id: String,
    /// Submitted model descriptor.
    pub model_name: String,
    /// Submitted architecture descriptor.
    pub architecture: String,
    /// Submitted use-case descriptor.
    pub use_case: String,
    /// ISO-8601 creation timestamp.
    pub timestamp: String,
    /// Threats in provider order.
    pub threats: Vec<Threat>,
    /// Benchmark scores in provider order.
    pub scores: Vec<BenchmarkScore>,
    /// Overall risk score, nominally in `[0, 100]`.
    pub overall_risk_score: f64,
}

impl ModelEvaluation {
    /// Returns the descriptors this evaluation was submitted with.
    pub fn inputs(&self) -> EvaluationInputs {
        EvaluationInputs::new(&self.model_name, &self.architecture, &self.use_case)
    }

    /// Number of threats with exactly the given severity.
    pub fn count_by_severity(&self, severity: &Severity) -> usize {
        self.threats
            .iter()
            .filter(|threat| &threat.severity == severity)
            .count()
    }

    /// Number of critical threats.
    pub fn critical_count(&self) -> usize {
        self.count_by_severity(&Severity::Critical)
    }

    /// Risk tier for the overall risk score.
    pub fn risk_tier(&self) -> RiskTier {
        RiskTier::from_score(self.overall_risk_score)
    }

    /// Mean benchmark score, or `None` when no scores were reported.
    pub fn mean_benchmark_score(&self) -> Option<f64> {
        if self.scores.is_empty() {
            return None;
        }
        let total: f64 = self.scores.iter().map(|score| score.score).sum();
        Some(total / self.scores.len() as f64)
    }
}

/// Three-tier overall risk classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskTier {
    /// Score below 40.
    Low,
    /// Score in `[40, 70)`.
    Medium,
    /// Score of 70 or above.
    High,
}

impl RiskTier {
    /// Classifies an overall risk score.
    pub fn from_score(score: f64) -> Self {
        if score < 40.0 {
            RiskTier::Low
        } else if score < 70.0 {
            RiskTier::Medium
        } else {
            RiskTier::High
        }
    }

    /// Lowercase label (`low`, `medium`, `high`).
    pub fn label(self) -> &'static str {
        match self {
            RiskTier::Low => "low",
            RiskTier::Medium => "medium",
            RiskTier::High => "high",
        }
    }
}

/// Display tier for one benchmark score; higher scores are better.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScoreTier {
    /// Score above 80.
    Strong,
    /// Score above 50, up to 80.
    Moderate,
    /// Score of 50 or below.
    Weak,
}

impl ScoreTier {
    /// Classifies a benchmark score.
    pub fn from_score(score: f64) -> Self {
        if score > 80.0 {
            ScoreTier::Strong
        } else if score > 50.0 {
            ScoreTier::Moderate
        } else {
            ScoreTier::Weak
        }
    }
}

/// OWASP Top 10 for LLM Applications categories the provider is asked to
/// evaluate against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OwaspCategory {
    /// LLM01.
    PromptInjection,
    /// LLM02.
    InsecureOutputHandling,
    /// LLM03.
    TrainingDataPoisoning,
    /// LLM04.
    ModelDenialOfService,
    /// LLM05.
    SupplyChainVulnerabilities,
    /// LLM06.
    SensitiveInformationDisclosure,
    /// LLM07.
    InsecurePluginDesign,
    /// LLM08.
    ExcessiveAgency,
    /// LLM09.
    Overreliance,
    /// LLM10.
    ModelTheft,
}

impl OwaspCategory {
    /// All categories in catalog order.
    pub const ALL: [OwaspCategory; 10] = [
        OwaspCategory::PromptInjection,
        OwaspCategory::InsecureOutputHandling,
        OwaspCategory::TrainingDataPoisoning,
        OwaspCategory::ModelDenialOfService,
        OwaspCategory::SupplyChainVulnerabilities,
        OwaspCategory::SensitiveInformationDisclosure,
        OwaspCategory::InsecurePluginDesign,
        OwaspCategory::ExcessiveAgency,
        OwaspCategory::Overreliance,
        OwaspCategory::ModelTheft,
    ];

    /// Full catalog label, e.g. `LLM01: Prompt Injection`.
    pub fn label(self) -> &'static str {
        match self {
            OwaspCategory::PromptInjection => "LLM01: Prompt Injection",
            OwaspCategory::InsecureOutputHandling => "LLM02: Insecure Output Handling",
            OwaspCategory::TrainingDataPoisoning => "LLM03: Training Data Poisoning",
            OwaspCategory::ModelDenialOfService => "LLM04: Model Denial of Service",
            OwaspCategory::SupplyChainVulnerabilities => "LLM05: Supply Chain Vulnerabilities",
            OwaspCategory::SensitiveInformationDisclosure => {
                "LLM06: Sensitive Information Disclosure"
            }
            OwaspCategory::InsecurePluginDesign => "LLM07: Insecure Plugin Design",
            OwaspCategory::ExcessiveAgency => "LLM08: Excessive Agency",
            OwaspCategory::Overreliance => "LLM09: Overreliance",
            OwaspCategory::ModelTheft => "LLM10: Model Theft",
        }
    }

    /// Short code, e.g. `LLM01`.
    pub fn code(self) -> &'static str {
        short_category_label(self.label())
    }
}

/// Shortens a category label to the part before the first `:`.
///
/// `"LLM01: Prompt Injection"` becomes `"LLM01"`; labels without a colon are
/// returned trimmed.
pub fn short_category_label(category: &str) -> &str {
    category.split(':').next().unwrap_or(category).trim()
}

/// Serializes history to the persisted JSON array form.
///
/// # Errors
/// Returns [`CoreError::Codec`] when JSON serialization fails.
pub fn encode_history(history: &[ModelEvaluation]) -> Result<String, CoreError> {
    serde_json::to_string(history).map_err(CoreError::Codec)
}

/// Deserializes a persisted history blob.
///
/// # Errors
/// Returns [`CoreError::Codec`] when the blob is not a JSON array of
/// evaluations.
pub fn decode_history(raw: &str) -> Result<Vec<ModelEvaluation>, CoreError> {
    serde_json::from_str(raw).map_err(CoreError::Codec)
}

/// Error type for core codec failures.
#[derive(Debug, Error)]
pub enum CoreError {
    /// JSON encoding/decoding error.
    #[error("history codec failure: {0}")]
    Codec(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    //! Unit tests for tiering and severity mapping.

    use super::*;

    #[test]
    fn risk_tier_boundaries() {
        assert_eq!(RiskTier::from_score(0.0), RiskTier::Low);
        assert_eq!(RiskTier::from_score(39.9), RiskTier::Low);
        assert_eq!(RiskTier::from_score(40.0), RiskTier::Medium);
        assert_eq!(RiskTier::from_score(69.0), RiskTier::Medium);
        assert_eq!(RiskTier::from_score(70.0), RiskTier::High);
        assert_eq!(RiskTier::from_score(100.0), RiskTier::High);
    }

    #[test]
    fn score_tier_boundaries() {
        assert_eq!(ScoreTier::from_score(81.0), ScoreTier::Strong);
        assert_eq!(ScoreTier::from_score(80.0), ScoreTier::Moderate);
        assert_eq!(ScoreTier::from_score(51.0), ScoreTier::Moderate);
        assert_eq!(ScoreTier::from_score(50.0), ScoreTier::Weak);
    }

    #[test]
    fn unknown_severity_keeps_label() {
        let severity: Severity = serde_json::from_str("\"Severe\"").expect("string decodes");
        assert_eq!(severity, Severity::Other("Severe".to_string()));
        assert_eq!(severity.weight(), 0);
        assert_eq!(
            serde_json::to_string(&severity).expect("string encodes"),
            "\"Severe\""
        );
    }

    #[test]
    fn owasp_codes_are_short_labels() {
        assert_eq!(OwaspCategory::PromptInjection.code(), "LLM01");
        assert_eq!(OwaspCategory::ModelTheft.code(), "LLM10");
        assert_eq!(short_category_label("Custom"), "Custom");
    }
}
