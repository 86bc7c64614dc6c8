#![warn(missing_docs)]
//! # sentinel-analysis-contract
//!
//! ## Purpose
//! Defines the request/response contract between `sentinel-llm` and the
//! hosted analysis provider.
//!
//! ## Responsibilities
//! - Build analysis requests from the three free-text descriptors.
//! - Describe the required response shape, both in the provider's schema
//!   dialect and as a frozen JSON Schema.
//! - Validate untrusted provider output against that schema before decoding
//!   it into typed values.
//! - Define the [`AnalysisProvider`] seam the store calls through.
//!
//! ## Data flow
//! [`EvaluationInputs`] -> [`AnalysisRequest::new`] -> provider ->
//! raw text -> [`parse_analysis_response`] -> [`AnalysisResult`].
//!
//! ## Ownership and lifetimes
//! Parsed values are owned so they can outlive the transient response
//! buffer and move into the store without copying.
//!
//! ## Error model
//! Shape problems return [`AnalysisContractError`]. Provider adapters report
//! every failure as one [`AnalysisFailure`] value, so callers handle a single
//! condition regardless of cause.
//!
//! ## Security and privacy notes
//! Descriptors are embedded verbatim in the instruction; they are user text
//! and are never interpreted locally.

use jsonschema::JSONSchema;
use sentinel_core::{BenchmarkScore, EvaluationInputs, OwaspCategory, Threat};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use thiserror::Error;

/// Severity labels the provider is allowed to return.
pub const SEVERITY_LABELS: [&str; 4] = ["Critical", "High", "Medium", "Low"];

/// Request handed to an analysis provider.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRequest {
    /// Descriptors exactly as submitted.
    pub inputs: EvaluationInputs,
    /// Natural-language instruction embedding the descriptors.
    pub instruction: String,
    /// Required output shape in the provider's schema dialect.
    pub response_schema: Value,
}

impl AnalysisRequest {
    /// Builds a request for the given descriptors.
    ///
    /// Strings are passed through verbatim; blank input still yields a
    /// well-formed request.
    pub fn new(inputs: EvaluationInputs) -> Self {
        let instruction = build_instruction(&inputs);
        Self {
            inputs,
            instruction,
            response_schema: provider_response_schema(),
        }
    }
}

/// Typed, validated provider output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// Identified threats in provider order.
    pub threats: Vec<Threat>,
    /// Benchmark scores in provider order.
    pub scores: Vec<BenchmarkScore>,
    /// Overall risk score.
    #[serde(rename = "overallRiskScore")]
    pub overall_risk: f64,
}

/// Analysis provider seam.
///
/// Implementations make exactly one attempt per call and block until the
/// remote result is available or has failed.
pub trait AnalysisProvider: Send + Sync {
    /// Runs one analysis.
    fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResult, AnalysisFailure>;
}

/// Builds the natural-language instruction for one evaluation.
pub fn build_instruction(inputs: &EvaluationInputs) -> String {
    let mut instruction = format!(
        "Perform a comprehensive security threat model and benchmark evaluation for the following LLM deployment:\n\
         Model: {}\n\
         Architecture: {}\n\
         Use Case: {}\n\n\
         Evaluate this against the OWASP Top 10 for LLMs:\n",
        inputs.model_name, inputs.architecture, inputs.use_case
    );
    for category in OwaspCategory::ALL {
        instruction.push_str("- ");
        instruction.push_str(category.label());
        instruction.push('\n');
    }
    instruction.push_str(
        "\nFor the benchmarking section, provide a security score (0-100) for each of the 10 \
         categories based on typical performance of this model architecture and the specific \
         deployment context.\n\nReturn a structured JSON object.",
    );
    instruction
}

/// Required response shape in the provider's (OpenAPI subset) dialect.
pub fn provider_response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "threats": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "id": { "type": "STRING" },
                        "category": { "type": "STRING" },
                        "title": { "type": "STRING" },
                        "description": { "type": "STRING" },
                        "severity": { "type": "STRING", "enum": SEVERITY_LABELS },
                        "mitigation": { "type": "STRING" },
                        "impact": { "type": "STRING" }
                    },
                    "required": ["id", "category", "title", "description", "severity", "mitigation", "impact"]
                }
            },
            "scores": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "category": { "type": "STRING" },
                        "score": { "type": "NUMBER" },
                        "details": { "type": "STRING" }
                    },
                    "required": ["category", "score", "details"]
                }
            },
            "overallRiskScore": { "type": "NUMBER" }
        },
        "required": ["threats", "scores", "overallRiskScore"]
    })
}

/// Frozen JSON Schema every provider response must satisfy.
///
/// Mirrors `contracts/analysis-response.schema.json`.
pub fn response_json_schema() -> Value {
    json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "title": "SentinelLLM analysis response",
        "type": "object",
        "required": ["threats", "scores", "overallRiskScore"],
        "properties": {
            "threats": {
                "type": "array",
                "items": {
                    "type": "object",
                    "required": ["id", "category", "title", "description", "severity", "mitigation", "impact"],
                    "properties": {
                        "id": { "type": "string" },
                        "category": { "type": "string" },
                        "title": { "type": "string" },
                        "description": { "type": "string" },
                        "severity": { "type": "string", "enum": SEVERITY_LABELS },
                        "mitigation": { "type": "string" },
                        "impact": { "type": "string" }
                    }
                }
            },
            "scores": {
                "type": "array",
                "items": {
                    "type": "object",
                    "required": ["category", "score", "details"],
                    "properties": {
                        "category": { "type": "string" },
                        "score": { "type": "number" },
                        "details": { "type": "string" }
                    }
                }
            },
            "overallRiskScore": { "type": "number" }
        }
    })
}

/// Validates and decodes raw provider text.
///
/// # Errors
/// - [`AnalysisContractError::Empty`] for a blank body.
/// - [`AnalysisContractError::Decode`] when the body is not JSON.
/// - [`AnalysisContractError::SchemaViolation`] when the JSON does not match
///   [`response_json_schema`].
pub fn parse_analysis_response(raw: &str) -> Result<AnalysisResult, AnalysisContractError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AnalysisContractError::Empty);
    }

    let value: Value = serde_json::from_str(trimmed).map_err(AnalysisContractError::Decode)?;
    validate_response_shape(&value)?;

    serde_json::from_value(value).map_err(AnalysisContractError::Decode)
}

/// Checks a decoded JSON value against [`response_json_schema`].
///
/// # Errors
/// Returns [`AnalysisContractError::SchemaViolation`] listing every
/// violation, or [`AnalysisContractError::SchemaCompile`] if the frozen
/// schema itself fails to compile.
pub fn validate_response_shape(value: &Value) -> Result<(), AnalysisContractError> {
    let schema = response_json_schema();
    let validator = JSONSchema::compile(&schema)
        .map_err(|error| AnalysisContractError::SchemaCompile(error.to_string()))?;

    let violations: Vec<String> = match validator.validate(value) {
        Ok(()) => return Ok(()),
        Err(errors) => errors
            .map(|error| format!("{}: {error}", error.instance_path))
            .collect(),
    };

    Err(AnalysisContractError::SchemaViolation(violations.join("; ")))
}

/// Response contract errors.
#[derive(Debug, Error)]
pub enum AnalysisContractError {
    /// Provider returned an empty body.
    #[error("analysis response is empty")]
    Empty,
    /// JSON decode failure.
    #[error("analysis decode failure: {0}")]
    Decode(#[from] serde_json::Error),
    /// JSON does not match the required shape.
    #[error("analysis schema violation: {0}")]
    SchemaViolation(String),
    /// Frozen schema failed to compile.
    #[error("analysis schema failed to compile: {0}")]
    SchemaCompile(String),
}

/// The single failure condition an analysis provider reports.
#[derive(Debug, Error)]
pub enum AnalysisFailure {
    /// Provider is misconfigured (endpoint policy, missing credential).
    #[error("provider configuration: {0}")]
    Configuration(String),
    /// Request never produced an HTTP response.
    #[error("network failure: {0}")]
    Network(String),
    /// Provider answered with a non-success status.
    #[error("provider rejected request with status {status}: {message}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Provider message, possibly truncated.
        message: String,
    },
    /// Provider answered without any content.
    #[error("provider returned an empty response")]
    EmptyResponse,
    /// Provider content failed the response contract.
    #[error("malformed analysis response: {0}")]
    Malformed(String),
}

impl From<AnalysisContractError> for AnalysisFailure {
    fn from(error: AnalysisContractError) -> Self {
        match error {
            AnalysisContractError::Empty => AnalysisFailure::EmptyResponse,
            other => AnalysisFailure::Malformed(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for request construction and shape validation.

    use super::*;

    #[test]
    fn instruction_embeds_descriptors_verbatim() {
        let request = AnalysisRequest::new(EvaluationInputs::new(
            "  GPT-4o ",
            "Public API + RAG",
            "Support bot",
        ));
        assert!(request.instruction.contains("Model:   GPT-4o \n"));
        assert!(request.instruction.contains("Architecture: Public API + RAG\n"));
        assert!(request.instruction.contains("Use Case: Support bot\n"));
        assert!(request.instruction.contains("LLM10: Model Theft"));
    }

    #[test]
    fn blank_inputs_still_build_a_request() {
        let request = AnalysisRequest::new(EvaluationInputs::default());
        assert!(request.instruction.contains("Model: \n"));
        assert_eq!(request.response_schema["type"], "OBJECT");
    }

    #[test]
    fn missing_overall_risk_is_a_violation() {
        let error = parse_analysis_response(r#"{"threats":[],"scores":[]}"#)
            .expect_err("missing field should fail");
        assert!(matches!(error, AnalysisContractError::SchemaViolation(_)));
    }

    #[test]
    fn empty_body_maps_to_empty_failure() {
        let error = parse_analysis_response("   ").expect_err("blank should fail");
        assert!(matches!(
            AnalysisFailure::from(error),
            AnalysisFailure::EmptyResponse
        ));
    }
}
