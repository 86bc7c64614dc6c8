#![warn(missing_docs)]
//! # sentinel-provider
//!
//! ## Purpose
//! Implements [`AnalysisProvider`] against the Google Generative Language
//! `generateContent` REST endpoint.
//!
//! ## Responsibilities
//! - Validate provider endpoint policy (HTTPS only) and credentials.
//! - Build the `generateContent` body requesting JSON output in the
//!   contract's response schema.
//! - Execute exactly one request through an injectable transport.
//! - Unwrap the candidate envelope and hand the text to the contract
//!   validator.
//!
//! ## Data flow
//! [`AnalysisRequest`] -> [`build_generate_content_body`] ->
//! [`AnalysisTransport::post_json`] -> [`extract_candidate_text`] ->
//! [`parse_analysis_response`].
//!
//! ## Error model
//! Every failure (policy, network, status, envelope, contract) is reported
//! as [`AnalysisFailure`]. Nothing is retried.
//!
//! ## Security and privacy notes
//! The API key travels in the `x-goog-api-key` header, never in the URL, and
//! is never logged.

use std::sync::Arc;
use std::time::Duration;

use sentinel_analysis_contract::{
    AnalysisFailure, AnalysisProvider, AnalysisRequest, AnalysisResult, parse_analysis_response,
};
use serde::Deserialize;
use serde_json::{Value, json};
use url::Url;

/// Default API base for the hosted provider.
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default provider model identifier.
pub const DEFAULT_PROVIDER_MODEL: &str = "gemini-3-pro-preview";

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

const MAX_REJECTION_MESSAGE_LEN: usize = 512;

/// Raw HTTP answer from a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body text.
    pub body: String,
}

/// Abstract transport used by [`GeminiClient`].
pub trait AnalysisTransport: Send + Sync {
    /// Posts a JSON body and returns the status and body.
    ///
    /// Non-success statuses are returned as responses, not errors; only
    /// failures that produced no HTTP response become
    /// [`AnalysisFailure::Network`].
    fn post_json(
        &self,
        url: &str,
        api_key: &str,
        body: &str,
    ) -> Result<TransportResponse, AnalysisFailure>;
}

/// Blocking transport backed by a `ureq` agent.
#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    /// Creates a transport with the given overall request timeout.
    pub fn new(timeout: Duration) -> Self {
        Self {
            agent: ureq::AgentBuilder::new().timeout(timeout).build(),
        }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
}

impl AnalysisTransport for UreqTransport {
    fn post_json(
        &self,
        url: &str,
        api_key: &str,
        body: &str,
    ) -> Result<TransportResponse, AnalysisFailure> {
        let result = self
            .agent
            .post(url)
            .set("Content-Type", "application/json")
            .set("x-goog-api-key", api_key)
            .send_string(body);

        match result {
            Ok(response) => {
                let status = response.status();
                let body = response.into_string().map_err(|error| {
                    AnalysisFailure::Network(format!("failed to read response body: {error}"))
                })?;
                Ok(TransportResponse { status, body })
            }
            Err(ureq::Error::Status(status, response)) => Ok(TransportResponse {
                status,
                body: response.into_string().unwrap_or_default(),
            }),
            Err(ureq::Error::Transport(transport)) => {
                Err(AnalysisFailure::Network(transport.to_string()))
            }
        }
    }
}

/// Provider client for the `generateContent` endpoint.
#[derive(Clone)]
pub struct GeminiClient {
    endpoint: String,
    model: String,
    api_key: String,
    transport: Arc<dyn AnalysisTransport>,
}

impl GeminiClient {
    /// Creates a validated client.
    ///
    /// # Errors
    /// Returns [`AnalysisFailure::Configuration`] when the endpoint is not
    /// HTTPS, or the model or API key is blank.
    pub fn new(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
        transport: Arc<dyn AnalysisTransport>,
    ) -> Result<Self, AnalysisFailure> {
        let endpoint = endpoint.into();
        let model = model.into();
        let api_key = api_key.into();

        validate_provider_endpoint(&endpoint)?;
        if model.trim().is_empty() {
            return Err(AnalysisFailure::Configuration(
                "provider model must be non-empty".to_string(),
            ));
        }
        if api_key.trim().is_empty() {
            return Err(AnalysisFailure::Configuration(
                "provider API key must be non-empty".to_string(),
            ));
        }

        Ok(Self {
            endpoint,
            model,
            api_key,
            transport,
        })
    }

    /// Returns the full `generateContent` URL.
    pub fn generate_content_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.endpoint.trim_end_matches('/'),
            self.model
        )
    }

    /// Returns the configured provider model.
    pub fn model(&self) -> &str {
        &self.model
    }
}

impl AnalysisProvider for GeminiClient {
    fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResult, AnalysisFailure> {
        let url = self.generate_content_url();
        let body = build_generate_content_body(request).to_string();
        tracing::info!(model = %self.model, "requesting threat model from provider");

        let response = self.transport.post_json(&url, &self.api_key, &body)?;
        tracing::debug!(status = response.status, bytes = response.body.len(), "provider answered");

        if !(200..300).contains(&response.status) {
            return Err(AnalysisFailure::Rejected {
                status: response.status,
                message: truncate(&response.body, MAX_REJECTION_MESSAGE_LEN),
            });
        }

        let text = extract_candidate_text(&response.body)?;
        parse_analysis_response(&text).map_err(AnalysisFailure::from)
    }
}

/// Builds the `generateContent` request body.
pub fn build_generate_content_body(request: &AnalysisRequest) -> Value {
    json!({
        "contents": [
            { "role": "user", "parts": [{ "text": request.instruction }] }
        ],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": request.response_schema
        }
    })
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ContentPart>,
}

#[derive(Debug, Deserialize)]
struct ContentPart {
    text: Option<String>,
}

/// Concatenates the text parts of the first candidate.
///
/// # Errors
/// Returns [`AnalysisFailure::Malformed`] when the envelope is not JSON and
/// [`AnalysisFailure::EmptyResponse`] when there is no candidate text.
pub fn extract_candidate_text(body: &str) -> Result<String, AnalysisFailure> {
    if body.trim().is_empty() {
        return Err(AnalysisFailure::EmptyResponse);
    }

    let envelope: GenerateContentResponse = serde_json::from_str(body)
        .map_err(|error| AnalysisFailure::Malformed(format!("provider envelope: {error}")))?;

    let text: String = envelope
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect()
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(AnalysisFailure::EmptyResponse);
    }
    Ok(text)
}

/// Validates provider endpoint constraints.
///
/// # Errors
/// Returns [`AnalysisFailure::Configuration`] for unparsable or non-HTTPS
/// URLs.
pub fn validate_provider_endpoint(endpoint: &str) -> Result<(), AnalysisFailure> {
    let parsed = Url::parse(endpoint).map_err(|error| {
        AnalysisFailure::Configuration(format!("invalid provider url: {error}"))
    })?;

    if parsed.scheme() != "https" {
        return Err(AnalysisFailure::Configuration(
            "provider endpoint must use https".to_string(),
        ));
    }

    Ok(())
}

fn truncate(input: &str, max_chars: usize) -> String {
    match input.char_indices().nth(max_chars) {
        Some((index, _)) => format!("{}...", &input[..index]),
        None => input.to_string(),
    }
}
