#![warn(missing_docs)]
//! # sentinel-app
//!
//! ## Purpose
//! Wires configuration, logging, the analysis provider, the evaluation store,
//! UI state, and the report exporter into the `sentinel` command-line app.
//!
//! ## Responsibilities
//! - Resolve [`AppConfig`] from flags, environment, and defaults.
//! - Install the `tracing` subscriber.
//! - Drive user intents through a [`Session`] and keep UI state in step with
//!   store outcomes.
//!
//! ## Data flow
//! CLI args -> [`AppConfig`] -> [`Session`] (store + UI state) ->
//! provider call -> store -> rendered view / exported report.
//!
//! ## Error model
//! Subsystem failures are wrapped in [`AppError`]. A failed analysis is also
//! recorded as the UI notice, with secrets redacted.
//!
//! ## Security and privacy notes
//! - The API key is never logged or rendered.
//! - Failure reasons pass through [`redact_sensitive`] before display.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use sentinel_core::EvaluationInputs;
use sentinel_provider::{
    DEFAULT_ENDPOINT, DEFAULT_PROVIDER_MODEL, DEFAULT_TIMEOUT, GeminiClient, UreqTransport,
};
use sentinel_report::ReportError;
use sentinel_store::StoreError;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

mod session;

pub use session::Session;

/// Build-time application version loaded from root `VERSION` file.
pub const APP_VERSION: &str = env!("SENTINEL_VERSION");

/// Environment variable holding the log filter.
pub const LOG_ENV: &str = "SENTINEL_LOG";

/// Log filter used when [`LOG_ENV`] is unset or invalid.
pub const DEFAULT_LOG_FILTER: &str = "sentinel=info";

/// Environment variables consulted, in order, when no API key flag is given.
pub const FALLBACK_API_KEY_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

/// Pre-filled model descriptor.
pub const DEFAULT_MODEL_NAME: &str = "GPT-4o / Gemini 1.5 Pro Wrapper";

/// Pre-filled architecture descriptor.
pub const DEFAULT_ARCHITECTURE: &str = "Public API endpoint with vector DB RAG";

/// Pre-filled use-case descriptor.
pub const DEFAULT_USE_CASE: &str = "Customer support chatbot handling PII and order history";

const SECRET_MARKERS: [&str; 6] = [
    "api_key",
    "api-key",
    "apikey",
    "password",
    "authorization",
    "bearer",
];

// Redacted only when followed by `=` or `:`.
const SECRET_KEYS: [&str; 1] = ["token"];

/// Returns the app version sourced from root `VERSION`.
pub fn app_version() -> &'static str {
    APP_VERSION
}

/// Descriptors the input form starts with.
pub fn default_inputs() -> EvaluationInputs {
    EvaluationInputs::new(DEFAULT_MODEL_NAME, DEFAULT_ARCHITECTURE, DEFAULT_USE_CASE)
}

/// Resolved runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Directory holding the history file.
    pub data_dir: PathBuf,
    /// Provider API key; only required for new evaluations.
    pub api_key: Option<String>,
    /// Provider model identifier.
    pub provider_model: String,
    /// Provider API base URL.
    pub endpoint: String,
    /// Provider request timeout.
    pub timeout: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            api_key: None,
            provider_model: DEFAULT_PROVIDER_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl AppConfig {
    /// Builds the provider client for this configuration.
    ///
    /// # Errors
    /// Returns [`AppError::MissingApiKey`] when no key is configured, or
    /// [`AppError::Provider`] when the endpoint or model is rejected.
    pub fn provider(&self) -> Result<GeminiClient, AppError> {
        let api_key = self.api_key.as_deref().ok_or(AppError::MissingApiKey)?;
        let transport = Arc::new(UreqTransport::new(self.timeout));
        GeminiClient::new(&self.endpoint, &self.provider_model, api_key, transport)
            .map_err(|failure| AppError::Provider(failure.to_string()))
    }
}

/// Per-user data directory, falling back to `./.sentinel`.
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("sentinel-llm"))
        .unwrap_or_else(|| PathBuf::from(".sentinel"))
}

/// Picks the API key: the explicit value if non-blank, otherwise the first
/// non-blank [`FALLBACK_API_KEY_VARS`] entry reported by `lookup`.
pub fn resolve_api_key(
    explicit: Option<String>,
    lookup: impl Fn(&str) -> Option<String>,
) -> Option<String> {
    explicit
        .filter(|key| !key.trim().is_empty())
        .or_else(|| {
            FALLBACK_API_KEY_VARS
                .iter()
                .filter_map(|var| lookup(*var))
                .find(|key| !key.trim().is_empty())
        })
}

/// Installs the stderr `tracing` subscriber filtered by [`LOG_ENV`].
///
/// Calling it more than once is harmless.
pub fn init_logging() {
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Cuts log-unsafe text at the first credential marker or `token=`/`token:`
/// pair.
pub fn redact_sensitive(input: &str) -> String {
    let lower = input.to_ascii_lowercase();
    let markers = SECRET_MARKERS
        .iter()
        .filter_map(|marker| lower.find(marker).map(|position| (position, *marker)));
    let keys = SECRET_KEYS
        .iter()
        .filter_map(|key| find_key_value(&lower, key).map(|position| (position, *key)));
    let earliest = markers.chain(keys).min_by_key(|(position, _)| *position);

    match earliest {
        Some((position, marker)) => format!("{}{marker}=<redacted>", &input[..position]),
        None => input.to_string(),
    }
}

fn find_key_value(haystack: &str, key: &str) -> Option<usize> {
    haystack
        .match_indices(key)
        .map(|(position, _)| position)
        .find(|position| {
            haystack[position + key.len()..]
                .trim_start()
                .starts_with(['=', ':'])
        })
}

/// App integration error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// No API key was configured for a command that needs the provider.
    #[error(
        "no API key configured; pass --api-key or set SENTINEL_API_KEY, GEMINI_API_KEY, or API_KEY"
    )]
    MissingApiKey,
    /// Provider configuration was rejected.
    #[error("provider error: {0}")]
    Provider(String),
    /// Analysis failed; the reason is already redacted.
    #[error("{0}")]
    Analysis(String),
    /// Persistence failure.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    /// Report export failure.
    #[error("report error: {0}")]
    Report(#[from] ReportError),
    /// No history entry with the given identifier.
    #[error("no evaluation with id {0}")]
    NotFound(String),
}
