//! Shared fixtures for app integration tests.

use std::sync::Mutex;

use rand::SeedableRng;
use rand::rngs::StdRng;
use sentinel_analysis_contract::{
    AnalysisFailure, AnalysisProvider, AnalysisRequest, AnalysisResult,
};
use sentinel_app::Session;
use sentinel_core::{BenchmarkScore, EvaluationInputs, Severity, Threat};
use sentinel_store::{EvaluationStore, HistoryBackend, MemoryBackend};

/// Provider that replays scripted outcomes and records request models.
pub struct FakeProvider {
    outcomes: Mutex<Vec<Result<AnalysisResult, AnalysisFailure>>>,
    seen_models: Mutex<Vec<String>>,
}

impl FakeProvider {
    #[allow(dead_code)]
    pub fn new(mut outcomes: Vec<Result<AnalysisResult, AnalysisFailure>>) -> Self {
        outcomes.reverse();
        Self {
            outcomes: Mutex::new(outcomes),
            seen_models: Mutex::new(Vec::new()),
        }
    }

    #[allow(dead_code)]
    pub fn seen_models(&self) -> Vec<String> {
        self.seen_models
            .lock()
            .expect("seen lock should work")
            .clone()
    }
}

impl AnalysisProvider for FakeProvider {
    fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResult, AnalysisFailure> {
        self.seen_models
            .lock()
            .expect("seen lock should work")
            .push(request.inputs.model_name.clone());
        self.outcomes
            .lock()
            .expect("outcome lock should work")
            .pop()
            .unwrap_or(Err(AnalysisFailure::EmptyResponse))
    }
}

fn threat(id: &str, title: &str, severity: Severity) -> Threat {
    Threat {
        id: id.to_string(),
        category: "LLM01: Prompt Injection".to_string(),
        title: title.to_string(),
        description: format!("{title} description"),
        severity,
        mitigation: format!("{title} mitigation"),
        impact: format!("{title} impact"),
    }
}

/// Two threats (Low, Critical) with overall risk 75.
#[allow(dead_code)]
pub fn support_bot_analysis() -> AnalysisResult {
    AnalysisResult {
        threats: vec![
            threat("T1", "Verbose error messages", Severity::Low),
            threat("T2", "Indirect prompt injection", Severity::Critical),
        ],
        scores: vec![BenchmarkScore {
            category: "LLM01: Prompt Injection".to_string(),
            score: 32.0,
            details: "Retrieved content is not isolated.".to_string(),
        }],
        overall_risk: 75.0,
    }
}

/// Scenario descriptors.
#[allow(dead_code)]
pub fn support_bot_inputs() -> EvaluationInputs {
    EvaluationInputs::new("GPT-4o", "Public API + RAG", "Support bot")
}

fn fixed_clock() -> String {
    "2026-10-15T09:00:00Z".to_string()
}

/// Session over the given backend with deterministic ids and timestamps.
#[allow(dead_code)]
pub fn session_with(backend: impl HistoryBackend + 'static) -> Session {
    let store = EvaluationStore::open(backend)
        .with_rng(StdRng::seed_from_u64(7))
        .with_clock(fixed_clock);
    Session::new(store, support_bot_inputs())
}

/// Session over a fresh in-memory backend.
#[allow(dead_code)]
pub fn memory_session() -> (Session, MemoryBackend) {
    let backend = MemoryBackend::new();
    (session_with(backend.clone()), backend)
}
