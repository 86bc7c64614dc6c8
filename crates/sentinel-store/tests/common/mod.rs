//! Shared fixtures for store integration tests.

use std::sync::Mutex;

use rand::SeedableRng;
use rand::rngs::StdRng;
use sentinel_analysis_contract::{
    AnalysisFailure, AnalysisProvider, AnalysisRequest, AnalysisResult,
};
use sentinel_core::{BenchmarkScore, Severity, Threat};
use sentinel_store::{EvaluationStore, HistoryBackend};

/// Provider that replays scripted outcomes in order.
pub struct ScriptedProvider {
    outcomes: Mutex<Vec<Result<AnalysisResult, AnalysisFailure>>>,
}

impl ScriptedProvider {
    #[allow(dead_code)]
    pub fn new(mut outcomes: Vec<Result<AnalysisResult, AnalysisFailure>>) -> Self {
        outcomes.reverse();
        Self {
            outcomes: Mutex::new(outcomes),
        }
    }

    #[allow(dead_code)]
    pub fn always(result: AnalysisResult, times: usize) -> Self {
        Self::new((0..times).map(|_| Ok(result.clone())).collect())
    }
}

impl AnalysisProvider for ScriptedProvider {
    fn analyze(&self, _request: &AnalysisRequest) -> Result<AnalysisResult, AnalysisFailure> {
        self.outcomes
            .lock()
            .expect("outcome lock should work")
            .pop()
            .unwrap_or(Err(AnalysisFailure::EmptyResponse))
    }
}

/// Builds one threat fixture.
#[allow(dead_code)]
pub fn threat(id: &str, title: &str, severity: Severity) -> Threat {
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

/// Two-threat analysis (Critical + Low) with overall risk 75.
#[allow(dead_code)]
pub fn support_bot_analysis() -> AnalysisResult {
    AnalysisResult {
        threats: vec![
            threat("T1", "Low-grade overreliance", Severity::Low),
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

fn fixed_clock() -> String {
    "2026-10-15T09:00:00Z".to_string()
}

/// Opens a store with deterministic ids and timestamps.
#[allow(dead_code)]
pub fn open_store(backend: impl HistoryBackend + 'static) -> EvaluationStore {
    EvaluationStore::open(backend)
        .with_rng(StdRng::seed_from_u64(42))
        .with_clock(fixed_clock)
}
