//! Shared fixtures for UI integration tests.

use sentinel_core::{BenchmarkScore, ModelEvaluation, Severity, Threat};

/// Builds one threat fixture.
#[allow(dead_code)]
pub fn threat(id: &str, title: &str, category: &str, severity: Severity) -> Threat {
    Threat {
        id: id.to_string(),
        category: category.to_string(),
        title: title.to_string(),
        description: format!("{title} description"),
        severity,
        mitigation: format!("{title} mitigation"),
        impact: format!("{title} impact"),
    }
}

/// Mixed-severity catalog in provider order.
#[allow(dead_code)]
pub fn mixed_threats() -> Vec<Threat> {
    vec![
        threat("T1", "Overreliance on output", "LLM09: Overreliance", Severity::Medium),
        threat("T2", "prompt injection via RAG", "LLM01: Prompt Injection", Severity::Critical),
        threat("T3", "Model theft", "LLM10: Model Theft", Severity::Low),
        threat("T4", "Insecure plugin design", "LLM07: Insecure Plugin Design", Severity::High),
    ]
}

/// Evaluation fixture wrapping [`mixed_threats`].
#[allow(dead_code)]
pub fn evaluation(id: &str, model_name: &str, risk: f64) -> ModelEvaluation {
    ModelEvaluation {
        id: id.to_string(),
        model_name: model_name.to_string(),
        architecture: "Public API + RAG".to_string(),
        use_case: "Support bot".to_string(),
        timestamp: "2026-10-15T09:00:00Z".to_string(),
        threats: mixed_threats(),
        scores: vec![
            BenchmarkScore {
                category: "LLM01: Prompt Injection".to_string(),
                score: 40.0,
                details: "Retrieved content is not isolated.".to_string(),
            },
            BenchmarkScore {
                category: "LLM06: Sensitive Information Disclosure".to_string(),
                score: 85.0,
                details: "PII filters in place.".to_string(),
            },
        ],
        overall_risk_score: risk,
    }
}
