//! Tests summary helpers on completed evaluations.

use sentinel_core::{BenchmarkScore, ModelEvaluation, RiskTier, Severity, Threat};

fn threat(id: &str, severity: Severity) -> Threat {
    Threat {
        id: id.to_string(),
        category: "LLM06: Sensitive Information Disclosure".to_string(),
        title: format!("threat {id}"),
        description: String::new(),
        severity,
        mitigation: String::new(),
        impact: String::new(),
    }
}

#[test]
fn evaluation_summary_tests_counts_and_tiers() {
    let evaluation = ModelEvaluation {
        id: "abc123".to_string(),
        model_name: "m".to_string(),
        architecture: "a".to_string(),
        use_case: "u".to_string(),
        timestamp: "2026-10-15T00:00:00Z".to_string(),
        threats: vec![
            threat("1", Severity::Critical),
            threat("2", Severity::Critical),
            threat("3", Severity::Low),
        ],
        scores: vec![
            BenchmarkScore {
                category: "LLM01".to_string(),
                score: 40.0,
                details: String::new(),
            },
            BenchmarkScore {
                category: "LLM02".to_string(),
                score: 80.0,
                details: String::new(),
            },
        ],
        overall_risk_score: 55.0,
    };

    assert_eq!(evaluation.critical_count(), 2);
    assert_eq!(evaluation.count_by_severity(&Severity::Low), 1);
    assert_eq!(evaluation.count_by_severity(&Severity::High), 0);
    assert_eq!(evaluation.risk_tier(), RiskTier::Medium);
    assert_eq!(evaluation.mean_benchmark_score(), Some(60.0));
    assert_eq!(evaluation.inputs().model_name, "m");
}
