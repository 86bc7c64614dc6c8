//! Benchmark smoke test for sort, parse, and store write-through.

use std::time::Instant;

use sentinel_analysis_contract::{AnalysisResult, parse_analysis_response};
use sentinel_core::{BenchmarkScore, EvaluationInputs, Severity, Threat};
use sentinel_store::{EvaluationStore, MemoryBackend, SubmitOutcome};
use sentinel_ui::{SortOption, sort_threats};

fn catalog(len: usize) -> Vec<Threat> {
    let severities = [
        Severity::Low,
        Severity::Critical,
        Severity::Medium,
        Severity::High,
    ];
    (0..len)
        .map(|index| Threat {
            id: format!("T{index}"),
            category: format!("LLM{:02}: Category", index % 10 + 1),
            title: format!("Threat {}", len - index),
            description: "description".to_string(),
            severity: severities[index % severities.len()].clone(),
            mitigation: "mitigation".to_string(),
            impact: "impact".to_string(),
        })
        .collect()
}

#[test]
fn benchmark_sort_and_store_smoke_prints_latency() {
    let threats = catalog(200);
    let result = AnalysisResult {
        threats: threats.clone(),
        scores: vec![BenchmarkScore {
            category: "LLM01: Prompt Injection".to_string(),
            score: 50.0,
            details: "details".to_string(),
        }],
        overall_risk: 60.0,
    };
    let raw = serde_json::to_string(&result).expect("result should encode");

    let start = Instant::now();
    let mut sorted_len = 0usize;
    for _ in 0..100 {
        for option in SortOption::ALL {
            sorted_len += sort_threats(&threats, option).len();
        }
        parse_analysis_response(&raw).expect("payload should parse");
    }
    let sort_ms = start.elapsed().as_millis();

    let stored = AnalysisResult {
        threats: threats[..20].to_vec(),
        ..result.clone()
    };
    let mut store = EvaluationStore::open(MemoryBackend::new());
    let start = Instant::now();
    for index in 0..50 {
        let pending = store.begin_submission(EvaluationInputs::new(
            format!("model-{index}"),
            "arch",
            "use",
        ));
        let outcome = store
            .complete_submission(pending, Ok(stored.clone()))
            .expect("write-through should succeed");
        assert!(matches!(outcome, SubmitOutcome::Recorded(_)));
    }
    let store_ms = start.elapsed().as_millis();

    println!("benchmark_sort_parse_elapsed_ms={sort_ms}");
    println!("benchmark_sorted_total_len={sorted_len}");
    println!("benchmark_store_elapsed_ms={store_ms}");

    assert_eq!(store.history().len(), 50);
    assert!(
        sort_ms < 5_000 && store_ms < 5_000,
        "smoke benchmark should stay bounded"
    );
}
