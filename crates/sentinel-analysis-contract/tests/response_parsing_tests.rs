//! Integration tests for provider response validation.

use sentinel_analysis_contract::{AnalysisContractError, parse_analysis_response};
use sentinel_core::Severity;

#[test]
fn response_parsing_tests_accepts_valid_payload() {
    let raw = r#"{
        "threats":[{
            "id":"T-1","category":"LLM01: Prompt Injection","title":"Jailbreak",
            "description":"d","severity":"High","mitigation":"m","impact":"i"
        }],
        "scores":[{"category":"LLM01: Prompt Injection","score":62.5,"details":"ok"}],
        "overallRiskScore":48
    }"#;

    let result = parse_analysis_response(raw).expect("payload should parse");
    assert_eq!(result.threats.len(), 1);
    assert_eq!(result.threats[0].severity, Severity::High);
    assert_eq!(result.scores[0].score, 62.5);
    assert_eq!(result.overall_risk, 48.0);
}

#[test]
fn response_parsing_tests_accepts_empty_lists() {
    let result = parse_analysis_response(r#"{"threats":[],"scores":[],"overallRiskScore":0}"#)
        .expect("empty lists are a valid shape");
    assert!(result.threats.is_empty());
    assert!(result.scores.is_empty());
}

#[test]
fn response_parsing_tests_rejects_unknown_severity() {
    let raw = r#"{
        "threats":[{
            "id":"T-1","category":"c","title":"t","description":"d",
            "severity":"Catastrophic","mitigation":"m","impact":"i"
        }],
        "scores":[],
        "overallRiskScore":10
    }"#;

    let error = parse_analysis_response(raw).expect_err("severity outside enum should fail");
    assert!(matches!(error, AnalysisContractError::SchemaViolation(_)));
}

#[test]
fn response_parsing_tests_rejects_missing_threat_field() {
    let raw = r#"{
        "threats":[{"id":"T-1","category":"c","title":"t","severity":"Low","mitigation":"m","impact":"i"}],
        "scores":[],
        "overallRiskScore":10
    }"#;

    let error = parse_analysis_response(raw).expect_err("missing description should fail");
    match error {
        AnalysisContractError::SchemaViolation(message) => {
            assert!(message.contains("description"), "{message}");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn response_parsing_tests_rejects_string_score() {
    let raw = r#"{"threats":[],"scores":[{"category":"c","score":"90","details":"d"}],"overallRiskScore":1}"#;
    assert!(parse_analysis_response(raw).is_err());
}

#[test]
fn response_parsing_tests_rejects_non_json() {
    let error = parse_analysis_response("Sorry, I cannot help with that.")
        .expect_err("prose should fail");
    assert!(matches!(error, AnalysisContractError::Decode(_)));
}
