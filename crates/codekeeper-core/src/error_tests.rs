//! Error module tests

use crate::error::{Error, Result};

#[test]
fn test_agent_not_found_error() {
    let error = Error::AgentNotFound("agent_1234".to_string());
    assert_eq!(error.code(), "E001");
    assert_eq!(
        error.suggestion(),
        Some("codekeeper agents list <application>".to_string())
    );
    assert!(error.to_string().contains("agent_1234"));
}

#[test]
fn test_malformed_analysis_error() {
    let error = Error::MalformedAnalysis("suggestedAgents[0].name is empty".to_string());
    assert_eq!(error.code(), "E100");
    assert!(error.suggestion().is_some());
    assert!(error.to_string().contains("suggestedAgents[0].name"));
}

#[test]
fn test_fanout_timeout_error() {
    let error = Error::FanOutTimeout(250);
    assert_eq!(error.code(), "E200");
    assert!(error.to_string().contains("250ms"));
}

#[test]
fn test_store_unavailable_error() {
    let error = Error::StoreUnavailable("connection refused".to_string());
    assert_eq!(error.code(), "E401");
    assert_eq!(error.suggestion(), Some("codekeeper doctor".to_string()));
}

#[test]
fn test_serialization_error_from() {
    let parse_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
    let error: Error = parse_err.into();
    assert_eq!(error.code(), "E402");
    assert_eq!(error.suggestion(), None);
}

#[test]
fn test_invalid_input_error() {
    let error = Error::InvalidInput("Empty file path".to_string());
    assert_eq!(error.code(), "E800");
    assert!(error.to_string().contains("Empty file path"));
}

#[test]
fn test_result_alias() {
    fn fails() -> Result<()> {
        Err(Error::Other("boom".to_string()))
    }

    let err = fails().unwrap_err();
    assert_eq!(err.to_string(), "boom");
}
