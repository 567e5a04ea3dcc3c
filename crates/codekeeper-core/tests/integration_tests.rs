//! Codekeeper Core Integration Tests

use codekeeper_core::{
    Error,
    agents::AgentStatus,
    analysis::ChangeEvent,
    config::EngineConfig,
    factory::CodebaseAnalysis,
    memory::pattern_key,
    service::{AgentService, SuggestionSource},
    storage::{Database, DatabaseConfig},
};

const ANALYSIS: &str = r#"{
    "applicationId": "shop",
    "projectType": "web",
    "languages": ["typescript"],
    "complexity": "medium",
    "suggestedAgents": [
        {
            "name": "SecuritySentinel",
            "role": "security",
            "purpose": "Guard authentication and input handling",
            "triggers": ["auth", "validation"],
            "capabilities": ["vulnerability-scanning"],
            "priority": "critical",
            "tier": 1
        },
        {
            "name": "CodeQualityGuardian",
            "role": "code quality",
            "purpose": "Keep refactors clean",
            "triggers": ["refactor"],
            "capabilities": ["complexity-analysis", "duplication-detection", "naming-review", "dead-code-detection"],
            "priority": "important",
            "tier": 2
        },
        {
            "name": "PerformanceOptimizer",
            "role": "performance",
            "purpose": "Watch hot paths",
            "triggers": ["utils", "api"],
            "capabilities": ["profiling"],
            "priority": "important",
            "tier": 2
        },
        {
            "name": "AccessibilityChampion",
            "role": "accessibility",
            "purpose": "Audit UI components",
            "triggers": ["components"],
            "capabilities": ["aria-audit"],
            "priority": "nice-to-have",
            "tier": 3
        }
    ]
}"#;

async fn setup() -> (AgentService, CodebaseAnalysis) {
    let db = Database::in_memory()
        .await
        .expect("Failed to create test database");
    let service = AgentService::from_database(&db, EngineConfig::default());
    let analysis = CodebaseAnalysis::from_json(ANALYSIS).expect("valid analysis");
    (service, analysis)
}

#[tokio::test]
async fn test_create_agents_from_analysis() {
    let (service, analysis) = setup().await;

    let created = service.create_agents_from_analysis(&analysis).await.unwrap();
    let names: Vec<_> = created.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["SecuritySentinel", "CodeQualityGuardian", "PerformanceOptimizer"]
    );
    assert!(created.iter().all(|a| a.status == AgentStatus::Learning));

    let ecosystem = service.get_ecosystem("shop").await.unwrap().unwrap();
    assert_eq!(ecosystem.agent_count, 3);
    assert!(!ecosystem.agent_types.contains(&"AccessibilityChampion".to_string()));

    // Second run with the same analysis changes nothing
    let again = service.create_agents_from_analysis(&analysis).await.unwrap();
    assert!(again.is_empty());
    assert_eq!(service.list_agents("shop").await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_security_sentinel_example() {
    let (service, analysis) = setup().await;
    service.create_agents_from_analysis(&analysis).await.unwrap();

    let event = ChangeEvent::new("shop", "/lib/login.ts", "auth-change");
    let responses = service.trigger_agent_analysis("shop", &event).await.unwrap();

    assert_eq!(responses.len(), 1);
    let response = &responses[0];
    assert_eq!(response.agent_name, "SecuritySentinel");
    assert_eq!(response.suggestions.len(), 1);
    assert_eq!(response.suggestions[0].priority, 1);
    assert_eq!(response.suggestions[0].impact, "high");
    assert_eq!(response.confidence, 0.5);
    assert!(response.coordination.is_none());
}

#[tokio::test]
async fn test_refactor_twice_increments_frequency() {
    let (service, analysis) = setup().await;
    service.create_agents_from_analysis(&analysis).await.unwrap();

    let first = ChangeEvent::new("shop", "/utils/x.ts", "refactor");
    let second = ChangeEvent::new("shop", "/utils/x.ts", "refactor");
    assert_eq!(
        pattern_key(&first.change_type, &first.file_path),
        pattern_key(&second.change_type, &second.file_path)
    );

    let responses = service.trigger_agent_analysis("shop", &first).await.unwrap();
    let guardian_id = responses
        .iter()
        .find(|r| r.agent_name == "CodeQualityGuardian")
        .map(|r| r.agent_id.clone())
        .expect("guardian responded");
    let after_first = service.get_agent(&guardian_id).await.unwrap().unwrap();
    let first_confidence = after_first.pattern("refactor_ts").unwrap().confidence;

    service.trigger_agent_analysis("shop", &second).await.unwrap();
    let after_second = service.get_agent(&guardian_id).await.unwrap().unwrap();
    let entry = after_second.pattern("refactor_ts").unwrap();

    assert_eq!(after_second.memory.patterns.len(), 1);
    assert_eq!(entry.frequency, 2);
    assert_eq!(entry.confidence, first_confidence);
}

#[tokio::test]
async fn test_coordination_only_with_multiple_responders() {
    let (service, analysis) = setup().await;
    service.create_agents_from_analysis(&analysis).await.unwrap();

    // CodeQualityGuardian (refactor) and PerformanceOptimizer (utils)
    let event = ChangeEvent::new("shop", "/utils/x.ts", "refactor");
    let responses = service.trigger_agent_analysis("shop", &event).await.unwrap();
    assert_eq!(responses.len(), 2);
    for response in &responses {
        let block = response.coordination.as_ref().expect("coordination block");
        assert_eq!(block.co_responders.len(), 1);
        assert_ne!(block.co_responders[0], response.agent_name);
    }

    // Suggestions per response are capped
    let guardian = responses
        .iter()
        .find(|r| r.agent_name == "CodeQualityGuardian")
        .unwrap();
    assert_eq!(guardian.suggestions.len(), 3);
    assert!(guardian.suggestions.iter().all(|s| s.priority == 2));
}

#[tokio::test]
async fn test_inactive_and_error_agents_do_not_respond() {
    let (service, analysis) = setup().await;
    let created = service.create_agents_from_analysis(&analysis).await.unwrap();
    let sentinel = created
        .iter()
        .find(|a| a.name == "SecuritySentinel")
        .unwrap();

    service
        .set_agent_status(&sentinel.id, AgentStatus::Inactive)
        .await
        .unwrap();
    let event = ChangeEvent::new("shop", "/lib/login.ts", "auth-change");
    assert!(service.trigger_agent_analysis("shop", &event).await.unwrap().is_empty());

    service
        .set_agent_status(&sentinel.id, AgentStatus::Error)
        .await
        .unwrap();
    assert!(service.trigger_agent_analysis("shop", &event).await.unwrap().is_empty());

    service
        .set_agent_status(&sentinel.id, AgentStatus::Active)
        .await
        .unwrap();
    assert_eq!(
        service.trigger_agent_analysis("shop", &event).await.unwrap().len(),
        1
    );
}

#[tokio::test]
async fn test_performance_and_feedback() {
    let (service, analysis) = setup().await;
    service.create_agents_from_analysis(&analysis).await.unwrap();

    let event = ChangeEvent::new("shop", "/utils/x.ts", "refactor");
    let outcome = service.track_change("shop", &event).await.unwrap();
    assert_eq!(outcome.source, SuggestionSource::Agents);
    assert_eq!(outcome.suggestions.len(), 4);

    let guardian = outcome
        .responses
        .iter()
        .find(|r| r.agent_name == "CodeQualityGuardian")
        .unwrap();
    let stored = service.get_agent(&guardian.agent_id).await.unwrap().unwrap();
    assert_eq!(stored.performance.suggestions_generated, 3);

    service
        .record_suggestion_feedback(&guardian.agent_id, true)
        .await
        .unwrap();
    let performance = service
        .record_suggestion_feedback(&guardian.agent_id, true)
        .await
        .unwrap();
    assert_eq!(performance.suggestions_accepted, 2);
    assert!((performance.success_rate - 2.0 / 3.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_malformed_analysis_is_rejected() {
    let (service, _) = setup().await;
    let analysis = CodebaseAnalysis::from_json(
        r#"{"applicationId": "shop", "suggestedAgents": [{"name": "X", "tier": 1}]}"#,
    )
    .unwrap();

    let err = service
        .create_agents_from_analysis(&analysis)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::MalformedAnalysis(_)));
    assert_eq!(err.code(), "E100");
    assert!(service.list_agents("shop").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_state_persists_across_connections() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("codekeeper.db");

    let agent_id = {
        let db = Database::new(DatabaseConfig::with_path(&path)).await.unwrap();
        let service = AgentService::from_database(&db, EngineConfig::default());
        let analysis = CodebaseAnalysis::from_json(ANALYSIS).unwrap();
        let created = service.create_agents_from_analysis(&analysis).await.unwrap();

        let event = ChangeEvent::new("shop", "/lib/login.ts", "auth-change");
        service.trigger_agent_analysis("shop", &event).await.unwrap();
        db.close().await;
        created[0].id.clone()
    };

    let db = Database::new(DatabaseConfig::with_path(&path)).await.unwrap();
    let service = AgentService::from_database(&db, EngineConfig::default());
    let agent = service.get_agent(&agent_id).await.unwrap().unwrap();
    assert_eq!(agent.name, "SecuritySentinel");
    assert_eq!(agent.pattern("auth-change_ts").unwrap().frequency, 1);
    assert_eq!(agent.performance.suggestions_generated, 1);
}
