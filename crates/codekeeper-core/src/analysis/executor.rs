//! Agent analysis executor
//!
//! Runs one agent against one matching change event: analysis text,
//! suggestions, confidence, then the memory update. A failed memory write is
//! logged and swallowed; the response still reaches the caller.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, warn};

use crate::agents::{Agent, analysis_text};
use crate::config::EngineConfig;
use crate::memory::MemoryUpdate;
use crate::storage::AgentRepository;

use super::confidence::estimate_confidence;
use super::suggestions::generate_suggestions;
use super::types::{AgentResponse, ChangeEvent};

/// Executes single agent/event pairs against a repository
#[derive(Clone)]
pub struct AgentAnalysisExecutor {
    repository: Arc<dyn AgentRepository>,
    engine: EngineConfig,
}

impl AgentAnalysisExecutor {
    pub fn new(repository: Arc<dyn AgentRepository>, engine: EngineConfig) -> Self {
        Self { repository, engine }
    }

    /// Build the response without touching the store
    ///
    /// Returns the response together with the memory update it implies.
    pub fn analyze(&self, agent: &Agent, event: &ChangeEvent) -> (AgentResponse, MemoryUpdate) {
        let analysis = analysis_text(&agent.name, &agent.role, &event.file_path, &event.change_type);
        let suggestions = generate_suggestions(agent, event);
        let confidence = estimate_confidence(agent, event);
        let timestamp = Utc::now();

        let update = MemoryUpdate::new(
            &event.change_type,
            &event.file_path,
            confidence,
            &analysis,
            timestamp,
            self.engine.pattern_example_cap,
        );

        let response = AgentResponse {
            agent_id: agent.id.clone(),
            agent_name: agent.name.clone(),
            change_event_id: event.id.clone(),
            analysis,
            suggestions,
            confidence,
            timestamp,
            coordination: None,
        };

        (response, update)
    }

    /// Analyze and persist the memory update
    pub async fn execute(&self, agent: &Agent, event: &ChangeEvent) -> AgentResponse {
        let (response, update) = self.analyze(agent, event);

        match self.repository.record_analysis(&agent.id, &update).await {
            Ok(()) => debug!(
                agent_id = %agent.id,
                pattern_key = %update.pattern_key,
                confidence = response.confidence,
                "Agent analysis recorded"
            ),
            Err(e) => warn!(
                agent_id = %agent.id,
                event_id = %event.id,
                error = %e,
                "Failed to persist agent memory; returning response anyway"
            ),
        }

        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::PriorityClass;
    use crate::analysis::suggestions::MAX_SUGGESTIONS;
    use crate::config::Config;
    use crate::storage::{Database, SqliteAgentRepository};
    use crate::test_support::{FailingRepository, sample_agent};

    async fn sqlite_repo() -> Arc<SqliteAgentRepository> {
        let db = Database::in_memory()
            .await
            .expect("Failed to create test database");
        Arc::new(SqliteAgentRepository::new(db.pool().clone()))
    }

    #[tokio::test]
    async fn test_security_sentinel_scenario() {
        let repo = sqlite_repo().await;
        let agent = sample_agent(
            "SecuritySentinel",
            &["auth", "validation"],
            &["vulnerability-scanning"],
            PriorityClass::Critical,
        );
        repo.insert_agent(&agent).await.unwrap();

        let executor = AgentAnalysisExecutor::new(repo.clone(), EngineConfig::default());
        let event = ChangeEvent::new("app-1", "/api/login.ts", "auth-change");
        let response = executor.execute(&agent, &event).await;

        assert_eq!(response.agent_id, agent.id);
        assert_eq!(response.change_event_id, event.id);
        assert_eq!(response.suggestions.len(), 1);
        assert_eq!(response.suggestions[0].priority, 1);
        assert_eq!(response.suggestions[0].impact, "high");
        assert_eq!(response.confidence, 0.5);
        assert!(response.coordination.is_none());

        let stored = repo.get_agent(&agent.id).await.unwrap().unwrap();
        let entry = stored.pattern("auth-change_ts").unwrap();
        assert_eq!(entry.frequency, 1);
        assert_eq!(entry.confidence, 0.5);
        assert_eq!(
            stored.last_context("auth-change").unwrap().analysis,
            response.analysis
        );
    }

    #[tokio::test]
    async fn test_unknown_agent_gets_generic_analysis() {
        let repo = sqlite_repo().await;
        let agent = sample_agent("LintBot", &["refactor"], &["lint"], PriorityClass::Important);
        let executor = AgentAnalysisExecutor::new(repo, EngineConfig::default());

        let event = ChangeEvent::new("app-1", "/utils/x.ts", "refactor");
        let (response, update) = executor.analyze(&agent, &event);

        assert_eq!(
            response.analysis,
            format!("LintBot analyzed /utils/x.ts for {} improvements.", agent.role)
        );
        assert_eq!(update.pattern_key, "refactor_ts");
        assert_eq!(update.context_key, "last_refactor");
    }

    #[tokio::test]
    async fn test_suggestions_capped_regardless_of_config() {
        let repo = sqlite_repo().await;
        let agent = sample_agent(
            "Many",
            &["x"],
            &["a", "b", "c", "d", "e"],
            PriorityClass::Important,
        );
        let mut config = Config::default();
        config.set("engine.pattern_example_cap", "9").unwrap();
        assert!(config.set("engine.max_suggestions", "5").is_err());
        let executor = AgentAnalysisExecutor::new(repo, config.engine);

        let (response, _) = executor.analyze(&agent, &ChangeEvent::new("app-1", "/x.rs", "x"));
        assert_eq!(response.suggestions.len(), MAX_SUGGESTIONS);
    }

    #[tokio::test]
    async fn test_persistence_failure_still_returns_response() {
        let agent = sample_agent("SecuritySentinel", &["auth"], &["vulnerability-scanning"], PriorityClass::Critical);
        let executor =
            AgentAnalysisExecutor::new(Arc::new(FailingRepository), EngineConfig::default());

        let event = ChangeEvent::new("app-1", "/api/login.ts", "auth-change");
        let response = executor.execute(&agent, &event).await;

        assert_eq!(response.agent_id, agent.id);
        assert_eq!(response.suggestions.len(), 1);
    }
}
