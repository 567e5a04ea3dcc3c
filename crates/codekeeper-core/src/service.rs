//! Agent service - the operations exposed to transports
//!
//! Wraps the factory, the fan-out coordinator and the repository behind one
//! handle. `track_change` is the resilient entry point: it never fails
//! because of the store, degrading to context-free suggestions instead.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::agents::{Agent, AgentPerformance, AgentStatus};
use crate::analysis::{AgentResponse, ChangeEvent, Suggestion, fallback_suggestions};
use crate::config::EngineConfig;
use crate::coordination::FanOutCoordinator;
use crate::error::{Error, Result};
use crate::factory::{AgentEcosystem, AgentFactory, CodebaseAnalysis};
use crate::storage::{AgentRepository, Database, SqliteAgentRepository};

/// Where the suggestions of a tracked change came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionSource {
    Agents,
    Fallback,
}

impl SuggestionSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Agents => "agents",
            Self::Fallback => "fallback",
        }
    }
}

/// Result of tracking one change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeTrackingOutcome {
    pub event_id: String,
    /// Empty when the fallback was used
    pub responses: Vec<AgentResponse>,
    pub suggestions: Vec<Suggestion>,
    pub source: SuggestionSource,
}

impl ChangeTrackingOutcome {
    /// Context-free outcome for when no agent could be consulted
    pub fn fallback(event: &ChangeEvent) -> Self {
        Self {
            event_id: event.id.clone(),
            responses: Vec::new(),
            suggestions: fallback_suggestions(event),
            source: SuggestionSource::Fallback,
        }
    }
}

/// Entry point for agent lifecycle and change analysis
#[derive(Clone)]
pub struct AgentService {
    repository: Arc<dyn AgentRepository>,
    engine: EngineConfig,
    factory: AgentFactory,
    coordinator: FanOutCoordinator,
}

impl AgentService {
    pub fn new(repository: Arc<dyn AgentRepository>, engine: EngineConfig) -> Self {
        let factory = AgentFactory::new(repository.clone());
        let coordinator = FanOutCoordinator::new(repository.clone(), engine.clone());
        Self {
            repository,
            engine,
            factory,
            coordinator,
        }
    }

    /// Service over the SQLite store of an open database
    pub fn from_database(db: &Database, engine: EngineConfig) -> Self {
        Self::new(
            Arc::new(SqliteAgentRepository::new(db.pool().clone())),
            engine,
        )
    }

    pub fn engine(&self) -> &EngineConfig {
        &self.engine
    }

    /// Create agents for an application; returns only newly created ones
    pub async fn create_agents_from_analysis(
        &self,
        analysis: &CodebaseAnalysis,
    ) -> Result<Vec<Agent>> {
        self.factory.create_from_analysis(analysis).await
    }

    /// Run one fan-out round and return the responses
    pub async fn trigger_agent_analysis(
        &self,
        application_id: &str,
        event: &ChangeEvent,
    ) -> Result<Vec<AgentResponse>> {
        check_event_application(application_id, event)?;
        let round = self.coordinator.run(application_id, event).await?;
        Ok(round.responses)
    }

    /// Agents whose status lets them respond (`active` or `learning`)
    pub async fn get_active_agents(&self, application_id: &str) -> Result<Vec<Agent>> {
        self.repository
            .list_agents_by_status(application_id, &AgentStatus::RESPONSIVE)
            .await
    }

    /// Every agent of an application regardless of status
    pub async fn list_agents(&self, application_id: &str) -> Result<Vec<Agent>> {
        self.repository.list_agents(application_id).await
    }

    pub async fn get_agent(&self, agent_id: &str) -> Result<Option<Agent>> {
        self.repository.get_agent(agent_id).await
    }

    /// Status hook for the orchestration layer
    pub async fn set_agent_status(&self, agent_id: &str, status: AgentStatus) -> Result<()> {
        self.repository.set_status(agent_id, status).await
    }

    pub async fn record_suggestion_feedback(
        &self,
        agent_id: &str,
        accepted: bool,
    ) -> Result<AgentPerformance> {
        self.repository.record_feedback(agent_id, accepted).await
    }

    pub async fn get_ecosystem(&self, application_id: &str) -> Result<Option<AgentEcosystem>> {
        self.repository.get_ecosystem(application_id).await
    }

    /// Track a change, falling back to context-free suggestions
    ///
    /// Any fan-out failure, store errors and timeouts included, is logged and
    /// answered with the fallback list. Only a mismatched application id is
    /// returned as an error.
    pub async fn track_change(
        &self,
        application_id: &str,
        event: &ChangeEvent,
    ) -> Result<ChangeTrackingOutcome> {
        check_event_application(application_id, event)?;

        let budget = self.engine.fanout_timeout();
        let result = match tokio::time::timeout(budget, self.coordinator.run(application_id, event))
            .await
        {
            Ok(result) => result,
            Err(_) => Err(Error::FanOutTimeout(self.engine.fanout_timeout_ms)),
        };

        match result {
            Ok(round) => {
                let suggestions = round.suggestions();
                Ok(ChangeTrackingOutcome {
                    event_id: round.event_id,
                    responses: round.responses,
                    suggestions,
                    source: SuggestionSource::Agents,
                })
            }
            Err(e) => {
                warn!(
                    application_id = %application_id,
                    event_id = %event.id,
                    error = %e,
                    code = e.code(),
                    "Agent fan-out failed, using fallback suggestions"
                );
                Ok(ChangeTrackingOutcome::fallback(event))
            }
        }
    }
}

fn check_event_application(application_id: &str, event: &ChangeEvent) -> Result<()> {
    if event.application_id != application_id {
        return Err(Error::InvalidInput(format!(
            "Change event belongs to application '{}', not '{}'",
            event.application_id, application_id
        )));
    }
    Ok(())
}
