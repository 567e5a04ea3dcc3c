//! Fan-out coordinator
//!
//! One round per change event: load responsive agents, match triggers, run
//! every matching agent concurrently, link co-responders, then record
//! performance. Rounds never share state, so responses from different events
//! are never cross-linked.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::agents::AgentStatus;
use crate::analysis::{
    AgentAnalysisExecutor, AgentResponse, ChangeEvent, CoordinationBlock, Suggestion,
    should_respond,
};
use crate::config::EngineConfig;
use crate::error::Result;
use crate::storage::AgentRepository;

/// Responses gathered for one change event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FanOutRound {
    pub event_id: String,
    /// In agent load order
    pub responses: Vec<AgentResponse>,
}

impl FanOutRound {
    /// All suggestions, flattened in response order
    pub fn suggestions(&self) -> Vec<Suggestion> {
        self.responses
            .iter()
            .flat_map(|r| r.suggestions.iter().cloned())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.responses.is_empty()
    }
}

/// Attach a coordination block to every response that has co-responders
///
/// All responses must belong to the same event. A lone response is left
/// without a block.
pub fn link_co_responders(responses: &mut [AgentResponse]) {
    if responses.len() < 2 {
        return;
    }

    let snapshot: Vec<(String, String)> = responses
        .iter()
        .map(|r| (r.agent_name.clone(), r.analysis.clone()))
        .collect();

    for (index, response) in responses.iter_mut().enumerate() {
        let others = snapshot
            .iter()
            .enumerate()
            .filter(|(other, _)| *other != index)
            .map(|(_, entry)| entry);

        let (co_responders, analyses): (Vec<String>, Vec<&str>) = others
            .map(|(name, analysis)| (name.clone(), analysis.as_str()))
            .unzip();

        response.coordination = Some(CoordinationBlock {
            co_responders,
            shared_analysis: analyses.join("; "),
        });
    }
}

/// Runs fan-out rounds against a repository
#[derive(Clone)]
pub struct FanOutCoordinator {
    repository: Arc<dyn AgentRepository>,
    executor: AgentAnalysisExecutor,
}

impl FanOutCoordinator {
    pub fn new(repository: Arc<dyn AgentRepository>, engine: EngineConfig) -> Self {
        let executor = AgentAnalysisExecutor::new(repository.clone(), engine);
        Self {
            repository,
            executor,
        }
    }

    /// Run one round for an event
    ///
    /// Fails only when the responsive agents cannot be loaded; later
    /// persistence failures are logged and the round still completes.
    pub async fn run(&self, application_id: &str, event: &ChangeEvent) -> Result<FanOutRound> {
        // Load
        let agents = self
            .repository
            .list_agents_by_status(application_id, &AgentStatus::RESPONSIVE)
            .await?;

        // Match
        let matching: Vec<_> = agents
            .iter()
            .filter(|agent| should_respond(&agent.triggers, event))
            .collect();

        debug!(
            application_id = %application_id,
            event_id = %event.id,
            loaded = agents.len(),
            matched = matching.len(),
            "Matched agents for change event"
        );

        // Execute
        let futures: Vec<_> = matching
            .iter()
            .map(|agent| self.executor.execute(agent, event))
            .collect();
        let mut responses = futures_util::future::join_all(futures).await;

        // Coordinate
        link_co_responders(&mut responses);

        // Record performance
        self.record_performance(&responses).await;

        info!(
            application_id = %application_id,
            event_id = %event.id,
            responders = responses.len(),
            "Fan-out round complete"
        );

        Ok(FanOutRound {
            event_id: event.id.clone(),
            responses,
        })
    }

    async fn record_performance(&self, responses: &[AgentResponse]) {
        let now = Utc::now();
        let updates = responses.iter().map(|response| async move {
            let count = response.suggestions.len() as u64;
            if let Err(e) = self
                .repository
                .increment_suggestions(&response.agent_id, count, now)
                .await
            {
                warn!(
                    agent_id = %response.agent_id,
                    error = %e,
                    "Failed to record agent performance"
                );
            }
        });
        futures_util::future::join_all(updates).await;
    }
}
