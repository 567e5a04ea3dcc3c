//! Agent factory - codebase analysis to persisted agents
//!
//! Creation is idempotent per application: names already present are
//! skipped. Tier 1 is always created, tier 2 is capped per run, tier 3 is
//! never auto-created. The ecosystem summary is replaced after every run.

pub mod analysis;
pub mod ecosystem;

pub use analysis::{CodebaseAnalysis, SuggestedAgent};
pub use ecosystem::AgentEcosystem;

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use crate::agents::{Agent, AgentTier};
use crate::error::Result;
use crate::storage::AgentRepository;

/// New tier-2 agents created per factory run
pub const TIER2_CREATION_CAP: usize = 3;

/// Creates agents from codebase analyses
#[derive(Clone)]
pub struct AgentFactory {
    repository: Arc<dyn AgentRepository>,
}

impl AgentFactory {
    pub fn new(repository: Arc<dyn AgentRepository>) -> Self {
        Self { repository }
    }

    /// Validate the analysis and persist the agents it warrants
    ///
    /// Returns only the agents created by this call.
    pub async fn create_from_analysis(&self, analysis: &CodebaseAnalysis) -> Result<Vec<Agent>> {
        analysis.validate()?;
        let application_id = analysis.application_id.as_str();

        let existing = self.repository.list_agents(application_id).await?;
        let mut agent_types: Vec<String> = existing.iter().map(|a| a.name.clone()).collect();
        let mut present: HashSet<String> = agent_types.iter().cloned().collect();
        let mut created = Vec::new();

        for suggestion in analysis.suggestions_in_tier(AgentTier::Essential) {
            if present.contains(&suggestion.name) {
                continue;
            }
            if let Some(agent) = self.create(application_id, suggestion).await? {
                created.push(agent);
            }
            present.insert(suggestion.name.clone());
        }

        let mut tier2_created = 0;
        for suggestion in analysis.suggestions_in_tier(AgentTier::Important) {
            if tier2_created >= TIER2_CREATION_CAP {
                break;
            }
            if present.contains(&suggestion.name) {
                continue;
            }
            if let Some(agent) = self.create(application_id, suggestion).await? {
                created.push(agent);
                tier2_created += 1;
            }
            present.insert(suggestion.name.clone());
        }

        let skipped_optional = analysis.suggestions_in_tier(AgentTier::Optional).count();
        if skipped_optional > 0 {
            debug!(
                application_id = %application_id,
                count = skipped_optional,
                "Tier-3 suggestions are not auto-created"
            );
        }

        agent_types.extend(created.iter().map(|a| a.name.clone()));
        let ecosystem = AgentEcosystem {
            application_id: application_id.to_string(),
            agent_count: u32::try_from(agent_types.len()).unwrap_or(u32::MAX),
            agent_types,
            project_type: analysis.project_type.clone(),
            updated_at: Utc::now(),
        };
        self.repository.replace_ecosystem(&ecosystem).await?;

        info!(
            application_id = %application_id,
            created = created.len(),
            total = ecosystem.agent_count,
            "Agent factory run complete"
        );

        Ok(created)
    }

    /// Insert one agent; `None` when another writer created the name first
    async fn create(
        &self,
        application_id: &str,
        suggestion: &SuggestedAgent,
    ) -> Result<Option<Agent>> {
        let agent = suggestion.to_agent(application_id, Utc::now())?;
        if self.repository.insert_agent(&agent).await? {
            Ok(Some(agent))
        } else {
            debug!(
                application_id = %application_id,
                name = %agent.name,
                "Agent name already taken, skipping"
            );
            Ok(None)
        }
    }
}
