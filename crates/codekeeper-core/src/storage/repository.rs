//! Repository trait for agent persistence
//!
//! The engine talks to the store only through this trait. Every mutation is
//! scoped to a single agent document (or the ecosystem summary) and is applied
//! as a field-level update so that overlapping change events for the same
//! agent never lose increments.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::agents::{Agent, AgentPerformance, AgentStatus};
use crate::error::Result;
use crate::factory::AgentEcosystem;
use crate::memory::MemoryUpdate;

/// Repository trait for agents and ecosystem summaries
#[async_trait]
pub trait AgentRepository: Send + Sync {
    // ========== Agent documents ==========

    /// Insert a new agent; returns `false` when the name already exists for the application
    async fn insert_agent(&self, agent: &Agent) -> Result<bool>;

    /// Get an agent with its memory by ID
    async fn get_agent(&self, agent_id: &str) -> Result<Option<Agent>>;

    /// List every agent of an application in creation order
    async fn list_agents(&self, application_id: &str) -> Result<Vec<Agent>>;

    /// List agents of an application whose status is one of `statuses`
    async fn list_agents_by_status(
        &self,
        application_id: &str,
        statuses: &[AgentStatus],
    ) -> Result<Vec<Agent>>;

    // ========== Field-level updates ==========

    /// Upsert a pattern entry, overwrite the context entry and refresh last-active, atomically
    async fn record_analysis(&self, agent_id: &str, update: &MemoryUpdate) -> Result<()>;

    /// Atomically add to the generated-suggestions counter and refresh last-active
    async fn increment_suggestions(
        &self,
        agent_id: &str,
        count: u64,
        at: DateTime<Utc>,
    ) -> Result<()>;

    /// Record acceptance feedback and return the updated performance block
    async fn record_feedback(&self, agent_id: &str, accepted: bool) -> Result<AgentPerformance>;

    /// Set lifecycle status
    async fn set_status(&self, agent_id: &str, status: AgentStatus) -> Result<()>;

    // ========== Ecosystem summary ==========

    /// Replace the ecosystem summary for its application
    async fn replace_ecosystem(&self, ecosystem: &AgentEcosystem) -> Result<()>;

    /// Get the ecosystem summary for an application
    async fn get_ecosystem(&self, application_id: &str) -> Result<Option<AgentEcosystem>>;
}
