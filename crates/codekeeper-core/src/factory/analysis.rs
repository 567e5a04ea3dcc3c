//! Codebase analysis contract
//!
//! Produced by an external analyzer; the factory only reads `applicationId`
//! and `suggestedAgents`. Fields are defaulted on deserialization so that
//! validation can report every problem at once instead of the first one
//! serde trips over.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::agents::{
    Agent, AgentMemory, AgentPerformance, AgentStatus, AgentTier, PriorityClass,
    specification_for,
};
use crate::error::{Error, Result};

/// Ranked agent suggestion from the analyzer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestedAgent {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub purpose: String,
    #[serde(default)]
    pub triggers: Vec<String>,
    #[serde(default)]
    pub capabilities: Vec<String>,
    /// `critical`, `important` or `nice-to-have`
    #[serde(default)]
    pub priority: String,
    /// 1..=3; zero when absent
    #[serde(default)]
    pub tier: u8,
}

impl SuggestedAgent {
    fn problems(&self, index: usize) -> Vec<String> {
        let label = if self.name.trim().is_empty() {
            format!("suggestedAgents[{}]", index)
        } else {
            format!("suggestedAgents[{}] ({})", index, self.name)
        };

        let mut problems = Vec::new();
        if self.name.trim().is_empty() {
            problems.push(format!("{}: name is missing", label));
        }
        if self.role.trim().is_empty() {
            problems.push(format!("{}: role is missing", label));
        }
        if self.triggers.iter().any(|t| t.is_empty()) {
            problems.push(format!("{}: triggers contain an empty keyword", label));
        }
        if self.capabilities.iter().any(|c| c.trim().is_empty()) {
            problems.push(format!("{}: capabilities contain an empty label", label));
        }
        if PriorityClass::parse(&self.priority).is_none() {
            problems.push(format!(
                "{}: priority '{}' is not critical, important or nice-to-have",
                label, self.priority
            ));
        }
        if AgentTier::try_from(self.tier).is_err() {
            problems.push(format!("{}: tier {} is outside 1..=3", label, self.tier));
        }
        problems
    }

    pub fn tier(&self) -> Option<AgentTier> {
        AgentTier::try_from(self.tier).ok()
    }

    /// Build a fresh `learning` agent; the suggestion must already be valid
    pub fn to_agent(&self, application_id: &str, created_at: DateTime<Utc>) -> Result<Agent> {
        let priority = PriorityClass::parse(&self.priority).ok_or_else(|| {
            Error::MalformedAnalysis(format!("unknown priority '{}'", self.priority))
        })?;
        let tier = AgentTier::try_from(self.tier).map_err(Error::MalformedAnalysis)?;

        Ok(Agent {
            id: Agent::derive_id(application_id, &self.name, created_at),
            application_id: application_id.to_string(),
            name: self.name.clone(),
            role: self.role.clone(),
            purpose: self.purpose.clone(),
            triggers: self.triggers.clone(),
            capabilities: self.capabilities.clone(),
            priority,
            tier,
            status: AgentStatus::Learning,
            performance: AgentPerformance::default(),
            memory: AgentMemory::default(),
            specification: specification_for(&self.name, &self.capabilities),
            created_at,
        })
    }
}

/// Analyzer output for one application
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodebaseAnalysis {
    #[serde(default)]
    pub application_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_type: Option<String>,
    #[serde(default)]
    pub languages: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complexity: Option<String>,
    /// Detected architectural patterns
    #[serde(default)]
    pub patterns: Vec<String>,
    pub suggested_agents: Vec<SuggestedAgent>,
}

impl CodebaseAnalysis {
    /// Parse analyzer JSON, mapping any shape error to `MalformedAnalysis`
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::MalformedAnalysis(e.to_string()))
    }

    /// Reject the analysis if any required field is missing or invalid
    pub fn validate(&self) -> Result<()> {
        let mut problems = Vec::new();
        if self.application_id.trim().is_empty() {
            problems.push("applicationId is missing".to_string());
        }
        for (index, suggestion) in self.suggested_agents.iter().enumerate() {
            problems.extend(suggestion.problems(index));
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(Error::MalformedAnalysis(problems.join("; ")))
        }
    }

    /// Suggestions of one tier, in analysis order
    pub fn suggestions_in_tier(&self, tier: AgentTier) -> impl Iterator<Item = &SuggestedAgent> {
        self.suggested_agents
            .iter()
            .filter(move |s| s.tier() == Some(tier))
    }
}
