//! Agent data model
//!
//! An agent is a persisted, per-application specialization that reacts to
//! change events whose file path or change type contains one of its triggers.

use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{Error, Result};
use crate::memory::PatternMemory;

/// Lifecycle status of an agent
///
/// Transitions are driven by the orchestration layer; the engine only reads
/// the status to decide fan-out participation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentStatus {
    /// Just created, no performance history yet
    Learning,
    /// Has responded at least once successfully
    Active,
    /// Deliberately disabled
    Inactive,
    /// Last execution failed
    Error,
}

impl AgentStatus {
    /// Statuses that take part in a fan-out round
    pub const RESPONSIVE: [AgentStatus; 2] = [AgentStatus::Active, AgentStatus::Learning];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Learning => "learning",
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Error => "error",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "learning" => Ok(Self::Learning),
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            "error" => Ok(Self::Error),
            other => Err(Error::InvalidInput(format!(
                "Unknown agent status '{}'. Expected learning, active, inactive or error",
                other
            ))),
        }
    }

    /// Whether agents in this status respond to change events
    pub fn is_responsive(&self) -> bool {
        matches!(self, Self::Active | Self::Learning)
    }
}

impl std::fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Priority class declared by the upstream analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PriorityClass {
    #[serde(rename = "critical")]
    Critical,
    #[serde(rename = "important")]
    Important,
    #[serde(rename = "nice-to-have")]
    NiceToHave,
}

impl PriorityClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::Important => "important",
            Self::NiceToHave => "nice-to-have",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "critical" => Some(Self::Critical),
            "important" => Some(Self::Important),
            "nice-to-have" | "nice_to_have" => Some(Self::NiceToHave),
            _ => None,
        }
    }

    /// Numeric suggestion priority (1 = highest)
    pub fn suggestion_priority(&self) -> u8 {
        match self {
            Self::Critical => 1,
            Self::Important => 2,
            Self::NiceToHave => 3,
        }
    }

    /// Impact label reported on suggestions
    pub fn impact(&self) -> &'static str {
        match self {
            Self::Critical => "high",
            Self::Important | Self::NiceToHave => "medium",
        }
    }

    /// Effort label reported on suggestions
    pub fn effort(&self) -> &'static str {
        match self {
            Self::Critical | Self::Important => "medium",
            Self::NiceToHave => "low",
        }
    }
}

impl std::fmt::Display for PriorityClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Essentiality tier (lower is more essential)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum AgentTier {
    /// Always created
    Essential = 1,
    /// Created up to a per-run cap
    Important = 2,
    /// Suggestion only, never auto-created
    Optional = 3,
}

impl TryFrom<u8> for AgentTier {
    type Error = String;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Essential),
            2 => Ok(Self::Important),
            3 => Ok(Self::Optional),
            other => Err(format!("tier must be 1, 2 or 3 (got {})", other)),
        }
    }
}

impl From<AgentTier> for u8 {
    fn from(tier: AgentTier) -> Self {
        tier as u8
    }
}

/// Accumulated performance counters; never decremented
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentPerformance {
    pub suggestions_generated: u64,
    pub suggestions_accepted: u64,
    pub success_rate: f64,
    pub last_active: Option<DateTime<Utc>>,
}

/// Latest response summary for one change type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextEntry {
    pub file_path: String,
    pub timestamp: DateTime<Utc>,
    pub analysis: String,
}

/// Agent-owned memory: pattern entries (most recent first) and context map
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentMemory {
    pub patterns: Vec<PatternMemory>,
    pub context: BTreeMap<String, ContextEntry>,
}

/// Descriptive text resolved once at creation time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentSpecification {
    pub analysis_approach: String,
    pub improvement_strategies: Vec<String>,
    pub communication_style: String,
    pub learning_approach: String,
}

/// A persisted per-application agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    pub id: String,
    pub application_id: String,
    pub name: String,
    pub role: String,
    pub purpose: String,
    /// Keywords matched as substrings of the change type or file path
    pub triggers: Vec<String>,
    /// Labels that become suggestion types, in declaration order
    pub capabilities: Vec<String>,
    pub priority: PriorityClass,
    pub tier: AgentTier,
    pub status: AgentStatus,
    pub performance: AgentPerformance,
    pub memory: AgentMemory,
    pub specification: AgentSpecification,
    pub created_at: DateTime<Utc>,
}

impl Agent {
    /// Derive the agent id from application, name and creation time
    pub fn derive_id(application_id: &str, name: &str, created_at: DateTime<Utc>) -> String {
        let mut hasher = Sha256::new();
        hasher.update(application_id.as_bytes());
        hasher.update([0u8]);
        hasher.update(name.as_bytes());
        hasher.update([0u8]);
        hasher.update(
            created_at
                .to_rfc3339_opts(SecondsFormat::Nanos, true)
                .as_bytes(),
        );
        let digest = hex::encode(hasher.finalize());
        format!("agent_{}", &digest[..16])
    }

    /// Context-map key for a change type
    pub fn context_key(change_type: &str) -> String {
        format!("last_{}", change_type)
    }

    /// Most recent context entry recorded for a change type
    pub fn last_context(&self, change_type: &str) -> Option<&ContextEntry> {
        self.memory.context.get(&Self::context_key(change_type))
    }

    /// Pattern-memory entry for a key, if the agent has seen it
    pub fn pattern(&self, pattern_key: &str) -> Option<&PatternMemory> {
        self.memory
            .patterns
            .iter()
            .find(|p| p.pattern_key == pattern_key)
    }
}
