//! Per-application ecosystem summary

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which agents an application has, replaced after every factory run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentEcosystem {
    pub application_id: String,
    pub agent_count: u32,
    /// Agent names, existing ones first in creation order
    pub agent_types: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_type: Option<String>,
    pub updated_at: DateTime<Utc>,
}
