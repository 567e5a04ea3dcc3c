//! Change events and the per-agent responses they produce

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A file change reported for an application
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeEvent {
    pub id: String,
    pub application_id: String,
    pub file_path: String,
    /// Free-text category such as `function-add` or `refactor`
    pub change_type: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Map<String, serde_json::Value>>,
}

impl ChangeEvent {
    /// Create an event stamped now with a fresh id
    pub fn new(
        application_id: impl Into<String>,
        file_path: impl Into<String>,
        change_type: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            application_id: application_id.into(),
            file_path: file_path.into(),
            change_type: change_type.into(),
            timestamp: Utc::now(),
            metadata: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_metadata(mut self, metadata: serde_json::Map<String, serde_json::Value>) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// One improvement suggestion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    /// Capability label the suggestion came from
    #[serde(rename = "type")]
    pub suggestion_type: String,
    pub description: String,
    /// 1 = highest
    pub priority: u8,
    pub effort: String,
    pub impact: String,
}

/// Cross-reference to other agents that answered the same event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoordinationBlock {
    pub co_responders: Vec<String>,
    /// Co-responders' analysis text joined with `"; "`
    pub shared_analysis: String,
}

/// Output of one agent for one event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentResponse {
    pub agent_id: String,
    pub agent_name: String,
    pub change_event_id: String,
    pub analysis: String,
    pub suggestions: Vec<Suggestion>,
    pub confidence: f64,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordination: Option<CoordinationBlock>,
}
