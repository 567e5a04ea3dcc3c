//! Capability-derived suggestion generation

use crate::agents::Agent;
use crate::agents::profiles::humanize;

use super::types::{ChangeEvent, Suggestion};

/// Upper bound on suggestions in one agent response
pub const MAX_SUGGESTIONS: usize = 3;

/// One suggestion per capability, in declaration order, at most [`MAX_SUGGESTIONS`]
///
/// Priority, effort and impact come from the agent's priority class only.
pub fn generate_suggestions(agent: &Agent, event: &ChangeEvent) -> Vec<Suggestion> {
    agent
        .capabilities
        .iter()
        .take(MAX_SUGGESTIONS)
        .map(|capability| Suggestion {
            suggestion_type: capability.clone(),
            description: format!(
                "Apply {} to {} after the {} change",
                humanize(capability),
                event.file_path,
                event.change_type
            ),
            priority: agent.priority.suggestion_priority(),
            effort: agent.priority.effort().to_string(),
            impact: agent.priority.impact().to_string(),
        })
        .collect()
}
