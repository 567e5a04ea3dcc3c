//! Trigger matching
//!
//! An agent responds when any trigger keyword is a substring of the event's
//! change type or file path. Matching is case-sensitive and never tokenizes.

use super::types::ChangeEvent;

/// Whether an agent with these triggers should respond to the event
pub fn should_respond(triggers: &[String], event: &ChangeEvent) -> bool {
    matching_trigger(triggers, event).is_some()
}

/// First trigger keyword that matches the event, if any
pub fn matching_trigger<'a>(triggers: &'a [String], event: &ChangeEvent) -> Option<&'a str> {
    triggers
        .iter()
        .find(|t| event.change_type.contains(t.as_str()) || event.file_path.contains(t.as_str()))
        .map(String::as_str)
}
