//! Change analysis - from one change event to agent responses
//!
//! - `trigger`: decides whether an agent responds
//! - `suggestions`: capability-derived suggestions
//! - `confidence`: per-response confidence
//! - `executor`: runs the steps above for one agent and persists memory
//! - `fallback`: context-free suggestions when agents cannot be consulted

pub mod confidence;
pub mod executor;
pub mod fallback;
pub mod suggestions;
pub mod trigger;
pub mod types;

pub use confidence::estimate_confidence;
pub use executor::AgentAnalysisExecutor;
pub use fallback::fallback_suggestions;
pub use suggestions::generate_suggestions;
pub use trigger::{matching_trigger, should_respond};
pub use types::{AgentResponse, ChangeEvent, CoordinationBlock, Suggestion};
