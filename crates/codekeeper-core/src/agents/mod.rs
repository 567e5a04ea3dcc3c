//! Agent system - per-application specializations that react to changes

pub mod profiles;
pub mod types;

pub use profiles::{AgentProfile, analysis_text, specification_for};
pub use types::{
    Agent, AgentMemory, AgentPerformance, AgentSpecification, AgentStatus, AgentTier,
    ContextEntry, PriorityClass,
};
