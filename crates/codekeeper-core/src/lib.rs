//! Codekeeper Core Library
//!
//! Per-application agents that react to file changes:
//! - Agent data model and name-keyed profiles
//! - Pattern memory keyed by change type and file extension
//! - Trigger matching, suggestion generation and confidence estimation
//! - Fan-out coordination across all responsive agents of an application
//! - Agent factory driven by an external codebase analysis
//! - SQLite agent store with atomic field-level updates

pub mod agents;
pub mod analysis;
pub mod config;
pub mod coordination;
pub mod error;
pub mod factory;
pub mod memory;
pub mod service;
pub mod storage;

pub use error::{Error, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::agents::{Agent, AgentStatus, PriorityClass};
    pub use crate::analysis::{AgentResponse, ChangeEvent, Suggestion};
    pub use crate::config::Config;
    pub use crate::error::{Error, Result};
    pub use crate::factory::{AgentEcosystem, CodebaseAnalysis};
    pub use crate::service::{AgentService, ChangeTrackingOutcome, SuggestionSource};
}

#[cfg(test)]
mod error_tests;
