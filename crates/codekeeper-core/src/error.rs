//! Error types for Codekeeper

use thiserror::Error;

/// Result type alias using Codekeeper's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Codekeeper error types with helpful messages and suggestions
#[derive(Error, Debug)]
pub enum Error {
    // Entity errors (E001-E099)
    #[error("Agent '{0}' not found. Run `codekeeper agents list <application>` to see all agents.")]
    AgentNotFound(String),

    // Analysis input errors (E100-E199)
    #[error("Malformed codebase analysis: {0}")]
    MalformedAnalysis(String),

    // Fan-out errors (E200-E299)
    #[error("Agent fan-out timed out after {0}ms")]
    FanOutTimeout(u64),

    // Store errors (E400-E499)
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Agent store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // Input errors (E800-E899)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // Generic errors
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Get error code for this error type
    pub fn code(&self) -> &'static str {
        match self {
            Self::AgentNotFound(_) => "E001",
            Self::MalformedAnalysis(_) => "E100",
            Self::FanOutTimeout(_) => "E200",
            Self::DatabaseError(_) => "E400",
            Self::StoreUnavailable(_) => "E401",
            Self::Serialization(_) => "E402",
            Self::InvalidInput(_) => "E800",
            Self::Other(_) => "E9999",
        }
    }

    /// Get suggestion for how to fix this error
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Self::AgentNotFound(_) => Some("codekeeper agents list <application>".to_string()),
            Self::MalformedAnalysis(_) => {
                Some("Re-run the codebase analysis and check suggestedAgents".to_string())
            }
            Self::StoreUnavailable(_) | Self::DatabaseError(_) => {
                Some("codekeeper doctor".to_string())
            }
            Self::FanOutTimeout(_) => {
                Some("Raise engine.fanout_timeout_ms in config.toml".to_string())
            }
            _ => None,
        }
    }
}
