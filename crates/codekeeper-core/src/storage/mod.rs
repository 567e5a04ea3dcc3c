//! Storage layer - SQLite agent store
//!
//! # Architecture
//!
//! - `database`: Connection pool management and initialization
//! - `migrations`: Schema versioning and automatic migration
//! - `repository`: The `AgentRepository` trait the engine depends on
//! - `agent_store`: SQLite implementation of `AgentRepository`
//!
//! # Usage
//!
//! ```ignore
//! use codekeeper_core::storage::{Database, SqliteAgentRepository};
//!
//! let db = Database::in_memory().await?;
//! let repo = SqliteAgentRepository::new(db.pool().clone());
//! ```

pub mod agent_store;
pub mod database;
pub mod migrations;
pub mod repository;

pub use agent_store::SqliteAgentRepository;
pub use database::{Database, DatabaseConfig};
pub use migrations::{CURRENT_VERSION, MigrationStatus, migration_status, run_migrations};
pub use repository::AgentRepository;
