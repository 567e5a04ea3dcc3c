//! Database migrations
//!
//! This module manages SQLite schema migrations for codekeeper.
//! Migrations are versioned and applied automatically on database connection.

use sqlx::SqlitePool;

/// Current schema version
pub const CURRENT_VERSION: i32 = 2;

/// SQL for creating the migrations tracking table
const CREATE_MIGRATIONS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS _migrations (
        version INTEGER PRIMARY KEY NOT NULL,
        applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
    );
"#;

/// Migration 1: Agents and their memory
const MIGRATION_V1: &str = r#"
    -- One row per agent; performance counters are updated in place
    CREATE TABLE IF NOT EXISTS agents (
        id TEXT PRIMARY KEY NOT NULL,
        application_id TEXT NOT NULL,
        name TEXT NOT NULL,
        role TEXT NOT NULL,
        purpose TEXT NOT NULL DEFAULT '',
        triggers TEXT NOT NULL DEFAULT '[]',
        capabilities TEXT NOT NULL DEFAULT '[]',
        priority TEXT NOT NULL CHECK (priority IN ('critical', 'important', 'nice-to-have')),
        tier INTEGER NOT NULL CHECK (tier IN (1, 2, 3)),
        status TEXT NOT NULL DEFAULT 'learning' CHECK (status IN ('learning', 'active', 'inactive', 'error')),
        suggestions_generated INTEGER NOT NULL DEFAULT 0,
        suggestions_accepted INTEGER NOT NULL DEFAULT 0,
        success_rate REAL NOT NULL DEFAULT 0.0,
        last_active TEXT,
        specification TEXT NOT NULL DEFAULT '{}',
        created_at TEXT NOT NULL,
        UNIQUE(application_id, name)
    );

    CREATE INDEX IF NOT EXISTS idx_agents_application_status ON agents(application_id, status);

    -- Pattern memory, one row per (agent, pattern key)
    CREATE TABLE IF NOT EXISTS agent_patterns (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        agent_id TEXT NOT NULL REFERENCES agents(id) ON DELETE CASCADE,
        pattern_key TEXT NOT NULL,
        frequency INTEGER NOT NULL DEFAULT 1,
        confidence REAL NOT NULL DEFAULT 0.0,
        examples TEXT NOT NULL DEFAULT '[]',
        last_seen TEXT NOT NULL,
        UNIQUE(agent_id, pattern_key)
    );

    CREATE INDEX IF NOT EXISTS idx_agent_patterns_agent ON agent_patterns(agent_id);

    -- Most recent response summary per change-type key
    CREATE TABLE IF NOT EXISTS agent_context (
        agent_id TEXT NOT NULL REFERENCES agents(id) ON DELETE CASCADE,
        context_key TEXT NOT NULL,
        file_path TEXT NOT NULL,
        analysis TEXT NOT NULL,
        timestamp TEXT NOT NULL,
        PRIMARY KEY (agent_id, context_key)
    );
"#;

/// Migration 2: Per-application ecosystem summary
const MIGRATION_V2: &str = r#"
    CREATE TABLE IF NOT EXISTS agent_ecosystems (
        application_id TEXT PRIMARY KEY NOT NULL,
        agent_count INTEGER NOT NULL DEFAULT 0,
        agent_types TEXT NOT NULL DEFAULT '[]',
        project_type TEXT,
        updated_at TEXT NOT NULL
    );
"#;

/// Get the current schema version from the database
async fn get_current_version(pool: &SqlitePool) -> anyhow::Result<i32> {
    // Ensure migrations table exists
    sqlx::raw_sql(CREATE_MIGRATIONS_TABLE).execute(pool).await?;

    let row: Option<(Option<i32>,)> = sqlx::query_as("SELECT MAX(version) FROM _migrations")
        .fetch_optional(pool)
        .await?;

    Ok(row.and_then(|(v,)| v).unwrap_or(0))
}

/// Record that a migration has been applied
async fn record_migration(pool: &SqlitePool, version: i32) -> anyhow::Result<()> {
    sqlx::query("INSERT INTO _migrations (version) VALUES (?)")
        .bind(version)
        .execute(pool)
        .await?;
    Ok(())
}

/// Run all pending migrations
pub async fn run_migrations(pool: &SqlitePool) -> anyhow::Result<()> {
    let current_version = get_current_version(pool).await?;

    tracing::info!(
        current_version = current_version,
        target_version = CURRENT_VERSION,
        "Checking database migrations"
    );

    if current_version >= CURRENT_VERSION {
        tracing::debug!("Database is up to date");
        return Ok(());
    }

    if current_version < 1 {
        tracing::info!("Applying migration v1: Agents and pattern memory");
        sqlx::raw_sql(MIGRATION_V1).execute(pool).await?;
        record_migration(pool, 1).await?;
    }

    if current_version < 2 {
        tracing::info!("Applying migration v2: Agent ecosystems");
        sqlx::raw_sql(MIGRATION_V2).execute(pool).await?;
        record_migration(pool, 2).await?;
    }

    Ok(())
}

/// Check if the database needs migrations
pub async fn needs_migration(pool: &SqlitePool) -> anyhow::Result<bool> {
    let current_version = get_current_version(pool).await?;
    Ok(current_version < CURRENT_VERSION)
}

/// Get migration status information
pub async fn migration_status(pool: &SqlitePool) -> anyhow::Result<MigrationStatus> {
    let current_version = get_current_version(pool).await?;
    Ok(MigrationStatus {
        current_version,
        target_version: CURRENT_VERSION,
        needs_migration: current_version < CURRENT_VERSION,
    })
}

/// Migration status information
#[derive(Debug, Clone)]
pub struct MigrationStatus {
    /// Current schema version in the database
    pub current_version: i32,
    /// Target schema version (latest)
    pub target_version: i32,
    /// Whether migrations need to be run
    pub needs_migration: bool,
}
