//! SQLite-backed agent repository
//!
//! Agents live in `agents`, their memory in `agent_patterns` and
//! `agent_context`. Counters and pattern entries are mutated with single
//! `UPDATE`/upsert statements so concurrent responders never overwrite each
//! other's increments.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::agents::{
    Agent, AgentMemory, AgentPerformance, AgentSpecification, AgentStatus, AgentTier,
    ContextEntry, PriorityClass,
};
use crate::error::{Error, Result};
use crate::factory::AgentEcosystem;
use crate::memory::{MemoryUpdate, PatternMemory};

use super::repository::AgentRepository;

const AGENT_COLUMNS: &str = r#"
    id, application_id, name, role, purpose, triggers, capabilities,
    priority, tier, status, suggestions_generated, suggestions_accepted,
    success_rate, last_active, specification, created_at
"#;

/// Fixed-width RFC 3339 so stored timestamps sort lexicographically
fn format_ts(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn parse_ts(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::Other(format!("Invalid stored timestamp '{}': {}", value, e)))
}

fn to_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// Agent repository over a SQLite pool
#[derive(Debug, Clone)]
pub struct SqliteAgentRepository {
    pool: SqlitePool,
}

impl SqliteAgentRepository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get a reference to the underlying connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn load_memory_for_agent(&self, agent_id: &str) -> Result<AgentMemory> {
        let patterns: Vec<PatternRow> = sqlx::query_as(
            r#"
            SELECT agent_id, pattern_key, frequency, confidence, examples, last_seen
            FROM agent_patterns
            WHERE agent_id = ?
            ORDER BY last_seen DESC, id DESC
            "#,
        )
        .bind(agent_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::DatabaseError)?;

        let context: Vec<ContextRow> = sqlx::query_as(
            r#"
            SELECT agent_id, context_key, file_path, analysis, timestamp
            FROM agent_context
            WHERE agent_id = ?
            "#,
        )
        .bind(agent_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::DatabaseError)?;

        let mut memory = AgentMemory::default();
        for row in patterns {
            memory.patterns.push(row.into_pattern()?.1);
        }
        for row in context {
            let (_, key, entry) = row.into_context()?;
            memory.context.insert(key, entry);
        }
        Ok(memory)
    }

    /// Memory for every agent of an application, keyed by agent id
    async fn load_memory_for_application(
        &self,
        application_id: &str,
    ) -> Result<HashMap<String, AgentMemory>> {
        let patterns: Vec<PatternRow> = sqlx::query_as(
            r#"
            SELECT p.agent_id, p.pattern_key, p.frequency, p.confidence, p.examples, p.last_seen
            FROM agent_patterns p
            JOIN agents a ON a.id = p.agent_id
            WHERE a.application_id = ?
            ORDER BY p.last_seen DESC, p.id DESC
            "#,
        )
        .bind(application_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::DatabaseError)?;

        let context: Vec<ContextRow> = sqlx::query_as(
            r#"
            SELECT c.agent_id, c.context_key, c.file_path, c.analysis, c.timestamp
            FROM agent_context c
            JOIN agents a ON a.id = c.agent_id
            WHERE a.application_id = ?
            "#,
        )
        .bind(application_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::DatabaseError)?;

        let mut memories: HashMap<String, AgentMemory> = HashMap::new();
        for row in patterns {
            let (agent_id, pattern) = row.into_pattern()?;
            memories.entry(agent_id).or_default().patterns.push(pattern);
        }
        for row in context {
            let (agent_id, key, entry) = row.into_context()?;
            memories.entry(agent_id).or_default().context.insert(key, entry);
        }
        Ok(memories)
    }

    fn attach_memory(
        rows: Vec<AgentRow>,
        mut memories: HashMap<String, AgentMemory>,
    ) -> Result<Vec<Agent>> {
        rows.into_iter()
            .map(|row| {
                let memory = memories.remove(&row.id).unwrap_or_default();
                row.into_agent(memory)
            })
            .collect()
    }
}

#[async_trait]
impl AgentRepository for SqliteAgentRepository {
    async fn insert_agent(&self, agent: &Agent) -> Result<bool> {
        let triggers = serde_json::to_string(&agent.triggers)?;
        let capabilities = serde_json::to_string(&agent.capabilities)?;
        let specification = serde_json::to_string(&agent.specification)?;
        let last_active = agent.performance.last_active.map(format_ts);

        let mut tx = self.pool.begin().await.map_err(Error::DatabaseError)?;

        let result = sqlx::query(&format!(
            r#"
            INSERT INTO agents ({})
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT DO NOTHING
            "#,
            AGENT_COLUMNS
        ))
        .bind(&agent.id)
        .bind(&agent.application_id)
        .bind(&agent.name)
        .bind(&agent.role)
        .bind(&agent.purpose)
        .bind(&triggers)
        .bind(&capabilities)
        .bind(agent.priority.as_str())
        .bind(u8::from(agent.tier) as i64)
        .bind(agent.status.as_str())
        .bind(to_i64(agent.performance.suggestions_generated))
        .bind(to_i64(agent.performance.suggestions_accepted))
        .bind(agent.performance.success_rate)
        .bind(&last_active)
        .bind(&specification)
        .bind(format_ts(agent.created_at))
        .execute(&mut *tx)
        .await
        .map_err(Error::DatabaseError)?;

        if result.rows_affected() == 0 {
            debug!(
                application_id = %agent.application_id,
                name = %agent.name,
                "Agent already exists, skipping insert"
            );
            return Ok(false);
        }

        for pattern in &agent.memory.patterns {
            sqlx::query(
                r#"
                INSERT INTO agent_patterns (agent_id, pattern_key, frequency, confidence, examples, last_seen)
                VALUES (?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&agent.id)
            .bind(&pattern.pattern_key)
            .bind(pattern.frequency as i64)
            .bind(pattern.confidence)
            .bind(serde_json::to_string(&pattern.examples)?)
            .bind(format_ts(pattern.last_seen))
            .execute(&mut *tx)
            .await
            .map_err(Error::DatabaseError)?;
        }

        for (key, entry) in &agent.memory.context {
            sqlx::query(
                r#"
                INSERT INTO agent_context (agent_id, context_key, file_path, analysis, timestamp)
                VALUES (?, ?, ?, ?, ?)
                "#,
            )
            .bind(&agent.id)
            .bind(key)
            .bind(&entry.file_path)
            .bind(&entry.analysis)
            .bind(format_ts(entry.timestamp))
            .execute(&mut *tx)
            .await
            .map_err(Error::DatabaseError)?;
        }

        tx.commit().await.map_err(Error::DatabaseError)?;

        info!(
            agent_id = %agent.id,
            application_id = %agent.application_id,
            name = %agent.name,
            "Inserted agent"
        );
        Ok(true)
    }

    async fn get_agent(&self, agent_id: &str) -> Result<Option<Agent>> {
        let row: Option<AgentRow> = sqlx::query_as(&format!(
            "SELECT {} FROM agents WHERE id = ?",
            AGENT_COLUMNS
        ))
        .bind(agent_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::DatabaseError)?;

        match row {
            Some(row) => {
                let memory = self.load_memory_for_agent(&row.id).await?;
                Ok(Some(row.into_agent(memory)?))
            }
            None => Ok(None),
        }
    }

    async fn list_agents(&self, application_id: &str) -> Result<Vec<Agent>> {
        let rows: Vec<AgentRow> = sqlx::query_as(&format!(
            "SELECT {} FROM agents WHERE application_id = ? ORDER BY created_at, rowid",
            AGENT_COLUMNS
        ))
        .bind(application_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::DatabaseError)?;

        let memories = self.load_memory_for_application(application_id).await?;
        Self::attach_memory(rows, memories)
    }

    async fn list_agents_by_status(
        &self,
        application_id: &str,
        statuses: &[AgentStatus],
    ) -> Result<Vec<Agent>> {
        if statuses.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; statuses.len()].join(", ");
        let sql = format!(
            "SELECT {} FROM agents WHERE application_id = ? AND status IN ({}) ORDER BY created_at, rowid",
            AGENT_COLUMNS, placeholders
        );

        let mut query = sqlx::query_as::<_, AgentRow>(&sql).bind(application_id);
        for status in statuses {
            query = query.bind(status.as_str());
        }
        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(Error::DatabaseError)?;

        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let memories = self.load_memory_for_application(application_id).await?;
        Self::attach_memory(rows, memories)
    }

    async fn record_analysis(&self, agent_id: &str, update: &MemoryUpdate) -> Result<()> {
        let observed_at = format_ts(update.observed_at);
        let mut tx = self.pool.begin().await.map_err(Error::DatabaseError)?;

        let touched = sqlx::query("UPDATE agents SET last_active = ? WHERE id = ?")
            .bind(&observed_at)
            .bind(agent_id)
            .execute(&mut *tx)
            .await
            .map_err(Error::DatabaseError)?;

        if touched.rows_affected() == 0 {
            return Err(Error::AgentNotFound(agent_id.to_string()));
        }

        sqlx::query(
            r#"
            INSERT INTO agent_patterns (agent_id, pattern_key, frequency, confidence, examples, last_seen)
            VALUES (?, ?, 1, ?, json_array(?), ?)
            ON CONFLICT(agent_id, pattern_key) DO UPDATE SET
                frequency = agent_patterns.frequency + 1,
                last_seen = excluded.last_seen,
                examples = CASE
                    WHEN json_array_length(agent_patterns.examples) < ?
                        THEN json_insert(agent_patterns.examples, '$[#]', ?)
                    ELSE agent_patterns.examples
                END
            "#,
        )
        .bind(agent_id)
        .bind(&update.pattern_key)
        .bind(update.confidence)
        .bind(&update.file_path)
        .bind(&observed_at)
        .bind(update.example_cap as i64)
        .bind(&update.file_path)
        .execute(&mut *tx)
        .await
        .map_err(Error::DatabaseError)?;

        sqlx::query(
            r#"
            INSERT INTO agent_context (agent_id, context_key, file_path, analysis, timestamp)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(agent_id, context_key) DO UPDATE SET
                file_path = excluded.file_path,
                analysis = excluded.analysis,
                timestamp = excluded.timestamp
            "#,
        )
        .bind(agent_id)
        .bind(&update.context_key)
        .bind(&update.context.file_path)
        .bind(&update.context.analysis)
        .bind(format_ts(update.context.timestamp))
        .execute(&mut *tx)
        .await
        .map_err(Error::DatabaseError)?;

        tx.commit().await.map_err(Error::DatabaseError)?;

        debug!(
            agent_id = %agent_id,
            pattern_key = %update.pattern_key,
            "Recorded analysis in agent memory"
        );
        Ok(())
    }

    async fn increment_suggestions(
        &self,
        agent_id: &str,
        count: u64,
        at: DateTime<Utc>,
    ) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE agents SET
                suggestions_generated = suggestions_generated + ?,
                last_active = ?
            WHERE id = ?
            "#,
        )
        .bind(to_i64(count))
        .bind(format_ts(at))
        .bind(agent_id)
        .execute(&self.pool)
        .await
        .map_err(Error::DatabaseError)?;

        if result.rows_affected() == 0 {
            return Err(Error::AgentNotFound(agent_id.to_string()));
        }
        Ok(())
    }

    async fn record_feedback(&self, agent_id: &str, accepted: bool) -> Result<AgentPerformance> {
        let delta: i64 = if accepted { 1 } else { 0 };

        let result = sqlx::query(
            r#"
            UPDATE agents SET
                suggestions_accepted = suggestions_accepted + ?,
                success_rate = CASE
                    WHEN suggestions_generated > 0
                        THEN MIN(1.0, CAST(suggestions_accepted + ? AS REAL) / suggestions_generated)
                    ELSE 0.0
                END
            WHERE id = ?
            "#,
        )
        .bind(delta)
        .bind(delta)
        .bind(agent_id)
        .execute(&self.pool)
        .await
        .map_err(Error::DatabaseError)?;

        if result.rows_affected() == 0 {
            return Err(Error::AgentNotFound(agent_id.to_string()));
        }

        let row: PerformanceRow = sqlx::query_as(
            r#"
            SELECT suggestions_generated, suggestions_accepted, success_rate, last_active
            FROM agents
            WHERE id = ?
            "#,
        )
        .bind(agent_id)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::DatabaseError)?;

        row.into_performance()
    }

    async fn set_status(&self, agent_id: &str, status: AgentStatus) -> Result<()> {
        let result = sqlx::query("UPDATE agents SET status = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(agent_id)
            .execute(&self.pool)
            .await
            .map_err(Error::DatabaseError)?;

        if result.rows_affected() == 0 {
            return Err(Error::AgentNotFound(agent_id.to_string()));
        }

        info!(agent_id = %agent_id, status = %status, "Updated agent status");
        Ok(())
    }

    async fn replace_ecosystem(&self, ecosystem: &AgentEcosystem) -> Result<()> {
        let agent_types = serde_json::to_string(&ecosystem.agent_types)?;

        sqlx::query(
            r#"
            INSERT INTO agent_ecosystems (application_id, agent_count, agent_types, project_type, updated_at)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(application_id) DO UPDATE SET
                agent_count = excluded.agent_count,
                agent_types = excluded.agent_types,
                project_type = excluded.project_type,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&ecosystem.application_id)
        .bind(ecosystem.agent_count as i64)
        .bind(&agent_types)
        .bind(&ecosystem.project_type)
        .bind(format_ts(ecosystem.updated_at))
        .execute(&self.pool)
        .await
        .map_err(Error::DatabaseError)?;

        debug!(
            application_id = %ecosystem.application_id,
            agent_count = ecosystem.agent_count,
            "Replaced agent ecosystem"
        );
        Ok(())
    }

    async fn get_ecosystem(&self, application_id: &str) -> Result<Option<AgentEcosystem>> {
        let row: Option<EcosystemRow> = sqlx::query_as(
            r#"
            SELECT application_id, agent_count, agent_types, project_type, updated_at
            FROM agent_ecosystems
            WHERE application_id = ?
            "#,
        )
        .bind(application_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::DatabaseError)?;

        row.map(EcosystemRow::into_ecosystem).transpose()
    }
}

// ========== Database Row Types ==========

#[derive(sqlx::FromRow)]
struct AgentRow {
    id: String,
    application_id: String,
    name: String,
    role: String,
    purpose: String,
    triggers: String,
    capabilities: String,
    priority: String,
    tier: i64,
    status: String,
    suggestions_generated: i64,
    suggestions_accepted: i64,
    success_rate: f64,
    last_active: Option<String>,
    specification: String,
    created_at: String,
}

impl AgentRow {
    fn into_agent(self, memory: AgentMemory) -> Result<Agent> {
        let priority = PriorityClass::parse(&self.priority)
            .ok_or_else(|| Error::Other(format!("Invalid stored priority: {}", self.priority)))?;
        let tier = u8::try_from(self.tier)
            .map_err(|_| Error::Other(format!("Invalid stored tier: {}", self.tier)))
            .and_then(|t| AgentTier::try_from(t).map_err(Error::Other))?;
        let status = AgentStatus::parse(&self.status)?;
        let triggers: Vec<String> = serde_json::from_str(&self.triggers)?;
        let capabilities: Vec<String> = serde_json::from_str(&self.capabilities)?;
        let specification: AgentSpecification = serde_json::from_str(&self.specification)?;
        let last_active = self.last_active.as_deref().map(parse_ts).transpose()?;

        Ok(Agent {
            id: self.id,
            application_id: self.application_id,
            name: self.name,
            role: self.role,
            purpose: self.purpose,
            triggers,
            capabilities,
            priority,
            tier,
            status,
            performance: AgentPerformance {
                suggestions_generated: self.suggestions_generated.max(0) as u64,
                suggestions_accepted: self.suggestions_accepted.max(0) as u64,
                success_rate: self.success_rate,
                last_active,
            },
            memory,
            specification,
            created_at: parse_ts(&self.created_at)?,
        })
    }
}

#[derive(sqlx::FromRow)]
struct PerformanceRow {
    suggestions_generated: i64,
    suggestions_accepted: i64,
    success_rate: f64,
    last_active: Option<String>,
}

impl PerformanceRow {
    fn into_performance(self) -> Result<AgentPerformance> {
        Ok(AgentPerformance {
            suggestions_generated: self.suggestions_generated.max(0) as u64,
            suggestions_accepted: self.suggestions_accepted.max(0) as u64,
            success_rate: self.success_rate,
            last_active: self.last_active.as_deref().map(parse_ts).transpose()?,
        })
    }
}

#[derive(sqlx::FromRow)]
struct PatternRow {
    agent_id: String,
    pattern_key: String,
    frequency: i64,
    confidence: f64,
    examples: String,
    last_seen: String,
}

impl PatternRow {
    fn into_pattern(self) -> Result<(String, PatternMemory)> {
        let frequency = u32::try_from(self.frequency)
            .map_err(|_| Error::Other(format!("Invalid stored frequency: {}", self.frequency)))?;
        let pattern = PatternMemory {
            pattern_key: self.pattern_key,
            frequency,
            confidence: self.confidence,
            examples: serde_json::from_str(&self.examples)?,
            last_seen: parse_ts(&self.last_seen)?,
        };
        Ok((self.agent_id, pattern))
    }
}

#[derive(sqlx::FromRow)]
struct ContextRow {
    agent_id: String,
    context_key: String,
    file_path: String,
    analysis: String,
    timestamp: String,
}

impl ContextRow {
    fn into_context(self) -> Result<(String, String, ContextEntry)> {
        let entry = ContextEntry {
            file_path: self.file_path,
            timestamp: parse_ts(&self.timestamp)?,
            analysis: self.analysis,
        };
        Ok((self.agent_id, self.context_key, entry))
    }
}

#[derive(sqlx::FromRow)]
struct EcosystemRow {
    application_id: String,
    agent_count: i64,
    agent_types: String,
    project_type: Option<String>,
    updated_at: String,
}

impl EcosystemRow {
    fn into_ecosystem(self) -> Result<AgentEcosystem> {
        Ok(AgentEcosystem {
            application_id: self.application_id,
            agent_count: self.agent_count.clamp(0, u32::MAX as i64) as u32,
            agent_types: serde_json::from_str(&self.agent_types)?,
            project_type: self.project_type,
            updated_at: parse_ts(&self.updated_at)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Database;
    use crate::test_support::sample_agent;
    use chrono::Duration;

    async fn create_repo() -> SqliteAgentRepository {
        let db = Database::in_memory()
            .await
            .expect("Failed to create test database");
        SqliteAgentRepository::new(db.pool().clone())
    }

    fn update(change_type: &str, path: &str, confidence: f64, at: DateTime<Utc>) -> MemoryUpdate {
        MemoryUpdate::new(change_type, path, confidence, "analysis text", at, 5)
    }

    #[tokio::test]
    async fn test_insert_and_get_agent() {
        let repo = create_repo().await;
        let agent = sample_agent("SecuritySentinel", &["auth"], &["vulnerability-scanning"], PriorityClass::Critical);

        assert!(repo.insert_agent(&agent).await.unwrap());

        let loaded = repo
            .get_agent(&agent.id)
            .await
            .unwrap()
            .expect("Agent not found");
        assert_eq!(loaded, agent);
    }

    #[tokio::test]
    async fn test_insert_duplicate_name_is_skipped() {
        let repo = create_repo().await;
        let first = sample_agent("TestArchitect", &["test"], &["test-generation"], PriorityClass::Important);
        let mut second = first.clone();
        second.id = "agent_other".to_string();

        assert!(repo.insert_agent(&first).await.unwrap());
        assert!(!repo.insert_agent(&second).await.unwrap());
        assert_eq!(repo.list_agents(&first.application_id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_get_missing_agent() {
        let repo = create_repo().await;
        assert!(repo.get_agent("agent_missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_by_status_filters() {
        let repo = create_repo().await;
        let mut active = sample_agent("A", &["x"], &["a"], PriorityClass::Critical);
        active.status = AgentStatus::Active;
        let learning = sample_agent("B", &["x"], &["b"], PriorityClass::Critical);
        let mut inactive = sample_agent("C", &["x"], &["c"], PriorityClass::Critical);
        inactive.status = AgentStatus::Inactive;

        for agent in [&active, &learning, &inactive] {
            repo.insert_agent(agent).await.unwrap();
        }

        let responsive = repo
            .list_agents_by_status("app-1", &AgentStatus::RESPONSIVE)
            .await
            .unwrap();
        let names: Vec<_> = responsive.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);

        assert!(repo.list_agents_by_status("app-1", &[]).await.unwrap().is_empty());
        assert!(
            repo.list_agents_by_status("other-app", &AgentStatus::RESPONSIVE)
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn test_record_analysis_upserts_pattern() {
        let repo = create_repo().await;
        let agent = sample_agent("CodeQualityGuardian", &["refactor"], &["complexity-analysis"], PriorityClass::Important);
        repo.insert_agent(&agent).await.unwrap();

        let t0 = Utc::now();
        repo.record_analysis(&agent.id, &update("refactor", "/utils/x.ts", 0.5, t0))
            .await
            .unwrap();
        repo.record_analysis(
            &agent.id,
            &update("refactor", "/utils/y.ts", 0.9, t0 + Duration::seconds(1)),
        )
        .await
        .unwrap();

        let loaded = repo.get_agent(&agent.id).await.unwrap().unwrap();
        let entry = loaded.pattern("refactor_ts").expect("pattern missing");
        assert_eq!(entry.frequency, 2);
        assert_eq!(entry.confidence, 0.5);
        assert_eq!(entry.examples, vec!["/utils/x.ts", "/utils/y.ts"]);
        assert_eq!(entry.last_seen, t0 + Duration::seconds(1));
        assert_eq!(loaded.last_context("refactor").unwrap().file_path, "/utils/y.ts");
        assert_eq!(loaded.performance.last_active, Some(t0 + Duration::seconds(1)));
    }

    #[tokio::test]
    async fn test_record_analysis_caps_examples() {
        let repo = create_repo().await;
        let agent = sample_agent("CodeQualityGuardian", &["refactor"], &["lint"], PriorityClass::Important);
        repo.insert_agent(&agent).await.unwrap();

        let now = Utc::now();
        for i in 0..7 {
            let path = format!("/src/f{}.rs", i);
            repo.record_analysis(&agent.id, &update("refactor", &path, 0.5, now))
                .await
                .unwrap();
        }

        let loaded = repo.get_agent(&agent.id).await.unwrap().unwrap();
        let entry = loaded.pattern("refactor_rs").unwrap();
        assert_eq!(entry.frequency, 7);
        assert_eq!(entry.examples.len(), 5);
    }

    #[tokio::test]
    async fn test_patterns_loaded_most_recent_first() {
        let repo = create_repo().await;
        let agent = sample_agent("A", &["x"], &["a"], PriorityClass::Critical);
        repo.insert_agent(&agent).await.unwrap();

        let t0 = Utc::now();
        repo.record_analysis(&agent.id, &update("refactor", "/a.ts", 0.5, t0))
            .await
            .unwrap();
        repo.record_analysis(&agent.id, &update("file-create", "/b.rs", 0.5, t0 + Duration::seconds(1)))
            .await
            .unwrap();

        let agents = repo.list_agents("app-1").await.unwrap();
        let keys: Vec<_> = agents[0]
            .memory
            .patterns
            .iter()
            .map(|p| p.pattern_key.as_str())
            .collect();
        assert_eq!(keys, vec!["file-create_rs", "refactor_ts"]);
    }

    #[tokio::test]
    async fn test_record_analysis_unknown_agent() {
        let repo = create_repo().await;
        let err = repo
            .record_analysis("agent_missing", &update("refactor", "/a.ts", 0.5, Utc::now()))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::AgentNotFound(_)));
    }

    #[tokio::test]
    async fn test_concurrent_increments_are_not_lost() {
        let repo = create_repo().await;
        let agent = sample_agent("A", &["x"], &["a"], PriorityClass::Critical);
        repo.insert_agent(&agent).await.unwrap();

        let futures = (0..10).map(|_| repo.increment_suggestions(&agent.id, 3, Utc::now()));
        for result in futures_util::future::join_all(futures).await {
            result.unwrap();
        }

        let loaded = repo.get_agent(&agent.id).await.unwrap().unwrap();
        assert_eq!(loaded.performance.suggestions_generated, 30);
        assert!(loaded.performance.last_active.is_some());
    }

    #[tokio::test]
    async fn test_record_feedback_updates_success_rate() {
        let repo = create_repo().await;
        let agent = sample_agent("A", &["x"], &["a"], PriorityClass::Critical);
        repo.insert_agent(&agent).await.unwrap();

        // No suggestions yet: rate stays at zero
        let perf = repo.record_feedback(&agent.id, true).await.unwrap();
        assert_eq!(perf.suggestions_accepted, 1);
        assert_eq!(perf.success_rate, 0.0);

        repo.increment_suggestions(&agent.id, 4, Utc::now()).await.unwrap();
        let perf = repo.record_feedback(&agent.id, false).await.unwrap();
        assert_eq!(perf.suggestions_accepted, 1);
        assert!((perf.success_rate - 0.25).abs() < 1e-9);

        let perf = repo.record_feedback(&agent.id, true).await.unwrap();
        assert!((perf.success_rate - 0.5).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_set_status() {
        let repo = create_repo().await;
        let agent = sample_agent("A", &["x"], &["a"], PriorityClass::Critical);
        repo.insert_agent(&agent).await.unwrap();

        repo.set_status(&agent.id, AgentStatus::Inactive).await.unwrap();
        let loaded = repo.get_agent(&agent.id).await.unwrap().unwrap();
        assert_eq!(loaded.status, AgentStatus::Inactive);

        let err = repo
            .set_status("agent_missing", AgentStatus::Active)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::AgentNotFound(_)));
    }

    #[tokio::test]
    async fn test_replace_ecosystem() {
        let repo = create_repo().await;
        assert!(repo.get_ecosystem("app-1").await.unwrap().is_none());

        let mut ecosystem = AgentEcosystem {
            application_id: "app-1".to_string(),
            agent_count: 1,
            agent_types: vec!["SecuritySentinel".to_string()],
            project_type: Some("web".to_string()),
            updated_at: Utc::now(),
        };
        repo.replace_ecosystem(&ecosystem).await.unwrap();

        ecosystem.agent_count = 2;
        ecosystem.agent_types.push("TestArchitect".to_string());
        repo.replace_ecosystem(&ecosystem).await.unwrap();

        let loaded = repo.get_ecosystem("app-1").await.unwrap().unwrap();
        assert_eq!(loaded, ecosystem);
    }
}
