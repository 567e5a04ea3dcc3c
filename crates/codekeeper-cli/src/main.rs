//! Codekeeper CLI - per-project change agents

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use codekeeper_core::agents::{Agent, AgentStatus};
use codekeeper_core::analysis::{ChangeEvent, Suggestion};
use codekeeper_core::config::Config;
use codekeeper_core::factory::CodebaseAnalysis;
use codekeeper_core::service::{AgentService, ChangeTrackingOutcome};
use codekeeper_core::storage::{Database, DatabaseConfig};
use codekeeper_core::Error;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "codekeeper")]
#[command(author, version, about = "Per-project change agents with pattern memory", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text")]
    format: OutputFormat,

    /// Quiet mode (minimal output)
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage agents
    Agents {
        #[command(subcommand)]
        action: AgentAction,
    },

    /// Track a file change and print the resulting suggestions
    Track {
        /// Application ID
        application_id: String,
        /// Changed file path
        #[arg(short, long)]
        path: String,
        /// Change type (e.g. function-add, refactor, auth-change)
        #[arg(short = 't', long)]
        change_type: String,
        /// Explicit event ID (defaults to a fresh UUID)
        #[arg(long)]
        event_id: Option<String>,
    },

    /// Record whether a suggestion from an agent was accepted
    Feedback {
        /// Agent ID
        agent_id: String,
        /// accepted or rejected
        #[arg(value_enum)]
        verdict: Verdict,
    },

    /// Show the agent ecosystem of an application
    Ecosystem {
        /// Application ID
        application_id: String,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Run health check
    Doctor,
}

#[derive(Subcommand)]
enum AgentAction {
    /// Create agents from a codebase analysis JSON file
    Create {
        /// Path to the analysis JSON
        #[arg(short, long)]
        analysis: PathBuf,
    },
    /// List agents of an application
    List {
        /// Application ID
        application_id: String,
        /// Include inactive and errored agents
        #[arg(short, long)]
        all: bool,
    },
    /// Show an agent with its memory
    Show { agent_id: String },
    /// Set agent status (learning, active, inactive, error)
    Status { agent_id: String, status: String },
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum Verdict {
    Accepted,
    Rejected,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Get a configuration value
    Get { key: String },
    /// Set a configuration value
    Set { key: String, value: String },
    /// List all configuration values
    List,
    /// Reset configuration to defaults
    Reset,
    /// Print the configuration file path
    Path,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("codekeeper=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Agents { action } => {
            let (_db, service) = open_service().await?;
            cmd_agents(&service, action, cli.format, cli.quiet).await
        }

        Commands::Track {
            application_id,
            path,
            change_type,
            event_id,
        } => {
            let mut event = ChangeEvent::new(&application_id, path, change_type);
            if let Some(id) = event_id {
                event = event.with_id(id);
            }
            cmd_track(&application_id, &event, cli.format, cli.quiet).await
        }

        Commands::Feedback { agent_id, verdict } => {
            let (_db, service) = open_service().await?;
            cmd_feedback(&service, &agent_id, verdict, cli.format, cli.quiet).await
        }

        Commands::Ecosystem { application_id } => {
            let (_db, service) = open_service().await?;
            cmd_ecosystem(&service, &application_id, cli.format).await
        }

        Commands::Config { action } => cmd_config(action, cli.quiet),

        Commands::Doctor => cmd_doctor(cli.quiet).await,
    }
}

/// Open the configured database and build the service on top of it
async fn open_service() -> anyhow::Result<(Database, AgentService)> {
    let config = Config::load()?;
    service_for(&config).await
}

async fn service_for(config: &Config) -> anyhow::Result<(Database, AgentService)> {
    let db_config = DatabaseConfig::with_path(config.database_path()?)
        .max_connections(config.storage.max_connections);
    let db = Database::new(db_config).await?;
    let service = AgentService::from_database(&db, config.engine.clone());
    Ok((db, service))
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_agent_line(agent: &Agent) {
    println!(
        "  {} {} [{}] tier {} {} - {}",
        agent.id,
        agent.name,
        agent.status,
        u8::from(agent.tier),
        agent.priority,
        agent.role
    );
}

fn print_suggestion(suggestion: &Suggestion) {
    println!(
        "    - [P{}] {}: {} (effort {}, impact {})",
        suggestion.priority,
        suggestion.suggestion_type,
        suggestion.description,
        suggestion.effort,
        suggestion.impact
    );
}

async fn cmd_agents(
    service: &AgentService,
    action: AgentAction,
    format: OutputFormat,
    quiet: bool,
) -> anyhow::Result<()> {
    match action {
        AgentAction::Create { analysis } => {
            let analysis = read_analysis(&analysis)?;
            let created = service.create_agents_from_analysis(&analysis).await?;
            info!(
                application_id = %analysis.application_id,
                created = created.len(),
                "Created agents from analysis"
            );

            if format == OutputFormat::Json {
                return print_json(&created);
            }
            if !quiet {
                if created.is_empty() {
                    println!(
                        "No new agents for {} (all suggested agents already exist).",
                        analysis.application_id
                    );
                } else {
                    println!(
                        "Created {} agent(s) for {}:",
                        created.len(),
                        analysis.application_id
                    );
                    for agent in &created {
                        print_agent_line(agent);
                    }
                }
            }
        }
        AgentAction::List {
            application_id,
            all,
        } => {
            let agents = if all {
                service.list_agents(&application_id).await?
            } else {
                service.get_active_agents(&application_id).await?
            };

            if format == OutputFormat::Json {
                return print_json(&agents);
            }
            if agents.is_empty() {
                if !quiet {
                    println!("No agents found for {}.", application_id);
                }
            } else {
                if !quiet {
                    println!("Agents for {}:", application_id);
                }
                for agent in &agents {
                    print_agent_line(agent);
                }
            }
        }
        AgentAction::Show { agent_id } => {
            let agent = service
                .get_agent(&agent_id)
                .await?
                .ok_or_else(|| Error::AgentNotFound(agent_id.clone()))?;

            if format == OutputFormat::Json {
                return print_json(&agent);
            }
            print_agent_details(&agent);
        }
        AgentAction::Status { agent_id, status } => {
            let status = AgentStatus::parse(&status)?;
            service.set_agent_status(&agent_id, status).await?;
            if !quiet {
                println!("Agent {} is now {}.", agent_id, status);
            }
        }
    }
    Ok(())
}

fn read_analysis(path: &Path) -> anyhow::Result<CodebaseAnalysis> {
    let json = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read analysis {}: {}", path.display(), e))?;
    Ok(CodebaseAnalysis::from_json(&json)?)
}

fn print_agent_details(agent: &Agent) {
    println!("Agent: {} ({})", agent.name, agent.id);
    println!("  Application:  {}", agent.application_id);
    println!("  Role:         {}", agent.role);
    println!("  Purpose:      {}", agent.purpose);
    println!("  Status:       {}", agent.status);
    println!("  Priority:     {}", agent.priority);
    println!("  Tier:         {}", u8::from(agent.tier));
    println!("  Triggers:     {}", agent.triggers.join(", "));
    println!("  Capabilities: {}", agent.capabilities.join(", "));
    println!("  Created:      {}", agent.created_at.format("%Y-%m-%d %H:%M:%S"));
    println!();

    let perf = &agent.performance;
    println!("Performance:");
    println!("  Suggestions generated: {}", perf.suggestions_generated);
    println!("  Suggestions accepted:  {}", perf.suggestions_accepted);
    println!("  Success rate:          {:.0}%", perf.success_rate * 100.0);
    match perf.last_active {
        Some(at) => println!("  Last active:           {}", at.format("%Y-%m-%d %H:%M:%S")),
        None => println!("  Last active:           never"),
    }
    println!();

    println!("Pattern memory:");
    if agent.memory.patterns.is_empty() {
        println!("  (none)");
    }
    for pattern in &agent.memory.patterns {
        println!(
            "  {} x{} (confidence {:.2}, last seen {})",
            pattern.pattern_key,
            pattern.frequency,
            pattern.confidence,
            pattern.last_seen.format("%Y-%m-%d %H:%M:%S")
        );
        for example in &pattern.examples {
            println!("    {}", example);
        }
    }

    if !agent.memory.context.is_empty() {
        println!();
        println!("Context:");
        for (key, entry) in &agent.memory.context {
            println!("  {}: {} - {}", key, entry.file_path, entry.analysis);
        }
    }
}

async fn cmd_track(
    application_id: &str,
    event: &ChangeEvent,
    format: OutputFormat,
    quiet: bool,
) -> anyhow::Result<()> {
    let config = Config::load()?;
    let outcome = match service_for(&config).await {
        Ok((_db, service)) => service.track_change(application_id, event).await?,
        Err(e) => {
            warn!(
                application_id = %application_id,
                event_id = %event.id,
                error = %e,
                "Agent store unavailable, using fallback suggestions"
            );
            ChangeTrackingOutcome::fallback(event)
        }
    };

    if format == OutputFormat::Json {
        return print_json(&outcome);
    }

    if !quiet {
        println!(
            "Change {} ({} on {}): {} suggestion(s) from {}",
            outcome.event_id,
            event.change_type,
            event.file_path,
            outcome.suggestions.len(),
            outcome.source.as_str()
        );
    }

    if outcome.responses.is_empty() {
        for suggestion in &outcome.suggestions {
            print_suggestion(suggestion);
        }
        return Ok(());
    }

    for response in &outcome.responses {
        println!(
            "  {} (confidence {:.2}): {}",
            response.agent_name, response.confidence, response.analysis
        );
        for suggestion in &response.suggestions {
            print_suggestion(suggestion);
        }
        if let Some(block) = &response.coordination {
            if !quiet {
                println!("    also responding: {}", block.co_responders.join(", "));
            }
        }
    }
    Ok(())
}

async fn cmd_feedback(
    service: &AgentService,
    agent_id: &str,
    verdict: Verdict,
    format: OutputFormat,
    quiet: bool,
) -> anyhow::Result<()> {
    let accepted = matches!(verdict, Verdict::Accepted);
    let performance = service.record_suggestion_feedback(agent_id, accepted).await?;

    if format == OutputFormat::Json {
        return print_json(&performance);
    }
    if !quiet {
        println!(
            "Recorded {} suggestion for {}: {}/{} accepted ({:.0}%)",
            if accepted { "accepted" } else { "rejected" },
            agent_id,
            performance.suggestions_accepted,
            performance.suggestions_generated,
            performance.success_rate * 100.0
        );
    }
    Ok(())
}

async fn cmd_ecosystem(
    service: &AgentService,
    application_id: &str,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let ecosystem = service.get_ecosystem(application_id).await?;

    if format == OutputFormat::Json {
        return print_json(&ecosystem);
    }

    match ecosystem {
        Some(ecosystem) => {
            println!("Ecosystem for {}:", ecosystem.application_id);
            if let Some(project_type) = &ecosystem.project_type {
                println!("  Project type: {}", project_type);
            }
            println!("  Agents ({}): {}", ecosystem.agent_count, ecosystem.agent_types.join(", "));
            println!("  Updated: {}", ecosystem.updated_at.format("%Y-%m-%d %H:%M:%S"));
        }
        None => {
            println!("No ecosystem recorded for {}.", application_id);
            println!("Run `codekeeper agents create --analysis <file>` first.");
        }
    }
    Ok(())
}

fn cmd_config(action: ConfigAction, quiet: bool) -> anyhow::Result<()> {
    match action {
        ConfigAction::Get { key } => {
            let config = Config::load()?;
            let value = config.get(&key)?;
            println!("{}", value);
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            config.save()?;
            if !quiet {
                println!("Set {} = {}", key, value);
            }
        }
        ConfigAction::List => {
            let config = Config::load()?;
            for (key, value) in config.list()? {
                println!("{} = {}", key, value);
            }
        }
        ConfigAction::Reset => {
            Config::reset()?;
            if !quiet {
                println!("Configuration reset to defaults.");
            }
        }
        ConfigAction::Path => {
            let path = Config::config_path()?;
            println!("{}", path.display());
        }
    }
    Ok(())
}

async fn cmd_doctor(quiet: bool) -> anyhow::Result<()> {
    if !quiet {
        println!("Codekeeper Health Check");
        println!("=======================");
        println!();
    }

    let mut all_ok = true;

    // Check configuration
    let config = match Config::load() {
        Ok(config) => {
            if !quiet {
                println!("[OK] Configuration: Valid");
            }
            Some(config)
        }
        Err(e) => {
            all_ok = false;
            if !quiet {
                println!("[!!] Configuration: Error - {}", e);
            }
            None
        }
    };

    // Check config file location
    if !quiet {
        match Config::config_path() {
            Ok(path) => {
                if path.exists() {
                    println!("[OK] Config file: {}", path.display());
                } else {
                    println!("[--] Config file: {} (using defaults)", path.display());
                }
            }
            Err(e) => {
                println!("[!!] Config file: Error - {}", e);
            }
        }
    }

    // Check database
    if let Some(config) = config {
        let db_path = config.database_path()?;
        let db_config = DatabaseConfig::with_path(&db_path)
            .max_connections(config.storage.max_connections);
        match Database::new(db_config).await {
            Ok(db) => match db.health_check().await {
                Ok(()) => {
                    let status = db.migration_status().await?;
                    if !quiet {
                        println!(
                            "[OK] Database: {} (schema v{})",
                            db_path.display(),
                            status.current_version
                        );
                    }
                }
                Err(e) => {
                    all_ok = false;
                    warn!(error = %e, "Database health check failed");
                    if !quiet {
                        println!("[!!] Database: Health check failed - {}", e);
                    }
                }
            },
            Err(e) => {
                all_ok = false;
                if !quiet {
                    println!("[!!] Database: Error - {}", e);
                }
            }
        }
    }

    if !quiet {
        println!();
        if all_ok {
            println!("All checks passed.");
        } else {
            println!("Some checks failed. See above for details.");
        }
    }

    if !all_ok {
        anyhow::bail!("health check failed");
    }
    Ok(())
}
