//! AGENTLOG — Demo CLI
//!
//! Wires the hash proof generator and the in-memory ledger into one
//! `ActionPipeline` and drives it from the command line.
//!
//! Usage:
//!   cargo run -p demo -- scenarios
//!   cargo run -p demo -- log --agent agent_1 --action task_completion --description "Sent email"
//!   cargo run -p demo -- --config demo/agentlog.toml status

mod scenarios;

use std::{path::PathBuf, sync::Arc};

use clap::{Parser, Subcommand};
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

use agentlog_contracts::{
    action::{ActionMetadata, ActionType, AgentId, Location},
    error::AgentLogError,
};
use agentlog_core::{config::AgentLogConfig, ActionPipeline};
use agentlog_ledger::InMemoryLedger;
use agentlog_proof::HashProofGenerator;

// ── CLI definition ────────────────────────────────────────────────────────────

/// AGENTLOG — verifiable logging of agent actions.
#[derive(Parser)]
#[command(
    name = "demo",
    about = "AGENTLOG demo: prove and log agent actions to a hash-chained ledger",
    long_about = "Logs agent actions through the proof generator and an in-memory,\n\
                  tamper-evident ledger, and replays the reference scenarios."
)]
struct Cli {
    /// TOML configuration file. Defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run scenarios A–D in sequence.
    Scenarios,
    /// Log one action, then print the agent's history and re-verify it.
    Log {
        #[arg(long, default_value = "agent_1")]
        agent: String,
        /// task_completion, location_visit, form_submit or verification.
        #[arg(long, default_value = "task_completion")]
        action: ActionType,
        #[arg(long)]
        description: String,
        #[arg(long, default_value = "addr_1")]
        submitter: String,
        /// Coordinates as `LAT,LON` for location visits.
        #[arg(long)]
        location: Option<String>,
        /// Form body as a JSON object for form submissions.
        #[arg(long)]
        form: Option<String>,
    },
    /// Print the ledger's connection and size status.
    Status,
}

// ── Errors ────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum DemoError {
    #[error(transparent)]
    Pipeline(#[from] AgentLogError),

    #[error("scenario {scenario} did not behave as expected: {detail}")]
    Unexpected { scenario: &'static str, detail: String },

    #[error("invalid argument: {reason}")]
    Argument { reason: String },
}

pub type DemoResult<T> = Result<T, DemoError>;

// ── Composition root ──────────────────────────────────────────────────────────

/// One pipeline and the concrete ledger behind it.
pub struct Wiring {
    pub pipeline: Arc<ActionPipeline>,
    pub ledger: Arc<InMemoryLedger>,
}

impl Wiring {
    pub fn build(config: AgentLogConfig) -> Self {
        let prover = Arc::new(HashProofGenerator::new(config.proof));
        let ledger = Arc::new(InMemoryLedger::new(config.ledger, prover.clone()));
        let pipeline = Arc::new(ActionPipeline::new(
            prover,
            ledger.clone(),
            config.pipeline,
        ));
        Self { pipeline, ledger }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() {
    // Set RUST_LOG=debug for verbose output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => println!("Done."),
        Err(e) => {
            eprintln!("Demo error: {}", e);
            std::process::exit(1);
        }
    }
}

async fn run(cli: Cli) -> DemoResult<()> {
    let config = match &cli.config {
        Some(path) => AgentLogConfig::from_file(path)?,
        None => AgentLogConfig::default(),
    };
    info!(
        chain_id = %config.ledger.chain_id,
        endpoint = %config.ledger.endpoint,
        privacy = config.proof.enable_privacy,
        "demo configured"
    );

    match cli.command {
        Command::Scenarios => {
            print_banner();
            scenarios::run_all(&config).await
        }
        Command::Log {
            agent,
            action,
            description,
            submitter,
            location,
            form,
        } => {
            let mut metadata = ActionMetadata::described(description);
            if let Some(raw) = location {
                metadata = metadata.with_location(parse_location(&raw)?);
            }
            if let Some(raw) = form {
                metadata = metadata.with_form_data(parse_form(&raw)?);
            }
            log_one(config, AgentId::new(agent), action, metadata, &submitter).await
        }
        Command::Status => {
            let wiring = Wiring::build(config);
            let status = wiring.pipeline.ledger_status().await;
            println!("Chain:      {}", status.chain_id);
            println!("Endpoint:   {}", status.endpoint);
            println!("Connected:  {}", status.connected);
            println!("Reachable:  {}", status.reachable);
            println!("Entries:    {}", status.entry_count);
            Ok(())
        }
    }
}

async fn log_one(
    config: AgentLogConfig,
    agent: AgentId,
    action_type: ActionType,
    metadata: ActionMetadata,
    submitter: &str,
) -> DemoResult<()> {
    let wiring = Wiring::build(config);
    let reference = wiring
        .pipeline
        .log_action(agent.clone(), action_type, metadata, submitter)
        .await?;
    println!("Logged {} as {}", action_type, reference);

    for action in wiring.pipeline.get_history(&agent) {
        let verified = wiring.pipeline.verify_action(&action).await?;
        println!(
            "  {}  {:<16} {:<10} verified={}",
            action.id(),
            action.action_type.as_str(),
            action.status().to_string(),
            verified
        );
    }
    Ok(())
}

// ── Argument parsing ──────────────────────────────────────────────────────────

fn parse_location(raw: &str) -> DemoResult<Location> {
    let argument = |reason: String| DemoError::Argument { reason };
    let (lat, lon) = raw
        .split_once(',')
        .ok_or_else(|| argument(format!("location '{}' is not LAT,LON", raw)))?;
    let latitude = lat
        .trim()
        .parse::<f64>()
        .map_err(|e| argument(format!("latitude '{}': {}", lat, e)))?;
    let longitude = lon
        .trim()
        .parse::<f64>()
        .map_err(|e| argument(format!("longitude '{}': {}", lon, e)))?;
    Ok(Location {
        latitude,
        longitude,
        address: None,
    })
}

fn parse_form(raw: &str) -> DemoResult<serde_json::Map<String, serde_json::Value>> {
    match serde_json::from_str(raw) {
        Ok(serde_json::Value::Object(map)) => Ok(map),
        Ok(_) => Err(DemoError::Argument {
            reason: "form must be a JSON object".to_string(),
        }),
        Err(e) => Err(DemoError::Argument {
            reason: format!("form is not valid JSON: {}", e),
        }),
    }
}

// ── Banner ────────────────────────────────────────────────────────────────────

fn print_banner() {
    println!();
    println!("AGENTLOG — Verifiable Agent Action Log");
    println!("======================================");
    println!();
    println!("Pipeline per action:");
    println!("  [1] Refuse if no submitter or ledger session");
    println!("  [2] Create and validate the action (status: pending)");
    println!("  [3] Generate a proof; sensitive fields are published as hashes");
    println!("  [4] Submit to the hash-chained ledger");
    println!("  [5] Complete with the ledger reference, or fail with the stage");
    println!();
}
