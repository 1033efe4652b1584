//! Linkstat main entry point
//!
//! This is the command-line interface for the Linkstat task engine.

use anyhow::Context;
use clap::{Parser, Subcommand};
use linkstat::config::load_config_or_default;
use linkstat::{Config, TaskEngine, TaskId};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Linkstat: durable link availability checks
///
/// Every invocation first resumes tasks left pending by an earlier,
/// interrupted run, then executes the requested command.
#[derive(Parser, Debug)]
#[command(name = "linkstat")]
#[command(version)]
#[command(about = "Check links and keep a durable record of the results", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults apply when omitted)
    #[arg(short, long, value_name = "CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Submit a batch of links, probe them and print the results
    Check {
        /// Links to check; a missing scheme tries https then http
        #[arg(required = true, value_name = "URL")]
        links: Vec<String>,
    },

    /// Print stored results for completed tasks
    Report {
        /// Task identifiers to include
        #[arg(required = true, value_name = "ID")]
        ids: Vec<TaskId>,

        /// Emit JSON instead of text lines
        #[arg(long)]
        json: bool,
    },

    /// Resume pending tasks and wait for them to finish
    Recover,

    /// Show pending/completed counts and the next task identifier
    Stats,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config =
        load_config_or_default(cli.config.as_deref()).context("Failed to load configuration")?;
    tracing::debug!(
        "Using {:?} storage at {}",
        config.storage.backend,
        config.storage.path
    );

    let engine = TaskEngine::from_config(&config).context("Failed to start task engine")?;

    // Resume interrupted work before accepting anything new
    match engine.recover_pending_tasks().await {
        Ok(0) => {}
        Ok(n) => tracing::info!("Resuming {} interrupted task(s) in the background", n),
        Err(e) => tracing::warn!("Could not recover pending tasks: {}", e),
    }

    let outcome = run_command(&engine, &config, cli.command).await;

    drain_recovery(&engine, &config).await;

    outcome
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("linkstat=info,warn"),
            1 => EnvFilter::new("linkstat=debug,info"),
            2 => EnvFilter::new("linkstat=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

async fn run_command(
    engine: &TaskEngine,
    config: &Config,
    command: Command,
) -> anyhow::Result<()> {
    match command {
        Command::Check { links } => handle_check(engine, links).await,
        Command::Report { ids, json } => handle_report(engine, &ids, json).await,
        Command::Recover => handle_recover(engine, config).await,
        Command::Stats => handle_stats(engine).await,
    }
}

/// Handles `check`: submit, process, print
async fn handle_check(engine: &TaskEngine, links: Vec<String>) -> anyhow::Result<()> {
    let (id, links) = engine.check(links).await?;

    println!("Task {}", id);
    for link in &links {
        println!("  {} ({})", link.url, link.status_label());
    }
    Ok(())
}

/// Handles `report`: print completed tasks, skipping unknown ids
async fn handle_report(engine: &TaskEngine, ids: &[TaskId], json: bool) -> anyhow::Result<()> {
    let report = engine.fetch_completed(ids).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    for (id, links) in &report {
        for link in links {
            println!("{}: {} ({})", id, link.url, link.status_label());
        }
    }

    let missing = ids.iter().filter(|id| !report.contains_key(*id)).count();
    if missing > 0 {
        tracing::info!("{} requested task(s) are not completed", missing);
    }
    Ok(())
}

/// Handles `recover`: recovery was launched at startup, so just wait for it
async fn handle_recover(engine: &TaskEngine, config: &Config) -> anyhow::Result<()> {
    let in_flight = engine.recovery_in_flight();
    drain_recovery(engine, config).await;
    println!("Recovered {} task(s)", in_flight);
    handle_stats(engine).await
}

/// Handles `stats`
async fn handle_stats(engine: &TaskEngine) -> anyhow::Result<()> {
    let stats = engine.stats().await?;
    println!("Pending tasks:   {}", stats.pending);
    println!("Completed tasks: {}", stats.completed);
    println!("Next task id:    {}", stats.next_id);
    Ok(())
}

/// Gives background recovery a bounded chance to finish before exit
async fn drain_recovery(engine: &TaskEngine, config: &Config) {
    let timeout = Duration::from_secs(config.engine.recovery_timeout_secs);
    if engine.wait_for_recovery(timeout).await {
        tracing::debug!("All recovery work finished");
    } else {
        tracing::warn!("Exiting with recovery work unfinished; it resumes on next start");
    }
}
