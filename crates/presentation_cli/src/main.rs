//! AstraGuard chaos CLI
//!
//! Drives fault-injection scenarios against a running instance and reports
//! whether it recovered.

#![allow(clippy::print_stdout)]

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use application::{ChaosMetricsPort, ChaosOrchestrator, HttpProbePort, SCENARIOS};
use clap::{Parser, Subcommand};
use domain::{FaultType, HealthSnapshot};
use infrastructure::{
    AppConfig, CorrelatedConnector, CorrelatedHttpClient, LogFormat, MetricsRegistry, init_logging,
};
use tracing::warn;

/// Exit status when a scenario or injection did not recover
const EXIT_FAILED: u8 = 1;
/// Exit status for an unknown scenario or fault name
const EXIT_USAGE: u8 = 2;

/// AstraGuard chaos CLI
#[derive(Debug, Parser)]
#[command(name = "astraguard-chaos")]
#[command(author, version, about = "AstraGuard chaos engineering harness", long_about = None)]
struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Configuration file (defaults to ./config.toml when present)
    #[arg(short, long, env = "ASTRAGUARD_CONFIG")]
    config: Option<PathBuf>,

    /// Service under test; overrides chaos.base_url
    #[arg(short, long)]
    base_url: Option<String>,

    /// Print the harness metrics in Prometheus format when done
    #[arg(long)]
    metrics: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run every scenario in sequence
    Suite,

    /// Run one named scenario
    ///
    /// Example: astraguard-chaos scenario circuit_breaker
    Scenario {
        /// circuit_breaker, retry_logic, recovery_orchestrator or cluster_consensus
        name: String,
    },

    /// Engage a single fault and wait for recovery
    ///
    /// Example: astraguard-chaos inject redis_failure --duration 5
    Inject {
        /// model_loader_failure, network_latency or redis_failure
        fault: String,

        /// Fault window in seconds (defaults to chaos.default_duration_secs)
        #[arg(short, long)]
        duration: Option<u64>,
    },

    /// Print the aggregate health of the service under test
    Status,
}

/// Determine log filter level from verbosity count
const fn log_filter_from_verbosity(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<AppConfig> {
    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load().unwrap_or_else(|e| {
            warn!(error = %e, "Falling back to default configuration");
            AppConfig::default()
        }),
    };
    if let Some(base_url) = &cli.base_url {
        config.chaos.base_url.clone_from(base_url);
    }
    Ok(config)
}

fn status_mark(passed: bool) -> &'static str {
    if passed { "PASS" } else { "FAIL" }
}

fn print_results(results: &BTreeMap<String, bool>) {
    for name in SCENARIOS {
        if let Some(passed) = results.get(name) {
            println!("{:<24} {}", name, status_mark(*passed));
        }
    }
    let passed = results.values().filter(|p| **p).count();
    println!("{passed}/{} scenarios recovered", results.len());
}

async fn print_status(config: &AppConfig) -> anyhow::Result<bool> {
    let client = CorrelatedHttpClient::with_config(config.chaos.to_client_config())?;
    let base_url = config.chaos.base_url.trim_end_matches('/');
    let resp = client.get(&format!("{base_url}/health")).await?;
    let snapshot: HealthSnapshot = resp.json()?;

    println!("System:          {}", snapshot.system.status);
    println!("Circuit breaker: {}", snapshot.circuit_breaker.state);
    println!("Retry:           {}", snapshot.retry.state);
    println!("Recovery:        {} action(s)", snapshot.recovery.action_count);
    println!(
        "Consensus:       quorum {} ({}/{} voting), leader {}",
        if snapshot.consensus.quorum_met { "met" } else { "lost" },
        snapshot.consensus.voting_instances,
        snapshot.consensus.known_instances,
        snapshot
            .consensus
            .leader_id
            .as_ref()
            .map_or("none", |id| id.as_str())
    );
    Ok(snapshot.system.status == domain::SystemStatus::Healthy)
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = load_config(&cli)?;

    if matches!(cli.command, Commands::Status) {
        let healthy = print_status(&config).await?;
        return Ok(if healthy {
            ExitCode::SUCCESS
        } else {
            ExitCode::from(EXIT_FAILED)
        });
    }

    // Reject bad names before any connection is made
    match &cli.command {
        Commands::Scenario { name } if !SCENARIOS.contains(&name.as_str()) => {
            println!("Unknown scenario: {name}");
            println!("Available: {}", SCENARIOS.join(", "));
            return Ok(ExitCode::from(EXIT_USAGE));
        },
        Commands::Inject { fault, .. } if fault.parse::<FaultType>().is_err() => {
            println!("Unknown fault type: {fault}");
            let names: Vec<_> = FaultType::ALL.iter().map(ToString::to_string).collect();
            println!("Available: {}", names.join(", "));
            return Ok(ExitCode::from(EXIT_USAGE));
        },
        _ => {},
    }

    let metrics = Arc::new(MetricsRegistry::new());
    let orchestrator = ChaosOrchestrator::new(
        config.chaos.to_chaos_config(),
        Arc::new(CorrelatedConnector::new(config.chaos.to_client_config())),
        Arc::clone(&metrics) as Arc<dyn ChaosMetricsPort>,
    );
    orchestrator.startup().await?;
    println!("Target: {}", orchestrator.base_url());

    let passed = match cli.command {
        Commands::Suite => {
            let results = orchestrator.run_full_suite().await;
            print_results(&results);
            results.values().all(|p| *p)
        },
        Commands::Scenario { name } => {
            let passed = orchestrator.run_scenario(&name).await.unwrap_or(false);
            println!("{name:<24} {}", status_mark(passed));
            passed
        },
        Commands::Inject { fault, duration } => {
            let duration = duration.unwrap_or(config.chaos.default_duration_secs);
            let passed = orchestrator.inject_faults_named(&fault, duration).await;
            println!("{fault} ({duration}s) {}", status_mark(passed));
            passed
        },
        Commands::Status => true,
    };

    orchestrator.shutdown().await;

    if cli.metrics {
        println!();
        print!("{}", metrics.render_prometheus());
    }

    Ok(if passed {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(EXIT_FAILED)
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(LogFormat::Text, log_filter_from_verbosity(cli.verbose))?;
    run(cli).await
}
