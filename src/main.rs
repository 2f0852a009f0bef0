//! Tickloop CLI
//!
//! Runs the lesson scenarios and prints their console output.

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use tickloop::lessons::{self, Scenario};
use tickloop::{Entry, LoopConfig, StdoutReporter, Transcript};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tickloop")]
#[command(author, version, about = "Replay event-loop lessons deterministically", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Loop configuration file (JSON)
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Verbose output (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// List the available scenarios
    List,

    /// Run one or more scenarios
    Run {
        /// Scenario names, see `tickloop list`
        #[arg(required = true)]
        names: Vec<String>,
        /// Print a JSON report instead of the raw console output
        #[arg(long)]
        json: bool,
    },

    /// Run every scenario in lesson order
    All {
        /// Print a JSON report instead of the raw console output
        #[arg(long)]
        json: bool,
    },
}

/// JSON view of one scenario run
#[derive(Serialize)]
struct ScenarioReport<'a> {
    scenario: &'a str,
    completed: bool,
    entries: Vec<Entry>,
    microtasks: usize,
    macrotasks: usize,
    final_time: u64,
    unhandled_rejections: usize,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::from(2)
        }
    }
}

fn setup_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "error",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = match &cli.config {
        Some(path) => LoopConfig::from_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => LoopConfig::default(),
    };
    tracing::debug!(?config, "loop config");

    match cli.command {
        Commands::List => {
            for scenario in lessons::SCENARIOS {
                println!("{:<24} {}", scenario.name, scenario.summary);
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Run { names, json } => {
            let scenarios = names
                .iter()
                .map(|name| lessons::find(name))
                .collect::<Result<Vec<_>, _>>()?;
            run_scenarios(&scenarios, &config, json)
        }
        Commands::All { json } => {
            let scenarios: Vec<&Scenario> = lessons::SCENARIOS.iter().collect();
            run_scenarios(&scenarios, &config, json)
        }
    }
}

fn run_scenarios(
    scenarios: &[&Scenario],
    config: &LoopConfig,
    json: bool,
) -> anyhow::Result<ExitCode> {
    let mut failed = false;
    let mut reports = Vec::new();

    for (i, scenario) in scenarios.iter().enumerate() {
        let transcript = Transcript::new();
        let outcome = if json {
            scenario.run(config.clone(), transcript.clone())
        } else {
            if scenarios.len() > 1 {
                if i > 0 {
                    println!();
                }
                println!("── {} ──", scenario.name);
            }
            scenario.run(config.clone(), StdoutReporter)
        };

        let result = match outcome {
            Ok(result) => {
                if config.fail_on_unhandled_rejection && result.unhandled_rejections > 0 {
                    failed = true;
                }
                Some(result)
            }
            Err(err) => {
                tracing::info!(scenario = scenario.name, error = %err, "scenario aborted");
                failed = true;
                None
            }
        };

        if json {
            let completed = result.is_some();
            let result = result.unwrap_or_default();
            reports.push(ScenarioReport {
                scenario: scenario.name,
                completed,
                entries: transcript.entries(),
                microtasks: result.microtasks_processed,
                macrotasks: result.macrotasks_processed,
                final_time: result.final_time,
                unhandled_rejections: result.unhandled_rejections,
            });
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    }

    Ok(if failed { ExitCode::from(1) } else { ExitCode::SUCCESS })
}
