#![forbid(unsafe_code)]

//! Scenario runner.
//!
//! ```sh
//! autoview-harness run scenarios/folder-lock.json
//! autoview-harness commands
//! ```

use std::path::PathBuf;

use autoview_harness::{Scenario, ScenarioError, ScenarioRunner};
use autoview_runtime::{Command, LoggingConfig, logging};
use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "autoview-harness",
    about = "Replay autoview scenarios against a simulated host",
    version
)]
struct Cli {
    /// Log filter directives (overridden by AUTOVIEW_LOG).
    #[arg(long, global = true, default_value = "warn")]
    log: String,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Replay a scenario file, printing one line per step.
    Run {
        /// Path to the scenario JSON.
        scenario: PathBuf,
    },
    /// Print the registered command ids and titles.
    Commands,
}

fn run(cli: Cli) -> Result<(), ScenarioError> {
    match cli.command {
        Commands::Run { scenario: path } => {
            let scenario = Scenario::from_json_file(&path)?;
            if let Some(name) = &scenario.name {
                println!("scenario: {name}");
            }
            let mut runner = ScenarioRunner::new(&scenario);
            for (index, step) in scenario.steps.iter().enumerate() {
                let outcome = runner.step(index, step)?;
                println!("{outcome}");
            }
            println!("ok: {} steps", scenario.steps.len());
            Ok(())
        }
        Commands::Commands => {
            for command in Command::ALL {
                println!("{}\t{}", command.id(), command.title());
            }
            Ok(())
        }
    }
}

fn main() {
    let cli = Cli::parse();
    let logging_config = LoggingConfig {
        filter: cli.log.clone(),
        json: cli.log_json,
    };
    if let Err(error) = logging::init(&logging_config) {
        eprintln!("{error}");
    }
    if let Err(error) = run(cli) {
        eprintln!("{error}");
        std::process::exit(error.exit_code());
    }
}
