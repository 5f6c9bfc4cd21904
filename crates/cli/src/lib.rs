pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "sitterfied",
    about = "Sitterfied operator CLI",
    long_about = "Inspect Sitterfied configuration, check readiness, and replay recorded platform events.",
    after_help = "Examples:\n  sitterfied doctor --json\n  sitterfied config\n  sitterfied simulate launch_event.json"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
    #[command(about = "Validate config and run a dialog round trip through the skill")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Run a recorded platform event through the skill and print the response")]
    Simulate {
        #[arg(help = "Path to a platform request envelope in JSON")]
        event: PathBuf,
        #[arg(long, help = "Day that relative dates are spoken against (YYYY-MM-DD)")]
        today: Option<NaiveDate>,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Doctor { json } => commands::doctor::run(json),
        Command::Simulate { event, today } => commands::simulate::run(&event, today),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
