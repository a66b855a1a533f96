pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "convostate",
    about = "Convostate slot-tracking operator CLI",
    long_about = "Validate domain files, inspect slot featurization layouts, and replay recorded turns.",
    after_help = "Examples:\n  convostate validate --domain domain.toml\n  convostate inspect --domain domain.toml\n  convostate run --domain domain.toml --turns turns.json"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Load a domain file and report schema validation errors")]
    Validate {
        #[arg(long, help = "Path to the domain TOML file")]
        domain: PathBuf,
    },
    #[command(about = "Print the slot catalog with per-slot feature widths")]
    Inspect {
        #[arg(long, help = "Path to the domain TOML file")]
        domain: PathBuf,
    },
    #[command(about = "Replay a JSON file of turns and emit snapshots and feature vectors")]
    Run {
        #[arg(long, help = "Path to the domain TOML file")]
        domain: PathBuf,
        #[arg(long, help = "Path to the turns JSON file")]
        turns: PathBuf,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Validate { domain } => commands::validate::run(&domain),
        Command::Inspect { domain } => commands::inspect::run(&domain),
        Command::Run { domain, turns } => commands::run::run(&domain, &turns),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
