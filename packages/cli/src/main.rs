mod commands;
mod scene;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{inspect, replay, InspectArgs, ReplayArgs};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Inspector CLI - property documents for reflected object graphs
#[derive(Parser, Debug)]
#[command(name = "inspector")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory holding inspector.config.json (defaults to current directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the property document of the sample scene
    Inspect(InspectArgs),

    /// Replay a script of wire messages and print the emitted events
    Replay(ReplayArgs),
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = std::env::current_dir()
        .map_err(anyhow::Error::from)
        .and_then(|cwd| {
            let config_dir = cli.config.unwrap_or(cwd);
            match cli.command {
                Command::Inspect(args) => inspect(args, &config_dir),
                Command::Replay(args) => replay(args, &config_dir),
            }
        });

    if let Err(err) = result {
        eprintln!();
        eprintln!("{} {:#}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
