mod commands;
mod config;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{init, replay, InitArgs, ReplayArgs};
use config::Config;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Vectra CLI - drive the collaborative edit engine from the terminal
#[derive(Parser, Debug)]
#[command(name = "vectra")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Directory containing vectra.config.json (defaults to the current directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a config file plus an example document and script
    Init(InitArgs),

    /// Replay an edit script against a document
    Replay(ReplayArgs),
}

fn run(command: Command, config_dir: &Path) -> anyhow::Result<()> {
    match command {
        Command::Init(args) => init(args, config_dir),
        Command::Replay(args) => {
            let config = Config::load(config_dir)?;
            init_tracing(&config);
            replay(args, &config)
        }
    }
}

fn init_tracing(config: &Config) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_filter)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();

    let config_dir = match cli.config {
        Some(dir) => Ok(dir),
        None => std::env::current_dir(),
    };

    let result = config_dir
        .map_err(anyhow::Error::from)
        .and_then(|dir| run(cli.command, &dir));

    if let Err(err) = result {
        eprintln!();
        eprintln!("{} {:#}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
