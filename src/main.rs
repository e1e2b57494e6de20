mod categorizer;
mod cli;
mod error;
mod export;
mod fmt;
mod importer;
mod models;
mod normalizer;
mod pdf;
mod reports;
mod resolver;
mod settings;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_env("STMTGROUP_LOG")
        .unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Group(args) => cli::group::run(args),
        Commands::Classify {
            narrations,
            abbreviations,
        } => cli::classify::run(&narrations, abbreviations.as_deref()),
        Commands::Abbreviations { abbreviations } => cli::abbreviations::list(abbreviations.as_deref()),
        Commands::Init { force } => cli::init::run(force),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
