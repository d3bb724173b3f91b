mod cli;
mod commands;
mod config;
mod constants;
mod download;
mod downloader;
mod error;
mod platform;
mod registry;
mod repository;
mod ui;
mod version;

use clap::Parser;
use cli::{Cli, Commands};
use config::Config;
use log::debug;
use registry::RepositoryRegistry;

/// Exit status after an interrupt (128 + SIGINT)
const INTERRUPTED_EXIT_CODE: i32 = 130;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();

    tokio::select! {
        result = run(cli) => result,
        _ = tokio::signal::ctrl_c() => {
            // Dropping `run` kills any in-flight downloader child
            ui::error("Interrupted");
            std::process::exit(INTERRUPTED_EXIT_CODE);
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    if let Commands::Platform = cli.command {
        return commands::platform::platform();
    }

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let registry = RepositoryRegistry::from_config(&config)?;
    debug!(
        "{} binary repositories registered",
        registry.repositories().len()
    );

    match cli.command {
        Commands::Download {
            version,
            edition,
            dir,
            repo,
        } => {
            commands::download::download(&registry, version, edition, dir, repo.as_deref()).await
        }
        Commands::Locate {
            version,
            edition,
            repo,
        } => commands::locate::locate(&registry, version, edition, repo.as_deref()),
        Commands::Repos => commands::repos::repos(&registry),
        Commands::Platform => commands::platform::platform(),
    }
}
