// CLI module for handling command-line interface

use crate::version::{Edition, is_valid_version};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "mongofetch")]
#[command(about = "Locate and download MongoDB server archives")]
#[command(version)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file (defaults to ~/.mongoctl/mongoctl.config)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Download a MongoDB server archive
    Download {
        /// MongoDB version, e.g. 3.0.4
        #[arg(value_parser = parse_version)]
        version: String,
        /// Edition to download (community or enterprise)
        #[arg(short, long, default_value_t = Edition::Community)]
        edition: Edition,
        /// Directory to save the archive in (defaults to the current directory)
        #[arg(short, long)]
        dir: Option<PathBuf>,
        /// Fetch from this repository only, without falling back
        #[arg(short, long)]
        repo: Option<String>,
    },
    /// Show where each repository would fetch a version from
    Locate {
        #[arg(value_parser = parse_version)]
        version: String,
        #[arg(short, long, default_value_t = Edition::Community)]
        edition: Edition,
        /// Only show this repository
        #[arg(short, long)]
        repo: Option<String>,
    },
    /// Show the detected platform
    Platform,
    /// List registered binary repositories in priority order
    Repos,
}

fn parse_version(value: &str) -> Result<String, String> {
    if is_valid_version(value) {
        Ok(value.trim().to_string())
    } else {
        Err(format!("Invalid version '{}'", value.trim()))
    }
}
