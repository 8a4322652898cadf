//! Client registry CLI - bulk import tools.
//!
//! # Usage
//!
//! ```bash
//! # Import data/clients.csv, skipping rows that fail to insert
//! registry-cli import
//!
//! # Import another file and stop at the first failed row
//! registry-cli import --file clients-2026.csv --policy fail-fast
//! ```
//!
//! # Commands
//!
//! - `import` - Load clients from a CSV file (`cpf_cnpj,name` with a header row)

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use client_registry_server::import::FailurePolicy;

mod commands;

#[derive(Parser)]
#[command(name = "registry-cli")]
#[command(author, version, about = "Client registry CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import clients from a CSV file
    Import {
        /// CSV file with a header row, then `cpf_cnpj,name` rows
        #[arg(short, long, default_value = "data/clients.csv")]
        file: PathBuf,

        /// What to do when a row fails to insert
        #[arg(short, long, value_enum, default_value_t = Policy::BestEffort)]
        policy: Policy,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Policy {
    /// Log and skip failed rows
    BestEffort,
    /// Abort on the first failed row
    FailFast,
}

impl From<Policy> for FailurePolicy {
    fn from(policy: Policy) -> Self {
        match policy {
            Policy::BestEffort => Self::BestEffort,
            Policy::FailFast => Self::FailFast,
        }
    }
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Import { file, policy } => {
            commands::import::run(&file, policy.into()).await?;
        }
    }
    Ok(())
}
