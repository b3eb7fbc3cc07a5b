//! # Nôa CLI Module
//!
//! This module implements the CLI interface for the triage server.
//!
//! ## Available Commands
//!
//! - `server` - Start the HTTP server
//! - `interview` - Run an interactive interview in the terminal
//! - `catalog` - Show the stage catalog
//! - `validate` - Validate a stage catalog file

mod commands;

use clap::{Parser, Subcommand};
use noa_core::TriageError;
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Nôa Esperanza - Triage Server
///
/// A deterministic, scripted clinical-intake sequencer. Sessions walk an
/// ordered stage catalog; every answer is judged by the same simple rules.
#[derive(Parser, Debug)]
#[command(name = "noa")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output (stage descriptions, suggestions)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to a TOML stage catalog (defaults to the built-in Nôa script)
    #[arg(short = 'C', long, global = true)]
    pub catalog: Option<PathBuf>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start HTTP server
    Server {
        /// Host to bind to
        #[arg(short = 'H', long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value = "8080")]
        port: u16,
    },

    /// Run an interactive interview in the terminal
    Interview {
        /// Skip the simulated typing delay
        #[arg(long)]
        fast: bool,
    },

    /// Show the stage catalog
    Catalog {
        /// Show prompts, follow-ups and quick replies for every stage
        #[arg(short, long)]
        detailed: bool,
    },

    /// Validate a stage catalog file
    Validate {
        /// Path to the catalog TOML file
        #[arg(short, long)]
        file: PathBuf,
    },
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), TriageError> {
    let catalog_path = cli.catalog.as_deref();
    let json_mode = cli.json_mode;

    match cli.command {
        Some(Commands::Server { host, port }) => cmd_server(catalog_path, &host, port).await,
        Some(Commands::Interview { fast }) => cmd_interview(catalog_path, fast, cli.verbose),
        Some(Commands::Catalog { detailed }) => cmd_catalog(catalog_path, json_mode, detailed),
        Some(Commands::Validate { file }) => cmd_validate(&file, json_mode),
        None => {
            // No subcommand - show the catalog overview by default
            cmd_catalog(catalog_path, json_mode, false)
        }
    }
}
