//! # Nôa Esperanza - Triage Server
//!
//! The main binary for the Nôa Esperanza triage stage engine.
//!
//! This application provides:
//! - HTTP REST API server (axum-based) over interview sessions
//! - CLI interface, including an interactive terminal interview
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                     apps/noa (THE BINARY)                  │
//! │                                                            │
//! │     ┌─────────────┐              ┌─────────────┐          │
//! │     │    CLI      │              │  HTTP API   │          │
//! │     │   (clap)    │              │   (axum)    │          │
//! │     └──────┬──────┘              └──────┬──────┘          │
//! │            │                            │                  │
//! │            └────────────┬───────────────┘                  │
//! │                         ▼                                  │
//! │                 ┌───────────────┐                          │
//! │                 │   noa-core    │                          │
//! │                 │ (THE ENGINE)  │                          │
//! │                 └───────────────┘                          │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Start the HTTP server
//! noa server --host 0.0.0.0 --port 8080
//!
//! # Interactive interview in the terminal
//! noa interview
//!
//! # Inspect or validate a stage catalog
//! noa catalog --detailed
//! noa validate --file etapas.toml
//! ```

use clap::Parser;
use noa::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    // Initialize tracing — NOA_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("NOA_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "noa=info,tower_http=debug".into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }

    // Parse CLI arguments
    let cli = cli::Cli::parse();

    // Display startup banner
    if !cli.quiet {
        print_banner();
    }

    // Execute command
    if let Err(e) = cli::execute(cli).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Print the Nôa Esperanza startup banner.
fn print_banner() {
    println!(
        r#"
  ███╗   ██╗ ██████╗  █████╗
  ████╗  ██║██╔═══██╗██╔══██╗
  ██╔██╗ ██║██║   ██║███████║
  ██║╚██╗██║██║   ██║██╔══██║
  ██║ ╚████║╚██████╔╝██║  ██║
  ╚═╝  ╚═══╝ ╚═════╝ ╚═╝  ╚═╝

  Nôa Esperanza Triage Server v{}

  Escuta clínica • Etapa a etapa • Determinística
"#,
        env!("CARGO_PKG_VERSION")
    );
}
