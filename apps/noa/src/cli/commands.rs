//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands, plus the
//! TOML catalog loading shared by all of them.

use crate::api;
use noa_core::{
    Author, SequencerState, SessionRegistry, StageCatalog, TriageError, TriageSession,
    TriageStage, narrative, primitives::typing_delay_ms,
};
use serde::Deserialize;
use std::io::{BufRead, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

// =============================================================================
// CATALOG FILES
// =============================================================================

/// Maximum stage catalog file size (1 MiB).
///
/// Catalogs are a handful of stages of prose; anything larger is a mistake.
const MAX_CATALOG_FILE_SIZE: u64 = 1024 * 1024;

/// On-disk catalog document: a list of `[[stages]]` tables.
#[derive(Debug, Deserialize)]
struct CatalogDocument {
    #[serde(default)]
    stages: Vec<TriageStage>,
}

/// Validate file size before reading.
fn validate_file_size(path: &Path, max_size: u64) -> Result<(), TriageError> {
    let metadata = std::fs::metadata(path)
        .map_err(|e| TriageError::IoError(format!("Cannot read file metadata: {}", e)))?;

    if metadata.len() > max_size {
        return Err(TriageError::InvalidCatalog(format!(
            "file size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            max_size
        )));
    }
    Ok(())
}

/// Validate a catalog file path.
///
/// Canonicalizes the path (resolving symlinks and "..") and ensures it is a
/// regular file, so a mistyped or traversal-shaped path fails loudly before
/// anything is read.
fn validate_file_path(path: &Path) -> Result<PathBuf, TriageError> {
    let canonical = path.canonicalize().map_err(|e| {
        TriageError::IoError(format!("Invalid file path '{}': {}", path.display(), e))
    })?;

    if !canonical.is_file() {
        return Err(TriageError::IoError(format!(
            "Path '{}' is not a regular file",
            path.display()
        )));
    }

    Ok(canonical)
}

/// Load a stage catalog: the given TOML file, or the built-in Nôa script.
pub fn load_catalog(path: Option<&Path>) -> Result<StageCatalog, TriageError> {
    let Some(path) = path else {
        return Ok(StageCatalog::noa_default());
    };

    let canonical = validate_file_path(path)?;
    validate_file_size(&canonical, MAX_CATALOG_FILE_SIZE)?;

    let raw = std::fs::read_to_string(&canonical)
        .map_err(|e| TriageError::IoError(format!("Cannot read '{}': {}", path.display(), e)))?;
    let document: CatalogDocument = toml::from_str(&raw)
        .map_err(|e| TriageError::InvalidCatalog(format!("TOML parse error: {}", e)))?;

    StageCatalog::new(document.stages)
}

// =============================================================================
// SERVER COMMAND
// =============================================================================

/// Start the HTTP server.
pub async fn cmd_server(
    catalog_path: Option<&Path>,
    host: &str,
    port: u16,
) -> Result<(), TriageError> {
    let catalog = load_catalog(catalog_path)?;
    let stage_count = catalog.stage_count();
    let registry = SessionRegistry::new(catalog);

    println!("Nôa Esperanza Triage Server Starting...");
    println!();
    println!("Configuration:");
    println!("  Host:    {}", host);
    println!("  Port:    {}", port);
    println!(
        "  Catalog: {} ({} stages)",
        catalog_path.map_or_else(|| "built-in".to_string(), |p| p.display().to_string()),
        stage_count
    );
    println!();
    println!("Endpoints:");
    println!("  POST   /sessions               - Open an interview session");
    println!("  POST   /sessions/{{id}}/answer   - Submit an answer");
    println!("  GET    /sessions/{{id}}/log      - Full transcript");
    println!("  GET    /sessions/{{id}}/state    - State and progress");
    println!("  DELETE /sessions/{{id}}          - Discard a session");
    println!("  GET    /catalog                - Stage catalog");
    println!("  GET    /health                 - Health check");
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    let addr = format!("{}:{}", host, port);
    api::run_server(&addr, registry).await
}

// =============================================================================
// INTERVIEW COMMAND
// =============================================================================

/// Run an interactive interview in the terminal.
///
/// Drives one session from `start` to a terminal state. The simulated
/// typing delay is purely presentational: replies are computed immediately
/// and only their reveal is deferred, and only when stdout is a TTY.
pub fn cmd_interview(
    catalog_path: Option<&Path>,
    fast: bool,
    verbose: bool,
) -> Result<(), TriageError> {
    let catalog = load_catalog(catalog_path)?;
    let mut session = TriageSession::new(Arc::new(catalog));
    let animate = !fast && std::io::stdout().is_terminal();

    println!("Triagem clínica Nôa Esperanza — responda livremente, /sair encerra.");
    println!();

    let first = session.start()?;
    print_noa(&first.content);
    if verbose {
        print_stage_hints(&session);
    }

    let stdin = std::io::stdin();
    let mut line = String::new();

    while !session.state().is_terminal() {
        print!("você> ");
        let _ = std::io::stdout().flush();

        line.clear();
        let read = stdin
            .lock()
            .read_line(&mut line)
            .map_err(|e| TriageError::IoError(format!("stdin: {}", e)))?;
        if read == 0 {
            println!();
            println!("(entrevista abandonada)");
            return Ok(());
        }

        let text = line.trim().to_string();
        if text == "/sair" {
            println!("(entrevista abandonada)");
            return Ok(());
        }

        if animate {
            std::thread::sleep(std::time::Duration::from_millis(typing_delay_ms(
                text.chars().count(),
            )));
        }

        let turn = session.submit_answer(&text)?;
        for message in &turn.new_messages {
            if message.author == Author::Noa {
                print_noa(&message.content);
            }
        }
        println!("      [{:>3}%]", turn.progress);
        if verbose && !turn.state.is_terminal() {
            print_stage_hints(&session);
        }
    }

    match session.state() {
        SequencerState::Completed => {
            println!();
            println!("Triagem concluída.");
            if let Some(summary) = session.summary() {
                println!(
                    "  {} etapas · {} mensagens · {}",
                    summary.stages_traversed,
                    summary.message_count,
                    summary.elapsed_mmss()
                );
            }
            println!();
            println!("Síntese inicial:");
            print!("{}", narrative(session.catalog(), session.log()));
        }
        SequencerState::Cancelled => {
            println!();
            println!("(triagem cancelada)");
        }
        _ => {}
    }

    Ok(())
}

/// Print one of Nôa's messages.
fn print_noa(content: &str) {
    println!("nôa > {}", content);
}

/// Print quick replies and focus topics for the active stage.
fn print_stage_hints(session: &TriageSession) {
    let index = match session.state() {
        SequencerState::InStage { index } | SequencerState::AwaitingConsent { index } => index,
        _ => return,
    };
    let Ok(stage) = session.catalog().stage_at(index) else {
        return;
    };

    if !stage.description.is_empty() {
        println!("      ({})", stage.description);
    }
    if !stage.suggestions.is_empty() {
        println!("      sugestões: {}", stage.suggestions.join(" · "));
    }
    if !stage.focus_topics.is_empty() {
        println!("      tópicos: {}", stage.focus_topics.join(" · "));
    }
}

// =============================================================================
// CATALOG COMMAND
// =============================================================================

/// Show the stage catalog.
pub fn cmd_catalog(
    catalog_path: Option<&Path>,
    json_mode: bool,
    detailed: bool,
) -> Result<(), TriageError> {
    let catalog = load_catalog(catalog_path)?;

    if json_mode {
        let stages: Vec<&TriageStage> = catalog.stages().collect();
        let output = serde_json::json!({
            "stage_count": catalog.stage_count(),
            "stages": stages,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&output).unwrap_or_default()
        );
        return Ok(());
    }

    println!("Nôa Esperanza Stage Catalog");
    println!("===========================");
    println!("Stages: {}", catalog.stage_count());
    println!();

    for (i, stage) in catalog.stages().enumerate() {
        let consent_marker = if stage.requires_consent { " [consent]" } else { "" };
        println!(
            "{:>2}. {} ({}) — {} follow-up(s){}",
            i,
            stage.label,
            stage.id,
            stage.follow_up_count(),
            consent_marker
        );

        if detailed {
            println!("    prompt: {}", stage.prompt);
            if !stage.description.is_empty() {
                println!("    {}", stage.description);
            }
            for follow_up in &stage.follow_ups {
                println!("    follow-up: {}", follow_up);
            }
            if let Some(exit_message) = &stage.exit_message {
                println!("    exit: {}", exit_message);
            }
            if !stage.suggestions.is_empty() {
                println!("    suggestions: {}", stage.suggestions.join(" · "));
            }
            if !stage.focus_topics.is_empty() {
                println!("    topics: {}", stage.focus_topics.join(" · "));
            }
            println!();
        }
    }

    Ok(())
}

// =============================================================================
// VALIDATE COMMAND
// =============================================================================

/// Validate a stage catalog file.
pub fn cmd_validate(file: &Path, json_mode: bool) -> Result<(), TriageError> {
    match load_catalog(Some(file)) {
        Ok(catalog) => {
            let consent_stages = catalog.stages().filter(|s| s.requires_consent).count();
            if json_mode {
                let output = serde_json::json!({
                    "valid": true,
                    "file": file.display().to_string(),
                    "stage_count": catalog.stage_count(),
                    "consent_stages": consent_stages,
                });
                println!(
                    "{}",
                    serde_json::to_string_pretty(&output).unwrap_or_default()
                );
            } else {
                println!("OK: {} is a valid catalog", file.display());
                println!("  Stages:         {}", catalog.stage_count());
                println!("  Consent stages: {}", consent_stages);
            }
            Ok(())
        }
        Err(e) => {
            if json_mode {
                let output = serde_json::json!({
                    "valid": false,
                    "file": file.display().to_string(),
                    "error": e.to_string(),
                });
                println!(
                    "{}",
                    serde_json::to_string_pretty(&output).unwrap_or_default()
                );
            }
            Err(e)
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
