//! # Completion Summary
//!
//! Read-model emitted when an interview reaches `Completed`: traversal
//! counts, elapsed time, and a consensual-closing narrative of the patient's
//! recorded answers. Certification or storage of the summary belongs to
//! external collaborators; the engine only computes it.

use crate::catalog::StageCatalog;
use crate::log::MessageLog;
use crate::types::Author;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// COMPLETION SUMMARY
// =============================================================================

/// Facts about one completed interview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionSummary {
    /// Stages traversed from start to completion.
    pub stages_traversed: usize,
    /// Total messages in the session log at completion.
    pub message_count: usize,
    /// Instant the session started.
    pub started_at: DateTime<Utc>,
    /// Instant the final answer was accepted.
    pub completed_at: DateTime<Utc>,
}

impl CompletionSummary {
    /// Time spent between start and completion.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.completed_at - self.started_at
    }

    /// Elapsed time rendered as zero-padded `mm:ss`, the way the session
    /// timer displays it.
    #[must_use]
    pub fn elapsed_mmss(&self) -> String {
        let total_seconds = self.elapsed().num_seconds().max(0);
        let minutes = total_seconds / 60;
        let seconds = total_seconds % 60;
        format!("{minutes:02}:{seconds:02}")
    }
}

// =============================================================================
// NARRATIVE
// =============================================================================

/// Bullet-per-stage review of the patient's recorded answers, in catalog
/// order. Stages the patient never answered render with an empty entry so
/// the review always covers the whole script.
#[must_use]
pub fn narrative(catalog: &StageCatalog, log: &MessageLog) -> String {
    let mut out = String::new();
    for stage in catalog.stages() {
        let answers: Vec<&str> = log
            .all()
            .iter()
            .filter(|m| m.author == Author::Paciente && m.stage_id == stage.id)
            .map(|m| m.content.as_str())
            .collect();
        out.push_str(&format!("• {}: {}\n", stage.label, answers.join("; ")));
    }
    out
}

// =============================================================================
// TESTS
// =============================================================================
