//! # API Request/Response Types
//!
//! This module defines the JSON structures for the HTTP API. Requests are
//! validated here, at the boundary, before anything reaches the engine.

use noa_core::{
    CompletionSummary, SequencerState, SessionId, TriageError, TriageMessage, TriageStage,
    primitives::{MAX_ANSWER_LENGTH, MAX_SESSION_ID_LENGTH},
};
use serde::{Deserialize, Serialize};

// =============================================================================
// HEALTH RESPONSE
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

// =============================================================================
// CATALOG RESPONSE
// =============================================================================

/// Stage catalog overview.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogResponse {
    pub success: bool,
    pub stage_count: usize,
    pub stages: Vec<TriageStage>,
    pub error: Option<String>,
}

impl CatalogResponse {
    pub fn success(stages: Vec<TriageStage>) -> Self {
        Self {
            success: true,
            stage_count: stages.len(),
            stages,
            error: None,
        }
    }
}

// =============================================================================
// START REQUEST/RESPONSE
// =============================================================================

/// Open-session request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartRequest {
    pub session_id: String,
}

impl StartRequest {
    /// Convert to a [`SessionId`], validating the field.
    ///
    /// The id must be non-empty after trimming and within
    /// `MAX_SESSION_ID_LENGTH` bytes. This rejects junk ids at the API
    /// boundary, before a registry entry is created.
    pub fn to_session_id(&self) -> Result<SessionId, TriageError> {
        let trimmed = self.session_id.trim();
        if trimmed.is_empty() {
            return Err(TriageError::InvalidInput(
                "session_id must not be empty".to_string(),
            ));
        }
        if trimmed.len() > MAX_SESSION_ID_LENGTH {
            return Err(TriageError::InvalidInput(format!(
                "session_id length {} exceeds maximum {} bytes",
                trimmed.len(),
                MAX_SESSION_ID_LENGTH
            )));
        }
        Ok(SessionId::new(trimmed))
    }
}

/// Open-session response: the first prompt plus the opening state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartResponse {
    pub success: bool,
    pub message: Option<TriageMessage>,
    pub state: Option<SequencerState>,
    pub progress: Option<u8>,
    pub error: Option<String>,
}

impl StartResponse {
    pub fn success(message: TriageMessage, state: SequencerState, progress: u8) -> Self {
        Self {
            success: true,
            message: Some(message),
            state: Some(state),
            progress: Some(progress),
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            message: None,
            state: None,
            progress: None,
            error: Some(msg.into()),
        }
    }
}

// =============================================================================
// ANSWER REQUEST/RESPONSE
// =============================================================================

/// Free-text answer submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerRequest {
    pub text: String,
}

impl AnswerRequest {
    /// Validate the payload size.
    ///
    /// Interview answers are short; anything beyond `MAX_ANSWER_LENGTH`
    /// bytes is rejected before it reaches the engine. Empty text is
    /// deliberately allowed — the sequencer has defined behavior for it.
    pub fn validate(&self) -> Result<&str, TriageError> {
        if self.text.len() > MAX_ANSWER_LENGTH {
            return Err(TriageError::InvalidInput(format!(
                "answer length {} exceeds maximum {} bytes",
                self.text.len(),
                MAX_ANSWER_LENGTH
            )));
        }
        Ok(&self.text)
    }
}

/// Completion summary as exposed on the wire, with the narrative review.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryJson {
    pub stages_traversed: usize,
    pub message_count: usize,
    pub elapsed_seconds: i64,
    pub elapsed: String,
    pub narrative: String,
}

impl SummaryJson {
    pub fn new(summary: &CompletionSummary, narrative: String) -> Self {
        Self {
            stages_traversed: summary.stages_traversed,
            message_count: summary.message_count,
            elapsed_seconds: summary.elapsed().num_seconds().max(0),
            elapsed: summary.elapsed_mmss(),
            narrative,
        }
    }
}

/// One turn's outcome: the appended messages and the resulting state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerResponse {
    pub success: bool,
    pub messages: Vec<TriageMessage>,
    pub state: Option<SequencerState>,
    pub progress: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub summary: Option<SummaryJson>,
    pub error: Option<String>,
}

impl AnswerResponse {
    pub fn success(
        messages: Vec<TriageMessage>,
        state: SequencerState,
        progress: u8,
        summary: Option<SummaryJson>,
    ) -> Self {
        Self {
            success: true,
            messages,
            state: Some(state),
            progress: Some(progress),
            summary,
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            messages: vec![],
            state: None,
            progress: None,
            summary: None,
            error: Some(msg.into()),
        }
    }
}

// =============================================================================
// LOG RESPONSE
// =============================================================================

/// Full transcript of a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogResponse {
    pub success: bool,
    pub messages: Vec<TriageMessage>,
    pub error: Option<String>,
}

impl LogResponse {
    pub fn success(messages: Vec<TriageMessage>) -> Self {
        Self {
            success: true,
            messages,
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            messages: vec![],
            error: Some(msg.into()),
        }
    }
}

// =============================================================================
// STATE RESPONSE
// =============================================================================

/// Current state and progress of a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateResponse {
    pub success: bool,
    pub state: Option<SequencerState>,
    pub progress: Option<u8>,
    pub error: Option<String>,
}

impl StateResponse {
    pub fn success(state: SequencerState, progress: u8) -> Self {
        Self {
            success: true,
            state: Some(state),
            progress: Some(progress),
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            state: None,
            progress: None,
            error: Some(msg.into()),
        }
    }
}

// =============================================================================
// DELETE RESPONSE
// =============================================================================

/// Session discard acknowledgement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub messages_recorded: Option<usize>,
    pub error: Option<String>,
}

impl DeleteResponse {
    pub fn success(messages_recorded: usize) -> Self {
        Self {
            success: true,
            messages_recorded: Some(messages_recorded),
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            messages_recorded: None,
            error: Some(msg.into()),
        }
    }
}
