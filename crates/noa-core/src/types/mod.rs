//! # Core Type Definitions
//!
//! This module contains all core types for the Nôa Esperanza triage engine:
//! - Session, stage and message identifiers (`SessionId`, `StageId`, `MessageId`)
//! - Interview script definitions (`TriageStage`)
//! - Conversation records (`TriageMessage`, `Author`)
//! - Error types (`TriageError`)
//!
//! ## Determinism Guarantees
//!
//! All types in this module:
//! - Use integer arithmetic only (no floating-point)
//! - Implement `Ord` where they key `BTreeMap`/`BTreeSet` collections
//! - Carry timestamps supplied by an injected [`crate::clock::Clock`], never
//!   read from ambient system time

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// IDENTIFIERS
// =============================================================================

/// Unique identifier for one interview session.
///
/// Chosen by the caller when the session is opened; the engine only requires
/// uniqueness within a [`crate::registry::SessionRegistry`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    /// Create a new session id from a string.
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the session id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unique identifier for a stage within the catalog.
///
/// Stable across the catalog; messages reference the stage that was active
/// when they were produced.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StageId(pub String);

impl StageId {
    /// Create a new stage id from a string.
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the stage id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for StageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unique identifier for a message within a session.
///
/// Monotonically creation-ordered: a later append always yields a larger id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MessageId(pub u64);

impl MessageId {
    /// Get the raw id value.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

// =============================================================================
// AUTHOR
// =============================================================================

/// Author of a triage message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Author {
    /// Nôa, the interviewer.
    Noa,
    /// The patient being interviewed.
    Paciente,
}

impl Author {
    /// Get the author's wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Author::Noa => "noa",
            Author::Paciente => "paciente",
        }
    }
}

impl std::fmt::Display for Author {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// TRIAGE STAGE
// =============================================================================

/// One step of the scripted interview.
///
/// Stages are author-defined and immutable at runtime. Catalog order defines
/// interview order. Optional fields default to empty so stage catalogs can be
/// written as sparse TOML tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriageStage {
    /// Unique stage identifier, stable across the catalog.
    pub id: StageId,
    /// Short human-readable name (e.g. "Acolhimento").
    pub label: String,
    /// The question Nôa asks on entering this stage.
    pub prompt: String,
    /// Auxiliary explanatory text.
    #[serde(default)]
    pub description: String,
    /// Ordered clarifying questions, asked only when the primary answer is
    /// insufficient. A stage with no follow-ups is satisfied by any
    /// non-empty answer.
    #[serde(default)]
    pub follow_ups: Vec<String>,
    /// Message shown when the stage is abandoned or declined.
    #[serde(default)]
    pub exit_message: Option<String>,
    /// Quick-reply strings offered to the patient.
    #[serde(default)]
    pub suggestions: Vec<String>,
    /// Topics the patient may choose to expand on.
    #[serde(default)]
    pub focus_topics: Vec<String>,
    /// Whether this stage gates progression on an explicit yes/no consent.
    #[serde(default)]
    pub requires_consent: bool,
}

impl TriageStage {
    /// Create a plain stage with just an id, label and prompt.
    #[must_use]
    pub fn new(id: impl Into<String>, label: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            id: StageId::new(id),
            label: label.into(),
            prompt: prompt.into(),
            description: String::new(),
            follow_ups: Vec::new(),
            exit_message: None,
            suggestions: Vec::new(),
            focus_topics: Vec::new(),
            requires_consent: false,
        }
    }

    /// Number of follow-up questions this stage carries.
    #[must_use]
    pub fn follow_up_count(&self) -> usize {
        self.follow_ups.len()
    }
}

// =============================================================================
// TRIAGE MESSAGE
// =============================================================================

/// One record of the conversation, immutable once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriageMessage {
    /// Unique, monotonically creation-ordered id.
    pub id: MessageId,
    /// Who produced the message.
    pub author: Author,
    /// Literal text.
    pub content: String,
    /// Instant of creation, from the injected clock. RFC 3339 on the wire.
    pub timestamp: DateTime<Utc>,
    /// The stage active when the message was produced.
    pub stage_id: StageId,
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors surfaced by the triage engine.
///
/// All are local, non-retryable precondition violations reported
/// synchronously. The engine never panics; callers decide whether to open a
/// fresh session.
#[derive(Debug, Error)]
pub enum TriageError {
    /// A catalog index lookup fell outside `[0, stage_count())`.
    #[error("stage index out of range: {0}")]
    OutOfRange(usize),

    /// A stage id is not present in the catalog.
    #[error("unknown stage id: {0}")]
    UnknownStage(String),

    /// An operation was attempted on a completed or cancelled session.
    #[error("session is closed")]
    SessionClosed,

    /// An answer was submitted before the session was started.
    #[error("session has not been started")]
    NotStarted,

    /// `start` was called on a session that is already underway.
    #[error("session has already been started")]
    AlreadyStarted,

    /// The registry has no session with the given id.
    #[error("unknown session: {0}")]
    UnknownSession(String),

    /// The registry already holds a session with the given id.
    #[error("session already exists: {0}")]
    DuplicateSession(String),

    /// A stage catalog failed validation (empty, duplicate ids, bad file).
    #[error("invalid catalog: {0}")]
    InvalidCatalog(String),

    /// A caller-supplied payload failed boundary validation.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An I/O error occurred (catalog files, terminal, network bind).
    #[error("I/O error: {0}")]
    IoError(String),
}

// =============================================================================
// TESTS
// =============================================================================
