//! # Message Log
//!
//! Append-only record of one session's conversation. Messages are created
//! here (fresh id from the injected [`IdSource`], caller-supplied instant)
//! and never mutated afterwards. Ordering by id and by insertion coincide.

use crate::catalog::StageCatalog;
use crate::clock::{IdSource, SequentialIds};
use crate::types::{Author, StageId, TriageError, TriageMessage};
use chrono::{DateTime, Utc};

// =============================================================================
// MESSAGE LOG
// =============================================================================

/// Append-only ordered sequence of [`TriageMessage`] records.
pub struct MessageLog {
    messages: Vec<TriageMessage>,
    ids: Box<dyn IdSource>,
}

impl std::fmt::Debug for MessageLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageLog")
            .field("messages", &self.messages)
            .finish()
    }
}

impl Default for MessageLog {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageLog {
    /// Empty log with the production id source.
    #[must_use]
    pub fn new() -> Self {
        Self::with_ids(Box::new(SequentialIds::new()))
    }

    /// Empty log with an injected id source (deterministic tests).
    #[must_use]
    pub fn with_ids(ids: Box<dyn IdSource>) -> Self {
        Self {
            messages: Vec::new(),
            ids,
        }
    }

    /// Create and store a new message, returning a reference to it.
    ///
    /// Fails with [`TriageError::UnknownStage`] when `stage_id` is neither a
    /// catalog stage nor the terminal sentinel.
    pub fn append(
        &mut self,
        catalog: &StageCatalog,
        author: Author,
        content: impl Into<String>,
        stage_id: StageId,
        at: DateTime<Utc>,
    ) -> Result<&TriageMessage, TriageError> {
        if !catalog.is_valid_message_stage(&stage_id) {
            return Err(TriageError::UnknownStage(stage_id.as_str().to_string()));
        }

        self.messages.push(TriageMessage {
            id: self.ids.next_id(),
            author,
            content: content.into(),
            timestamp: at,
            stage_id,
        });

        // Just pushed, so the slice is non-empty.
        self.messages
            .last()
            .ok_or(TriageError::IoError("message log empty after push".to_string()))
    }

    /// All messages in creation order.
    #[must_use]
    pub fn all(&self) -> &[TriageMessage] {
        &self.messages
    }

    /// Most recent message by `author`, if any.
    #[must_use]
    pub fn last_from(&self, author: Author) -> Option<&TriageMessage> {
        self.messages.iter().rev().find(|m| m.author == author)
    }

    /// Number of messages in the log.
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the log is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

// =============================================================================
// TESTS
// =============================================================================
