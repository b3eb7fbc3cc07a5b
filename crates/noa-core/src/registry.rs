//! # Session Registry
//!
//! The multi-session front door for presentation layers: every operation is
//! keyed by [`SessionId`]. Sessions are fully independent; the registry adds
//! no locking of its own — hosts that mutate it from several threads wrap it
//! in their own exclusion (the HTTP layer uses a write lock), which is
//! exactly the "at most one in-flight mutation per session" discipline the
//! engine requires.

use crate::catalog::StageCatalog;
use crate::sequencer::{SequencerState, TriageSession, Turn};
use crate::types::{SessionId, TriageError, TriageMessage};
use crate::vocabulary::ConsentVocabulary;
use std::collections::BTreeMap;
use std::sync::Arc;

// =============================================================================
// SESSION REGISTRY
// =============================================================================

/// Holds live sessions over one shared catalog and consent vocabulary.
#[derive(Debug)]
pub struct SessionRegistry {
    catalog: Arc<StageCatalog>,
    vocabulary: ConsentVocabulary,
    sessions: BTreeMap<SessionId, TriageSession>,
}

impl SessionRegistry {
    /// Registry over a catalog, with the default consent vocabulary.
    #[must_use]
    pub fn new(catalog: StageCatalog) -> Self {
        Self::with_vocabulary(catalog, ConsentVocabulary::default())
    }

    /// Registry with a custom consent vocabulary (localized deployments).
    #[must_use]
    pub fn with_vocabulary(catalog: StageCatalog, vocabulary: ConsentVocabulary) -> Self {
        Self {
            catalog: Arc::new(catalog),
            vocabulary,
            sessions: BTreeMap::new(),
        }
    }

    /// The catalog shared by every session in this registry.
    #[must_use]
    pub fn catalog(&self) -> &StageCatalog {
        &self.catalog
    }

    /// Open and start a session, returning the first prompt.
    ///
    /// Fails with [`TriageError::DuplicateSession`] while a session with the
    /// same id is live (including one already in a terminal state — callers
    /// remove finished sessions before reusing ids).
    pub fn start(&mut self, id: SessionId) -> Result<TriageMessage, TriageError> {
        if self.sessions.contains_key(&id) {
            return Err(TriageError::DuplicateSession(id.as_str().to_string()));
        }

        let mut session = TriageSession::with_parts(
            Arc::clone(&self.catalog),
            self.vocabulary.clone(),
            Box::new(crate::clock::SystemClock),
            Box::new(crate::clock::SequentialIds::new()),
        );
        let first = session.start()?;
        self.sessions.insert(id, session);
        Ok(first)
    }

    /// Submit an answer to the session with `id`.
    pub fn submit_answer(&mut self, id: &SessionId, text: &str) -> Result<Turn, TriageError> {
        self.session_mut(id)?.submit_answer(text)
    }

    /// The session's message log, in creation order.
    pub fn log(&self, id: &SessionId) -> Result<&[TriageMessage], TriageError> {
        Ok(self.session(id)?.messages())
    }

    /// The session's current state.
    pub fn state(&self, id: &SessionId) -> Result<SequencerState, TriageError> {
        Ok(self.session(id)?.state())
    }

    /// The session's completion percentage.
    pub fn progress(&self, id: &SessionId) -> Result<u8, TriageError> {
        Ok(self.session(id)?.progress())
    }

    /// Borrow a session for richer read access (summary, narrative).
    pub fn session(&self, id: &SessionId) -> Result<&TriageSession, TriageError> {
        self.sessions
            .get(id)
            .ok_or_else(|| TriageError::UnknownSession(id.as_str().to_string()))
    }

    /// Discard a session (completed, cancelled or abandoned). Returns it so
    /// callers can hand the transcript to external collaborators.
    pub fn remove(&mut self, id: &SessionId) -> Result<TriageSession, TriageError> {
        self.sessions
            .remove(id)
            .ok_or_else(|| TriageError::UnknownSession(id.as_str().to_string()))
    }

    /// Number of live sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether no sessions are live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Ids of the live sessions, in deterministic order.
    pub fn session_ids(&self) -> impl Iterator<Item = &SessionId> {
        self.sessions.keys()
    }

    fn session_mut(&mut self, id: &SessionId) -> Result<&mut TriageSession, TriageError> {
        self.sessions
            .get_mut(id)
            .ok_or_else(|| TriageError::UnknownSession(id.as_str().to_string()))
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Author, TriageStage};

    fn registry() -> SessionRegistry {
        SessionRegistry::new(
            StageCatalog::new(vec![
                TriageStage::new("identificacao", "Identificação", "Como você se chama?"),
                TriageStage::new("queixas", "Queixas", "O que trouxe você aqui?"),
            ])
            .expect("catalog"),
        )
    }

    #[test]
    fn start_returns_first_prompt() {
        let mut registry = registry();
        let first = registry
            .start(SessionId::new("sessao-1"))
            .expect("start");

        assert_eq!(first.author, Author::Noa);
        assert_eq!(first.content, "Como você se chama?");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn duplicate_session_ids_are_rejected() {
        let mut registry = registry();
        registry.start(SessionId::new("sessao-1")).expect("start");

        assert!(matches!(
            registry.start(SessionId::new("sessao-1")),
            Err(TriageError::DuplicateSession(_))
        ));
    }

    #[test]
    fn unknown_session_lookups_fail() {
        let mut registry = registry();
        let ghost = SessionId::new("fantasma");

        assert!(matches!(
            registry.submit_answer(&ghost, "olá"),
            Err(TriageError::UnknownSession(_))
        ));
        assert!(matches!(
            registry.log(&ghost),
            Err(TriageError::UnknownSession(_))
        ));
        assert!(matches!(
            registry.state(&ghost),
            Err(TriageError::UnknownSession(_))
        ));
        assert!(matches!(
            registry.remove(&ghost),
            Err(TriageError::UnknownSession(_))
        ));
    }

    #[test]
    fn sessions_are_independent() {
        let mut registry = registry();
        let ana = SessionId::new("ana");
        let bia = SessionId::new("bia");
        registry.start(ana.clone()).expect("start");
        registry.start(bia.clone()).expect("start");

        registry.submit_answer(&ana, "Ana Souza").expect("answer");

        assert_eq!(
            registry.state(&ana).expect("state"),
            SequencerState::InStage { index: 1 }
        );
        assert_eq!(
            registry.state(&bia).expect("state"),
            SequencerState::InStage { index: 0 }
        );
        assert_eq!(registry.log(&ana).expect("log").len(), 3);
        assert_eq!(registry.log(&bia).expect("log").len(), 1);
    }

    #[test]
    fn remove_frees_the_id_for_reuse() {
        let mut registry = registry();
        let id = SessionId::new("sessao-1");
        registry.start(id.clone()).expect("start");

        let removed = registry.remove(&id).expect("remove");
        assert_eq!(removed.messages().len(), 1);
        assert!(registry.is_empty());

        registry.start(id).expect("restart");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn session_ids_are_deterministically_ordered() {
        let mut registry = registry();
        for name in ["carla", "ana", "bia"] {
            registry.start(SessionId::new(name)).expect("start");
        }
        let ids: Vec<&str> = registry.session_ids().map(SessionId::as_str).collect();
        assert_eq!(ids, ["ana", "bia", "carla"]);
    }
}
