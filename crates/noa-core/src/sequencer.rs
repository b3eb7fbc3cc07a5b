//! # Stage Sequencer
//!
//! The interview state machine. A [`TriageSession`] walks the patient
//! through the catalog: each submitted answer is judged against the current
//! stage's rules, the [`MessageLog`] records both sides of the exchange, and
//! the state advances until the interview completes or is cancelled.
//!
//! ## States
//!
//! `NotStarted → InStage(0) → … → Completed`, with `AwaitingConsent`
//! interposed whenever the entered stage is consent-flagged and `Cancelled`
//! reachable from consent (decline, or retry exhaustion). Terminal states
//! reject further answers.
//!
//! ## Acceptance rule
//!
//! Evaluated in priority order: empty/whitespace-only input is insufficient;
//! input shorter than [`MIN_ANSWER_CHARS`] with unused follow-ups remaining
//! is insufficient (the next follow-up is asked); anything else is accepted.
//! A deliberately simple heuristic — the interview is scripted, not
//! semantic.

use crate::catalog::StageCatalog;
use crate::clock::{Clock, IdSource, SystemClock};
use crate::log::MessageLog;
use crate::primitives::{CONSENT_RETRY_LIMIT, MIN_ANSWER_CHARS};
use crate::progress::progress;
use crate::summary::CompletionSummary;
use crate::types::{Author, StageId, TriageError, TriageMessage};
use crate::vocabulary::{ConsentReply, ConsentVocabulary};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

// =============================================================================
// SEQUENCER STATE
// =============================================================================

/// Where a session stands in the interview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum SequencerState {
    /// Created but `start` has not run.
    NotStarted,
    /// Collecting answers for the stage at `index`.
    InStage {
        /// Catalog position of the active stage.
        index: usize,
    },
    /// Waiting for an explicit yes/no on the consent stage at `index`.
    AwaitingConsent {
        /// Catalog position of the consent stage.
        index: usize,
    },
    /// Every stage was traversed. Terminal.
    Completed,
    /// The patient declined, or consent retries ran out. Terminal.
    Cancelled,
}

impl SequencerState {
    /// Whether the session accepts no further answers.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, SequencerState::Completed | SequencerState::Cancelled)
    }
}

impl std::fmt::Display for SequencerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SequencerState::NotStarted => write!(f, "not started"),
            SequencerState::InStage { index } => write!(f, "stage {index}"),
            SequencerState::AwaitingConsent { index } => {
                write!(f, "awaiting consent (stage {index})")
            }
            SequencerState::Completed => write!(f, "completed"),
            SequencerState::Cancelled => write!(f, "cancelled"),
        }
    }
}

// =============================================================================
// TURN
// =============================================================================

/// Outcome of one submitted answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    /// Messages appended by this answer, in creation order.
    pub new_messages: Vec<TriageMessage>,
    /// State after the transition.
    pub state: SequencerState,
    /// Completion percentage after the transition.
    pub progress: u8,
    /// Present exactly once: on the turn that completes the interview.
    pub summary: Option<CompletionSummary>,
}

// =============================================================================
// TRIAGE SESSION
// =============================================================================

/// One patient's traversal through the stage catalog.
///
/// Owns all mutable session state; the catalog and vocabulary are shared,
/// immutable inputs. Each call runs to completion before the next is
/// accepted — hosts that share a session across threads must serialize
/// access (the HTTP layer holds sessions behind a write lock).
pub struct TriageSession {
    catalog: Arc<StageCatalog>,
    vocabulary: ConsentVocabulary,
    log: MessageLog,
    state: SequencerState,
    follow_ups_used: usize,
    consent_retries: usize,
    cancel_index: Option<usize>,
    started_at: Option<DateTime<Utc>>,
    summary: Option<CompletionSummary>,
    clock: Box<dyn Clock>,
}

impl std::fmt::Debug for TriageSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TriageSession")
            .field("state", &self.state)
            .field("messages", &self.log.len())
            .field("follow_ups_used", &self.follow_ups_used)
            .field("consent_retries", &self.consent_retries)
            .finish()
    }
}

impl TriageSession {
    /// New session over a shared catalog, with the production clock, id
    /// source and consent vocabulary.
    #[must_use]
    pub fn new(catalog: Arc<StageCatalog>) -> Self {
        Self::with_parts(
            catalog,
            ConsentVocabulary::default(),
            Box::new(SystemClock),
            Box::new(crate::clock::SequentialIds::new()),
        )
    }

    /// New session with every collaborator injected (deterministic tests,
    /// localized vocabularies).
    #[must_use]
    pub fn with_parts(
        catalog: Arc<StageCatalog>,
        vocabulary: ConsentVocabulary,
        clock: Box<dyn Clock>,
        ids: Box<dyn IdSource>,
    ) -> Self {
        Self {
            catalog,
            vocabulary,
            log: MessageLog::with_ids(ids),
            state: SequencerState::NotStarted,
            follow_ups_used: 0,
            consent_retries: 0,
            cancel_index: None,
            started_at: None,
            summary: None,
            clock,
        }
    }

    // =========================================================================
    // OPERATIONS
    // =========================================================================

    /// Begin the interview: enter stage 0 and log its prompt.
    ///
    /// Returns the created prompt message. Fails with
    /// [`TriageError::AlreadyStarted`] on a running session and
    /// [`TriageError::SessionClosed`] on a terminal one.
    pub fn start(&mut self) -> Result<TriageMessage, TriageError> {
        match self.state {
            SequencerState::NotStarted => {}
            SequencerState::Completed | SequencerState::Cancelled => {
                return Err(TriageError::SessionClosed);
            }
            _ => return Err(TriageError::AlreadyStarted),
        }

        self.started_at = Some(self.clock.now());
        self.enter_stage(0)?;

        self.log
            .all()
            .last()
            .cloned()
            .ok_or(TriageError::NotStarted)
    }

    /// Evaluate one free-text answer against the current stage.
    ///
    /// Fails with [`TriageError::SessionClosed`] on terminal sessions and
    /// [`TriageError::NotStarted`] before [`Self::start`].
    pub fn submit_answer(&mut self, text: &str) -> Result<Turn, TriageError> {
        let mark = self.log.len();

        match self.state {
            SequencerState::NotStarted => return Err(TriageError::NotStarted),
            SequencerState::Completed | SequencerState::Cancelled => {
                return Err(TriageError::SessionClosed);
            }
            SequencerState::InStage { index } => self.answer_stage(index, text)?,
            SequencerState::AwaitingConsent { index } => self.answer_consent(index, text)?,
        }

        Ok(Turn {
            new_messages: self.log.all()[mark..].to_vec(),
            state: self.state,
            progress: self.progress(),
            summary: self.summary.clone(),
        })
    }

    // =========================================================================
    // READ ACCESSORS
    // =========================================================================

    /// Current state.
    #[must_use]
    pub fn state(&self) -> SequencerState {
        self.state
    }

    /// All messages in creation order.
    #[must_use]
    pub fn messages(&self) -> &[TriageMessage] {
        self.log.all()
    }

    /// The session's message log.
    #[must_use]
    pub fn log(&self) -> &MessageLog {
        &self.log
    }

    /// The catalog this session walks.
    #[must_use]
    pub fn catalog(&self) -> &StageCatalog {
        &self.catalog
    }

    /// Completion percentage for the current state. Frozen after
    /// cancellation; always 100 after completion.
    #[must_use]
    pub fn progress(&self) -> u8 {
        let count = self.catalog.stage_count();
        match self.state {
            SequencerState::NotStarted => 0,
            SequencerState::InStage { index } | SequencerState::AwaitingConsent { index } => {
                progress(index, count)
            }
            SequencerState::Completed => 100,
            SequencerState::Cancelled => progress(self.cancel_index.unwrap_or(0), count),
        }
    }

    /// Summary of the completed interview, once `Completed`.
    #[must_use]
    pub fn summary(&self) -> Option<&CompletionSummary> {
        self.summary.as_ref()
    }

    // =========================================================================
    // TRANSITIONS
    // =========================================================================

    /// Enter the stage at `index`: reset per-stage cursors, log its prompt,
    /// and settle into `InStage` or `AwaitingConsent`. An index one past the
    /// end completes the interview instead.
    fn enter_stage(&mut self, index: usize) -> Result<(), TriageError> {
        if index >= self.catalog.stage_count() {
            self.complete();
            return Ok(());
        }

        let stage = self.catalog.stage_at(index)?;
        let stage_id = stage.id.clone();
        let prompt = stage.prompt.clone();
        let requires_consent = stage.requires_consent;

        self.follow_ups_used = 0;
        self.consent_retries = 0;

        let now = self.clock.now();
        self.log
            .append(&self.catalog, Author::Noa, prompt, stage_id, now)?;

        self.state = if requires_consent {
            SequencerState::AwaitingConsent { index }
        } else {
            SequencerState::InStage { index }
        };
        Ok(())
    }

    /// Handle an answer to an ordinary (non-consent) stage.
    fn answer_stage(&mut self, index: usize, text: &str) -> Result<(), TriageError> {
        let trimmed = text.trim();
        let stage = self.catalog.stage_at(index)?;
        let stage_id = stage.id.clone();
        let next_follow_up = stage.follow_ups.get(self.follow_ups_used).cloned();

        // Whitespace-only input is never recorded as a patient message; it
        // still consumes a follow-up when one remains.
        if trimmed.is_empty() {
            if let Some(question) = next_follow_up {
                self.ask(question, stage_id)?;
                self.follow_ups_used += 1;
            }
            return Ok(());
        }

        let now = self.clock.now();
        self.log
            .append(&self.catalog, Author::Paciente, trimmed, stage_id.clone(), now)?;

        let below_threshold = trimmed.chars().count() < MIN_ANSWER_CHARS;
        if below_threshold {
            if let Some(question) = next_follow_up {
                self.ask(question, stage_id)?;
                self.follow_ups_used += 1;
                return Ok(());
            }
            // Follow-ups exhausted: the answer stands.
        }

        self.enter_stage(index + 1)
    }

    /// Handle a reply while awaiting consent at the stage with `index`.
    fn answer_consent(&mut self, index: usize, text: &str) -> Result<(), TriageError> {
        let trimmed = text.trim();
        let stage = self.catalog.stage_at(index)?;
        let stage_id = stage.id.clone();
        let prompt = stage.prompt.clone();
        let exit_message = stage.exit_message.clone();

        if !trimmed.is_empty() {
            let now = self.clock.now();
            self.log
                .append(&self.catalog, Author::Paciente, trimmed, stage_id.clone(), now)?;
        }

        match self.vocabulary.classify(trimmed) {
            Some(ConsentReply::Negative) => self.cancel(index, exit_message, stage_id),
            Some(ConsentReply::Affirmative) => self.enter_stage(index + 1),
            None => {
                self.consent_retries += 1;
                if self.consent_retries > CONSENT_RETRY_LIMIT {
                    return self.cancel(index, exit_message, stage_id);
                }
                self.ask(prompt, stage_id)
            }
        }
    }

    /// Log a Nôa question under `stage_id`.
    fn ask(&mut self, question: String, stage_id: StageId) -> Result<(), TriageError> {
        let now = self.clock.now();
        self.log
            .append(&self.catalog, Author::Noa, question, stage_id, now)?;
        Ok(())
    }

    /// Cancel at the stage with `index`, logging its exit message when
    /// present. Progress freezes at this index.
    fn cancel(
        &mut self,
        index: usize,
        exit_message: Option<String>,
        stage_id: StageId,
    ) -> Result<(), TriageError> {
        if let Some(text) = exit_message {
            self.ask(text, stage_id)?;
        }
        self.cancel_index = Some(index);
        self.state = SequencerState::Cancelled;
        Ok(())
    }

    /// Mark the interview completed and compute its summary.
    fn complete(&mut self) {
        let completed_at = self.clock.now();
        self.summary = Some(CompletionSummary {
            stages_traversed: self.catalog.stage_count(),
            message_count: self.log.len(),
            started_at: self.started_at.unwrap_or(completed_at),
            completed_at,
        });
        self.state = SequencerState::Completed;
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{FixedClock, SequentialIds};
    use crate::types::TriageStage;

    fn plain_catalog() -> Arc<StageCatalog> {
        Arc::new(
            StageCatalog::new(vec![
                TriageStage::new("identificacao", "Identificação", "Como você se chama?"),
                TriageStage::new("queixas", "Queixas", "O que trouxe você aqui?"),
                TriageStage::new("sintese", "Síntese", "Algo mais a acrescentar?"),
            ])
            .expect("catalog"),
        )
    }

    fn follow_up_catalog() -> Arc<StageCatalog> {
        let mut stage = TriageStage::new("queixas", "Queixas", "O que trouxe você aqui?");
        stage.follow_ups = vec![
            "Há mais alguma queixa que gostaria de registrar?".to_string(),
            "Percebe algo que agrave ou alivie essas queixas?".to_string(),
        ];
        Arc::new(StageCatalog::new(vec![stage]).expect("catalog"))
    }

    fn consent_catalog() -> Arc<StageCatalog> {
        let mut consent = TriageStage::new("consentimento", "Consentimento", "Podemos prosseguir?");
        consent.requires_consent = true;
        consent.exit_message = Some("Tudo bem, a triagem foi encerrada.".to_string());
        Arc::new(
            StageCatalog::new(vec![
                TriageStage::new("identificacao", "Identificação", "Como você se chama?"),
                consent,
                TriageStage::new("queixas", "Queixas", "O que trouxe você aqui?"),
            ])
            .expect("catalog"),
        )
    }

    fn session(catalog: Arc<StageCatalog>) -> TriageSession {
        TriageSession::with_parts(
            catalog,
            ConsentVocabulary::default(),
            Box::new(FixedClock::unix_epoch()),
            Box::new(SequentialIds::new()),
        )
    }

    #[test]
    fn start_enters_stage_zero_and_logs_one_prompt() {
        let mut session = session(plain_catalog());
        let first = session.start().expect("start");

        assert_eq!(session.state(), SequencerState::InStage { index: 0 });
        assert_eq!(session.messages().len(), 1);
        assert_eq!(first.author, Author::Noa);
        assert_eq!(first.content, "Como você se chama?");
        assert_eq!(session.progress(), 0);
    }

    #[test]
    fn start_twice_is_rejected() {
        let mut session = session(plain_catalog());
        session.start().expect("start");
        assert!(matches!(
            session.start(),
            Err(TriageError::AlreadyStarted)
        ));
    }

    #[test]
    fn submit_before_start_is_rejected() {
        let mut session = session(plain_catalog());
        assert!(matches!(
            session.submit_answer("olá"),
            Err(TriageError::NotStarted)
        ));
    }

    #[test]
    fn accepted_answer_advances_and_logs_both_sides() {
        let mut session = session(plain_catalog());
        session.start().expect("start");

        let turn = session.submit_answer("Meu nome é João").expect("answer");

        assert_eq!(turn.state, SequencerState::InStage { index: 1 });
        assert_eq!(turn.new_messages.len(), 2);
        assert_eq!(turn.new_messages[0].author, Author::Paciente);
        assert_eq!(turn.new_messages[0].content, "Meu nome é João");
        assert_eq!(turn.new_messages[1].author, Author::Noa);
        assert_eq!(turn.new_messages[1].content, "O que trouxe você aqui?");
        assert_eq!(turn.progress, 33);
        assert!(turn.summary.is_none());
    }

    #[test]
    fn final_answer_completes_with_summary() {
        let mut session = session(plain_catalog());
        session.start().expect("start");
        session.submit_answer("Meu nome é João").expect("answer");
        session.submit_answer("não uso cannabis").expect("answer");
        let turn = session.submit_answer("dor de cabeça").expect("answer");

        assert_eq!(turn.state, SequencerState::Completed);
        assert_eq!(turn.progress, 100);
        let summary = turn.summary.expect("summary");
        assert_eq!(summary.stages_traversed, 3);
        assert_eq!(summary.message_count, 6);

        // The summary is returned, never appended to the log.
        assert_eq!(session.messages().len(), 6);
        assert_eq!(
            session.messages().last().map(|m| m.author),
            Some(Author::Paciente)
        );
    }

    #[test]
    fn terminal_session_rejects_answers() {
        let mut session = session(plain_catalog());
        session.start().expect("start");
        for answer in ["João", "nada demais", "dor de cabeça"] {
            session.submit_answer(answer).expect("answer");
        }
        assert!(matches!(
            session.submit_answer("mais uma coisa"),
            Err(TriageError::SessionClosed)
        ));
    }

    #[test]
    fn empty_answer_asks_follow_up_without_logging_patient() {
        let mut session = session(follow_up_catalog());
        session.start().expect("start");

        let turn = session.submit_answer("   ").expect("answer");

        assert_eq!(turn.state, SequencerState::InStage { index: 0 });
        assert_eq!(turn.new_messages.len(), 1);
        assert_eq!(turn.new_messages[0].author, Author::Noa);
        assert_eq!(
            turn.new_messages[0].content,
            "Há mais alguma queixa que gostaria de registrar?"
        );
    }

    #[test]
    fn empty_answer_with_follow_ups_exhausted_is_a_no_op() {
        let mut session = session(follow_up_catalog());
        session.start().expect("start");
        session.submit_answer("").expect("first follow-up");
        session.submit_answer("").expect("second follow-up");

        let turn = session.submit_answer("").expect("no-op");
        assert!(turn.new_messages.is_empty());
        assert_eq!(turn.state, SequencerState::InStage { index: 0 });
    }

    #[test]
    fn short_answer_consumes_follow_ups_then_passes() {
        let mut session = session(follow_up_catalog());
        session.start().expect("start");

        // One character is below the threshold: follow-up asked each time.
        let turn = session.submit_answer("x").expect("answer");
        assert_eq!(turn.state, SequencerState::InStage { index: 0 });
        assert_eq!(turn.new_messages.len(), 2);

        let turn = session.submit_answer("y").expect("answer");
        assert_eq!(turn.state, SequencerState::InStage { index: 0 });

        // Follow-ups exhausted: even a short answer is accepted now.
        let turn = session.submit_answer("z").expect("answer");
        assert_eq!(turn.state, SequencerState::Completed);
    }

    #[test]
    fn long_answer_skips_remaining_follow_ups() {
        let mut session = session(follow_up_catalog());
        session.start().expect("start");

        let turn = session
            .submit_answer("dor de cabeça e cansaço há três meses")
            .expect("answer");
        assert_eq!(turn.state, SequencerState::Completed);
    }

    #[test]
    fn entering_consent_stage_awaits_consent() {
        let mut session = session(consent_catalog());
        session.start().expect("start");

        let turn = session.submit_answer("Maria, 28 anos").expect("answer");
        assert_eq!(turn.state, SequencerState::AwaitingConsent { index: 1 });
        assert_eq!(
            turn.new_messages.last().map(|m| m.content.as_str()),
            Some("Podemos prosseguir?")
        );
    }

    #[test]
    fn consent_decline_cancels_and_logs_exit_message() {
        let mut session = session(consent_catalog());
        session.start().expect("start");
        session.submit_answer("Maria, 28 anos").expect("answer");
        let before = session.progress();

        let turn = session.submit_answer("não").expect("decline");

        assert_eq!(turn.state, SequencerState::Cancelled);
        assert_eq!(
            session.messages().last().map(|m| m.content.as_str()),
            Some("Tudo bem, a triagem foi encerrada.")
        );
        // Progress freezes at the value before cancellation.
        assert_eq!(turn.progress, before);
        assert!(matches!(
            session.submit_answer("mudei de ideia"),
            Err(TriageError::SessionClosed)
        ));
    }

    #[test]
    fn consent_accept_advances() {
        let mut session = session(consent_catalog());
        session.start().expect("start");
        session.submit_answer("Maria, 28 anos").expect("answer");

        let turn = session.submit_answer("sim").expect("accept");
        assert_eq!(turn.state, SequencerState::InStage { index: 2 });
        assert_eq!(
            turn.new_messages.last().map(|m| m.content.as_str()),
            Some("O que trouxe você aqui?")
        );
    }

    #[test]
    fn unrecognized_consent_replies_re_prompt_then_cancel() {
        let mut session = session(consent_catalog());
        session.start().expect("start");
        session.submit_answer("Maria, 28 anos").expect("answer");

        for _ in 0..CONSENT_RETRY_LIMIT {
            let turn = session.submit_answer("talvez").expect("re-prompt");
            assert_eq!(turn.state, SequencerState::AwaitingConsent { index: 1 });
            assert_eq!(
                turn.new_messages.last().map(|m| m.content.as_str()),
                Some("Podemos prosseguir?")
            );
        }

        // One past the bound cancels with the exit message.
        let turn = session.submit_answer("quem sabe").expect("exhausted");
        assert_eq!(turn.state, SequencerState::Cancelled);
        assert_eq!(
            turn.new_messages.last().map(|m| m.content.as_str()),
            Some("Tudo bem, a triagem foi encerrada.")
        );
    }

    #[test]
    fn consent_stage_first_in_catalog() {
        let mut consent = TriageStage::new("consentimento", "Consentimento", "Podemos começar?");
        consent.requires_consent = true;
        let catalog = Arc::new(
            StageCatalog::new(vec![
                consent,
                TriageStage::new("queixas", "Queixas", "O que trouxe você aqui?"),
            ])
            .expect("catalog"),
        );

        let mut session = session(catalog);
        session.start().expect("start");
        assert_eq!(session.state(), SequencerState::AwaitingConsent { index: 0 });

        let turn = session.submit_answer("sim").expect("accept");
        assert_eq!(turn.state, SequencerState::InStage { index: 1 });
    }

    #[test]
    fn consent_stage_last_completes_on_accept() {
        let mut consent = TriageStage::new("validacao", "Validação", "Você concorda?");
        consent.requires_consent = true;
        let catalog = Arc::new(
            StageCatalog::new(vec![
                TriageStage::new("queixas", "Queixas", "O que trouxe você aqui?"),
                consent,
            ])
            .expect("catalog"),
        );

        let mut session = session(catalog);
        session.start().expect("start");
        session.submit_answer("dor de cabeça").expect("answer");
        let turn = session.submit_answer("concordo").expect("accept");

        assert_eq!(turn.state, SequencerState::Completed);
        assert_eq!(turn.progress, 100);
        assert!(turn.summary.is_some());
    }

    #[test]
    fn timestamps_follow_insertion_order() {
        let mut session = session(plain_catalog());
        session.start().expect("start");
        session.submit_answer("João").expect("answer");
        session.submit_answer("dores").expect("answer");

        let messages = session.messages();
        for pair in messages.windows(2) {
            assert!(pair[0].timestamp < pair[1].timestamp);
            assert!(pair[0].id < pair[1].id);
        }
    }
}
