//! # noa-core
//!
//! The deterministic triage interview engine for Nôa Esperanza - THE ENGINE.
//!
//! This crate implements the scripted clinical intake as a pure state
//! machine: an ordered stage catalog, an append-only message log, a
//! sequencer that judges free-text answers and advances stages, and a
//! progress projector. It is consumed in-process by presentation layers
//! (the `noa` binary's HTTP API and terminal interview) and never renders
//! anything itself.
//!
//! ## Architectural Constraints
//!
//! The ENGINE:
//! - Is synchronous and single-owner: each `submit_answer` runs to
//!   completion before the next is accepted
//! - Reads time and message ids only through injected seams
//!   ([`clock::Clock`], [`clock::IdSource`])
//! - Holds no durable state; persistence, authentication and certificate
//!   issuance belong to external collaborators
//! - Uses integer arithmetic and ordered collections only

// =============================================================================
// MODULES
// =============================================================================

pub mod catalog;
pub mod clock;
pub mod log;
pub mod primitives;
pub mod progress;
pub mod registry;
pub mod sequencer;
pub mod summary;
pub mod types;
pub mod vocabulary;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{
    Author, MessageId, SessionId, StageId, TriageError, TriageMessage, TriageStage,
};

// =============================================================================
// RE-EXPORTS: Engine
// =============================================================================

pub use catalog::StageCatalog;
pub use clock::{Clock, FixedClock, IdSource, SequentialIds, SystemClock};
pub use log::MessageLog;
pub use progress::progress;
pub use registry::SessionRegistry;
pub use sequencer::{SequencerState, TriageSession, Turn};
pub use summary::{CompletionSummary, narrative};
pub use vocabulary::{ConsentReply, ConsentVocabulary};
