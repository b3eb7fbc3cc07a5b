//! # Engine Bounds
//!
//! Central constants for the triage engine. Both the core acceptance rules
//! and the API-boundary validation read from here so limits are documented
//! in exactly one place.

/// Minimum number of characters (not bytes) for an answer to be judged
/// sufficient while the current stage still has unused follow-ups.
///
/// Deliberately tiny: the interview is scripted, not semantic. An answer
/// shorter than this triggers the next follow-up question instead of
/// advancing the stage.
pub const MIN_ANSWER_CHARS: usize = 2;

/// Bounded number of re-prompts while awaiting consent.
///
/// A reply that is neither affirmative nor negative re-asks the consent
/// question; once more than this many invalid replies accumulate, the
/// session is cancelled.
pub const CONSENT_RETRY_LIMIT: usize = 3;

/// Maximum answer payload accepted at the API boundary (8 KiB).
///
/// Free-text interview answers are short; anything larger is rejected
/// before it reaches the engine.
pub const MAX_ANSWER_LENGTH: usize = 8 * 1024;

/// Maximum session id length accepted at the API boundary.
pub const MAX_SESSION_ID_LENGTH: usize = 128;

/// Terminal sentinel stage id for messages produced after the catalog's
/// final stage (the closing of a completed interview).
pub const CLOSING_STAGE_ID: &str = "encerramento";

/// Presentation-layer typing delay: milliseconds simulated per character of
/// the patient's message before Nôa's reply is revealed.
///
/// The engine computes replies immediately; the delay only defers when a
/// presenter reveals them and never alters session state.
pub const TYPING_DELAY_MS_PER_CHAR: u64 = 22;

/// Lower clamp for the simulated typing delay, in milliseconds.
pub const TYPING_DELAY_MIN_MS: u64 = 500;

/// Upper clamp for the simulated typing delay, in milliseconds.
pub const TYPING_DELAY_MAX_MS: u64 = 1400;

/// Compute the presentation-layer typing delay for a patient message.
///
/// `chars` is the character count of the trimmed message.
#[must_use]
pub const fn typing_delay_ms(chars: usize) -> u64 {
    let raw = (chars as u64).saturating_mul(TYPING_DELAY_MS_PER_CHAR);
    if raw < TYPING_DELAY_MIN_MS {
        TYPING_DELAY_MIN_MS
    } else if raw > TYPING_DELAY_MAX_MS {
        TYPING_DELAY_MAX_MS
    } else {
        raw
    }
}

// =============================================================================
// TESTS
// =============================================================================
