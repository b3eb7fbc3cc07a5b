//! # Injected Clock & Id Source
//!
//! The engine never reads ambient time or generates ids on its own: both are
//! supplied through these seams so every transition is reproducible in tests.
//!
//! Production code uses [`SystemClock`] and [`SequentialIds`]; deterministic
//! tests use [`FixedClock`] with a fixed epoch and step.

use crate::types::MessageId;
use chrono::{DateTime, Duration, Utc};
use std::sync::atomic::{AtomicU64, Ordering};

// =============================================================================
// CLOCK
// =============================================================================

/// Source of message timestamps.
///
/// Implementations must be `Send + Sync`; a session may live behind a shared
/// lock in a multi-threaded host.
pub trait Clock: Send + Sync {
    /// Current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time. The production clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Deterministic clock for tests: starts at a fixed epoch and advances by a
/// fixed number of milliseconds on every call.
///
/// Successive calls are strictly increasing (for a non-zero step), so the
/// log invariant "ordering by timestamp matches insertion order" is
/// observable in tests.
#[derive(Debug)]
pub struct FixedClock {
    epoch: DateTime<Utc>,
    step_ms: u64,
    ticks: AtomicU64,
}

impl FixedClock {
    /// Create a clock starting at `epoch` and stepping `step_ms` per call.
    #[must_use]
    pub fn new(epoch: DateTime<Utc>, step_ms: u64) -> Self {
        Self {
            epoch,
            step_ms,
            ticks: AtomicU64::new(0),
        }
    }

    /// Clock pinned at the Unix epoch with a one-second step.
    #[must_use]
    pub fn unix_epoch() -> Self {
        Self::new(DateTime::UNIX_EPOCH, 1_000)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        let tick = self.ticks.fetch_add(1, Ordering::SeqCst);
        let offset_ms = tick.saturating_mul(self.step_ms);
        self.epoch
            .checked_add_signed(Duration::milliseconds(offset_ms as i64))
            .unwrap_or(self.epoch)
    }
}

// =============================================================================
// ID SOURCE
// =============================================================================

/// Source of fresh message ids.
pub trait IdSource: Send + Sync {
    /// Allocate the next id. Must be strictly increasing.
    fn next_id(&mut self) -> MessageId;
}

/// Monotonic counter starting at 1. The production id source.
#[derive(Debug)]
pub struct SequentialIds {
    next: u64,
}

impl SequentialIds {
    /// Create a counter starting at 1.
    #[must_use]
    pub fn new() -> Self {
        Self { next: 1 }
    }
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self::new()
    }
}

impl IdSource for SequentialIds {
    fn next_id(&mut self) -> MessageId {
        let id = MessageId(self.next);
        self.next = self.next.saturating_add(1);
        id
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequential_ids_start_at_one_and_increase() {
        let mut ids = SequentialIds::new();
        assert_eq!(ids.next_id(), MessageId(1));
        assert_eq!(ids.next_id(), MessageId(2));
        assert_eq!(ids.next_id(), MessageId(3));
    }

    #[test]
    fn fixed_clock_steps_monotonically() {
        let clock = FixedClock::unix_epoch();
        let a = clock.now();
        let b = clock.now();
        let c = clock.now();
        assert!(a < b && b < c);
        assert_eq!((b - a).num_milliseconds(), 1_000);
    }

    #[test]
    fn fixed_clock_zero_step_is_constant() {
        let clock = FixedClock::new(Utc::now(), 0);
        assert_eq!(clock.now(), clock.now());
    }
}
