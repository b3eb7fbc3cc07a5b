//! # Progress Projector
//!
//! Derives a 0–100 completion percentage from the current position in the
//! catalog. Integer arithmetic only: `round(index / count × 100)` is computed
//! as `(index · 200 + count) / (2 · count)`, which rounds half up without
//! touching floats.

// =============================================================================
// PROGRESS
// =============================================================================

/// Percentage of the interview completed at `current_stage_index` out of
/// `stage_count` stages, rounded and clamped to `[0, 100]`.
///
/// A zero `stage_count` yields 0 rather than dividing by zero; catalogs are
/// validated non-empty, so that case only arises for callers probing the
/// function directly.
#[must_use]
pub fn progress(current_stage_index: usize, stage_count: usize) -> u8 {
    if stage_count == 0 {
        return 0;
    }

    let index = current_stage_index as u64;
    let count = stage_count as u64;
    let percent = index
        .saturating_mul(200)
        .saturating_add(count)
        / count.saturating_mul(2);

    percent.min(100) as u8
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints() {
        assert_eq!(progress(0, 4), 0);
        assert_eq!(progress(4, 4), 100);
    }

    #[test]
    fn thirds_round_to_nearest() {
        assert_eq!(progress(1, 3), 33);
        assert_eq!(progress(2, 3), 67);
    }

    #[test]
    fn clamps_past_the_end() {
        assert_eq!(progress(9, 4), 100);
    }

    #[test]
    fn zero_stage_count_is_zero() {
        assert_eq!(progress(3, 0), 0);
    }

    #[test]
    fn monotone_over_a_catalog_walk() {
        let count = 7;
        let mut last = 0;
        for i in 0..=count {
            let p = progress(i, count);
            assert!(p >= last, "progress regressed at index {i}");
            last = p;
        }
        assert_eq!(last, 100);
    }

    #[test]
    fn half_rounds_up() {
        // 1/8 = 12.5% rounds to 13.
        assert_eq!(progress(1, 8), 13);
    }
}
