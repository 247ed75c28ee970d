//! Position string codec.
//!
//! Positions are fixed-width decimal strings so that plain lexicographic
//! comparison (and the database's default string ordering) yields the intended
//! task order without any custom collation.
//!
//! Two encodings share a scope:
//! * incomplete tasks get a dense zero-padded index, `"00000000000000000000"`,
//!   `"00000000000000000001"`, ...
//! * completed tasks get `"0"` followed by 19 digits of
//!   `COMPLETED_BASE - completion epoch millis`, so the most recently
//!   completed task sorts first among completed tasks, and every completed
//!   position sorts after every realistic incomplete index.

/// Total width of a position string.
pub const POSITION_WIDTH: usize = 20;

/// Subtrahend base for the completed-task encoding (19 nines).
const COMPLETED_BASE: u64 = 9_999_999_999_999_999_999;

/// Encode a manual-order index as a position.
///
/// `u64` cannot exceed the 20-digit capacity, so this is total.
pub fn encode_sequential(index: u64) -> String {
    format!("{index:020}")
}

/// Encode a completion instant (epoch milliseconds) as a position.
///
/// Larger instants (more recent completions) produce lexicographically
/// smaller strings. Instants at or before the epoch saturate to the base
/// value rather than wrapping.
pub fn encode_completed(completed_ms: i64) -> String {
    let value = if completed_ms <= 0 {
        COMPLETED_BASE
    } else {
        COMPLETED_BASE.saturating_sub(completed_ms as u64)
    };
    format!("0{value:019}")
}

/// Recover the completion instant from a completed-task position.
///
/// Positions are write-once and compare-only, so nothing in the engine needs
/// this; it exists for diagnostics and log output. Returns `None` for strings
/// that are not a completed encoding.
pub fn decode_completed(position: &str) -> Option<i64> {
    let digits = position.strip_prefix('0')?;
    if digits.len() != POSITION_WIDTH - 1 {
        return None;
    }
    let value: u64 = digits.parse().ok()?;
    let ms = COMPLETED_BASE.checked_sub(value)?;
    i64::try_from(ms).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequential_is_dense_and_sorted() {
        assert_eq!(encode_sequential(0), "00000000000000000000");
        assert_eq!(encode_sequential(1), "00000000000000000001");
        assert!(encode_sequential(9) < encode_sequential(10));
        assert!(encode_sequential(99) < encode_sequential(100));
    }

    #[test]
    fn completed_known_vectors() {
        assert_eq!(encode_completed(0), "09999999999999999999");
        // 2024-10-29T15:54:12Z
        assert_eq!(encode_completed(1_730_217_252_000), "09999998269782747999");
        // 9999-12-31T23:59:59Z
        assert_eq!(encode_completed(253_402_300_799_000), "09999746597699200999");
    }

    #[test]
    fn more_recent_completion_sorts_first() {
        let older = encode_completed(1_000);
        let newer = encode_completed(2_000);
        assert!(newer < older);
    }

    #[test]
    fn completed_sorts_after_sequential() {
        assert!(encode_sequential(123_456) < encode_completed(1_730_217_252_000));
    }

    #[test]
    fn pre_epoch_instants_saturate() {
        assert_eq!(encode_completed(-5), encode_completed(0));
    }

    #[test]
    fn decode_round_trips() {
        let ms = 1_730_217_252_000;
        assert_eq!(decode_completed(&encode_completed(ms)), Some(ms));
        assert_eq!(decode_completed("not a position"), None);
    }
}
