//! Bonus-time arithmetic for quiz items.
//!
//! Everything here is derived from the opened/finished timestamps of an item and a
//! caller-supplied "now", so the same persisted state always yields the same score.

use chrono::{DateTime, Utc};

/// Points awarded for any correct answer before the speed bonus.
pub const BASE_POINTS: u32 = 10;

/// Seconds a learner has before the speed bonus is exhausted.
pub const DEFAULT_BONUS_TIME_LIMIT_SECS: f64 = 20.0;

/// Seconds of remaining bonus time that are worth one bonus point.
pub const BONUS_DIVIDER: u32 = 2;

//
// ─── TIMING ────────────────────────────────────────────────────────────────────
//

/// Seconds spent on a question.
///
/// Uses the frozen `finished - opened` span once the clock has stopped, the live
/// `now - opened` span while it is still running, and zero if the question was never
/// opened. Negative spans (clock went backwards) clamp to zero.
#[must_use]
pub fn time_taken(
    opened: Option<DateTime<Utc>>,
    finished: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> f64 {
    let Some(opened) = opened else {
        return 0.0;
    };
    let end = finished.unwrap_or(now);
    let millis = (end - opened).num_milliseconds();
    #[allow(clippy::cast_precision_loss)]
    let secs = millis as f64 / 1000.0;
    secs.max(0.0)
}

/// Bonus seconds left, never negative.
#[must_use]
pub fn bonus_time_remaining(bonus_time_limit: f64, time_taken: f64) -> f64 {
    (bonus_time_limit - time_taken).max(0.0)
}

/// Remaining bonus time as a fraction of the limit, in `[0, 1]`.
#[must_use]
pub fn bonus_remaining_percent(bonus_time_limit: f64, bonus_time_remaining: f64) -> f64 {
    if bonus_time_limit > 0.0 && bonus_time_remaining > 0.0 {
        bonus_time_remaining / bonus_time_limit
    } else {
        0.0
    }
}

//
// ─── SCORE ─────────────────────────────────────────────────────────────────────
//

/// Speed bonus for a correct answer: `ceil((limit - taken) / BONUS_DIVIDER)`.
///
/// Goes negative once `taken` exceeds the limit, so slow answers lose base points.
#[must_use]
pub fn bonus_score(bonus_time_limit: f64, time_taken: f64) -> i64 {
    let raw = ((bonus_time_limit - time_taken) / f64::from(BONUS_DIVIDER)).ceil();
    if raw.is_finite() {
        #[allow(clippy::cast_possible_truncation)]
        let bonus = raw as i64;
        bonus
    } else {
        0
    }
}

/// Total score for an item given its correctness and frozen time taken.
///
/// `BASE_POINTS + bonus_score` for a correct answer, floored at zero.
#[must_use]
pub fn score(is_correct: Option<bool>, bonus_time_limit: f64, time_taken: f64) -> u32 {
    if is_correct != Some(true) {
        return 0;
    }
    let total = i64::from(BASE_POINTS).saturating_add(bonus_score(bonus_time_limit, time_taken));
    u32::try_from(total.max(0)).unwrap_or(u32::MAX)
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
