use chrono::{DateTime, Duration, Utc};

/// Where quiz timing reads "now" from.
///
/// Opening, closing and answering a question stamp the item with `Clock::now`, and the
/// bonus countdown is recomputed from those stamps. `Fixed` pins the stamps so a whole
/// open/answer sequence can be stepped through second by second with `advance`.
#[derive(Debug, Clone, Copy, Default)]
pub enum Clock {
    #[default]
    Default,
    Fixed(DateTime<Utc>),
}

impl Clock {
    /// Wall-clock time; what the app binary runs with.
    #[must_use]
    pub fn default_clock() -> Self {
        Self::Default
    }

    /// Pinned at `at` until advanced.
    #[must_use]
    pub fn fixed(at: DateTime<Utc>) -> Self {
        Self::Fixed(at)
    }

    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::Default => Utc::now(),
            Clock::Fixed(t) => *t,
        }
    }

    /// Steps a pinned clock by `delta`, e.g. the seconds a learner spends on a question.
    /// Wall-clock time cannot be stepped and is left alone.
    pub fn advance(&mut self, delta: Duration) {
        if let Clock::Fixed(t) = self {
            *t += delta;
        }
    }
}

/// Epoch seconds of the instant quiz tests treat as `t = 0` (2023-11-14T22:13:20Z).
pub const FIXED_TEST_TIMESTAMP: i64 = 1_700_000_000;

/// `FIXED_TEST_TIMESTAMP` as a `DateTime<Utc>`.
///
/// # Panics
///
/// Panics if the fixed timestamp cannot be represented.
#[must_use]
pub fn fixed_now() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(FIXED_TEST_TIMESTAMP, 0)
        .expect("fixed timestamp should be valid")
}
