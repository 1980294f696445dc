use chrono::{DateTime, Duration, Utc};

/// Where quiz timers read the current instant from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Clock {
    #[default]
    System,
    /// Stands still until moved with [`Clock::advance`].
    Fixed(DateTime<Utc>),
}

impl Clock {
    #[must_use]
    pub fn system() -> Self {
        Self::System
    }

    #[must_use]
    pub fn fixed(at: DateTime<Utc>) -> Self {
        Self::Fixed(at)
    }

    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        match *self {
            Clock::System => Utc::now(),
            Clock::Fixed(at) => at,
        }
    }

    /// Starts a countdown of `limit` from this clock's current instant.
    #[must_use]
    pub fn start_timer(&self, limit: Duration) -> QuizTimer {
        QuizTimer::new(self.now(), limit)
    }

    /// Time left on `timer` as of this clock's current instant.
    #[must_use]
    pub fn time_left(&self, timer: &QuizTimer) -> Duration {
        timer.remaining(self.now())
    }

    /// Moves a fixed clock forward; the system clock keeps real time.
    pub fn advance(&mut self, delta: Duration) {
        match self {
            Clock::Fixed(at) => *at = *at + delta,
            Clock::System => {}
        }
    }
}

/// Countdown for one quiz attempt.
///
/// Elapsed time is never negative, so a timer read before its start shows the
/// full limit remaining.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizTimer {
    started_at: DateTime<Utc>,
    limit: Duration,
}

impl QuizTimer {
    #[must_use]
    pub fn new(started_at: DateTime<Utc>, limit: Duration) -> Self {
        Self {
            started_at,
            limit: limit.max(Duration::zero()),
        }
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn limit(&self) -> Duration {
        self.limit
    }

    #[must_use]
    pub fn deadline(&self) -> DateTime<Utc> {
        self.started_at + self.limit
    }

    #[must_use]
    pub fn elapsed(&self, now: DateTime<Utc>) -> Duration {
        (now - self.started_at).max(Duration::zero())
    }

    #[must_use]
    pub fn remaining(&self, now: DateTime<Utc>) -> Duration {
        (self.limit - self.elapsed(now)).max(Duration::zero())
    }

    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.deadline()
    }
}

/// Start of every timed test run: 2026-01-01T00:00:00Z.
pub const TEST_START_SECS: i64 = 1_767_225_600;

#[must_use]
pub fn test_start() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(TEST_START_SECS, 0).unwrap_or_default()
}

/// A fixed clock at [`test_start`].
#[must_use]
pub fn test_clock() -> Clock {
    Clock::fixed(test_start())
}
