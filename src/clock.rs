use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

/// Source of the current instant.
///
/// Two things in this crate depend on wall-clock time: the incremental
/// refresh windows (first of the current month for incomes, one month back
/// for expenses) and bearer-token expiry. Both go through this trait so
/// tests can pin the calendar.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// The current calendar date in UTC. Refresh cutoffs are computed from
    /// this, never from `now()` directly.
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// The real wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock frozen at a single instant, for tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(DateTime<Utc>);

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(now)
    }

    /// Freeze the clock at midnight UTC on the given date. Cutoff tests
    /// only ever look at `today()`, so the time of day does not matter.
    pub fn on_date(date: NaiveDate) -> Self {
        Self(date.and_time(NaiveTime::MIN).and_utc())
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
