use chrono::{DateTime, Days, NaiveDate, Utc};

/// Source of "now" for services. Task dates are calendar days in UTC.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Clock {
    #[default]
    System,
    Fixed(DateTime<Utc>),
}

impl Clock {
    /// The system clock.
    #[must_use]
    pub fn default_clock() -> Self {
        Self::System
    }

    #[must_use]
    pub fn fixed(at: DateTime<Utc>) -> Self {
        Self::Fixed(at)
    }

    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::System => Utc::now(),
            Clock::Fixed(at) => *at,
        }
    }

    #[must_use]
    pub fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }

    /// The date `days` after today, saturating at the last representable date.
    #[must_use]
    pub fn days_ahead(&self, days: u64) -> NaiveDate {
        let today = self.today();
        today.checked_add_days(Days::new(days)).unwrap_or(NaiveDate::MAX)
    }
}

/// Unix timestamp behind [`fixed_clock`]: 2023-11-14T22:13:20Z.
pub const FIXED_TEST_TIMESTAMP: i64 = 1_700_000_000;

/// A clock frozen at [`FIXED_TEST_TIMESTAMP`].
///
/// # Panics
///
/// Never in practice; the constant is a valid timestamp.
#[must_use]
pub fn fixed_clock() -> Clock {
    let at = DateTime::<Utc>::from_timestamp(FIXED_TEST_TIMESTAMP, 0)
        .expect("fixed timestamp should be valid");
    Clock::fixed(at)
}

/// `fixed_clock().today()`, i.e. 2023-11-14.
#[must_use]
pub fn fixed_today() -> NaiveDate {
    fixed_clock().today()
}
