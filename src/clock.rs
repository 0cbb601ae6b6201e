//! Date source used by the store.

use chrono::{Local, NaiveDate, NaiveDateTime};

pub trait Clock {
    fn today(&self) -> NaiveDate;
    fn now(&self) -> NaiveDateTime;
}

/// Local wall clock at calendar-date granularity.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }

    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

#[cfg(test)]
pub use fixed::FixedClock;

#[cfg(test)]
mod fixed {
    use std::cell::Cell;

    use chrono::{NaiveDate, NaiveDateTime};

    use super::Clock;

    /// Clock pinned to a moment; tests move it with `set`.
    #[derive(Debug)]
    pub struct FixedClock {
        now: Cell<NaiveDateTime>,
    }

    impl FixedClock {
        pub fn at(date: NaiveDate) -> Self {
            FixedClock {
                now: Cell::new(date.and_hms_opt(9, 0, 0).unwrap()),
            }
        }

        pub fn set(&self, now: NaiveDateTime) {
            self.now.set(now);
        }
    }

    impl Clock for FixedClock {
        fn today(&self) -> NaiveDate {
            self.now.get().date()
        }

        fn now(&self) -> NaiveDateTime {
            self.now.get()
        }
    }
}
