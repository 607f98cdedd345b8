//! MarketClock — gates live fetching on the exchange session.

use super::TradingCalendar;
use chrono::{DateTime, NaiveDate, Utc};
use std::sync::Arc;

/// Answers "is the exchange in session right now" against a trading
/// calendar. Returns false rather than erroring when the calendar has no
/// session for the date.
#[derive(Clone)]
pub struct MarketClock {
    calendar: Arc<dyn TradingCalendar>,
}

impl MarketClock {
    pub fn new(calendar: Arc<dyn TradingCalendar>) -> Self {
        Self { calendar }
    }

    pub fn calendar(&self) -> &dyn TradingCalendar {
        self.calendar.as_ref()
    }

    /// The exchange-local calendar date for an instant.
    pub fn local_date(&self, now: DateTime<Utc>) -> NaiveDate {
        now.with_timezone(&self.calendar.timezone()).date_naive()
    }

    /// Whether `now` falls inside the regular session, early closes and
    /// holidays included.
    pub fn is_open(&self, now: DateTime<Utc>) -> bool {
        let local = now.with_timezone(&self.calendar.timezone());
        match self.calendar.session(local.date_naive()) {
            Some(session) => {
                let time = local.time();
                session.open <= time && time <= session.close
            }
            None => false,
        }
    }
}

impl std::fmt::Debug for MarketClock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarketClock")
            .field("timezone", &self.calendar.timezone())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::NyseCalendar;
    use chrono::TimeZone;

    fn clock() -> MarketClock {
        MarketClock::new(Arc::new(NyseCalendar::new()))
    }

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    #[test]
    fn open_mid_session() {
        // 15:00 UTC on a January Tuesday is 10:00 EST.
        assert!(clock().is_open(utc(2024, 1, 16, 15, 0)));
    }

    #[test]
    fn closed_after_hours() {
        // 22:00 UTC is 17:00 EST.
        assert!(!clock().is_open(utc(2024, 1, 16, 22, 0)));
    }

    #[test]
    fn closed_before_open() {
        // 14:00 UTC is 09:00 EST, half an hour before the bell.
        assert!(!clock().is_open(utc(2024, 1, 16, 14, 0)));
    }

    #[test]
    fn closed_on_holiday() {
        assert!(!clock().is_open(utc(2024, 7, 4, 15, 0)));
    }

    #[test]
    fn early_close_respected() {
        // Friday after Thanksgiving 2024: 17:00 UTC = 12:00 EST (open),
        // 18:30 UTC = 13:30 EST (past the 13:00 close).
        assert!(clock().is_open(utc(2024, 11, 29, 17, 0)));
        assert!(!clock().is_open(utc(2024, 11, 29, 18, 30)));
    }

    #[test]
    fn local_date_crosses_midnight() {
        // 02:00 UTC on July 5 is still July 4 in New York (EDT, UTC-4).
        assert_eq!(
            clock().local_date(utc(2024, 7, 5, 2, 0)),
            "2024-07-04".parse().unwrap()
        );
    }
}
