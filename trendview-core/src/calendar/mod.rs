//! Trading calendars and the market clock.
//!
//! Indices observe exchange holidays and occasional early closes that a
//! naive weekday/hour check misses, so session gating goes through a
//! [`TradingCalendar`] rather than a heuristic.

pub mod clock;
pub mod nyse;

pub use clock::MarketClock;
pub use nyse::NyseCalendar;

use chrono::{Duration, NaiveDate, NaiveTime};
use chrono_tz::Tz;

/// A single day's regular trading session, in exchange-local wall time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    pub open: NaiveTime,
    pub close: NaiveTime,
}

/// Authoritative schedule of open-market sessions for one exchange.
pub trait TradingCalendar: Send + Sync {
    /// IANA time zone the exchange keeps its schedule in.
    fn timezone(&self) -> Tz;

    /// The session for a calendar day, or `None` when the exchange is
    /// closed all day (weekend or holiday).
    fn session(&self, date: NaiveDate) -> Option<Session>;

    fn is_trading_day(&self, date: NaiveDate) -> bool {
        self.session(date).is_some()
    }

    /// First trading day strictly after `after`, up to and including
    /// `through`. Used to place the fallback placeholder row.
    fn next_trading_day(&self, after: NaiveDate, through: NaiveDate) -> Option<NaiveDate> {
        let mut day = after + Duration::days(1);
        while day <= through {
            if self.is_trading_day(day) {
                return Some(day);
            }
            day += Duration::days(1);
        }
        None
    }

    /// All trading days in `[start, end]`, ascending.
    fn trading_days(&self, start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
        let mut days = Vec::new();
        let mut day = start;
        while day <= end {
            if self.is_trading_day(day) {
                days.push(day);
            }
            day += Duration::days(1);
        }
        days
    }
}
