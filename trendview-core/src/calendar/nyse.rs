//! NYSE trading calendar: weekends, full-day holidays, early closes.
//!
//! Holiday observance follows exchange practice: Saturday holidays shift to
//! the preceding Friday, Sunday holidays to the following Monday, except
//! New Year's Day, which is not observed at all when January 1 falls on a
//! Saturday (the market traded on 2021-12-31).

use super::{Session, TradingCalendar};
use chrono::{Datelike, NaiveDate, NaiveTime, Weekday};
use chrono_tz::Tz;

const REGULAR_OPEN: (u32, u32) = (9, 30);
const REGULAR_CLOSE: (u32, u32) = (16, 0);
const EARLY_CLOSE: (u32, u32) = (13, 0);

/// The New York Stock Exchange regular-session calendar.
#[derive(Debug, Clone, Copy, Default)]
pub struct NyseCalendar;

impl NyseCalendar {
    pub fn new() -> Self {
        Self
    }

    fn is_holiday(&self, date: NaiveDate) -> bool {
        let year = date.year();
        holidays_for_year(year).contains(&date)
    }

    /// Early closes at 13:00: July 3, the day after Thanksgiving, and
    /// Christmas Eve — when they are trading days at all.
    fn is_early_close(&self, date: NaiveDate) -> bool {
        let year = date.year();
        if date == NaiveDate::from_ymd_opt(year, 7, 3).expect("valid date") {
            return true;
        }
        if date == thanksgiving(year).succ_opt().expect("valid date") {
            return true;
        }
        if date == NaiveDate::from_ymd_opt(year, 12, 24).expect("valid date") {
            return true;
        }
        false
    }
}

impl TradingCalendar for NyseCalendar {
    fn timezone(&self) -> Tz {
        chrono_tz::America::New_York
    }

    fn session(&self, date: NaiveDate) -> Option<Session> {
        if matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
            return None;
        }
        if self.is_holiday(date) {
            return None;
        }
        let (close_h, close_m) = if self.is_early_close(date) {
            EARLY_CLOSE
        } else {
            REGULAR_CLOSE
        };
        Some(Session {
            open: NaiveTime::from_hms_opt(REGULAR_OPEN.0, REGULAR_OPEN.1, 0).expect("valid time"),
            close: NaiveTime::from_hms_opt(close_h, close_m, 0).expect("valid time"),
        })
    }
}

/// All observed full-day holidays for one year.
fn holidays_for_year(year: i32) -> Vec<NaiveDate> {
    let mut days = Vec::with_capacity(10);

    // New Year's Day: Sunday shifts to Monday, Saturday is not observed.
    let new_years = ymd(year, 1, 1);
    match new_years.weekday() {
        Weekday::Sat => {}
        Weekday::Sun => days.push(ymd(year, 1, 2)),
        _ => days.push(new_years),
    }

    // Martin Luther King Jr. Day: third Monday of January.
    days.push(nth_weekday(year, 1, Weekday::Mon, 3));

    // Washington's Birthday: third Monday of February.
    days.push(nth_weekday(year, 2, Weekday::Mon, 3));

    // Good Friday: two days before Easter Sunday.
    days.push(easter_sunday(year) - chrono::Duration::days(2));

    // Memorial Day: last Monday of May.
    days.push(last_weekday(year, 5, Weekday::Mon));

    // Juneteenth: observed by the exchange since 2022.
    if year >= 2022 {
        days.push(observed(ymd(year, 6, 19)));
    }

    // Independence Day.
    days.push(observed(ymd(year, 7, 4)));

    // Labor Day: first Monday of September.
    days.push(nth_weekday(year, 9, Weekday::Mon, 1));

    // Thanksgiving: fourth Thursday of November.
    days.push(thanksgiving(year));

    // Christmas.
    days.push(observed(ymd(year, 12, 25)));

    days
}

fn thanksgiving(year: i32) -> NaiveDate {
    nth_weekday(year, 11, Weekday::Thu, 4)
}

/// Saturday shifts to the preceding Friday, Sunday to the following Monday.
fn observed(date: NaiveDate) -> NaiveDate {
    match date.weekday() {
        Weekday::Sat => date - chrono::Duration::days(1),
        Weekday::Sun => date + chrono::Duration::days(1),
        _ => date,
    }
}

fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

/// The `n`-th (1-based) given weekday of a month.
fn nth_weekday(year: i32, month: u32, weekday: Weekday, n: u32) -> NaiveDate {
    let first = ymd(year, month, 1);
    let offset = (7 + weekday.num_days_from_monday() as i64
        - first.weekday().num_days_from_monday() as i64)
        % 7;
    first + chrono::Duration::days(offset + 7 * (n as i64 - 1))
}

/// The last given weekday of a month.
fn last_weekday(year: i32, month: u32, weekday: Weekday) -> NaiveDate {
    let first_of_next = if month == 12 {
        ymd(year + 1, 1, 1)
    } else {
        ymd(year, month + 1, 1)
    };
    let last = first_of_next - chrono::Duration::days(1);
    let offset = (7 + last.weekday().num_days_from_monday() as i64
        - weekday.num_days_from_monday() as i64)
        % 7;
    last - chrono::Duration::days(offset)
}

/// Gregorian Easter Sunday (Meeus/Jones/Butcher).
fn easter_sunday(year: i32) -> NaiveDate {
    let a = year % 19;
    let b = year / 100;
    let c = year % 100;
    let d = b / 4;
    let e = b % 4;
    let f = (b + 8) / 25;
    let g = (b - f + 1) / 3;
    let h = (19 * a + b - d - g + 15) % 30;
    let i = c / 4;
    let k = c % 4;
    let l = (32 + 2 * e + 2 * i - h - k) % 7;
    let m = (a + 11 * h + 22 * l) / 451;
    let month = (h + l - 7 * m + 114) / 31;
    let day = (h + l - 7 * m + 114) % 31 + 1;
    ymd(year, month as u32, day as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn easter_known_years() {
        assert_eq!(easter_sunday(2024), date("2024-03-31"));
        assert_eq!(easter_sunday(2025), date("2025-04-20"));
        assert_eq!(easter_sunday(2021), date("2021-04-04"));
    }

    #[test]
    fn good_friday_is_closed() {
        let cal = NyseCalendar::new();
        assert!(!cal.is_trading_day(date("2024-03-29")));
        assert!(cal.is_trading_day(date("2024-03-28")));
    }

    #[test]
    fn weekends_are_closed() {
        let cal = NyseCalendar::new();
        assert!(!cal.is_trading_day(date("2024-01-06")));
        assert!(!cal.is_trading_day(date("2024-01-07")));
        assert!(cal.is_trading_day(date("2024-01-08")));
    }

    #[test]
    fn fixed_holidays_2024() {
        let cal = NyseCalendar::new();
        assert!(!cal.is_trading_day(date("2024-01-01")));
        assert!(!cal.is_trading_day(date("2024-01-15"))); // MLK
        assert!(!cal.is_trading_day(date("2024-02-19"))); // Washington's Birthday
        assert!(!cal.is_trading_day(date("2024-05-27"))); // Memorial Day
        assert!(!cal.is_trading_day(date("2024-06-19"))); // Juneteenth
        assert!(!cal.is_trading_day(date("2024-07-04")));
        assert!(!cal.is_trading_day(date("2024-09-02"))); // Labor Day
        assert!(!cal.is_trading_day(date("2024-11-28"))); // Thanksgiving
        assert!(!cal.is_trading_day(date("2024-12-25")));
    }

    #[test]
    fn juneteenth_observed_monday_2022() {
        // June 19, 2022 fell on a Sunday; the exchange closed Monday the 20th.
        let cal = NyseCalendar::new();
        assert!(!cal.is_trading_day(date("2022-06-20")));
        assert!(cal.is_trading_day(date("2022-06-21")));
    }

    #[test]
    fn juneteenth_not_observed_before_2022() {
        let cal = NyseCalendar::new();
        // June 18, 2021 was a regular Friday session.
        assert!(cal.is_trading_day(date("2021-06-18")));
    }

    #[test]
    fn saturday_new_years_not_observed() {
        // January 1, 2022 was a Saturday; the market traded on 2021-12-31.
        let cal = NyseCalendar::new();
        assert!(cal.is_trading_day(date("2021-12-31")));
    }

    #[test]
    fn christmas_saturday_observed_friday() {
        // December 25, 2021 was a Saturday, observed Friday the 24th.
        let cal = NyseCalendar::new();
        assert!(!cal.is_trading_day(date("2021-12-24")));
    }

    #[test]
    fn early_close_after_thanksgiving() {
        let cal = NyseCalendar::new();
        let session = cal.session(date("2024-11-29")).unwrap();
        assert_eq!(session.close, NaiveTime::from_hms_opt(13, 0, 0).unwrap());
        assert_eq!(session.open, NaiveTime::from_hms_opt(9, 30, 0).unwrap());
    }

    #[test]
    fn early_close_july_third() {
        let cal = NyseCalendar::new();
        let session = cal.session(date("2024-07-03")).unwrap();
        assert_eq!(session.close, NaiveTime::from_hms_opt(13, 0, 0).unwrap());
    }

    #[test]
    fn early_close_christmas_eve() {
        let cal = NyseCalendar::new();
        let session = cal.session(date("2024-12-24")).unwrap();
        assert_eq!(session.close, NaiveTime::from_hms_opt(13, 0, 0).unwrap());
    }

    #[test]
    fn regular_day_full_session() {
        let cal = NyseCalendar::new();
        let session = cal.session(date("2024-01-16")).unwrap();
        assert_eq!(session.open, NaiveTime::from_hms_opt(9, 30, 0).unwrap());
        assert_eq!(session.close, NaiveTime::from_hms_opt(16, 0, 0).unwrap());
    }

    #[test]
    fn next_trading_day_skips_weekend_and_holiday() {
        let cal = NyseCalendar::new();
        // Friday 2024-03-29 is Good Friday; from Thursday the next session
        // is Monday 2024-04-01.
        assert_eq!(
            cal.next_trading_day(date("2024-03-28"), date("2024-04-05")),
            Some(date("2024-04-01"))
        );
        // No session inside the window at all.
        assert_eq!(
            cal.next_trading_day(date("2024-03-28"), date("2024-03-31")),
            None
        );
    }

    #[test]
    fn trading_days_range() {
        let cal = NyseCalendar::new();
        let days = cal.trading_days(date("2024-11-25"), date("2024-11-29"));
        // Thanksgiving Thursday is missing from the week.
        assert_eq!(
            days,
            vec![
                date("2024-11-25"),
                date("2024-11-26"),
                date("2024-11-27"),
                date("2024-11-29"),
            ]
        );
    }
}
