//! Business wall-clock normalization
//!
//! Every instant that enters the availability engine passes through
//! [`BusinessClock`]. Dates and minute-of-day values are only ever compared
//! after conversion into the single business timezone.

use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveDateTime, TimeZone, Timelike, Utc};
use chrono_tz::Tz;
use salonbook_domain::constants::DEFAULT_BUSINESS_TIMEZONE;
use salonbook_domain::{Result, SalonError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusinessClock {
    tz: Tz,
}

impl BusinessClock {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }

    /// Build from an IANA timezone name such as `America/Chicago`.
    pub fn from_name(name: &str) -> Result<Self> {
        name.trim()
            .parse::<Tz>()
            .map(Self::new)
            .map_err(|_| SalonError::Config(format!("unknown business timezone '{name}'")))
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }

    pub fn wall_clock(&self, instant: DateTime<Utc>) -> NaiveDateTime {
        instant.with_timezone(&self.tz).naive_local()
    }

    pub fn local_date(&self, instant: DateTime<Utc>) -> NaiveDate {
        self.wall_clock(instant).date()
    }

    pub fn minute_of_day(&self, instant: DateTime<Utc>) -> i64 {
        let local = self.wall_clock(instant);
        i64::from(local.hour()) * 60 + i64::from(local.minute())
    }

    /// Instant for `minute` minutes past local midnight on `date`.
    ///
    /// Ambiguous wall-clock times (DST fall-back) resolve to the earlier
    /// instant; non-existent ones (spring-forward gap) shift forward by an hour.
    pub fn to_instant(&self, date: NaiveDate, minute: i64) -> DateTime<Utc> {
        let naive = date.and_time(chrono::NaiveTime::MIN) + Duration::minutes(minute);
        let local = match self.tz.from_local_datetime(&naive) {
            LocalResult::Single(t) => Some(t),
            LocalResult::Ambiguous(earliest, _) => Some(earliest),
            LocalResult::None => self.tz.from_local_datetime(&(naive + Duration::hours(1))).earliest(),
        };
        local.map_or_else(|| Utc.from_utc_datetime(&naive), |t| t.with_timezone(&Utc))
    }
}

impl Default for BusinessClock {
    fn default() -> Self {
        Self::new(DEFAULT_BUSINESS_TIMEZONE.parse().unwrap_or(chrono_tz::America::Chicago))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn normalizes_utc_instants_to_central_wall_clock() {
        let clock = BusinessClock::default();
        // 03:30 UTC on the 4th is 21:30 CST on the 3rd.
        let instant = Utc.with_ymd_and_hms(2025, 3, 4, 3, 30, 0).unwrap();

        assert_eq!(clock.local_date(instant), date(2025, 3, 3));
        assert_eq!(clock.minute_of_day(instant), 21 * 60 + 30);
    }

    #[test]
    fn to_instant_round_trips_through_wall_clock() {
        let clock = BusinessClock::default();
        let instant = clock.to_instant(date(2025, 7, 14), 9 * 60 + 30);

        assert_eq!(instant, Utc.with_ymd_and_hms(2025, 7, 14, 14, 30, 0).unwrap());
        assert_eq!(clock.minute_of_day(instant), 570);
    }

    #[test]
    fn spring_forward_gap_shifts_later() {
        let clock = BusinessClock::default();
        // 02:30 does not exist in Chicago on 2025-03-09.
        let instant = clock.to_instant(date(2025, 3, 9), 150);
        assert_eq!(clock.minute_of_day(instant), 210);
    }

    #[test]
    fn rejects_unknown_timezone_names() {
        assert!(BusinessClock::from_name("Mars/Olympus").is_err());
        assert_eq!(
            BusinessClock::from_name("Europe/London").unwrap().timezone(),
            chrono_tz::Europe::London
        );
    }
}
