//! Reference-timezone clock.
//!
//! All day boundaries are computed in one fixed IANA timezone (US Central by
//! default), independent of where the bot process runs. A "day" may last 23,
//! 24 or 25 wall-clock hours around daylight-saving transitions, but always
//! advances the civil date by exactly one.
//!
//! The current instant comes from a [`Clock`], so tests can swap in a
//! [`ManualClock`].

use std::sync::{Arc, Mutex};

use chrono::{DateTime, NaiveDate, NaiveTime, TimeDelta, TimeZone, Utc};
use chrono_tz::Tz;

use crate::error::ClockError;

pub const DEFAULT_TIMEZONE: &str = "America/Chicago";

/// Local midnight can fall inside a DST gap in a few zones; probe forward in
/// these steps until a valid local time is found.
const GAP_PROBE_MINUTES: i64 = 15;
const GAP_PROBE_STEPS: i64 = 12;

/// Source of the current instant.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A settable clock. Clones share the same instant.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(Mutex::new(now)),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(|e| e.into_inner()) = now;
    }

    pub fn advance(&self, by: TimeDelta) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Parse an IANA timezone name such as `America/Chicago`.
pub fn parse_timezone(name: &str) -> Result<Tz, ClockError> {
    name.parse::<Tz>()
        .map_err(|_| ClockError::UnknownTimezone(name.to_string()))
}

/// A clock anchored to a reference timezone.
#[derive(Clone)]
pub struct ClockSource {
    clock: Arc<dyn Clock>,
    zone: Tz,
}

impl std::fmt::Debug for ClockSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClockSource")
            .field("zone", &self.zone)
            .field("now", &self.clock.now())
            .finish()
    }
}

impl ClockSource {
    pub fn new(clock: Arc<dyn Clock>, zone: Tz) -> Self {
        Self { clock, zone }
    }

    /// Real wall clock in the given zone.
    pub fn system(zone: Tz) -> Self {
        Self::new(Arc::new(SystemClock), zone)
    }

    pub fn zone(&self) -> Tz {
        self.zone
    }

    /// Current instant in the reference zone.
    pub fn now(&self) -> DateTime<Tz> {
        self.clock.now().with_timezone(&self.zone)
    }

    pub fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }

    /// Calendar date of `instant` in the reference zone.
    pub fn civil_date<Z: TimeZone>(&self, instant: &DateTime<Z>) -> NaiveDate {
        instant.with_timezone(&self.zone).date_naive()
    }

    /// First instant of `date` in the reference zone.
    ///
    /// Ambiguous midnights resolve to the earlier mapping. If midnight does
    /// not exist (DST gap), the first valid local time after it is used.
    pub fn start_of_day(&self, date: NaiveDate) -> Result<DateTime<Tz>, ClockError> {
        let midnight = date.and_time(NaiveTime::MIN);
        for step in 0..=GAP_PROBE_STEPS {
            let local = midnight + TimeDelta::minutes(GAP_PROBE_MINUTES * step);
            if let Some(instant) = self.zone.from_local_datetime(&local).earliest() {
                return Ok(instant);
            }
        }
        Err(ClockError::NoMidnight { date })
    }

    /// The next local-midnight boundary strictly after `instant`.
    pub fn next_midnight<Z: TimeZone>(
        &self,
        instant: &DateTime<Z>,
    ) -> Result<DateTime<Tz>, ClockError> {
        let date = self.civil_date(instant);
        let next = date.succ_opt().ok_or(ClockError::NoMidnight { date })?;
        self.start_of_day(next)
    }

    /// Time left from `instant` until the next local midnight.
    pub fn until_next_midnight<Z: TimeZone>(
        &self,
        instant: &DateTime<Z>,
    ) -> Result<TimeDelta, ClockError> {
        let target = self.next_midnight(instant)?;
        Ok(target.signed_duration_since(instant.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn central() -> Tz {
        parse_timezone(DEFAULT_TIMEZONE).unwrap()
    }

    fn source_at(zone: Tz, utc: &str) -> (ClockSource, ManualClock) {
        let clock = ManualClock::new(utc.parse().unwrap());
        (ClockSource::new(Arc::new(clock.clone()), zone), clock)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn unknown_timezone_is_rejected() {
        assert_eq!(
            parse_timezone("Mars/Olympus_Mons"),
            Err(ClockError::UnknownTimezone("Mars/Olympus_Mons".into()))
        );
    }

    #[test]
    fn civil_date_uses_reference_zone() {
        // 03:00 UTC on the 5th is still the evening of the 4th in Chicago.
        let (source, _) = source_at(central(), "2024-06-05T03:00:00Z");
        assert_eq!(source.today(), date(2024, 6, 4));
    }

    #[test]
    fn next_midnight_on_a_regular_day() {
        let (source, _) = source_at(central(), "2024-06-04T17:00:00Z");
        let now = source.now();
        let next = source.next_midnight(&now).unwrap();
        assert_eq!(next.date_naive(), date(2024, 6, 5));
        assert_eq!(
            next.with_timezone(&Utc),
            "2024-06-05T05:00:00Z".parse::<DateTime<Utc>>().unwrap()
        );
        assert_eq!(source.until_next_midnight(&now).unwrap(), TimeDelta::hours(12));
    }

    #[test]
    fn next_midnight_is_strictly_after_a_midnight_instant() {
        let (source, _) = source_at(central(), "2024-06-05T05:00:00Z");
        let now = source.now();
        let next = source.next_midnight(&now).unwrap();
        assert_eq!(next.date_naive(), date(2024, 6, 6));
        assert_eq!(next - now, TimeDelta::hours(24));
    }

    #[test]
    fn spring_forward_day_is_23_hours() {
        // 2024-03-10: Chicago jumps 02:00 CST -> 03:00 CDT.
        let (source, _) = source_at(central(), "2024-03-10T06:00:00Z");
        let start = source.now();
        assert_eq!(start.date_naive(), date(2024, 3, 10));
        let next = source.next_midnight(&start).unwrap();
        assert_eq!(next.date_naive(), date(2024, 3, 11));
        assert_eq!(next - start, TimeDelta::hours(23));
    }

    #[test]
    fn fall_back_day_is_25_hours() {
        // 2024-11-03: Chicago repeats 01:00-02:00.
        let (source, _) = source_at(central(), "2024-11-03T05:00:00Z");
        let start = source.now();
        assert_eq!(start.date_naive(), date(2024, 11, 3));
        let next = source.next_midnight(&start).unwrap();
        assert_eq!(next.date_naive(), date(2024, 11, 4));
        assert_eq!(next - start, TimeDelta::hours(25));
    }

    #[test]
    fn consecutive_midnights_advance_one_date_each() {
        let (source, _) = source_at(central(), "2024-03-01T12:00:00Z");
        let mut cursor = source.now();
        let mut expected = cursor.date_naive();
        for _ in 0..400 {
            cursor = source.next_midnight(&cursor).unwrap();
            expected = expected.succ_opt().unwrap();
            assert_eq!(cursor.date_naive(), expected);
        }
    }

    #[test]
    fn midnight_inside_dst_gap_uses_first_valid_time() {
        // Chile springs forward at local midnight: 2024-09-08 00:00 does not exist.
        let santiago = parse_timezone("America/Santiago").unwrap();
        let (source, _) = source_at(santiago, "2024-09-07T20:00:00Z");
        let next = source.next_midnight(&source.now()).unwrap();
        assert_eq!(next.date_naive(), date(2024, 9, 8));
        assert_eq!(
            next.with_timezone(&Utc),
            "2024-09-08T04:00:00Z".parse::<DateTime<Utc>>().unwrap()
        );
    }

    #[test]
    fn manual_clock_clones_share_time() {
        let (source, clock) = source_at(central(), "2024-06-04T17:00:00Z");
        clock.clone().advance(TimeDelta::hours(12));
        assert_eq!(source.today(), date(2024, 6, 5));
    }
}
