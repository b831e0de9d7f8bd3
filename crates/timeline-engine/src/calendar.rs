//! The local calendar every layout computation runs against.
//!
//! A [`TimelineCalendar`] fixes the two things "local" means for the engine:
//! the IANA timezone whose midnights delimit days, and which weekday starts a
//! week. All instants are carried as `DateTime<Utc>`; day arithmetic happens
//! on the local `NaiveDate` and is mapped back to the instant of local
//! midnight.
//!
//! No function here reads the system clock. Callers that need "today" pass
//! their own `now` to [`TimelineCalendar::today`].

use chrono::{
    DateTime, Datelike, LocalResult, NaiveDate, NaiveTime, Offset, TimeDelta, TimeZone, Utc,
    Weekday,
};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{LayoutError, Result};

/// Upper bound, in minutes, when looking for the first valid local time of a
/// day whose midnight falls inside a DST gap.
const GAP_SEARCH_MINUTES: i64 = 24 * 60;

// ── Configurable week start ─────────────────────────────────────────────────

/// Which day begins a week on week pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekStartDay {
    /// ISO 8601 standard (Monday = day 0 of the week).
    #[default]
    Monday,
    /// US/Canada convention (Sunday = day 0 of the week).
    Sunday,
}

impl WeekStartDay {
    /// How many days `weekday` is from this week-start day.
    pub fn days_since(self, weekday: Weekday) -> i64 {
        match self {
            WeekStartDay::Monday => weekday.num_days_from_monday() as i64,
            WeekStartDay::Sunday => weekday.num_days_from_sunday() as i64,
        }
    }
}

// ── TimelineCalendar ────────────────────────────────────────────────────────

/// Timezone and week convention used for day normalization and paging.
///
/// Deserializes from the configuration shape
/// `{"timezone": "Europe/Berlin", "week_start": "sunday"}`; both keys are
/// optional and default to UTC and Monday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "CalendarConfig", into = "CalendarConfig")]
pub struct TimelineCalendar {
    timezone: Tz,
    week_start: WeekStartDay,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CalendarConfig {
    #[serde(default = "default_timezone_name")]
    timezone: String,
    #[serde(default)]
    week_start: WeekStartDay,
}

fn default_timezone_name() -> String {
    "UTC".to_string()
}

impl TryFrom<CalendarConfig> for TimelineCalendar {
    type Error = LayoutError;

    fn try_from(config: CalendarConfig) -> Result<Self> {
        let timezone = parse_timezone(&config.timezone)?;
        Ok(Self::new(timezone, config.week_start))
    }
}

impl From<TimelineCalendar> for CalendarConfig {
    fn from(calendar: TimelineCalendar) -> Self {
        CalendarConfig {
            timezone: calendar.timezone.name().to_string(),
            week_start: calendar.week_start,
        }
    }
}

impl Default for TimelineCalendar {
    fn default() -> Self {
        Self::new(Tz::UTC, WeekStartDay::default())
    }
}

impl TimelineCalendar {
    pub fn new(timezone: Tz, week_start: WeekStartDay) -> Self {
        Self {
            timezone,
            week_start,
        }
    }

    /// Build a calendar from an IANA timezone name.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::InvalidTimezone`] if the name is not a known
    /// IANA timezone.
    pub fn with_timezone_name(name: &str, week_start: WeekStartDay) -> Result<Self> {
        Ok(Self::new(parse_timezone(name)?, week_start))
    }

    /// Parse a JSON calendar configuration.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::InvalidConfig`] for malformed JSON or an unknown
    /// timezone.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| LayoutError::InvalidConfig(e.to_string()))
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    pub fn week_start(&self) -> WeekStartDay {
        self.week_start
    }

    /// Truncate an instant to local midnight of the same calendar day.
    ///
    /// Idempotent: `normalize(normalize(x)) == normalize(x)`. Saturates at
    /// the first or last representable day when the local date of `instant`
    /// lies outside chrono's calendar.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::{TimeZone, Utc};
    /// use timeline_engine::TimelineCalendar;
    ///
    /// let calendar = TimelineCalendar::default();
    /// let instant = Utc.with_ymd_and_hms(2024, 1, 15, 17, 45, 3).unwrap();
    /// let day = calendar.normalize(instant);
    /// assert_eq!(day, Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap());
    /// assert_eq!(calendar.normalize(day), day);
    /// ```
    pub fn normalize(&self, instant: DateTime<Utc>) -> DateTime<Utc> {
        self.local_midnight(self.local_date(instant))
    }

    /// The calendar day `instant` falls on in the local timezone.
    ///
    /// Clamped to `NaiveDate::MIN`/`NaiveDate::MAX` for instants within one
    /// UTC offset of the ends of the representable range.
    pub fn local_date(&self, instant: DateTime<Utc>) -> NaiveDate {
        let utc = instant.naive_utc();
        let offset = self.timezone.offset_from_utc_datetime(&utc).fix();
        match utc.checked_add_offset(offset) {
            Some(local) => local.date(),
            None if offset.local_minus_utc() > 0 => NaiveDate::MAX,
            None => NaiveDate::MIN,
        }
    }

    /// The instant at which `date` begins in the local timezone.
    ///
    /// When midnight is skipped by a DST transition the day begins at its
    /// first valid local minute. When midnight is repeated the earlier
    /// instant is used.
    pub fn local_midnight(&self, date: NaiveDate) -> DateTime<Utc> {
        let midnight = date.and_time(NaiveTime::MIN);
        match self.timezone.from_local_datetime(&midnight) {
            LocalResult::Single(dt) => dt.with_timezone(&Utc),
            LocalResult::Ambiguous(earliest, _) => earliest.with_timezone(&Utc),
            LocalResult::None => (1..=GAP_SEARCH_MINUTES)
                .find_map(|minutes| {
                    let shifted = midnight.checked_add_signed(TimeDelta::minutes(minutes))?;
                    self.timezone.from_local_datetime(&shifted).earliest()
                })
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(|| Utc.from_utc_datetime(&midnight)),
        }
    }

    /// Local midnight of the calendar day after `day`.
    ///
    /// Not `day + 24h`: days around DST transitions are 23 or 25 hours long.
    /// `None` at the end of the representable calendar.
    pub fn next_day(&self, day: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let next = self.local_date(day).succ_opt()?;
        Some(self.local_midnight(next))
    }

    /// First day of the week containing `date`.
    pub fn start_of_week(&self, date: NaiveDate) -> Option<NaiveDate> {
        let since = self.week_start.days_since(date.weekday());
        date.checked_sub_signed(TimeDelta::try_days(since)?)
    }

    /// Today's date at local midnight, given the caller's notion of `now`.
    pub fn today(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        self.normalize(now)
    }

    /// Parse an instant from text.
    ///
    /// Accepts an RFC 3339 datetime (`2024-01-15T09:30:00Z`) or a plain ISO
    /// date (`2024-01-15`), the latter meaning local midnight of that day.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::InvalidDatetime`] if neither form parses.
    pub fn parse_instant(&self, s: &str) -> Result<DateTime<Utc>> {
        let trimmed = s.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
            return Ok(dt.with_timezone(&Utc));
        }
        NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
            .map(|date| self.local_midnight(date))
            .map_err(|e| LayoutError::InvalidDatetime(format!("'{}': {}", s, e)))
    }
}

/// Parse an IANA timezone string into `Tz`.
fn parse_timezone(s: &str) -> Result<Tz> {
    s.parse::<Tz>()
        .map_err(|_| LayoutError::InvalidTimezone(format!("'{}'", s)))
}

// ── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn new_york() -> TimelineCalendar {
        TimelineCalendar::with_timezone_name("America/New_York", WeekStartDay::Sunday).unwrap()
    }

    #[test]
    fn test_normalize_strips_time_of_day_in_utc() {
        let calendar = TimelineCalendar::default();
        let instant = Utc.with_ymd_and_hms(2024, 3, 10, 23, 59, 59).unwrap();
        assert_eq!(
            calendar.normalize(instant),
            Utc.with_ymd_and_hms(2024, 3, 10, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_normalize_uses_local_day_not_utc_day() {
        // 03:00 UTC on Jan 16 is still Jan 15 in New York (UTC-5)
        let calendar = new_york();
        let instant = Utc.with_ymd_and_hms(2024, 1, 16, 3, 0, 0).unwrap();
        let day = calendar.normalize(instant);
        assert_eq!(day, Utc.with_ymd_and_hms(2024, 1, 15, 5, 0, 0).unwrap());
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let calendar = new_york();
        let instant = Utc.with_ymd_and_hms(2024, 11, 3, 12, 34, 56).unwrap();
        let once = calendar.normalize(instant);
        assert_eq!(calendar.normalize(once), once);
    }

    #[test]
    fn test_normalize_saturates_at_calendar_bounds() {
        // Kolkata is ahead of UTC: the local date of MAX_UTC is past NaiveDate::MAX
        let kolkata =
            TimelineCalendar::with_timezone_name("Asia/Kolkata", WeekStartDay::Monday).unwrap();
        assert_eq!(kolkata.local_date(DateTime::<Utc>::MAX_UTC), NaiveDate::MAX);
        let last = kolkata.normalize(DateTime::<Utc>::MAX_UTC);
        assert!(last <= DateTime::<Utc>::MAX_UTC);
        assert_eq!(kolkata.local_date(last), NaiveDate::MAX);
        assert_eq!(kolkata.normalize(last), last);

        // New York is behind UTC: the local date of MIN_UTC is before NaiveDate::MIN
        let eastern = new_york();
        assert_eq!(eastern.local_date(DateTime::<Utc>::MIN_UTC), NaiveDate::MIN);
        let first = eastern.normalize(DateTime::<Utc>::MIN_UTC);
        assert_eq!(eastern.local_date(first), NaiveDate::MIN);
        assert_eq!(eastern.normalize(first), first);
    }

    #[test]
    fn test_midnight_inside_dst_gap_moves_to_first_valid_minute() {
        // Santiago springs forward at local midnight: 2024-09-08 00:00 does not exist
        let calendar =
            TimelineCalendar::with_timezone_name("America/Santiago", WeekStartDay::Monday).unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 9, 8).unwrap();
        let start = calendar.local_midnight(date);
        let local = start.with_timezone(&calendar.timezone());
        assert_eq!(local.date_naive(), date);
        assert_eq!(local.time(), NaiveTime::from_hms_opt(1, 0, 0).unwrap());
        assert_eq!(calendar.normalize(start), start);
    }

    #[test]
    fn test_next_day_spans_23_hours_on_spring_forward() {
        let calendar = new_york();
        let day = calendar.local_midnight(NaiveDate::from_ymd_opt(2024, 3, 10).unwrap());
        let next = calendar.next_day(day).unwrap();
        assert_eq!((next - day).num_hours(), 23);
    }

    #[test]
    fn test_next_day_at_end_of_calendar_is_none() {
        let calendar = TimelineCalendar::default();
        let day = calendar.local_midnight(NaiveDate::MAX);
        assert!(calendar.next_day(day).is_none());
    }

    #[test]
    fn test_start_of_week_monday_and_sunday() {
        // Wed Feb 18 2026
        let date = NaiveDate::from_ymd_opt(2026, 2, 18).unwrap();
        let monday = TimelineCalendar::default();
        assert_eq!(
            monday.start_of_week(date),
            NaiveDate::from_ymd_opt(2026, 2, 16)
        );
        let sunday = TimelineCalendar::new(Tz::UTC, WeekStartDay::Sunday);
        assert_eq!(
            sunday.start_of_week(date),
            NaiveDate::from_ymd_opt(2026, 2, 15)
        );
    }

    #[test]
    fn test_parse_instant_rfc3339_and_date() {
        let calendar = new_york();
        assert_eq!(
            calendar.parse_instant("2024-01-15T09:30:00-05:00").unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 15, 14, 30, 0).unwrap()
        );
        assert_eq!(
            calendar.parse_instant("2024-01-15").unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 15, 5, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_parse_instant_rejects_garbage() {
        let err = TimelineCalendar::default()
            .parse_instant("next tuesday")
            .unwrap_err()
            .to_string();
        assert!(err.contains("Invalid datetime"), "got: {err}");
    }

    #[test]
    fn test_calendar_from_json() {
        let calendar =
            TimelineCalendar::from_json(r#"{"timezone": "Europe/Berlin", "week_start": "sunday"}"#)
                .unwrap();
        assert_eq!(calendar.timezone(), Tz::Europe__Berlin);
        assert_eq!(calendar.week_start(), WeekStartDay::Sunday);
    }

    #[test]
    fn test_calendar_from_json_defaults() {
        let calendar = TimelineCalendar::from_json("{}").unwrap();
        assert_eq!(calendar, TimelineCalendar::default());
    }

    #[test]
    fn test_calendar_from_json_invalid_timezone() {
        let err = TimelineCalendar::from_json(r#"{"timezone": "Mars/Olympus"}"#)
            .unwrap_err()
            .to_string();
        assert!(err.contains("Invalid config"), "got: {err}");
        assert!(err.contains("Invalid timezone"), "got: {err}");
    }

    #[test]
    fn test_calendar_serializes_to_config_shape() {
        let json = serde_json::to_value(new_york()).unwrap();
        assert_eq!(json["timezone"], "America/New_York");
        assert_eq!(json["week_start"], "sunday");
    }
}
