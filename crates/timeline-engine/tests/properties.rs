//! Property-based tests for lane assignment, normalization and paging.

use chrono::{DateTime, Datelike, NaiveDate, TimeDelta, Utc};
use proptest::prelude::*;
use timeline_engine::{
    assign_lanes, assign_lanes_with, find_lane_conflict, lane_count, page_dates, Event,
    LaneStrategy, TimelineCalendar, ViewMode, WeekStartDay,
};

const TIMEZONES: &[&str] = &[
    "UTC",
    "America/New_York",
    "Europe/Berlin",
    "Asia/Kolkata",
    "Australia/Lord_Howe",
    "America/Santiago",
];

fn instant(seconds: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(seconds, 0).unwrap()
}

fn calendar_strategy() -> impl Strategy<Value = TimelineCalendar> {
    (0..TIMEZONES.len(), any::<bool>()).prop_map(|(tz, sunday)| {
        let week_start = if sunday {
            WeekStartDay::Sunday
        } else {
            WeekStartDay::Monday
        };
        TimelineCalendar::with_timezone_name(TIMEZONES[tz], week_start).unwrap()
    })
}

/// Events within a two-month window; `allow_reversed` lets some end before
/// they start.
fn events_strategy(allow_reversed: bool) -> impl Strategy<Value = Vec<Event>> {
    let min_len: i64 = if allow_reversed { -86_400 } else { 0 };
    prop::collection::vec((0i64..60 * 86_400, min_len..5 * 86_400), 0..40).prop_map(|spans| {
        let origin = 1_704_067_200; // 2024-01-01T00:00:00Z
        spans
            .into_iter()
            .enumerate()
            .map(|(i, (offset, length))| Event {
                id: i as u64,
                name: format!("e{i}"),
                start: instant(origin + offset),
                end: instant(origin + offset + length),
            })
            .collect()
    })
}

/// Largest number of events containing a common instant.
fn max_overlap(events: &[Event]) -> usize {
    events
        .iter()
        .map(|e| {
            events
                .iter()
                .filter(|f| f.start <= e.start && e.start <= f.end)
                .count()
        })
        .max()
        .unwrap_or(0)
}

fn days_in_month(year: i32, month: u32) -> i64 {
    let first = NaiveDate::from_ymd_opt(year, month, 1).unwrap();
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1).unwrap()
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1).unwrap()
    };
    (next - first).num_days()
}

proptest! {
    #[test]
    fn prop_no_two_events_in_a_lane_overlap(events in events_strategy(true)) {
        let calendar = TimelineCalendar::default();
        let laned = assign_lanes(&events, &calendar);
        prop_assert_eq!(laned.len(), events.len());
        prop_assert!(find_lane_conflict(&laned).is_none());
    }

    #[test]
    fn prop_strategies_agree(events in events_strategy(true)) {
        let calendar = TimelineCalendar::default();
        prop_assert_eq!(
            assign_lanes_with(&events, &calendar, LaneStrategy::Linear),
            assign_lanes_with(&events, &calendar, LaneStrategy::Indexed)
        );
    }

    #[test]
    fn prop_lane_count_is_minimal(events in events_strategy(false)) {
        let laned = assign_lanes(&events, &TimelineCalendar::default());
        prop_assert_eq!(lane_count(&laned), max_overlap(&events));
    }

    #[test]
    fn prop_assignment_is_deterministic(events in events_strategy(true)) {
        let calendar = TimelineCalendar::default();
        prop_assert_eq!(assign_lanes(&events, &calendar), assign_lanes(&events, &calendar));
    }

    #[test]
    fn prop_laned_bounds_are_normalized(
        events in events_strategy(false),
        calendar in calendar_strategy(),
    ) {
        for laned in assign_lanes(&events, &calendar) {
            prop_assert_eq!(laned.day_start, calendar.normalize(laned.event.start));
            prop_assert_eq!(laned.day_end, calendar.normalize(laned.event.end));
            prop_assert!(laned.day_start <= laned.event.start);
        }
    }

    #[test]
    fn prop_normalize_is_idempotent(
        seconds in -5_000_000_000i64..5_000_000_000,
        calendar in calendar_strategy(),
    ) {
        let once = calendar.normalize(instant(seconds));
        prop_assert_eq!(calendar.normalize(once), once);
        prop_assert_eq!(calendar.local_date(once), calendar.local_date(instant(seconds)));
    }

    #[test]
    fn prop_week_pages_have_seven_contiguous_days(
        seconds in -3_000_000_000i64..5_000_000_000,
        index in -10_000i64..10_000,
        calendar in calendar_strategy(),
    ) {
        let base = instant(seconds);
        let this = page_dates(base, index, ViewMode::Week, &calendar).unwrap();
        let next = page_dates(base, index + 1, ViewMode::Week, &calendar).unwrap();
        prop_assert_eq!(this.len(), 7);
        let first = calendar.local_date(this[0]);
        prop_assert_eq!(calendar.local_date(this[6]) - first, TimeDelta::days(6));
        prop_assert_eq!(calendar.local_date(next[0]) - first, TimeDelta::days(7));
        prop_assert_eq!(calendar.week_start().days_since(first.weekday()), 0);
    }

    #[test]
    fn prop_month_pages_cover_the_whole_month(
        seconds in -3_000_000_000i64..5_000_000_000,
        index in -5_000i64..5_000,
        calendar in calendar_strategy(),
    ) {
        let dates = page_dates(instant(seconds), index, ViewMode::Month, &calendar).unwrap();
        let first = calendar.local_date(dates[0]);
        prop_assert_eq!(first.day(), 1);
        prop_assert_eq!(dates.len() as i64, days_in_month(first.year(), first.month()));
        for date in &dates {
            prop_assert_eq!(calendar.normalize(*date), *date);
        }
    }

    #[test]
    fn prop_year_pages_are_twelve_month_starts(
        seconds in -3_000_000_000i64..5_000_000_000,
        index in -1_000i64..1_000,
        calendar in calendar_strategy(),
    ) {
        let base = instant(seconds);
        let dates = page_dates(base, index, ViewMode::Year, &calendar).unwrap();
        prop_assert_eq!(dates.len(), 12);
        let expected_year = i64::from(calendar.local_date(base).year()) + index;
        for (month0, date) in dates.iter().enumerate() {
            let local = calendar.local_date(*date);
            prop_assert_eq!(i64::from(local.year()), expected_year);
            prop_assert_eq!(local.month0() as usize, month0);
            prop_assert_eq!(local.day(), 1);
        }
    }
}
