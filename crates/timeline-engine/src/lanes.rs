//! Greedy lane assignment for overlapping events.
//!
//! Events are placed, in start order, into the lowest-numbered lane that is
//! free. A lane is free for an event when the end instant of the lane's last
//! occupant is strictly before the event's start. Both instants are raw, not
//! day-normalized, so an event ending exactly when the next one starts keeps
//! its lane busy.
//!
//! Because intervals are one-dimensional, first-free-lane greedy placement in
//! start order uses the minimum possible number of lanes (the size of the
//! largest set of mutually overlapping events).
//!
//! The day-level presence rule used when drawing ([`LanedEvent::is_present_on`])
//! is a different, inclusive test on normalized days. The two rules disagree
//! at exact boundary touches; see the tests at the bottom of this module.

use std::cmp::Reverse;
use std::collections::{BTreeSet, BinaryHeap, HashMap};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::calendar::TimelineCalendar;
use crate::event::Event;

/// An event together with its lane and its day-normalized bounds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LanedEvent {
    pub event: Event,
    /// Local midnight of the day the event starts on.
    pub day_start: DateTime<Utc>,
    /// Local midnight of the day the event ends on.
    pub day_end: DateTime<Utc>,
    /// Zero-based lane index.
    pub lane: usize,
}

impl LanedEvent {
    /// Whether the event occupies the local day beginning at `day`.
    ///
    /// `day` must be day-normalized (as every page date is). The event is
    /// present iff `day_start < next_day(day) && day_end >= day`, i.e. its end
    /// day counts as occupied.
    pub fn is_present_on(&self, day: DateTime<Utc>, calendar: &TimelineCalendar) -> bool {
        let starts_in_time = match calendar.next_day(day) {
            Some(next) => self.day_start < next,
            None => true,
        };
        starts_in_time && self.day_end >= day
    }
}

/// How lane freedom is looked up during assignment.
///
/// Both strategies produce identical assignments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LaneStrategy {
    /// Scan lane end instants in lane order. O(n * lanes).
    #[default]
    Linear,
    /// Min-heap of busy lanes keyed by end instant plus an ordered set of
    /// free lane indices. O(n log n); for event sets in the thousands.
    Indexed,
}

/// Assign every event to a lane using [`LaneStrategy::Linear`].
///
/// The output holds one entry per input event, ordered by start instant
/// (ties keep input order). Never fails: an event whose end precedes its
/// start simply frees its lane for any later event.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use timeline_engine::{assign_lanes, Event, TimelineCalendar};
///
/// let day = |d| Utc.with_ymd_and_hms(2024, 1, d, 12, 0, 0).unwrap();
/// let events = vec![
///     Event::new(1, "a", day(1), day(3)).unwrap(),
///     Event::new(2, "b", day(2), day(4)).unwrap(),
///     Event::new(3, "c", day(5), day(6)).unwrap(),
/// ];
/// let laned = assign_lanes(&events, &TimelineCalendar::default());
/// let lanes: Vec<usize> = laned.iter().map(|l| l.lane).collect();
/// assert_eq!(lanes, vec![0, 1, 0]);
/// ```
pub fn assign_lanes(events: &[Event], calendar: &TimelineCalendar) -> Vec<LanedEvent> {
    assign_lanes_with(events, calendar, LaneStrategy::Linear)
}

/// Assign every event to a lane using the given strategy.
pub fn assign_lanes_with(
    events: &[Event],
    calendar: &TimelineCalendar,
    strategy: LaneStrategy,
) -> Vec<LanedEvent> {
    let mut sorted: Vec<&Event> = events.iter().collect();
    // Stable: equal starts keep input order.
    sorted.sort_by_key(|event| event.start);

    let lanes = match strategy {
        LaneStrategy::Linear => linear_lanes(&sorted),
        LaneStrategy::Indexed => indexed_lanes(&sorted),
    };

    let laned: Vec<LanedEvent> = sorted
        .into_iter()
        .zip(lanes)
        .map(|(event, lane)| {
            log::trace!("event {} '{}' -> lane {}", event.id, event.name, lane);
            LanedEvent {
                event: event.clone(),
                day_start: calendar.normalize(event.start),
                day_end: calendar.normalize(event.end),
                lane,
            }
        })
        .collect();

    debug_assert!(
        find_lane_conflict(&laned).is_none(),
        "lane assignment produced overlapping events in one lane"
    );
    log::debug!(
        "assigned {} events to {} lanes ({:?})",
        laned.len(),
        lane_count(&laned),
        strategy
    );
    laned
}

/// Lane index per event, for events already sorted by start.
fn linear_lanes(sorted: &[&Event]) -> Vec<usize> {
    // lane_ends[i] is the end instant of the last event placed in lane i.
    let mut lane_ends: Vec<DateTime<Utc>> = Vec::new();
    let mut lanes = Vec::with_capacity(sorted.len());
    for event in sorted {
        let lane = match lane_ends.iter().position(|end| *end < event.start) {
            Some(lane) => {
                lane_ends[lane] = event.end;
                lane
            }
            None => {
                lane_ends.push(event.end);
                lane_ends.len() - 1
            }
        };
        lanes.push(lane);
    }
    lanes
}

/// Same result as [`linear_lanes`].
///
/// Starts are non-decreasing, so a lane whose end is before one event's start
/// stays free for every later event. Popping all such lanes into `free`
/// leaves `free` equal to the set the linear scan would find.
fn indexed_lanes(sorted: &[&Event]) -> Vec<usize> {
    let mut busy: BinaryHeap<Reverse<(DateTime<Utc>, usize)>> = BinaryHeap::new();
    let mut free: BTreeSet<usize> = BTreeSet::new();
    let mut lane_total = 0usize;

    sorted
        .iter()
        .map(|event| {
            while let Some(Reverse((end, lane))) = busy.peek().copied() {
                if end >= event.start {
                    break;
                }
                busy.pop();
                free.insert(lane);
            }
            let lane = free.pop_first().unwrap_or_else(|| {
                lane_total += 1;
                lane_total - 1
            });
            busy.push(Reverse((event.end, lane)));
            lane
        })
        .collect()
}

/// Number of lanes an assignment uses (`max(lane) + 1`, or 0 when empty).
pub fn lane_count(laned: &[LanedEvent]) -> usize {
    laned.iter().map(|l| l.lane + 1).max().unwrap_or(0)
}

/// Find two events sharing a lane that overlap under the lane-freedom rule.
///
/// Returns the indices (into `laned`) of the first offending pair in start
/// order, or `None` when the assignment is valid. Input order is irrelevant.
pub fn find_lane_conflict(laned: &[LanedEvent]) -> Option<(usize, usize)> {
    let mut order: Vec<usize> = (0..laned.len()).collect();
    order.sort_by_key(|&i| laned[i].event.start);

    let mut last_in_lane: HashMap<usize, usize> = HashMap::new();
    for i in order {
        let current = &laned[i];
        if let Some(prev) = last_in_lane.insert(current.lane, i) {
            if laned[prev].event.end >= current.event.start {
                return Some((prev, i));
            }
        }
    }
    None
}
