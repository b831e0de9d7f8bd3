//! Events as delivered by the event source, and their boundary validation.
//!
//! The engine reads events and never mutates them. Whether an event's start
//! precedes its end is not guaranteed by the source, so callers run
//! [`prepare_events`] once at the boundary and pick how degenerate intervals
//! are treated. [`crate::lanes::assign_lanes`] itself accepts anything.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::calendar::TimelineCalendar;
use crate::error::{LayoutError, Result};

/// A named time interval.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Event {
    pub id: u64,
    pub name: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Event {
    /// Create an event, rejecting intervals that end before they start.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::InvalidInterval`] if `start > end`.
    pub fn new(
        id: u64,
        name: impl Into<String>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Self> {
        let event = Self {
            id,
            name: name.into(),
            start,
            end,
        };
        if event.is_degenerate() {
            return Err(degenerate_error(&event));
        }
        Ok(event)
    }

    /// True when the event ends before it starts.
    pub fn is_degenerate(&self) -> bool {
        self.start > self.end
    }
}

/// What [`prepare_events`] does with an event whose start is after its end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DegeneratePolicy {
    /// Fail the whole batch with [`LayoutError::InvalidInterval`].
    #[default]
    Reject,
    /// Exchange start and end.
    Swap,
}

/// Validate a batch of events from the event source.
///
/// An empty batch is valid.
///
/// # Errors
///
/// Returns [`LayoutError::InvalidInterval`] for the first degenerate event
/// when `policy` is [`DegeneratePolicy::Reject`].
pub fn prepare_events(events: Vec<Event>, policy: DegeneratePolicy) -> Result<Vec<Event>> {
    events
        .into_iter()
        .map(|mut event| {
            if !event.is_degenerate() {
                return Ok(event);
            }
            match policy {
                DegeneratePolicy::Reject => Err(degenerate_error(&event)),
                DegeneratePolicy::Swap => {
                    log::warn!(
                        "event {} '{}' ends before it starts; swapping start and end",
                        event.id,
                        event.name
                    );
                    std::mem::swap(&mut event.start, &mut event.end);
                    Ok(event)
                }
            }
        })
        .collect()
}

fn degenerate_error(event: &Event) -> LayoutError {
    LayoutError::InvalidInterval(format!(
        "event {} '{}' starts at {} after its end {}",
        event.id,
        event.name,
        event.start.to_rfc3339(),
        event.end.to_rfc3339()
    ))
}

// ── Text records ────────────────────────────────────────────────────────────

/// An event as written in an event file, with textual instants.
///
/// `start` and `end` take any form [`TimelineCalendar::parse_instant`]
/// accepts, so date-only records (`"2024-01-15"`) mean local midnight.
#[derive(Debug, Clone, Deserialize)]
pub struct EventRecord {
    pub id: u64,
    pub name: String,
    pub start: String,
    pub end: String,
}

impl EventRecord {
    /// Resolve the textual instants against `calendar`.
    ///
    /// Does not check the interval order; see [`prepare_events`].
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::InvalidDatetime`] if either instant fails to
    /// parse.
    pub fn into_event(self, calendar: &TimelineCalendar) -> Result<Event> {
        let start = calendar.parse_instant(&self.start)?;
        let end = calendar.parse_instant(&self.end)?;
        Ok(Event {
            id: self.id,
            name: self.name,
            start,
            end,
        })
    }
}

/// Parse a JSON array of [`EventRecord`]s into events.
///
/// # Errors
///
/// Returns [`LayoutError::InvalidConfig`] if the JSON does not match the
/// record shape, or [`LayoutError::InvalidDatetime`] for a bad instant.
pub fn parse_events_json(json: &str, calendar: &TimelineCalendar) -> Result<Vec<Event>> {
    let records: Vec<EventRecord> =
        serde_json::from_str(json).map_err(|e| LayoutError::InvalidConfig(e.to_string()))?;
    records
        .into_iter()
        .map(|record| record.into_event(calendar))
        .collect()
}
