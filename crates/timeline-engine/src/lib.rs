//! # timeline-engine
//!
//! Deterministic layout for paged calendar timelines.
//!
//! The engine answers two questions a week/month/year timeline asks on every
//! render: which parallel lane each (possibly overlapping) event goes in, and
//! which dates a given page shows. Everything is a pure function of its
//! inputs plus a [`TimelineCalendar`] fixing the local timezone and week
//! start; nothing reads the system clock or performs I/O.
//!
//! ## Modules
//!
//! - [`calendar`] — Local timezone, week start, day normalization
//! - [`event`] — Event records and boundary validation
//! - [`lanes`] — Greedy minimum lane assignment and the day presence test
//! - [`page`] — Week/month/year page dates and the pager adapter
//! - [`label`] — Period and column labels
//! - [`grid`] — Date x lane matrix for one page
//! - [`cache`] — Page and lane memoization
//! - [`error`] — Error types

pub mod cache;
pub mod calendar;
pub mod error;
pub mod event;
pub mod grid;
pub mod label;
pub mod lanes;
pub mod page;

pub use cache::{LaneCache, PageCache};
pub use calendar::{TimelineCalendar, WeekStartDay};
pub use error::LayoutError;
pub use event::{parse_events_json, prepare_events, DegeneratePolicy, Event, EventRecord};
pub use grid::{build_grid, GridColumn, PageGrid};
pub use label::{column_label, period_label};
pub use lanes::{
    assign_lanes, assign_lanes_with, find_lane_conflict, lane_count, LaneStrategy, LanedEvent,
};
pub use page::{calendar_page, page_dates, CalendarPage, PagerWindow, ViewMode};
