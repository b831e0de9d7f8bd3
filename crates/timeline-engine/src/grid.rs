//! The date x lane matrix a renderer draws for one page.
//!
//! Each column is one page date, each row one lane. A cell holds the event
//! present on that date in that lane, found with
//! [`LanedEvent::is_present_on`]. When the inclusive presence rule finds two
//! events of one lane on the same day (possible when one ends the day the
//! next one starts), the cell takes the first in start order.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::calendar::TimelineCalendar;
use crate::event::Event;
use crate::label::column_label;
use crate::lanes::{lane_count, LanedEvent};
use crate::page::CalendarPage;

/// One date column of a [`PageGrid`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GridColumn {
    pub date: DateTime<Utc>,
    pub label: String,
    /// Per lane, the index into the laned events of the event shown there.
    pub cells: Vec<Option<usize>>,
}

/// A page laid out against a lane assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageGrid {
    pub page: CalendarPage,
    /// Rows per column; the same for every page of one assignment.
    pub lane_count: usize,
    pub columns: Vec<GridColumn>,
}

impl PageGrid {
    /// The laned event drawn at (`column`, `lane`), for click handling.
    ///
    /// `laned` must be the slice the grid was built from.
    pub fn laned_event_at<'a>(
        &self,
        laned: &'a [LanedEvent],
        column: usize,
        lane: usize,
    ) -> Option<&'a LanedEvent> {
        let index = (*self.columns.get(column)?.cells.get(lane)?)?;
        laned.get(index)
    }

    /// The source event drawn at (`column`, `lane`).
    pub fn event_at<'a>(
        &self,
        laned: &'a [LanedEvent],
        column: usize,
        lane: usize,
    ) -> Option<&'a Event> {
        self.laned_event_at(laned, column, lane)
            .map(|laned_event| &laned_event.event)
    }
}

/// Lay out `page` against a lane assignment.
pub fn build_grid(
    page: CalendarPage,
    laned: &[LanedEvent],
    calendar: &TimelineCalendar,
) -> PageGrid {
    let lanes = lane_count(laned);

    // Start order, ties by position, so "first" in a cell is well defined
    // whatever order `laned` arrives in.
    let mut order: Vec<usize> = (0..laned.len()).collect();
    order.sort_by_key(|&i| laned[i].event.start);

    let columns = page
        .dates
        .iter()
        .map(|&date| {
            let mut cells = vec![None; lanes];
            for &i in &order {
                let laned_event = &laned[i];
                let cell = &mut cells[laned_event.lane];
                if cell.is_none() && laned_event.is_present_on(date, calendar) {
                    *cell = Some(i);
                }
            }
            GridColumn {
                date,
                label: column_label(date, page.mode, calendar),
                cells,
            }
        })
        .collect();

    log::debug!(
        "built {:?} grid '{}': {} columns x {} lanes",
        page.mode,
        page.label,
        page.dates.len(),
        lanes
    );

    PageGrid {
        page,
        lane_count: lanes,
        columns,
    }
}
