//! Display labels for pages and their columns.
//!
//! Month names are English (chrono's formatter); localized names are left to
//! the rendering layer.

use chrono::{DateTime, NaiveDate, Utc};

use crate::calendar::TimelineCalendar;
use crate::error::Result;
use crate::page::{shifted_anchor, ViewMode};

/// Title for the page `index` pages away from the one containing `base`.
///
/// Week and month pages read "Month Year" (`"February 2024"`); year pages
/// read the four-digit year (`"2024"`). A week page is titled after the
/// base date moved by whole weeks, before snapping to the week start, so a
/// week straddling two months takes the month of that moved date.
///
/// # Errors
///
/// Returns [`crate::LayoutError::PageOutOfRange`] if the page lies outside
/// the representable calendar.
pub fn period_label(
    base: DateTime<Utc>,
    index: i64,
    mode: ViewMode,
    calendar: &TimelineCalendar,
) -> Result<String> {
    let anchor = shifted_anchor(base, index, mode, calendar)?;
    Ok(period_label_for_anchor(anchor, mode))
}

pub(crate) fn period_label_for_anchor(anchor: NaiveDate, mode: ViewMode) -> String {
    match mode {
        ViewMode::Year => anchor.format("%Y").to_string(),
        ViewMode::Week | ViewMode::Month => anchor.format("%B %Y").to_string(),
    }
}

/// Header for one date column: `"Mon, 15"`, or the month name on year pages.
pub fn column_label(date: DateTime<Utc>, mode: ViewMode, calendar: &TimelineCalendar) -> String {
    let local = calendar.local_date(date);
    match mode {
        ViewMode::Year => local.format("%B").to_string(),
        ViewMode::Week | ViewMode::Month => local.format("%a, %-d").to_string(),
    }
}
