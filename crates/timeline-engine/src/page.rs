//! Calendar pages for week, month and year views.
//!
//! A page is addressed by a signed delta from the page containing a base
//! date: 0 is the base date's own week/month/year, -1 the one before, and so
//! on without bound. Every page is a pure function of `(base, index, mode)`
//! and the [`TimelineCalendar`].
//!
//! Pages whose dates fall outside chrono's representable range yield
//! [`LayoutError::PageOutOfRange`] rather than wrapping around.

use chrono::{DateTime, Datelike, NaiveDate, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::calendar::TimelineCalendar;
use crate::error::{LayoutError, Result};
use crate::label::period_label_for_anchor;

const DAYS_PER_WEEK: usize = 7;
const MONTHS_PER_YEAR: u32 = 12;

/// Page granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    /// Seven consecutive days starting on the calendar's week start.
    #[default]
    Week,
    /// Every day of one calendar month.
    Month,
    /// The first day of each month of one year.
    Year,
}

/// The dates and label of one page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarPage {
    /// Signed offset from the page containing the base date.
    pub index: i64,
    pub mode: ViewMode,
    /// Day-normalized instants in ascending order.
    pub dates: Vec<DateTime<Utc>>,
    pub label: String,
}

/// Build the full page: dates plus period label.
///
/// # Errors
///
/// Returns [`LayoutError::PageOutOfRange`] if the page lies outside the
/// representable calendar.
pub fn calendar_page(
    base: DateTime<Utc>,
    index: i64,
    mode: ViewMode,
    calendar: &TimelineCalendar,
) -> Result<CalendarPage> {
    let anchor = shifted_anchor(base, index, mode, calendar)?;
    let Some(dates) = dates_from_anchor(anchor, mode, calendar) else {
        return Err(out_of_range(base, index, mode));
    };
    Ok(CalendarPage {
        index,
        mode,
        dates,
        label: period_label_for_anchor(anchor, mode),
    })
}

/// The ordered day-normalized dates of a page.
///
/// - Week: 7 days from the week start of the base date shifted by `index`
///   weeks.
/// - Month: every day of the base month shifted by `index` months.
/// - Year: the first of each month of the base year shifted by `index`
///   years.
///
/// # Errors
///
/// Returns [`LayoutError::PageOutOfRange`] if the page lies outside the
/// representable calendar.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use timeline_engine::{page_dates, TimelineCalendar, ViewMode};
///
/// let base = Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap();
/// let calendar = TimelineCalendar::default();
/// let february = page_dates(base, 1, ViewMode::Month, &calendar).unwrap();
/// assert_eq!(february.len(), 29); // 2024 is a leap year
/// ```
pub fn page_dates(
    base: DateTime<Utc>,
    index: i64,
    mode: ViewMode,
    calendar: &TimelineCalendar,
) -> Result<Vec<DateTime<Utc>>> {
    let anchor = shifted_anchor(base, index, mode, calendar)?;
    dates_from_anchor(anchor, mode, calendar).ok_or_else(|| out_of_range(base, index, mode))
}

/// The local date of `base` moved by `index` pages.
///
/// Week pages keep the weekday (not yet snapped to the week start); month
/// and year pages land on the first day of the month or year.
pub(crate) fn shifted_anchor(
    base: DateTime<Utc>,
    index: i64,
    mode: ViewMode,
    calendar: &TimelineCalendar,
) -> Result<NaiveDate> {
    let date = calendar.local_date(base);
    let shifted = match mode {
        ViewMode::Week => index
            .checked_mul(DAYS_PER_WEEK as i64)
            .and_then(TimeDelta::try_days)
            .and_then(|delta| date.checked_add_signed(delta)),
        ViewMode::Month => {
            let months = i64::from(MONTHS_PER_YEAR);
            let month_number = i64::from(date.year()) * months + i64::from(date.month0());
            month_number.checked_add(index).and_then(|target| {
                let year = i32::try_from(target.div_euclid(months)).ok()?;
                let month0 = u32::try_from(target.rem_euclid(months)).ok()?;
                NaiveDate::from_ymd_opt(year, month0 + 1, 1)
            })
        }
        ViewMode::Year => i64::from(date.year())
            .checked_add(index)
            .and_then(|year| i32::try_from(year).ok())
            .and_then(|year| NaiveDate::from_ymd_opt(year, 1, 1)),
    };
    shifted.ok_or_else(|| out_of_range(base, index, mode))
}

fn dates_from_anchor(
    anchor: NaiveDate,
    mode: ViewMode,
    calendar: &TimelineCalendar,
) -> Option<Vec<DateTime<Utc>>> {
    let days: Vec<NaiveDate> = match mode {
        ViewMode::Week => {
            let start = calendar.start_of_week(anchor)?;
            let week: Vec<NaiveDate> = start.iter_days().take(DAYS_PER_WEEK).collect();
            if week.len() < DAYS_PER_WEEK {
                return None;
            }
            week
        }
        ViewMode::Month => anchor
            .iter_days()
            .take_while(|day| day.month() == anchor.month())
            .collect(),
        ViewMode::Year => (1..=MONTHS_PER_YEAR)
            .map(|month| NaiveDate::from_ymd_opt(anchor.year(), month, 1))
            .collect::<Option<Vec<_>>>()?,
    };
    Some(
        days.into_iter()
            .map(|day| calendar.local_midnight(day))
            .collect(),
    )
}

fn out_of_range(base: DateTime<Utc>, index: i64, mode: ViewMode) -> LayoutError {
    LayoutError::PageOutOfRange(format!(
        "{:?} page {} from {}",
        mode,
        index,
        base.to_rfc3339()
    ))
}

// ── Pager adapter ───────────────────────────────────────────────────────────

/// Page count used by pagers that cannot scroll infinitely.
pub const DEFAULT_PAGE_COUNT: usize = 1000;

/// Maps positions of a finite pager onto signed page deltas.
///
/// The pager opens at `center`, which shows the page containing the base
/// date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PagerWindow {
    page_count: usize,
    center: usize,
}

impl Default for PagerWindow {
    fn default() -> Self {
        Self::centered(DEFAULT_PAGE_COUNT)
    }
}

impl PagerWindow {
    /// A window of `page_count` pages opening in the middle.
    pub fn centered(page_count: usize) -> Self {
        Self {
            page_count,
            center: page_count / 2,
        }
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    /// The position the pager starts on.
    pub fn center(&self) -> usize {
        self.center
    }

    /// Signed page index for a pager position.
    pub fn delta(&self, position: usize) -> i64 {
        position as i64 - self.center as i64
    }

    /// Pager position showing the page `delta` away from the center, if the
    /// window reaches that far.
    pub fn position(&self, delta: i64) -> Option<usize> {
        let position = usize::try_from((self.center as i64).checked_add(delta)?).ok()?;
        (position < self.page_count).then_some(position)
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────
