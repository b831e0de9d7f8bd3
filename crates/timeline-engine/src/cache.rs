//! Memoization for rapid navigation.
//!
//! Pages are keyed by `(base, index, mode)`; lane assignments by a content
//! hash of the event list, confirmed by equality so a hash collision can
//! never serve a stale assignment. Both caches are owned by one caller and
//! take `&mut self`.

use std::collections::hash_map::{DefaultHasher, Entry};
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use chrono::{DateTime, Utc};

use crate::calendar::TimelineCalendar;
use crate::error::Result;
use crate::event::Event;
use crate::lanes::{assign_lanes_with, LaneStrategy, LanedEvent};
use crate::page::{calendar_page, CalendarPage, ViewMode};

type PageKey = (DateTime<Utc>, i64, ViewMode);

/// Calendar pages already computed for one calendar.
#[derive(Debug, Clone)]
pub struct PageCache {
    calendar: TimelineCalendar,
    pages: HashMap<PageKey, CalendarPage>,
}

impl PageCache {
    pub fn new(calendar: TimelineCalendar) -> Self {
        Self {
            calendar,
            pages: HashMap::new(),
        }
    }

    /// The page for `(base, index, mode)`, computed on first request.
    ///
    /// # Errors
    ///
    /// Propagates [`crate::LayoutError::PageOutOfRange`]; failures are not
    /// cached.
    pub fn page(
        &mut self,
        base: DateTime<Utc>,
        index: i64,
        mode: ViewMode,
    ) -> Result<&CalendarPage> {
        match self.pages.entry((base, index, mode)) {
            Entry::Occupied(entry) => Ok(&*entry.into_mut()),
            Entry::Vacant(entry) => {
                log::trace!("page cache miss: {:?} {} from {}", mode, index, base);
                let page = calendar_page(base, index, mode, &self.calendar)?;
                Ok(&*entry.insert(page))
            }
        }
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn clear(&mut self) {
        self.pages.clear();
    }
}

/// The lane assignment of the most recent event list.
///
/// Holds one entry: the timeline shows one event set at a time, and a
/// changed set invalidates the previous assignment entirely.
#[derive(Debug, Clone)]
pub struct LaneCache {
    calendar: TimelineCalendar,
    strategy: LaneStrategy,
    cached: Option<CachedLanes>,
}

#[derive(Debug, Clone)]
struct CachedLanes {
    hash: u64,
    events: Vec<Event>,
    laned: Vec<LanedEvent>,
}

impl LaneCache {
    pub fn new(calendar: TimelineCalendar, strategy: LaneStrategy) -> Self {
        Self {
            calendar,
            strategy,
            cached: None,
        }
    }

    /// Lanes for `events`, recomputed only when the list's content changed.
    pub fn lanes(&mut self, events: &[Event]) -> &[LanedEvent] {
        let hash = content_hash(events);
        let fresh = matches!(
            &self.cached,
            Some(cached) if cached.hash == hash && cached.events == events
        );
        if !fresh {
            log::debug!(
                "event set changed; recomputing lanes for {} events",
                events.len()
            );
            self.cached = Some(CachedLanes {
                hash,
                events: events.to_vec(),
                laned: assign_lanes_with(events, &self.calendar, self.strategy),
            });
        }
        self.cached
            .as_ref()
            .map(|cached| cached.laned.as_slice())
            .unwrap_or_default()
    }

    pub fn invalidate(&mut self) {
        self.cached = None;
    }
}

fn content_hash(events: &[Event]) -> u64 {
    let mut hasher = DefaultHasher::new();
    events.hash(&mut hasher);
    hasher.finish()
}
