//! Range matching for calendar events.
//!
//! The matching functions are pure filters: they never mutate their inputs,
//! preserve the original event order, and always produce the same output for
//! the same input. All comparisons are day-granularity on UTC calendar days.

use chrono::NaiveDate;

use crate::error::CoreResult;
use crate::event::Event;
use crate::time::DateRange;

/// Returns the events whose day interval intersects the query range.
///
/// An event matches when any of the following hold:
///
/// 1. its start day falls within `[from, to]`, or
/// 2. its end day falls within `[from, to]`, or
/// 3. its start day is on or before `from` AND its end day is on or after
///    `to` — the event fully spans the query range.
///
/// Clause 3 is what catches long-running events that start before the window
/// and end after it; neither endpoint falls inside the range, so clauses 1-2
/// alone would miss them.
pub fn events_in_range<'a>(events: &'a [Event], range: &DateRange) -> Vec<&'a Event> {
    events
        .iter()
        .filter(|event| overlaps(event, range))
        .collect()
}

/// Returns the events covering a single day.
///
/// Degenerate case of the range policy with `from = to = day`: an event
/// matches when `start_day <= day <= end_day`, inclusive on both ends.
/// This is the primitive the grid builder calls once per cell.
pub fn events_on_day<'a>(events: &'a [Event], day: NaiveDate) -> Vec<&'a Event> {
    events.iter().filter(|event| event.covers_day(day)).collect()
}

/// Fail-fast invariant check for a batch of events.
///
/// Events constructed through [`Event::new`] are always valid; this is for
/// callers holding events from an unvalidated path (deserialization).
///
/// # Errors
///
/// Returns the first [`crate::CoreError::InvalidEvent`] encountered.
pub fn validate_events(events: &[Event]) -> CoreResult<()> {
    events.iter().try_for_each(Event::validate)
}

fn overlaps(event: &Event, range: &DateRange) -> bool {
    range.contains(event.start_day())
        || range.contains(event.end_day())
        || event.spans_range(range)
}
