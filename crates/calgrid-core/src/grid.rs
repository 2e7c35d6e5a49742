//! Month grid construction.
//!
//! [`MonthGrid::build`] lays a set of events out on a rectangular calendar
//! grid: one [`DayCell`] per position, leading and trailing blanks aligning
//! day 1 to its Sunday-start weekday column and padding the final row to a
//! full week. The builder is a pure function of its parameters; the displayed
//! month, selected day, and "today" all arrive as arguments, never from
//! ambient state.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::event::Event;
use crate::matcher::events_on_day;
use crate::time::MonthRef;

/// Default number of events shown per day cell before overflowing.
pub const DEFAULT_DISPLAY_LIMIT: usize = 3;

/// Options controlling grid construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridOptions {
    /// Maximum events kept per cell; the rest become `overflow_count`.
    pub display_limit: usize,
}

impl Default for GridOptions {
    fn default() -> Self {
        Self {
            display_limit: DEFAULT_DISPLAY_LIMIT,
        }
    }
}

impl GridOptions {
    /// Creates options with the given display limit.
    pub fn with_display_limit(display_limit: usize) -> Self {
        Self { display_limit }
    }
}

/// One position on the month grid.
///
/// Blank cells (leading/trailing padding) have no `date` and never carry
/// events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayCell {
    /// The calendar day, or `None` for a blank padding cell.
    pub date: Option<NaiveDate>,
    /// Whether this cell is the caller's "today".
    pub is_today: bool,
    /// Whether this cell is the caller's selected day.
    pub is_selected: bool,
    /// Events covering this day, start-ascending, capped at the display limit.
    pub events: Vec<Event>,
    /// Matching events beyond the display limit.
    pub overflow_count: usize,
}

impl DayCell {
    fn blank() -> Self {
        Self {
            date: None,
            is_today: false,
            is_selected: false,
            events: Vec::new(),
            overflow_count: 0,
        }
    }

    /// Returns true for leading/trailing padding cells.
    pub fn is_blank(&self) -> bool {
        self.date.is_none()
    }

    /// Total events covering this day, including overflowed ones.
    pub fn total_events(&self) -> usize {
        self.events.len() + self.overflow_count
    }
}

/// A month of events laid out as a rectangular week grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthGrid {
    month: MonthRef,
    cells: Vec<DayCell>,
}

impl MonthGrid {
    /// Builds the grid for `month` from an event snapshot.
    ///
    /// Cells are emitted in order: `month.leading_blanks()` blank cells, one
    /// dated cell per day of the month, then blanks padding the last row to
    /// a multiple of seven. Each dated cell holds the events covering that
    /// day sorted by start time ascending, truncated to
    /// `options.display_limit` with the remainder in `overflow_count`.
    ///
    /// `today` and `selected_day` only set the corresponding cell flags;
    /// they never affect which events match.
    pub fn build(
        events: &[Event],
        month: MonthRef,
        selected_day: Option<NaiveDate>,
        today: NaiveDate,
        options: &GridOptions,
    ) -> Self {
        let leading = month.leading_blanks();
        let days = month.days_in_month();
        let mut cells = Vec::with_capacity(leading + days as usize + 6);

        cells.extend(std::iter::repeat_with(DayCell::blank).take(leading));

        for day in 1..=days {
            let date = NaiveDate::from_ymd_opt(month.year(), month.month(), day)
                .expect("validated month and in-range day");

            let mut matched: Vec<Event> =
                events_on_day(events, date).into_iter().cloned().collect();
            matched.sort_by_key(|event| event.start);

            let total = matched.len();
            matched.truncate(options.display_limit);

            cells.push(DayCell {
                date: Some(date),
                is_today: date == today,
                is_selected: selected_day == Some(date),
                overflow_count: total - matched.len(),
                events: matched,
            });
        }

        while cells.len() % 7 != 0 {
            cells.push(DayCell::blank());
        }

        Self { month, cells }
    }

    /// The month this grid was built for.
    pub fn month(&self) -> MonthRef {
        self.month
    }

    /// All cells in row-major order; length is always a multiple of seven.
    pub fn cells(&self) -> &[DayCell] {
        &self.cells
    }

    /// Number of week rows.
    pub fn week_count(&self) -> usize {
        self.cells.len() / 7
    }

    /// Iterates over the grid one week row at a time.
    pub fn weeks(&self) -> impl Iterator<Item = &[DayCell]> {
        self.cells.chunks(7)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn event(id: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Event {
        Event::new(id, format!("Event {id}"), start, end, "#000000").unwrap()
    }

    fn month(year: i32, month_no: u32) -> MonthRef {
        MonthRef::new(year, month_no).unwrap()
    }

    fn build(events: &[Event], m: MonthRef) -> MonthGrid {
        MonthGrid::build(events, m, None, date(2020, 1, 1), &GridOptions::default())
    }

    fn cell<'a>(grid: &'a MonthGrid, day: NaiveDate) -> &'a DayCell {
        grid.cells()
            .iter()
            .find(|c| c.date == Some(day))
            .expect("day cell present")
    }

    #[test]
    fn february_2024_shape() {
        // Leap year, 29 days, starts on a Thursday: 4 leading blanks,
        // 29 dated cells, 2 trailing blanks, 5 week rows.
        let grid = build(&[], month(2024, 2));

        assert_eq!(grid.cells().len(), 35);
        assert_eq!(grid.week_count(), 5);

        let blanks = grid.cells().iter().filter(|c| c.is_blank()).count();
        let dated = grid.cells().iter().filter(|c| !c.is_blank()).count();
        assert_eq!(dated, 29);
        assert_eq!(blanks, 6);

        assert!(grid.cells()[..4].iter().all(DayCell::is_blank));
        assert_eq!(grid.cells()[4].date, Some(date(2024, 2, 1)));
        assert!(grid.cells()[33..].iter().all(DayCell::is_blank));
    }

    #[test]
    fn grid_width_is_always_a_multiple_of_seven() {
        for (y, m) in [(2024, 1), (2024, 2), (2024, 6), (2024, 9), (2023, 2), (2026, 8)] {
            let grid = build(&[], month(y, m));
            assert_eq!(grid.cells().len() % 7, 0, "{y}-{m}");

            let dated = grid.cells().iter().filter(|c| !c.is_blank()).count();
            assert_eq!(dated as u32, month(y, m).days_in_month(), "{y}-{m}");
        }
    }

    #[test]
    fn month_with_no_trailing_blanks() {
        // June 2024: starts Saturday, 30 days, 6 + 30 = 36 -> pads to 42
        let grid = build(&[], month(2024, 6));
        assert_eq!(grid.cells().len(), 42);

        // September 2024: starts Sunday, 30 days -> 35 cells, 5 trailing blanks
        let grid = build(&[], month(2024, 9));
        assert_eq!(grid.cells().len(), 35);
        assert_eq!(grid.cells()[0].date, Some(date(2024, 9, 1)));
    }

    #[test]
    fn events_land_on_their_days() {
        let events = vec![
            event("a", utc(2024, 3, 15, 9, 0, 0), utc(2024, 3, 15, 10, 0, 0)),
            event("b", utc(2024, 3, 14, 12, 0, 0), utc(2024, 3, 16, 12, 0, 0)),
        ];
        let grid = build(&events, month(2024, 3));

        assert_eq!(cell(&grid, date(2024, 3, 14)).events.len(), 1);
        assert_eq!(cell(&grid, date(2024, 3, 15)).events.len(), 2);
        assert_eq!(cell(&grid, date(2024, 3, 16)).events.len(), 1);
        assert!(cell(&grid, date(2024, 3, 13)).events.is_empty());
    }

    #[test]
    fn cell_events_sorted_by_start_ascending() {
        let events = vec![
            event("late", utc(2024, 3, 15, 16, 0, 0), utc(2024, 3, 15, 17, 0, 0)),
            event("early", utc(2024, 3, 15, 8, 0, 0), utc(2024, 3, 15, 9, 0, 0)),
            event("noon", utc(2024, 3, 15, 12, 0, 0), utc(2024, 3, 15, 13, 0, 0)),
        ];
        let grid = build(&events, month(2024, 3));

        let ids: Vec<_> = cell(&grid, date(2024, 3, 15))
            .events
            .iter()
            .map(|e| e.id.as_str())
            .collect();
        assert_eq!(ids, vec!["early", "noon", "late"]);
    }

    #[test]
    fn overflow_beyond_display_limit() {
        // 5 events on one day with the default limit of 3
        let events: Vec<Event> = (0..5)
            .map(|i| {
                event(
                    &format!("evt-{i}"),
                    utc(2024, 3, 15, 8 + i, 0, 0),
                    utc(2024, 3, 15, 9 + i, 0, 0),
                )
            })
            .collect();
        let grid = build(&events, month(2024, 3));

        let c = cell(&grid, date(2024, 3, 15));
        assert_eq!(c.events.len(), 3);
        assert_eq!(c.overflow_count, 2);
        assert_eq!(c.total_events(), 5);
    }

    #[test]
    fn custom_display_limit() {
        let events: Vec<Event> = (0..4)
            .map(|i| {
                event(
                    &format!("evt-{i}"),
                    utc(2024, 3, 15, 8 + i, 0, 0),
                    utc(2024, 3, 15, 9 + i, 0, 0),
                )
            })
            .collect();
        let grid = MonthGrid::build(
            &events,
            month(2024, 3),
            None,
            date(2020, 1, 1),
            &GridOptions::with_display_limit(1),
        );

        let c = cell(&grid, date(2024, 3, 15));
        assert_eq!(c.events.len(), 1);
        assert_eq!(c.overflow_count, 3);
        assert_eq!(c.events[0].id, "evt-0");
    }

    #[test]
    fn no_overflow_when_under_limit() {
        let events = vec![event(
            "a",
            utc(2024, 3, 15, 9, 0, 0),
            utc(2024, 3, 15, 10, 0, 0),
        )];
        let grid = build(&events, month(2024, 3));

        let c = cell(&grid, date(2024, 3, 15));
        assert_eq!(c.events.len(), 1);
        assert_eq!(c.overflow_count, 0);
    }

    #[test]
    fn today_and_selected_flags() {
        let today = date(2024, 3, 15);
        let selected = date(2024, 3, 20);
        let grid = MonthGrid::build(
            &[],
            month(2024, 3),
            Some(selected),
            today,
            &GridOptions::default(),
        );

        assert!(cell(&grid, today).is_today);
        assert!(!cell(&grid, today).is_selected);
        assert!(cell(&grid, selected).is_selected);
        assert!(!cell(&grid, selected).is_today);

        let flagged_today = grid.cells().iter().filter(|c| c.is_today).count();
        let flagged_selected = grid.cells().iter().filter(|c| c.is_selected).count();
        assert_eq!(flagged_today, 1);
        assert_eq!(flagged_selected, 1);
    }

    #[test]
    fn flags_outside_month_never_set() {
        // today/selected in a different month: no cell gets flagged, and no
        // event is filtered out because of it
        let events = vec![event(
            "a",
            utc(2024, 3, 15, 9, 0, 0),
            utc(2024, 3, 15, 10, 0, 0),
        )];
        let grid = MonthGrid::build(
            &events,
            month(2024, 3),
            Some(date(2024, 4, 2)),
            date(2024, 4, 1),
            &GridOptions::default(),
        );

        assert!(grid.cells().iter().all(|c| !c.is_today && !c.is_selected));
        assert_eq!(cell(&grid, date(2024, 3, 15)).events.len(), 1);
    }

    #[test]
    fn rebuild_is_deterministic() {
        let events = vec![
            event("a", utc(2024, 3, 15, 9, 0, 0), utc(2024, 3, 15, 10, 0, 0)),
            event("b", utc(2024, 3, 1, 0, 0, 0), utc(2024, 3, 31, 23, 0, 0)),
        ];
        let m = month(2024, 3);
        let today = date(2024, 3, 15);

        let first = MonthGrid::build(&events, m, None, today, &GridOptions::default());
        let second = MonthGrid::build(&events, m, None, today, &GridOptions::default());
        assert_eq!(first, second);
    }

    #[test]
    fn weeks_iterator_rows() {
        let grid = build(&[], month(2024, 2));
        let weeks: Vec<_> = grid.weeks().collect();
        assert_eq!(weeks.len(), 5);
        assert!(weeks.iter().all(|w| w.len() == 7));
    }

    #[test]
    fn serde_roundtrip() {
        let events = vec![event(
            "a",
            utc(2024, 3, 15, 9, 0, 0),
            utc(2024, 3, 15, 10, 0, 0),
        )];
        let grid = build(&events, month(2024, 3));

        let json = serde_json::to_string(&grid).unwrap();
        let parsed: MonthGrid = serde_json::from_str(&json).unwrap();
        assert_eq!(grid, parsed);
    }
}
