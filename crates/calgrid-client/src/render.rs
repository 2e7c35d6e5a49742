//! Plain-text rendering of events and month grids.
//!
//! The grid renderer prints seven columns per week row: the day number,
//! `[..]` around today, `<..>` around the selected day, and a `*` marker on
//! days with events. Below the grid, one legend line per non-empty day lists
//! the displayed event titles and the overflow count.

use std::fmt::Write;

use chrono::Datelike;

use calgrid_core::{DayCell, Event, MonthGrid};

const WEEKDAY_HEADER: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// Returns the English name of a month (1-12).
pub fn month_name(month: u32) -> &'static str {
    match month {
        1 => "January",
        2 => "February",
        3 => "March",
        4 => "April",
        5 => "May",
        6 => "June",
        7 => "July",
        8 => "August",
        9 => "September",
        10 => "October",
        11 => "November",
        _ => "December",
    }
}

/// Renders a one-line summary of an event.
pub fn render_event_line(event: &Event) -> String {
    format!(
        "{}  {} .. {}  {}",
        event.id,
        event.start.format("%Y-%m-%d %H:%M"),
        event.end.format("%Y-%m-%d %H:%M"),
        event.title
    )
}

/// Renders a list of events, one line each.
pub fn render_events(events: &[Event]) -> String {
    if events.is_empty() {
        return "No events".to_string();
    }
    events
        .iter()
        .map(render_event_line)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Renders the full detail view of a single event.
pub fn render_event(event: &Event) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "id:     {}", event.id);
    let _ = writeln!(out, "title:  {}", event.title);
    let _ = writeln!(out, "start:  {}", event.start.format("%Y-%m-%d %H:%M:%S UTC"));
    let _ = writeln!(out, "end:    {}", event.end.format("%Y-%m-%d %H:%M:%S UTC"));
    let _ = writeln!(out, "color:  {}", event.color);
    if let Some(ref description) = event.description {
        let _ = writeln!(out, "notes:  {description}");
    }
    out.trim_end().to_string()
}

fn cell_token(cell: &DayCell) -> String {
    let Some(date) = cell.date else {
        return "     ".to_string();
    };
    let day = format!("{:>2}", date.day());
    let framed = if cell.is_today {
        format!("[{day}]")
    } else if cell.is_selected {
        format!("<{day}>")
    } else {
        format!(" {day} ")
    };
    if cell.total_events() > 0 {
        format!("{framed}*")
    } else {
        format!("{framed} ")
    }
}

fn legend_line(cell: &DayCell) -> Option<String> {
    let date = cell.date?;
    if cell.total_events() == 0 {
        return None;
    }

    let titles: Vec<&str> = cell.events.iter().map(|e| e.title.as_str()).collect();
    let mut line = format!("{:>3}  {}", date.day(), titles.join(", "));
    if cell.overflow_count > 0 {
        let _ = write!(line, " (+{} more)", cell.overflow_count);
    }
    Some(line)
}

/// Renders a month grid as plain text.
pub fn render_grid(grid: &MonthGrid) -> String {
    let month = grid.month();
    let mut out = String::new();

    let title = format!("{} {}", month_name(month.month()), month.year());
    let _ = writeln!(out, "{title:^42}");
    let _ = writeln!(
        out,
        "{}",
        WEEKDAY_HEADER.map(|name| format!("{name:^6}")).join("")
    );

    for week in grid.weeks() {
        let row: String = week.iter().map(|cell| cell_token(cell) + " ").collect();
        let _ = writeln!(out, "{}", row.trim_end());
    }

    let legend: Vec<String> = grid.cells().iter().filter_map(legend_line).collect();
    if !legend.is_empty() {
        let _ = writeln!(out);
        for line in legend {
            let _ = writeln!(out, "{line}");
        }
    }

    out.trim_end().to_string()
}
