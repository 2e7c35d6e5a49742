//! Core types: calendar days, events, range matching, month grids

pub mod error;
pub mod event;
pub mod grid;
pub mod matcher;
pub mod time;
pub mod tracing;

pub use error::{CoreError, CoreResult};
pub use event::Event;
pub use grid::{DEFAULT_DISPLAY_LIMIT, DayCell, GridOptions, MonthGrid};
pub use matcher::{events_in_range, events_on_day, validate_events};
pub use time::{DateRange, MonthRef};
pub use tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};
