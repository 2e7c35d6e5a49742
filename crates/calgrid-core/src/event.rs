//! The calendar event model.
//!
//! [`Event`] is the entity the matching and grid code operates on. Construction
//! enforces the `end > start` invariant; an `Event` obtained through
//! [`Event::new`] is always valid. Events deserialized from the wire bypass
//! the constructor and should be re-checked with [`Event::validate`] (or
//! [`crate::matcher::validate_events`]) at the boundary.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::time::DateRange;

/// A calendar event.
///
/// `start` and `end` are absolute UTC instants; day-granularity queries
/// compare their UTC calendar days only. On the wire the timestamps
/// serialize as ISO-8601 under `startDate`/`endDate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Opaque unique identifier.
    pub id: String,
    /// Event title, never empty.
    pub title: String,
    /// Optional free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// When the event starts.
    #[serde(rename = "startDate")]
    pub start: DateTime<Utc>,
    /// When the event ends, strictly after `start`.
    #[serde(rename = "endDate")]
    pub end: DateTime<Utc>,
    /// Display tag, opaque to the scheduling logic.
    pub color: String,
}

impl Event {
    /// Creates a new event.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidEvent`] if `end` is not strictly after
    /// `start`, or the title is empty.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        color: impl Into<String>,
    ) -> CoreResult<Self> {
        let event = Self {
            id: id.into(),
            title: title.into(),
            description: None,
            start,
            end,
            color: color.into(),
        };
        event.validate()?;
        Ok(event)
    }

    /// Builder method to set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Checks the event invariants.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidEvent`] if `end <= start` or the title
    /// is empty.
    pub fn validate(&self) -> CoreResult<()> {
        if self.title.is_empty() {
            return Err(CoreError::invalid_event(&self.id, "title must not be empty"));
        }
        if self.end <= self.start {
            return Err(CoreError::invalid_event(
                &self.id,
                "end must be strictly after start",
            ));
        }
        Ok(())
    }

    /// The UTC calendar day the event starts on.
    pub fn start_day(&self) -> NaiveDate {
        self.start.date_naive()
    }

    /// The UTC calendar day the event ends on.
    pub fn end_day(&self) -> NaiveDate {
        self.end.date_naive()
    }

    /// Checks whether the event covers the given day.
    ///
    /// A day is covered when `start_day <= day <= end_day`, inclusive on
    /// both ends; an event contained within a single calendar day covers
    /// exactly that day.
    pub fn covers_day(&self, day: NaiveDate) -> bool {
        self.start_day() <= day && day <= self.end_day()
    }

    /// Returns true if the event spans more than one calendar day.
    pub fn is_multi_day(&self) -> bool {
        self.start_day() != self.end_day()
    }

    /// Checks whether the event's day interval fully spans the given range.
    pub fn spans_range(&self, range: &DateRange) -> bool {
        self.start_day() <= range.from() && self.end_day() >= range.to()
    }
}
