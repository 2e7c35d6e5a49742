//! Request and response types for the calgrid protocol.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use calgrid_core::{CoreError, CoreResult, DateRange, Event, MonthGrid};

use crate::PROTOCOL_VERSION;

/// Default display tag assigned to events created without one.
pub const DEFAULT_EVENT_COLOR: &str = "#3b82f6";

/// Message envelope wrapping all protocol messages.
///
/// Every message exchanged between client and server is wrapped in this
/// envelope, which provides versioning and request correlation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope<T> {
    /// Protocol version (always "1" for v1).
    pub protocol_version: String,
    /// Unique request ID for correlation.
    pub request_id: String,
    /// The actual payload.
    pub payload: T,
}

impl<T> Envelope<T> {
    /// Creates a new envelope with the current protocol version.
    pub fn new(request_id: impl Into<String>, payload: T) -> Self {
        Self {
            protocol_version: PROTOCOL_VERSION.to_string(),
            request_id: request_id.into(),
            payload,
        }
    }

    /// Creates a request envelope.
    pub fn request(request_id: impl Into<String>, request: T) -> Self {
        Self::new(request_id, request)
    }

    /// Creates a response envelope.
    pub fn response(request_id: impl Into<String>, response: T) -> Self {
        Self::new(request_id, response)
    }

    /// Checks if this envelope uses a compatible protocol version.
    pub fn is_compatible(&self) -> bool {
        self.protocol_version == PROTOCOL_VERSION
    }
}

/// The wire shape of an event body, without an identity.
///
/// Timestamps travel as ISO-8601 strings under `startDate`/`endDate`.
/// A draft is not validated until it is turned into a core [`Event`]
/// at the server boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDraft {
    /// Event title.
    pub title: String,
    /// Optional free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// When the event starts.
    #[serde(rename = "startDate")]
    pub start: DateTime<Utc>,
    /// When the event ends.
    #[serde(rename = "endDate")]
    pub end: DateTime<Utc>,
    /// Display tag.
    #[serde(default = "default_color")]
    pub color: String,
}

fn default_color() -> String {
    DEFAULT_EVENT_COLOR.to_string()
}

impl EventDraft {
    /// Creates a draft with the default color and no description.
    pub fn new(title: impl Into<String>, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            title: title.into(),
            description: None,
            start,
            end,
            color: default_color(),
        }
    }

    /// Builder method to set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Builder method to set the color.
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    /// Validates the draft into a core event under the given identity.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidEvent`] if the draft violates the event
    /// invariants (`end > start`, non-empty title).
    pub fn into_event(self, id: impl Into<String>) -> CoreResult<Event> {
        let event = Event::new(id, self.title, self.start, self.end, self.color)?;
        Ok(match self.description {
            Some(description) => event.with_description(description),
            None => event,
        })
    }

    /// Creates a draft mirroring an existing event's body.
    pub fn from_event(event: &Event) -> Self {
        Self {
            title: event.title.clone(),
            description: event.description.clone(),
            start: event.start,
            end: event.end,
            color: event.color.clone(),
        }
    }
}

/// ISO-8601 day-window query parameters, the wire form of a [`DateRange`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeQuery {
    /// First day of the window (inclusive).
    #[serde(rename = "startDate")]
    pub start: NaiveDate,
    /// Last day of the window (inclusive).
    #[serde(rename = "endDate")]
    pub end: NaiveDate,
}

impl RangeQuery {
    /// Creates a new range query.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Validates into a core range.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidRange`] if `start` is after `end`.
    pub fn to_range(self) -> CoreResult<DateRange> {
        DateRange::new(self.start, self.end)
    }
}

impl From<DateRange> for RangeQuery {
    fn from(range: DateRange) -> Self {
        Self {
            start: range.from(),
            end: range.to(),
        }
    }
}

/// Request types that can be sent from client to server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Request {
    /// List events, optionally restricted to a day window.
    ListEvents {
        /// Day window to match against; all events when absent.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        range: Option<RangeQuery>,
    },

    /// Fetch a single event by id.
    GetEvent {
        /// Event identifier.
        id: String,
    },

    /// Create a new event from a draft.
    CreateEvent {
        /// The event body.
        draft: EventDraft,
    },

    /// Replace an existing event's body.
    UpdateEvent {
        /// Event identifier.
        id: String,
        /// The new event body.
        draft: EventDraft,
    },

    /// Delete an event by id.
    DeleteEvent {
        /// Event identifier.
        id: String,
    },

    /// Build the month grid for a year+month.
    MonthGrid {
        /// Calendar year.
        year: i32,
        /// Calendar month (1-12).
        month: u32,
        /// Day to flag as selected on the grid.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        selected_day: Option<NaiveDate>,
        /// Per-cell event cap; server default when absent.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        display_limit: Option<usize>,
    },

    /// Get server status.
    Status,

    /// Ping to check server liveness.
    Ping,

    /// Request server shutdown.
    Shutdown,
}

impl Request {
    /// Creates a ListEvents request with no window.
    pub fn list_events() -> Self {
        Self::ListEvents { range: None }
    }

    /// Creates a ListEvents request restricted to a day window.
    pub fn list_events_in(range: RangeQuery) -> Self {
        Self::ListEvents { range: Some(range) }
    }

    /// Creates a GetEvent request.
    pub fn get_event(id: impl Into<String>) -> Self {
        Self::GetEvent { id: id.into() }
    }

    /// Creates a CreateEvent request.
    pub fn create_event(draft: EventDraft) -> Self {
        Self::CreateEvent { draft }
    }

    /// Creates an UpdateEvent request.
    pub fn update_event(id: impl Into<String>, draft: EventDraft) -> Self {
        Self::UpdateEvent {
            id: id.into(),
            draft,
        }
    }

    /// Creates a DeleteEvent request.
    pub fn delete_event(id: impl Into<String>) -> Self {
        Self::DeleteEvent { id: id.into() }
    }

    /// Creates a MonthGrid request with server-side defaults.
    pub fn month_grid(year: i32, month: u32) -> Self {
        Self::MonthGrid {
            year,
            month,
            selected_day: None,
            display_limit: None,
        }
    }
}

/// Response types that can be sent from server to client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    /// A list of events.
    Events {
        /// Matching events, start-ascending.
        events: Vec<Event>,
    },

    /// A single event.
    Event {
        /// The event.
        event: Event,
    },

    /// A month grid.
    Grid {
        /// The constructed grid.
        grid: MonthGrid,
    },

    /// Server status information.
    Status {
        /// Status details.
        #[serde(flatten)]
        info: StatusInfo,
    },

    /// Generic success response.
    Ok,

    /// Pong response to Ping.
    Pong,

    /// Error response.
    Error {
        /// Error details.
        #[serde(flatten)]
        error: ErrorResponse,
    },
}

impl Response {
    /// Creates an Events response.
    pub fn events(events: Vec<Event>) -> Self {
        Self::Events { events }
    }

    /// Creates an Event response.
    pub fn event(event: Event) -> Self {
        Self::Event { event }
    }

    /// Creates a Grid response.
    pub fn grid(grid: MonthGrid) -> Self {
        Self::Grid { grid }
    }

    /// Creates a Status response.
    pub fn status(info: StatusInfo) -> Self {
        Self::Status { info }
    }

    /// Creates an Error response.
    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Error {
            error: ErrorResponse {
                code,
                message: message.into(),
            },
        }
    }

    /// Creates an error response from an ErrorResponse.
    pub fn from_error(error: ErrorResponse) -> Self {
        Self::Error { error }
    }

    /// Returns true if this is a success response.
    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Error { .. })
    }

    /// Returns the error if this is an error response.
    pub fn as_error(&self) -> Option<&ErrorResponse> {
        match self {
            Self::Error { error } => Some(error),
            _ => None,
        }
    }
}

/// Server status information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusInfo {
    /// Server uptime in seconds.
    pub uptime_seconds: u64,

    /// Number of events in the store.
    pub event_count: usize,

    /// When the store was last mutated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<DateTime<Utc>>,
}

impl StatusInfo {
    /// Creates a new StatusInfo.
    pub fn new(uptime_seconds: u64, event_count: usize) -> Self {
        Self {
            uptime_seconds,
            event_count,
            last_modified: None,
        }
    }

    /// Builder: set last_modified.
    pub fn with_last_modified(mut self, at: DateTime<Utc>) -> Self {
        self.last_modified = Some(at);
        self
    }
}

/// Error codes for protocol errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Unknown or internal error.
    InternalError,

    /// Invalid request format.
    InvalidRequest,

    /// Query range with start after end.
    InvalidRange,

    /// Month outside 1-12.
    InvalidMonth,

    /// Event body violating its invariants.
    InvalidEvent,

    /// Requested event not found.
    NotFound,

    /// Server is shutting down.
    ShuttingDown,
}

impl ErrorCode {
    /// Returns a human-readable description of the error code.
    pub fn description(&self) -> &'static str {
        match self {
            Self::InternalError => "An internal error occurred",
            Self::InvalidRequest => "The request was invalid",
            Self::InvalidRange => "The query range is inverted",
            Self::InvalidMonth => "The month is out of range",
            Self::InvalidEvent => "The event body is invalid",
            Self::NotFound => "Requested event not found",
            Self::ShuttingDown => "Server is shutting down",
        }
    }
}

/// Error response details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code.
    pub code: ErrorCode,
    /// Human-readable error message.
    pub message: String,
}

impl ErrorResponse {
    /// Creates a new error response.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// Creates an invalid request error.
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidRequest, message)
    }

    /// Creates a not found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }
}

impl From<CoreError> for ErrorResponse {
    fn from(err: CoreError) -> Self {
        let code = match err {
            CoreError::InvalidRange { .. } => ErrorCode::InvalidRange,
            CoreError::InvalidMonth { .. } => ErrorCode::InvalidMonth,
            CoreError::InvalidEvent { .. } => ErrorCode::InvalidEvent,
        };
        Self::new(code, err.to_string())
    }
}

impl std::fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code.description(), self.message)
    }
}

impl std::error::Error for ErrorResponse {}
