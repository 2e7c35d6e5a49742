//! Request/response dispatch handler.
//!
//! Routes incoming protocol requests to the event store and the scheduling
//! engine, translating store and engine failures into protocol error codes.
//! Query requests clone a snapshot of the matching events out of the store
//! before handing it to the pure engine, so grid construction never runs
//! against a collection that a concurrent write could mutate.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use calgrid_core::{GridOptions, MonthGrid, MonthRef};
use calgrid_protocol::{ErrorResponse, Request, Response, StatusInfo};

use crate::error::{ServerError, ServerResult};
use crate::socket::Connection;
use crate::store::{EventStore, StoreError};

impl From<StoreError> for ErrorResponse {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { ref id } => {
                ErrorResponse::not_found(format!("event not found: {id}"))
            }
            StoreError::Invalid(core) => core.into(),
        }
    }
}

/// Server state shared across all connections.
#[derive(Debug)]
pub struct ServerState {
    /// Server start time.
    start_time: DateTime<Utc>,
    /// The event store.
    store: EventStore,
    /// Whether shutdown has been requested.
    shutdown_requested: bool,
}

impl Default for ServerState {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerState {
    /// Creates a new server state with an empty store.
    pub fn new() -> Self {
        Self {
            start_time: Utc::now(),
            store: EventStore::new(),
            shutdown_requested: false,
        }
    }

    /// Returns the server uptime in seconds.
    pub fn uptime_seconds(&self) -> u64 {
        let duration = Utc::now() - self.start_time;
        duration.num_seconds().max(0) as u64
    }

    /// Returns the status info.
    pub fn status_info(&self) -> StatusInfo {
        let info = StatusInfo::new(self.uptime_seconds(), self.store.len());
        match self.store.last_modified() {
            Some(at) => info.with_last_modified(at),
            None => info,
        }
    }

    /// Shared access to the event store.
    pub fn store(&self) -> &EventStore {
        &self.store
    }

    /// Mutable access to the event store.
    pub fn store_mut(&mut self) -> &mut EventStore {
        &mut self.store
    }

    /// Requests a shutdown.
    pub fn request_shutdown(&mut self) {
        self.shutdown_requested = true;
    }

    /// Returns true if shutdown has been requested.
    pub fn shutdown_requested(&self) -> bool {
        self.shutdown_requested
    }
}

/// Shared server state wrapped in an `Arc<RwLock>`.
pub type SharedState = Arc<RwLock<ServerState>>;

/// Creates a new shared state.
pub fn new_shared_state() -> SharedState {
    Arc::new(RwLock::new(ServerState::new()))
}

/// Request handler that processes incoming requests and produces responses.
pub struct RequestHandler {
    state: SharedState,
}

impl RequestHandler {
    /// Creates a new request handler with the given state.
    pub fn new(state: SharedState) -> Self {
        Self { state }
    }

    /// Handles a single request and returns the response.
    pub async fn handle(&self, request: &Request) -> Response {
        match request {
            Request::Ping => {
                debug!("Handling Ping request");
                Response::Pong
            }
            Request::Status => {
                debug!("Handling Status request");
                let state = self.state.read().await;
                Response::status(state.status_info())
            }
            Request::ListEvents { range } => {
                debug!(?range, "Handling ListEvents request");
                let state = self.state.read().await;
                let events = match range {
                    Some(query) => match query.to_range() {
                        Ok(range) => state.store().list_overlapping(&range),
                        Err(err) => return Response::from_error(err.into()),
                    },
                    None => state.store().list(),
                };
                debug!(event_count = events.len(), "Returning events");
                Response::events(events)
            }
            Request::GetEvent { id } => {
                debug!(id = %id, "Handling GetEvent request");
                let state = self.state.read().await;
                match state.store().get(id) {
                    Some(event) => Response::event(event.clone()),
                    None => Response::from_error(StoreError::not_found(id).into()),
                }
            }
            Request::CreateEvent { draft } => {
                debug!(title = %draft.title, "Handling CreateEvent request");
                let mut state = self.state.write().await;
                match state.store_mut().create(draft.clone()) {
                    Ok(event) => {
                        info!(id = %event.id, "Event created");
                        Response::event(event)
                    }
                    Err(err) => {
                        warn!(error = %err, "Event creation rejected");
                        Response::from_error(err.into())
                    }
                }
            }
            Request::UpdateEvent { id, draft } => {
                debug!(id = %id, "Handling UpdateEvent request");
                let mut state = self.state.write().await;
                match state.store_mut().update(id, draft.clone()) {
                    Ok(event) => Response::event(event),
                    Err(err) => Response::from_error(err.into()),
                }
            }
            Request::DeleteEvent { id } => {
                debug!(id = %id, "Handling DeleteEvent request");
                let mut state = self.state.write().await;
                match state.store_mut().delete(id) {
                    Ok(event) => {
                        info!(id = %event.id, "Event deleted");
                        Response::Ok
                    }
                    Err(err) => Response::from_error(err.into()),
                }
            }
            Request::MonthGrid {
                year,
                month,
                selected_day,
                display_limit,
            } => {
                debug!(year = *year, month = *month, "Handling MonthGrid request");
                let month = match MonthRef::new(*year, *month) {
                    Ok(month) => month,
                    Err(err) => return Response::from_error(err.into()),
                };

                let state = self.state.read().await;
                // Immutable snapshot of the month's events for the pure builder
                let events = state.store().list_overlapping(&month.to_range());
                drop(state);

                let options = display_limit
                    .map(GridOptions::with_display_limit)
                    .unwrap_or_default();
                let today = Utc::now().date_naive();
                let grid = MonthGrid::build(&events, month, *selected_day, today, &options);

                debug!(
                    month = %month,
                    cells = grid.cells().len(),
                    "Returning month grid"
                );
                Response::grid(grid)
            }
            Request::Shutdown => {
                info!("Handling Shutdown request");
                let mut state = self.state.write().await;
                state.request_shutdown();
                Response::Ok
            }
        }
    }

    /// Handles a connection, processing requests until the peer disconnects.
    pub async fn handle_connection(&self, mut conn: Connection) -> ServerResult<()> {
        loop {
            match conn.read_request().await {
                Ok(Some(envelope)) => {
                    let response = self.handle(&envelope.payload).await;
                    conn.respond(&envelope.request_id, response).await?;

                    if self.state.read().await.shutdown_requested() {
                        return Err(ServerError::Shutdown);
                    }
                }
                Ok(None) => {
                    debug!("Client disconnected");
                    return Ok(());
                }
                Err(e) => {
                    warn!(error = %e, "Error reading request");
                    return Err(e);
                }
            }
        }
    }
}

/// Creates a connection handler function for use with `SocketServer::run`.
pub fn make_connection_handler(
    state: SharedState,
) -> impl Fn(Connection) -> std::pin::Pin<Box<dyn std::future::Future<Output = ()> + Send>>
+ Send
+ Sync
+ 'static {
    move |conn| {
        let handler = RequestHandler::new(state.clone());
        Box::pin(async move {
            if let Err(e) = handler.handle_connection(conn).await
                && !matches!(e, ServerError::Shutdown)
            {
                warn!(error = %e, "Connection handler error");
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calgrid_protocol::{ErrorCode, EventDraft, RangeQuery};
    use chrono::{NaiveDate, TimeZone};

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn draft(title: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> EventDraft {
        EventDraft::new(title, start, end)
    }

    async fn create(handler: &RequestHandler, d: EventDraft) -> calgrid_core::Event {
        match handler.handle(&Request::create_event(d)).await {
            Response::Event { event } => event,
            other => panic!("expected Event response, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn ping_pong() {
        let handler = RequestHandler::new(new_shared_state());
        assert_eq!(handler.handle(&Request::Ping).await, Response::Pong);
    }

    #[tokio::test]
    async fn status_reports_event_count() {
        let handler = RequestHandler::new(new_shared_state());
        create(
            &handler,
            draft(
                "Standup",
                utc(2024, 3, 15, 9, 0, 0),
                utc(2024, 3, 15, 10, 0, 0),
            ),
        )
        .await;

        match handler.handle(&Request::Status).await {
            Response::Status { info } => {
                assert!(info.uptime_seconds < 2);
                assert_eq!(info.event_count, 1);
                assert!(info.last_modified.is_some());
            }
            other => panic!("expected Status response, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn crud_lifecycle() {
        let handler = RequestHandler::new(new_shared_state());

        let created = create(
            &handler,
            draft(
                "Standup",
                utc(2024, 3, 15, 9, 0, 0),
                utc(2024, 3, 15, 10, 0, 0),
            ),
        )
        .await;

        // Read it back
        match handler.handle(&Request::get_event(&created.id)).await {
            Response::Event { event } => assert_eq!(event, created),
            other => panic!("expected Event response, got {other:?}"),
        }

        // Update
        let updated_draft = draft(
            "Standup (moved)",
            utc(2024, 3, 15, 11, 0, 0),
            utc(2024, 3, 15, 12, 0, 0),
        );
        match handler
            .handle(&Request::update_event(&created.id, updated_draft))
            .await
        {
            Response::Event { event } => {
                assert_eq!(event.id, created.id);
                assert_eq!(event.title, "Standup (moved)");
            }
            other => panic!("expected Event response, got {other:?}"),
        }

        // Delete
        assert_eq!(
            handler.handle(&Request::delete_event(&created.id)).await,
            Response::Ok
        );

        // Gone now
        match handler.handle(&Request::get_event(&created.id)).await {
            Response::Error { error } => assert_eq!(error.code, ErrorCode::NotFound),
            other => panic!("expected Error response, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unknown_ids_are_not_found() {
        let handler = RequestHandler::new(new_shared_state());

        for request in [
            Request::get_event("missing"),
            Request::update_event(
                "missing",
                draft(
                    "Ghost",
                    utc(2024, 3, 15, 9, 0, 0),
                    utc(2024, 3, 15, 10, 0, 0),
                ),
            ),
            Request::delete_event("missing"),
        ] {
            match handler.handle(&request).await {
                Response::Error { error } => assert_eq!(error.code, ErrorCode::NotFound),
                other => panic!("expected Error response, got {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn invalid_draft_rejected() {
        let handler = RequestHandler::new(new_shared_state());
        let bad = draft(
            "Backwards",
            utc(2024, 3, 15, 10, 0, 0),
            utc(2024, 3, 15, 9, 0, 0),
        );

        match handler.handle(&Request::create_event(bad)).await {
            Response::Error { error } => assert_eq!(error.code, ErrorCode::InvalidEvent),
            other => panic!("expected Error response, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn list_events_with_range() {
        let handler = RequestHandler::new(new_shared_state());
        create(
            &handler,
            draft(
                "March",
                utc(2024, 3, 11, 9, 0, 0),
                utc(2024, 3, 11, 10, 0, 0),
            ),
        )
        .await;
        create(
            &handler,
            draft(
                "April",
                utc(2024, 4, 5, 9, 0, 0),
                utc(2024, 4, 5, 10, 0, 0),
            ),
        )
        .await;

        let all = handler.handle(&Request::list_events()).await;
        match all {
            Response::Events { events } => assert_eq!(events.len(), 2),
            other => panic!("expected Events response, got {other:?}"),
        }

        let request = Request::list_events_in(RangeQuery::new(date(2024, 3, 10), date(2024, 3, 12)));
        match handler.handle(&request).await {
            Response::Events { events } => {
                assert_eq!(events.len(), 1);
                assert_eq!(events[0].title, "March");
            }
            other => panic!("expected Events response, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn list_events_inverted_range() {
        let handler = RequestHandler::new(new_shared_state());
        let request = Request::list_events_in(RangeQuery::new(date(2024, 3, 12), date(2024, 3, 10)));

        match handler.handle(&request).await {
            Response::Error { error } => assert_eq!(error.code, ErrorCode::InvalidRange),
            other => panic!("expected Error response, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn month_grid_shape_and_events() {
        let handler = RequestHandler::new(new_shared_state());
        create(
            &handler,
            draft(
                "Standup",
                utc(2024, 2, 15, 9, 0, 0),
                utc(2024, 2, 15, 10, 0, 0),
            ),
        )
        .await;

        match handler.handle(&Request::month_grid(2024, 2)).await {
            Response::Grid { grid } => {
                assert_eq!(grid.cells().len(), 35);
                let cell = grid
                    .cells()
                    .iter()
                    .find(|c| c.date == Some(date(2024, 2, 15)))
                    .unwrap();
                assert_eq!(cell.events.len(), 1);
            }
            other => panic!("expected Grid response, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn month_grid_invalid_month() {
        let handler = RequestHandler::new(new_shared_state());

        match handler.handle(&Request::month_grid(2024, 13)).await {
            Response::Error { error } => assert_eq!(error.code, ErrorCode::InvalidMonth),
            other => panic!("expected Error response, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn month_grid_respects_display_limit() {
        let handler = RequestHandler::new(new_shared_state());
        for i in 0..5u32 {
            create(
                &handler,
                draft(
                    &format!("Event {i}"),
                    utc(2024, 3, 15, 8 + i, 0, 0),
                    utc(2024, 3, 15, 9 + i, 0, 0),
                ),
            )
            .await;
        }

        let request = Request::MonthGrid {
            year: 2024,
            month: 3,
            selected_day: None,
            display_limit: Some(2),
        };
        match handler.handle(&request).await {
            Response::Grid { grid } => {
                let cell = grid
                    .cells()
                    .iter()
                    .find(|c| c.date == Some(date(2024, 3, 15)))
                    .unwrap();
                assert_eq!(cell.events.len(), 2);
                assert_eq!(cell.overflow_count, 3);
            }
            other => panic!("expected Grid response, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn shutdown_sets_flag() {
        let state = new_shared_state();
        let handler = RequestHandler::new(state.clone());

        assert_eq!(handler.handle(&Request::Shutdown).await, Response::Ok);
        assert!(state.read().await.shutdown_requested());
    }
}
