//! In-memory event store.
//!
//! The store is the CRUD collaborator of the scheduling engine: it owns the
//! events, mints their ids, and offers a coarse day-window pre-filter. The
//! engine's matcher remains the source of truth for exact range semantics;
//! [`EventStore::list_overlapping`] simply delegates to it.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use calgrid_core::{CoreError, DateRange, Event, events_in_range};
use calgrid_protocol::EventDraft;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur in the event store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No event with the given id.
    #[error("event not found: {id}")]
    NotFound { id: String },

    /// The event body failed validation.
    #[error(transparent)]
    Invalid(#[from] CoreError),
}

impl StoreError {
    /// Creates a not found error.
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }
}

/// In-memory event collection keyed by id.
#[derive(Debug, Default)]
pub struct EventStore {
    events: HashMap<String, Event>,
    last_modified: Option<DateTime<Utc>>,
}

impl EventStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates a draft and stores it under a freshly minted id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Invalid`] if the draft violates the event
    /// invariants.
    pub fn create(&mut self, draft: EventDraft) -> StoreResult<Event> {
        let id = Uuid::new_v4().to_string();
        let event = draft.into_event(&id)?;
        self.events.insert(id.clone(), event.clone());
        self.touch();
        debug!(id = %id, title = %event.title, "Created event");
        Ok(event)
    }

    /// Fetches an event by id.
    pub fn get(&self, id: &str) -> Option<&Event> {
        self.events.get(id)
    }

    /// Replaces an existing event's body, keeping its id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for an unknown id, or
    /// [`StoreError::Invalid`] if the new body fails validation.
    pub fn update(&mut self, id: &str, draft: EventDraft) -> StoreResult<Event> {
        if !self.events.contains_key(id) {
            return Err(StoreError::not_found(id));
        }
        let event = draft.into_event(id)?;
        self.events.insert(id.to_string(), event.clone());
        self.touch();
        debug!(id = %id, "Updated event");
        Ok(event)
    }

    /// Removes an event by id, returning it.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for an unknown id.
    pub fn delete(&mut self, id: &str) -> StoreResult<Event> {
        let event = self
            .events
            .remove(id)
            .ok_or_else(|| StoreError::not_found(id))?;
        self.touch();
        debug!(id = %id, "Deleted event");
        Ok(event)
    }

    /// All events as a snapshot, sorted by start time ascending.
    pub fn list(&self) -> Vec<Event> {
        let mut events: Vec<Event> = self.events.values().cloned().collect();
        events.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.id.cmp(&b.id)));
        events
    }

    /// Snapshot of the events whose day interval intersects the range,
    /// sorted by start time ascending.
    pub fn list_overlapping(&self, range: &DateRange) -> Vec<Event> {
        let all = self.list();
        events_in_range(&all, range).into_iter().cloned().collect()
    }

    /// Number of stored events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns true if the store holds no events.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// When the store was last mutated.
    pub fn last_modified(&self) -> Option<DateTime<Utc>> {
        self.last_modified
    }

    fn touch(&mut self) {
        self.last_modified = Some(Utc::now());
    }
}
