//! Event service: business rules between the HTTP layer and the store

use crate::error::{Error, Result};
use crate::events::store::EventStore;
use crate::events::types::*;
use crate::events::validation;
use chrono::NaiveDate;
use std::sync::Arc;

/// Orchestrates validation, the future-date rule and store calls
#[derive(Clone)]
pub struct EventService {
    store: Arc<dyn EventStore>,
}

impl EventService {
    pub fn new(store: Arc<dyn EventStore>) -> Self {
        Self { store }
    }

    /// Validate and persist a new event.
    ///
    /// The date must be strictly after today's date in the server's local
    /// time zone.
    pub async fn create_event(&self, request: CreateEventRequest) -> Result<Event> {
        self.create_event_on(request, today()).await
    }

    async fn create_event_on(&self, request: CreateEventRequest, today: NaiveDate) -> Result<Event> {
        let event = validation::validate_create(request)?;
        if event.date <= today {
            return Err(Error::InvalidDate(
                "Event date must be in the future".to_string(),
            ));
        }

        let created = self.store.save(event).await?;
        tracing::info!(id = created.id, date = %created.date, "Created event");
        Ok(created)
    }

    /// List events, ordered by date ascending unless a sort is given
    pub async fn get_events(
        &self,
        page: u32,
        size: u32,
        name: Option<String>,
        location: Option<String>,
        sort: Option<Sort>,
    ) -> Result<Page<Event>> {
        let query = EventQuery {
            name,
            location,
            sort: sort.unwrap_or_default(),
            page,
            size,
        };
        tracing::debug!(?query, "Listing events");
        self.store.find_filtered(query).await
    }

    /// Delete an event, failing if it does not exist
    pub async fn delete_event(&self, id: i64) -> Result<()> {
        if !self.store.exists(id).await? {
            return Err(Error::EventNotFound(id));
        }
        self.store.delete_by_id(id).await?;
        tracing::info!(id, "Deleted event");
        Ok(())
    }

    /// Distinct locations of all stored events
    pub async fn list_locations(&self) -> Result<Vec<String>> {
        self.store.distinct_locations().await
    }
}

/// Current date on the server's local clock
fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}
