//! Events module — event lifecycle and listing
//!
//! Provides REST endpoints for creating, listing and deleting events.
//! Events are persisted in SQLite through the [`EventStore`] trait; the
//! [`EventService`] enforces that new events are dated in the future.

pub mod handler;
pub mod service;
pub mod store;
pub mod types;
pub mod validation;

pub use handler::{events_router, EventsState};
pub use service::EventService;
pub use store::{EventStore, SqliteEventStore};
pub use types::{Event, Page};
