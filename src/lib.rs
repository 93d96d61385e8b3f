//! EventManager - HTTP service for scheduling and browsing events
//!
//! EventManager stores events (name, description, date, location) in SQLite
//! and exposes them over a small JSON API with filtering and pagination.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                 Event API                     │
//! │  axum router: POST / GET / DELETE /events     │
//! └──────────────────────┬───────────────────────┘
//!                        │
//! ┌──────────────────────▼───────────────────────┐
//! │               Event Service                   │
//! │  - validate input                             │
//! │  - reject events not dated in the future      │
//! └──────────────────────┬───────────────────────┘
//!                        │
//! ┌──────────────────────▼───────────────────────┐
//! │                Event Store                    │
//! │  SQLite via r2d2 pool, id assignment,         │
//! │  filter / sort / paginate                     │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`api`]: top-level router, health probe, CORS
//! - [`events`]: event types, validation, service, store and handlers
//! - [`db`]: connection pool and schema migrations
//! - [`server`]: listener and graceful shutdown
//! - [`config`]: configuration management

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod events;
pub mod server;

pub use config::EventManagerConfig;
pub use error::{Error, Result};
