//! SQLite plumbing shared by the event store
//!
//! - [`connection`]: r2d2 pool with per-connection pragmas and functions
//! - [`migrations`]: embedded, version-tracked schema migrations

pub mod connection;
pub mod migrations;

pub use connection::{new_file, new_in_memory, ConnectionPool, UNICODE_LOWER};
pub use migrations::{current_version, latest_version, run_migrations};
