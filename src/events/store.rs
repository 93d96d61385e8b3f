//! Event persistence
//!
//! [`EventStore`] is the seam between the service and the database.
//! [`SqliteEventStore`] implements it over an r2d2 pool; every call runs on
//! tokio's blocking pool and issues a single statement (listing reads its
//! count and its page inside one read transaction). Name and location
//! filters match case-insensitively with Unicode case folding.

use crate::config::DatabaseConfig;
use crate::db::{self, ConnectionPool};
use crate::error::{Error, Result};
use crate::events::types::*;
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension, Row};

/// Durable storage for events
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Persist a new event and return it with its assigned id
    async fn save(&self, event: NewEvent) -> Result<Event>;

    /// Whether an event with this id exists
    async fn exists(&self, id: i64) -> Result<bool>;

    /// Remove an event; absent ids are a no-op
    async fn delete_by_id(&self, id: i64) -> Result<()>;

    /// Filter, sort and page events
    async fn find_filtered(&self, query: EventQuery) -> Result<Page<Event>>;

    /// Every distinct location, ascending
    async fn distinct_locations(&self) -> Result<Vec<String>>;
}

/// SQLite-backed event store
#[derive(Clone)]
pub struct SqliteEventStore {
    pool: ConnectionPool,
}

impl SqliteEventStore {
    /// Wrap an existing pool, applying pending migrations
    pub fn new(pool: ConnectionPool) -> Result<Self> {
        let conn = pool.get()?;
        let applied = db::run_migrations(&conn)?;
        if applied > 0 {
            tracing::info!("Applied {} schema migration(s)", applied);
        }
        drop(conn);
        Ok(Self { pool })
    }

    /// Open the database file named in the configuration
    pub fn open(config: &DatabaseConfig) -> Result<Self> {
        let pool = db::new_file(&config.path, config)?;
        tracing::info!("Using event database at {}", config.path.display());
        Self::new(pool)
    }

    /// Private in-memory database
    pub fn in_memory() -> Result<Self> {
        Self::new(db::new_in_memory()?)
    }

    /// Current schema version of the underlying database
    pub async fn schema_version(&self) -> Result<u32> {
        self.with_conn(|conn| db::current_version(conn)).await
    }

    async fn with_conn<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;
            f(&mut conn)
        })
        .await
        .map_err(|e| Error::Internal(format!("database task failed: {}", e)))?
    }
}

#[async_trait]
impl EventStore for SqliteEventStore {
    async fn save(&self, event: NewEvent) -> Result<Event> {
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO events (name, description, date, location) VALUES (?1, ?2, ?3, ?4)",
                params![event.name, event.description, event.date, event.location],
            )?;
            let id = conn.last_insert_rowid();
            Ok(event.with_id(id))
        })
        .await
    }

    async fn exists(&self, id: i64) -> Result<bool> {
        self.with_conn(move |conn| {
            let found = conn
                .query_row("SELECT 1 FROM events WHERE id = ?1", [id], |_| Ok(()))
                .optional()?;
            Ok(found.is_some())
        })
        .await
    }

    async fn delete_by_id(&self, id: i64) -> Result<()> {
        self.with_conn(move |conn| {
            conn.execute("DELETE FROM events WHERE id = ?1", [id])?;
            Ok(())
        })
        .await
    }

    async fn find_filtered(&self, query: EventQuery) -> Result<Page<Event>> {
        self.with_conn(move |conn| find_filtered(conn, &query)).await
    }

    async fn distinct_locations(&self) -> Result<Vec<String>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT DISTINCT location FROM events \
                 ORDER BY unicode_lower(location) ASC, location ASC",
            )?;
            let locations = stmt
                .query_map([], |row| row.get(0))?
                .collect::<rusqlite::Result<Vec<String>>>()?;
            Ok(locations)
        })
        .await
    }
}

// =============================================================================
// Queries
// =============================================================================

// `unicode_lower` is registered on every pooled connection.
const FILTER_CLAUSE: &str = "WHERE (?1 IS NULL OR instr(unicode_lower(name), unicode_lower(?1)) > 0) \
     AND (?2 IS NULL OR instr(unicode_lower(location), unicode_lower(?2)) > 0)";

fn find_filtered(conn: &mut Connection, query: &EventQuery) -> Result<Page<Event>> {
    let name = non_empty(query.name.as_deref());
    let location = non_empty(query.location.as_deref());

    let tx = conn.transaction()?;

    let total: i64 = tx.query_row(
        &format!("SELECT COUNT(*) FROM events {}", FILTER_CLAUSE),
        params![name, location],
        |row| row.get(0),
    )?;

    let sql = format!(
        "SELECT id, name, description, date, location FROM events {} \
         ORDER BY {}, id ASC LIMIT ?3 OFFSET ?4",
        FILTER_CLAUSE,
        order_terms(&query.sort),
    );
    let limit = i64::from(query.size);
    let offset = i64::from(query.page) * limit;

    let content = {
        let mut stmt = tx.prepare(&sql)?;
        let rows = stmt.query_map(params![name, location, limit, offset], map_event)?;
        rows.collect::<rusqlite::Result<Vec<_>>>()?
    };
    tx.commit()?;

    Ok(Page::new(
        content,
        query.page,
        query.size,
        u64::try_from(total).unwrap_or_default(),
    ))
}

/// Column and direction come from closed enums, never from raw input.
/// Text columns order case-insensitively first, then by their raw value.
fn order_terms(sort: &Sort) -> String {
    let column = sort.field.column();
    let direction = sort.direction.keyword();
    if sort.field.is_text() {
        format!(
            "{}({}) {}, {} {}",
            db::UNICODE_LOWER,
            column,
            direction,
            column,
            direction
        )
    } else {
        format!("{} {}", column, direction)
    }
}

fn map_event(row: &Row<'_>) -> rusqlite::Result<Event> {
    Ok(Event {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        date: row.get(3)?,
        location: row.get(4)?,
    })
}

fn non_empty(filter: Option<&str>) -> Option<&str> {
    filter.filter(|f| !f.is_empty())
}
