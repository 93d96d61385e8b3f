//! HTTP server lifecycle
//!
//! Wires configuration, store, service and router together and serves
//! them until a shutdown signal resolves.

use crate::api::build_app;
use crate::config::EventManagerConfig;
use crate::error::{Error, Result};
use crate::events::{EventService, EventsState, SqliteEventStore};
use axum::Router;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

/// EventManager HTTP server
pub struct Server {
    config: EventManagerConfig,
    app: Router,
}

impl Server {
    /// Open the configured database and build the application
    pub fn new(config: EventManagerConfig) -> Result<Self> {
        config.validate()?;
        let store = SqliteEventStore::open(&config.database)?;
        Ok(Self::with_store(config, store))
    }

    /// Build the application over an already opened store
    pub fn with_store(config: EventManagerConfig, store: SqliteEventStore) -> Self {
        let state = EventsState {
            service: EventService::new(Arc::new(store)),
            pagination: config.pagination,
        };
        let app = build_app(state, &config.server);
        Self { config, app }
    }

    /// Bind the configured address
    pub async fn bind(&self) -> Result<TcpListener> {
        let addr = format!("{}:{}", self.config.server.host, self.config.server.port);
        TcpListener::bind(&addr)
            .await
            .map_err(|e| Error::Config(format!("Failed to bind {}: {}", addr, e)))
    }

    /// Serve on `listener` until `shutdown` resolves
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr: SocketAddr = listener.local_addr()?;
        tracing::info!(
            "EventManager listening on http://{}{}/events",
            addr,
            self.config.server.base_path
        );

        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("EventManager stopped");
        Ok(())
    }
}
