//! EventManager - HTTP service for scheduling and browsing events

use anyhow::Result;
use clap::{Parser, Subcommand};
use eventmanager::{
    config::EventManagerConfig,
    db,
    events::{types::EventQuery, EventStore, SqliteEventStore},
    server::Server,
};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "eventmanager")]
#[command(version)]
#[command(about = "HTTP service for scheduling and browsing events")]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "EVENTMANAGER_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on
        #[arg(long)]
        port: Option<u16>,

        /// SQLite database file
        #[arg(long)]
        database: Option<PathBuf>,
    },

    /// Check the database and report its state
    Doctor,

    /// Show configuration
    Config {
        /// Show default configuration
        #[arg(long)]
        default: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("eventmanager={},tower_http=debug", log_level).into());
    if cli.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    // Load configuration
    let config = match cli.config {
        Some(path) => EventManagerConfig::load(&path)?,
        None => EventManagerConfig::default(),
    };

    match cli.command {
        Commands::Serve {
            host,
            port,
            database,
        } => {
            let mut config = config;
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            if let Some(database) = database {
                config.database.path = database;
            }
            run_server(config).await?;
        }
        Commands::Doctor => {
            run_doctor(&config).await?;
        }
        Commands::Config { default } => {
            show_config(if default { None } else { Some(&config) })?;
        }
    }

    Ok(())
}

async fn run_server(config: EventManagerConfig) -> Result<()> {
    tracing::info!("Starting EventManager");

    let server = Server::new(config)?;
    let listener = server.bind().await?;

    server
        .serve(listener, async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for Ctrl+C: {}", e);
                return;
            }
            tracing::info!("Shutting down...");
        })
        .await?;

    Ok(())
}

async fn run_doctor(config: &EventManagerConfig) -> Result<()> {
    println!("EventManager Doctor");
    println!();
    println!("Checking database at {}...", config.database.path.display());

    let store = SqliteEventStore::open(&config.database)?;
    let version = store.schema_version().await?;
    println!(
        "  ✓ Schema version {} (latest {})",
        version,
        db::latest_version()
    );

    let page = store
        .find_filtered(EventQuery {
            size: 1,
            ..Default::default()
        })
        .await?;
    println!("  ✓ {} event(s) stored", page.total_elements);

    println!();
    println!("Doctor check complete!");
    Ok(())
}

fn show_config(config: Option<&EventManagerConfig>) -> Result<()> {
    let config = config.cloned().unwrap_or_default();
    let toml = toml::to_string_pretty(&config)?;
    println!("{}", toml);
    Ok(())
}
