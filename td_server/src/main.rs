//! Topic deck server.
//!
//! Spawns the single session actor and serves the HTTP/WebSocket API.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Error};
use log::info;
use pico_args::Arguments;
use td_server::{
    api,
    config::{ConfigOverrides, ServerConfig},
    logging,
    metrics::{self, SessionMetrics},
};
use topic_deck::SessionActor;

const HELP: &str = "\
Run a shared topic-card draw server

USAGE:
  td_server [OPTIONS]

OPTIONS:
  --bind             IP:PORT  Server socket bind address  [default: env SERVER_BIND or 127.0.0.1:3001]
  --catalog          PATH     JSON card catalog           [default: env CATALOG_PATH or built-in]
  --reveal-delay-ms  MS       Delay before a drawn card is revealed  [default: env REVEAL_DELAY_MS or 2000]

FLAGS:
  -h, --help                  Print help information

ENVIRONMENT:
  SERVER_BIND              Server bind address (e.g., 0.0.0.0:3001)
  REVEAL_DELAY_MS          Reveal delay in milliseconds
  POLL_INTERVAL_MS         Polling interval advertised to HTTP clients
  CATALOG_PATH             JSON card catalog
  SESSION_INBOX_CAPACITY   Session actor inbox size
  BROADCAST_CAPACITY       Event buffer per WebSocket subscriber
  RNG_SEED                 Fixed seed for reproducible draws
  WS_BURST_LIMIT           WebSocket messages per second per connection
  RUST_LOG                 Log filter
";

fn parse_overrides(mut pargs: Arguments) -> Result<ConfigOverrides, Error> {
    let overrides = ConfigOverrides {
        bind: pargs.opt_value_from_str("--bind")?,
        catalog_path: pargs.opt_value_from_os_str("--catalog", |s| {
            Ok::<_, std::convert::Infallible>(PathBuf::from(s))
        })?,
        reveal_delay_ms: pargs.opt_value_from_str("--reveal-delay-ms")?,
    };

    let remaining = pargs.finish();
    if !remaining.is_empty() {
        anyhow::bail!("Unexpected arguments: {:?}", remaining);
    }

    Ok(overrides)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    logging::init();

    let overrides = parse_overrides(pargs)?;
    let config = ServerConfig::from_env(overrides)?;
    config.validate()?;

    let catalog = config.load_catalog()?;
    info!(
        "Loaded {} card(s) in {} categories from {}",
        catalog.len(),
        catalog.categories().len(),
        config
            .catalog_path
            .as_ref()
            .map_or_else(|| "built-in catalog".to_string(), |p| p.display().to_string())
    );

    let prometheus = metrics::init_metrics().map_err(Error::msg)?;

    let (mut actor, session) = SessionActor::new(catalog.clone(), config.session.clone());
    actor.add_observer(Arc::new(SessionMetrics));
    tokio::spawn(actor.run());

    let state = api::AppState::new(session, catalog)
        .with_config(&config)
        .with_metrics(prometheus);
    let app = api::create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind))?;

    info!(
        "Server is running at http://{}. Press Ctrl+C to stop.",
        config.bind
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Shutting down server...");

    Ok(())
}

/// Graceful shutdown signal
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
}
