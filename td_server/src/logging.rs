//! Structured logging configuration.
//!
//! The server logs through `tracing`; the `topic_deck` library logs through
//! the `log` facade, whose records are forwarded into the same subscriber.

use topic_deck::SessionError;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when `RUST_LOG` is not set
pub const DEFAULT_FILTER: &str = "info,tower_http=warn,hyper=warn";

/// Build the filter from `RUST_LOG`, falling back to [`DEFAULT_FILTER`]
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Initialize structured logging
///
/// Configurable log levels via the RUST_LOG env var.
///
/// # Example
///
/// ```no_run
/// use td_server::logging;
///
/// #[tokio::main]
/// async fn main() {
///     logging::init();
///     tracing::info!("Server starting");
/// }
/// ```
pub fn init() {
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt_layer)
        .init();

    tracing::info!("Structured logging initialized");
}

/// Log a rejected session operation.
///
/// Expected rejections (busy, no match) are debug noise; anything else is
/// a server-side fault and logged as a warning.
pub fn log_rejection(transport: &str, operation: &str, error: &SessionError) {
    if error.is_user_facing() {
        tracing::debug!(
            transport = transport,
            operation = operation,
            reason = %error,
            "Operation rejected"
        );
    } else {
        tracing::warn!(
            transport = transport,
            operation = operation,
            reason = %error,
            "Operation failed"
        );
    }
}
