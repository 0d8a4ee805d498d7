//! Server configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use topic_deck::{
    Catalog, CatalogError, SessionConfig,
    session::{DEFAULT_POLL_INTERVAL_MS, SessionConfigError},
};

/// Default bind address when neither CLI nor `SERVER_BIND` provide one
pub const DEFAULT_BIND: SocketAddr = SocketAddr::new(
    std::net::IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)),
    3001,
);

/// Accepted range for the advertised polling interval
pub const POLL_INTERVAL_RANGE_MS: std::ops::RangeInclusive<u64> = 100..=60_000;

/// Default number of WebSocket messages allowed per second per connection
pub const DEFAULT_WS_BURST_LIMIT: usize = 10;

/// Complete server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server bind address
    pub bind: SocketAddr,
    /// Session actor configuration
    pub session: SessionConfig,
    /// Polling interval advertised to pull clients
    pub poll_interval_ms: u64,
    /// JSON catalog file; the built-in catalog is used when unset
    pub catalog_path: Option<PathBuf>,
    /// Per-connection WebSocket messages per second
    pub ws_burst_limit: usize,
}

/// Values given on the command line, which win over the environment
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub bind: Option<SocketAddr>,
    pub catalog_path: Option<PathBuf>,
    pub reveal_delay_ms: Option<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND,
            session: SessionConfig::default(),
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            catalog_path: None,
            ws_burst_limit: DEFAULT_WS_BURST_LIMIT,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Arguments
    ///
    /// * `overrides` - Values from CLI args, applied on top of the environment
    ///
    /// # Errors
    ///
    /// Returns error if a variable is present but can't be used
    pub fn from_env(overrides: ConfigOverrides) -> Result<Self, ConfigError> {
        let bind = match overrides.bind {
            Some(bind) => bind,
            None => match std::env::var("SERVER_BIND") {
                Ok(value) => value.parse().map_err(|_| ConfigError::Invalid {
                    var: "SERVER_BIND".to_string(),
                    reason: format!("'{}' is not an IP:PORT address", value),
                })?,
                Err(_) => DEFAULT_BIND,
            },
        };

        let catalog_path = overrides.catalog_path.or_else(|| {
            std::env::var("CATALOG_PATH")
                .ok()
                .filter(|path| !path.trim().is_empty())
                .map(PathBuf::from)
        });

        let defaults = SessionConfig::default();
        let session = SessionConfig {
            reveal_delay_ms: overrides
                .reveal_delay_ms
                .unwrap_or_else(|| parse_env_or("REVEAL_DELAY_MS", defaults.reveal_delay_ms)),
            inbox_capacity: parse_env_or("SESSION_INBOX_CAPACITY", defaults.inbox_capacity),
            broadcast_capacity: parse_env_or("BROADCAST_CAPACITY", defaults.broadcast_capacity),
            rng_seed: parse_env_opt("RNG_SEED"),
        };

        Ok(ServerConfig {
            bind,
            session,
            poll_interval_ms: parse_env_or("POLL_INTERVAL_MS", DEFAULT_POLL_INTERVAL_MS),
            catalog_path,
            ws_burst_limit: parse_env_or("WS_BURST_LIMIT", DEFAULT_WS_BURST_LIMIT),
        })
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.session
            .validate()
            .map_err(|e| ConfigError::Invalid {
                var: session_env_var(e).to_string(),
                reason: e.to_string(),
            })?;

        if !POLL_INTERVAL_RANGE_MS.contains(&self.poll_interval_ms) {
            return Err(ConfigError::Invalid {
                var: "POLL_INTERVAL_MS".to_string(),
                reason: format!(
                    "Must be between {} and {} ms",
                    POLL_INTERVAL_RANGE_MS.start(),
                    POLL_INTERVAL_RANGE_MS.end()
                ),
            });
        }

        if self.ws_burst_limit == 0 {
            return Err(ConfigError::Invalid {
                var: "WS_BURST_LIMIT".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        Ok(())
    }

    /// Load the configured catalog, or the built-in one
    pub fn load_catalog(&self) -> Result<Catalog, ConfigError> {
        match &self.catalog_path {
            Some(path) => Catalog::from_json_file(path).map_err(|source| ConfigError::Catalog {
                path: path.clone(),
                source,
            }),
            None => Ok(Catalog::builtin()),
        }
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },

    #[error("Failed to load catalog from {}: {source}", path.display())]
    Catalog {
        path: PathBuf,
        #[source]
        source: CatalogError,
    },
}

/// Environment variable that sets the rejected session field
fn session_env_var(error: SessionConfigError) -> &'static str {
    match error {
        SessionConfigError::RevealDelayTooLong => "REVEAL_DELAY_MS",
        SessionConfigError::ZeroInboxCapacity => "SESSION_INBOX_CAPACITY",
        SessionConfigError::ZeroBroadcastCapacity => "BROADCAST_CAPACITY",
    }
}

/// Helper to parse an optional environment variable; unparsable values are
/// logged and treated as unset
fn parse_env_opt<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    let value = std::env::var(key).ok()?;
    match value.trim().parse() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            tracing::warn!(var = key, value = %value, "Unparsable value, ignoring");
            None
        }
    }
}

/// Helper to parse environment variable with default fallback
fn parse_env_or<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    match std::env::var(key) {
        Ok(value) => value.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(var = key, value = %value, "Unparsable value, using default");
            default
        }),
        Err(_) => default,
    }
}
