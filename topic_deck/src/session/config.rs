//! Session configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Delay between accepting a draw and revealing the card
pub const DEFAULT_REVEAL_DELAY_MS: u64 = 2_000;

/// Polling interval advertised to pull-transport clients
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1_000;

/// Longest reveal delay accepted by [`SessionConfig::validate`]
pub const MAX_REVEAL_DELAY_MS: u64 = 60_000;

/// A [`SessionConfig`] field outside its accepted range
#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
pub enum SessionConfigError {
    #[error("Reveal delay must be at most {} ms", MAX_REVEAL_DELAY_MS)]
    RevealDelayTooLong,

    #[error("Inbox capacity must be greater than 0")]
    ZeroInboxCapacity,

    #[error("Broadcast capacity must be greater than 0")]
    ZeroBroadcastCapacity,
}

/// Session actor configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Reveal delay in milliseconds (default: 2000)
    pub reveal_delay_ms: u64,

    /// Capacity of the actor's message inbox
    pub inbox_capacity: usize,

    /// Capacity of the push event channel; slower subscribers lag
    pub broadcast_capacity: usize,

    /// Fixed RNG seed, for reproducible draws in tests
    pub rng_seed: Option<u64>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            reveal_delay_ms: DEFAULT_REVEAL_DELAY_MS,
            inbox_capacity: 100,
            broadcast_capacity: 256,
            rng_seed: None,
        }
    }
}

impl SessionConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), SessionConfigError> {
        if self.reveal_delay_ms > MAX_REVEAL_DELAY_MS {
            return Err(SessionConfigError::RevealDelayTooLong);
        }

        if self.inbox_capacity == 0 {
            return Err(SessionConfigError::ZeroInboxCapacity);
        }

        if self.broadcast_capacity == 0 {
            return Err(SessionConfigError::ZeroBroadcastCapacity);
        }

        Ok(())
    }

    pub fn reveal_delay(&self) -> Duration {
        Duration::from_millis(self.reveal_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = SessionConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.reveal_delay(), Duration::from_secs(2));
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let config = SessionConfig {
            broadcast_capacity: 0,
            ..SessionConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(SessionConfigError::ZeroBroadcastCapacity)
        );

        let config = SessionConfig {
            inbox_capacity: 0,
            ..SessionConfig::default()
        };
        assert_eq!(config.validate(), Err(SessionConfigError::ZeroInboxCapacity));
    }

    #[test]
    fn test_reveal_delay_upper_bound() {
        let config = SessionConfig {
            reveal_delay_ms: MAX_REVEAL_DELAY_MS + 1,
            ..SessionConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(SessionConfigError::RevealDelayTooLong)
        );
        assert_eq!(
            SessionConfigError::RevealDelayTooLong.to_string(),
            "Reveal delay must be at most 60000 ms"
        );
    }
}
