//! Participant presence tracking.

/// Counts live subscribers. No per-connection identity is kept.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ConnectionRegistry {
    participants: usize,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new connection and return the updated count.
    pub fn on_connect(&mut self) -> usize {
        self.participants = self.participants.saturating_add(1);
        self.participants
    }

    /// Record a disconnection and return the updated count.
    ///
    /// The count never drops below zero, so a duplicate disconnect is harmless.
    pub fn on_disconnect(&mut self) -> usize {
        self.participants = self.participants.saturating_sub(1);
        self.participants
    }

    pub fn participants(&self) -> usize {
        self.participants
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connects_and_disconnects() {
        let mut registry = ConnectionRegistry::new();
        registry.on_connect();
        registry.on_connect();
        assert_eq!(registry.on_connect(), 3);
        assert_eq!(registry.on_disconnect(), 2);
        assert_eq!(registry.participants(), 2);
    }

    #[test]
    fn test_disconnect_floors_at_zero() {
        let mut registry = ConnectionRegistry::new();
        registry.on_connect();
        registry.on_connect();
        for _ in 0..4 {
            registry.on_disconnect();
        }
        assert_eq!(registry.participants(), 0);
        assert_eq!(registry.on_connect(), 1);
    }
}
