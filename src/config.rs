//! Registry configuration.

use std::time::Duration;

/// Configuration for a [`SwitchRegistry`](crate::registry::SwitchRegistry).
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// How long a snapshot stays trusted before the next access reloads it
    pub ttl: Duration,

    /// Upper bound on a single store fetch during refresh
    pub fetch_timeout: Duration,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(10),
            fetch_timeout: Duration::from_secs(3),
        }
    }
}

impl RegistryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the snapshot TTL.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Set the store fetch timeout.
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RegistryConfig::default();
        assert_eq!(config.ttl, Duration::from_secs(10));
        assert_eq!(config.fetch_timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_builders() {
        let config = RegistryConfig::new()
            .with_ttl(Duration::from_secs(60))
            .with_fetch_timeout(Duration::from_millis(500));
        assert_eq!(config.ttl, Duration::from_secs(60));
        assert_eq!(config.fetch_timeout, Duration::from_millis(500));
    }
}
