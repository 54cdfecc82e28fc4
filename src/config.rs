//! Tuning knobs for the acquisition pipeline.

use std::time::Duration;

use serde::Deserialize;

/// Configuration for the acquisition pipeline.
///
/// All durations are in seconds so the struct can be deserialized from plain
/// config files. Defaults match the reference behavior: 1-hour cache TTL,
/// 1-hour cooldown penalty, 30-second request timeout.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct AcquireConfig {
    /// How long a cached history stays fresh.
    pub cache_ttl_secs: u64,
    /// How long the cooldown gate suppresses requests after a rate-limit
    /// signal.
    pub cooldown_secs: u64,
    /// Upper bound on a single upstream request.
    pub request_timeout_secs: u64,
}

impl Default for AcquireConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: 3600,
            cooldown_secs: 3600,
            request_timeout_secs: 30,
        }
    }
}

impl AcquireConfig {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.cooldown_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AcquireConfig::default();
        assert_eq!(config.cache_ttl(), Duration::from_secs(3600));
        assert_eq!(config.cooldown(), Duration::from_secs(3600));
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_partial_deserialization_fills_defaults() {
        let config: AcquireConfig = serde_json::from_str(r#"{"cache_ttl_secs": 86400}"#).unwrap();
        assert_eq!(config.cache_ttl(), Duration::from_secs(86400));
        assert_eq!(config.cooldown(), Duration::from_secs(3600));
    }
}
