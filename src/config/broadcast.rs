//! Listener and fan-out tunables.

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

#[derive(Debug, Clone, Deserialize)]
pub struct BroadcastConfig {
    /// Per-subscriber send timeout; slower subscribers are evicted
    #[serde(default = "default_send_timeout")]
    pub send_timeout_ms: u64,

    /// Frames buffered per subscriber connection
    #[serde(default = "default_outbound_capacity")]
    pub outbound_capacity: usize,

    /// How long a stop waits for in-flight events before aborting the pump
    #[serde(default = "default_drain_timeout")]
    pub drain_timeout_ms: u64,

    #[serde(default = "default_metadata_timeout")]
    pub metadata_timeout_ms: u64,

    #[serde(default = "default_profile_timeout")]
    pub profile_timeout_ms: u64,
}

impl BroadcastConfig {
    pub fn send_timeout(&self) -> Duration {
        Duration::from_millis(self.send_timeout_ms)
    }

    pub fn drain_timeout(&self) -> Duration {
        Duration::from_millis(self.drain_timeout_ms)
    }

    pub fn metadata_timeout(&self) -> Duration {
        Duration::from_millis(self.metadata_timeout_ms)
    }

    pub fn profile_timeout(&self) -> Duration {
        Duration::from_millis(self.profile_timeout_ms)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.send_timeout_ms == 0 {
            return Err(ValidationError::InvalidTimeout("broadcast.send_timeout_ms"));
        }
        if self.drain_timeout_ms == 0 {
            return Err(ValidationError::InvalidTimeout("broadcast.drain_timeout_ms"));
        }
        if self.outbound_capacity == 0 {
            return Err(ValidationError::InvalidQueueCapacity);
        }
        Ok(())
    }
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            send_timeout_ms: default_send_timeout(),
            outbound_capacity: default_outbound_capacity(),
            drain_timeout_ms: default_drain_timeout(),
            metadata_timeout_ms: default_metadata_timeout(),
            profile_timeout_ms: default_profile_timeout(),
        }
    }
}

fn default_send_timeout() -> u64 {
    5_000
}

fn default_outbound_capacity() -> usize {
    64
}

fn default_drain_timeout() -> u64 {
    10_000
}

fn default_metadata_timeout() -> u64 {
    5_000
}

fn default_profile_timeout() -> u64 {
    3_000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BroadcastConfig::default();
        assert_eq!(config.send_timeout(), Duration::from_secs(5));
        assert_eq!(config.outbound_capacity, 64);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_capacity_is_rejected() {
        let config = BroadcastConfig {
            outbound_capacity: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidQueueCapacity)
        ));
    }
}
