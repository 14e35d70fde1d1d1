//! Queue configuration.

use std::time::Duration;

/// Render queue configuration.
#[derive(Debug, Clone)]
pub struct QueueConfig {
    /// Maximum jobs holding a processing slot at once
    pub max_concurrent: usize,
    /// Reconciliation tick cadence
    pub tick_interval: Duration,
    /// Deadline for a single backend submit/poll call
    pub call_timeout: Duration,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            max_concurrent: 2,
            tick_interval: Duration::from_secs(2),
            call_timeout: Duration::from_secs(30),
        }
    }
}

impl QueueConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            max_concurrent: std::env::var("VFORGE_MAX_CONCURRENT")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(2),
            tick_interval: Duration::from_millis(
                std::env::var("VFORGE_TICK_INTERVAL_MS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(2000),
            ),
            call_timeout: Duration::from_secs(
                std::env::var("VFORGE_CALL_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = QueueConfig::default();
        assert_eq!(config.max_concurrent, 2);
        assert_eq!(config.tick_interval, Duration::from_secs(2));
        assert_eq!(config.call_timeout, Duration::from_secs(30));
    }
}
