//! Engine configuration.

use vforge_queue::QueueConfig;
use vforge_render::HttpBackendConfig;

/// Engine configuration, assembled from environment variables.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Render backend connection settings
    pub backend: HttpBackendConfig,
    /// Queue scheduling settings
    pub queue: QueueConfig,
    /// Path of the queue snapshot file
    pub snapshot_path: String,
}

impl EngineConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            backend: HttpBackendConfig::from_env(),
            queue: QueueConfig::from_env(),
            snapshot_path: std::env::var("VFORGE_SNAPSHOT_PATH")
                .unwrap_or_else(|_| "/tmp/vidforge/queue-snapshot.json".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_snapshot_path() {
        // Guard against env leakage from the host
        std::env::remove_var("VFORGE_SNAPSHOT_PATH");
        let config = EngineConfig::from_env();
        assert!(config.snapshot_path.ends_with("queue-snapshot.json"));
    }
}
