//! Orchestrator configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the download orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Concurrent download cap used when the caller passes no explicit
    /// limit. Must be at least 1.
    #[serde(default = "default_concurrency")]
    pub concurrency_limit: usize,

    /// Upper bound on each stop request issued during pause/cancel
    /// (milliseconds). An unresponsive fetcher never blocks the control
    /// transition beyond this.
    #[serde(default = "default_stop_timeout")]
    pub stop_request_timeout_ms: u64,
}

fn default_concurrency() -> usize {
    1
}

fn default_stop_timeout() -> u64 {
    10_000 // 10 seconds
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            concurrency_limit: default_concurrency(),
            stop_request_timeout_ms: default_stop_timeout(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = OrchestratorConfig::default();
        assert_eq!(config.concurrency_limit, 1);
        assert_eq!(config.stop_request_timeout_ms, 10_000);
    }

    #[test]
    fn test_deserialize_minimal() {
        let toml = r#"
            concurrency_limit = 4
        "#;
        let config: OrchestratorConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.concurrency_limit, 4);
        assert_eq!(config.stop_request_timeout_ms, 10_000);
    }

    #[test]
    fn test_deserialize_full() {
        let toml = r#"
            concurrency_limit = 3
            stop_request_timeout_ms = 2500
        "#;
        let config: OrchestratorConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.concurrency_limit, 3);
        assert_eq!(config.stop_request_timeout_ms, 2500);
    }
}
