//! Engine configuration from the environment

use std::str::FromStr;
use std::time::Duration;

use crate::batch::EngineConfig;
use crate::worker::WorkerPoolConfig;

/// Complete engine configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemflowConfig {
    pub pool: WorkerPoolConfig,
    pub engine: EngineConfig,
}

impl ItemflowConfig {
    /// Create configuration from environment variables
    ///
    /// Environment variables:
    /// - `ITEMFLOW_MAX_WORKERS`: Worker pool size (default: 10)
    /// - `ITEMFLOW_QUEUE_CAPACITY`: Submissions allowed to wait (default: unbounded)
    /// - `ITEMFLOW_PROCESSING_DELAY_MS`: Per-item delay (default: 100)
    /// - `ITEMFLOW_SHUTDOWN_TIMEOUT_MS`: Graceful shutdown timeout (default: 30000)
    ///
    /// Unparseable values fall back to the defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with a custom variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let max_concurrency =
            parse(&lookup, "ITEMFLOW_MAX_WORKERS").unwrap_or(defaults.pool.max_concurrency);
        let queue_capacity = parse(&lookup, "ITEMFLOW_QUEUE_CAPACITY");
        let processing_delay = parse(&lookup, "ITEMFLOW_PROCESSING_DELAY_MS")
            .map(Duration::from_millis)
            .unwrap_or(defaults.engine.processing_delay);
        let shutdown_timeout = parse(&lookup, "ITEMFLOW_SHUTDOWN_TIMEOUT_MS")
            .map(Duration::from_millis)
            .unwrap_or(defaults.pool.shutdown_timeout);

        let mut pool = WorkerPoolConfig::new()
            .with_max_concurrency(max_concurrency)
            .with_shutdown_timeout(shutdown_timeout);
        if let Some(capacity) = queue_capacity {
            pool = pool.with_queue_capacity(capacity);
        }

        Self {
            pool,
            engine: EngineConfig::new().with_processing_delay(processing_delay),
        }
    }
}

fn parse<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(key, value = %raw, "Ignoring unparseable configuration value");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = ItemflowConfig::from_lookup(lookup(&[]));
        assert_eq!(config, ItemflowConfig::default());
        assert_eq!(config.pool.max_concurrency, 10);
        assert_eq!(config.pool.queue_capacity, None);
        assert_eq!(config.engine.processing_delay, Duration::from_millis(100));
    }

    #[test]
    fn test_reads_all_values() {
        let config = ItemflowConfig::from_lookup(lookup(&[
            ("ITEMFLOW_MAX_WORKERS", "4"),
            ("ITEMFLOW_QUEUE_CAPACITY", "16"),
            ("ITEMFLOW_PROCESSING_DELAY_MS", " 5 "),
            ("ITEMFLOW_SHUTDOWN_TIMEOUT_MS", "750"),
        ]));

        assert_eq!(config.pool.max_concurrency, 4);
        assert_eq!(config.pool.queue_capacity, Some(16));
        assert_eq!(config.engine.processing_delay, Duration::from_millis(5));
        assert_eq!(config.pool.shutdown_timeout, Duration::from_millis(750));
    }

    #[test]
    fn test_bad_values_fall_back() {
        let config = ItemflowConfig::from_lookup(lookup(&[
            ("ITEMFLOW_MAX_WORKERS", "many"),
            ("ITEMFLOW_QUEUE_CAPACITY", "-1"),
        ]));

        assert_eq!(config.pool.max_concurrency, 10);
        assert_eq!(config.pool.queue_capacity, None);
    }

    #[test]
    fn test_zero_workers_clamped() {
        let config = ItemflowConfig::from_lookup(lookup(&[("ITEMFLOW_MAX_WORKERS", "0")]));
        assert_eq!(config.pool.max_concurrency, 1);
    }
}
