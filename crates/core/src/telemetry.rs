// Telemetry Module
//
// Structured logging setup shared by the CLI and integration tests:
// - `tracing` spans and events throughout the engine
// - `tracing-subscriber` stderr output with an env-driven filter
// - Optional JSON formatting for log shipping

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

// ============================================================================
// Telemetry Configuration
// ============================================================================

/// Configuration for logging
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Service name, attached to the startup event
    pub service_name: String,
    /// Whether to enable console logging
    pub enable_console: bool,
    /// Log filter (e.g., "info", "debug", "itemflow_engine=debug")
    pub log_filter: Option<String>,
    /// Emit one JSON object per event instead of human-readable lines
    pub json: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "itemflow".to_string(),
            enable_console: true,
            log_filter: None,
            json: false,
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables
    ///
    /// Environment variables:
    /// - `ITEMFLOW_SERVICE_NAME`: Service name (default: "itemflow")
    /// - `RUST_LOG` or `LOG_LEVEL`: Log filter
    /// - `ITEMFLOW_LOG_FORMAT`: "json" for JSON output, anything else for text
    pub fn from_env() -> Self {
        Self {
            service_name: std::env::var("ITEMFLOW_SERVICE_NAME")
                .unwrap_or_else(|_| "itemflow".to_string()),
            enable_console: true,
            log_filter: std::env::var("RUST_LOG")
                .ok()
                .or_else(|| std::env::var("LOG_LEVEL").ok()),
            json: std::env::var("ITEMFLOW_LOG_FORMAT")
                .map(|v| v.eq_ignore_ascii_case("json"))
                .unwrap_or(false),
        }
    }

    /// Build the filter, falling back to `info` on a missing or malformed directive
    pub fn env_filter(&self) -> EnvFilter {
        self.log_filter
            .as_ref()
            .and_then(|f| EnvFilter::try_new(f).ok())
            .unwrap_or_else(|| EnvFilter::new("info"))
    }
}

// ============================================================================
// Initialization
// ============================================================================

/// Install the global subscriber
///
/// Returns `false` when a subscriber was already installed (e.g. by a test
/// harness); the existing one is kept.
///
/// # Example
///
/// ```ignore
/// use itemflow_core::telemetry::{init_telemetry, TelemetryConfig};
///
/// #[tokio::main]
/// async fn main() {
///     init_telemetry(TelemetryConfig::from_env());
///     // ... your application code
/// }
/// ```
pub fn init_telemetry(config: TelemetryConfig) -> bool {
    let console_layer = if config.enable_console {
        let layer = if config.json {
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_filter(config.env_filter())
                .boxed()
        } else {
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_filter(config.env_filter())
                .boxed()
        };
        Some(layer)
    } else {
        None
    };

    let installed = tracing_subscriber::registry()
        .with(console_layer)
        .try_init()
        .is_ok();

    if installed {
        tracing::debug!(service = %config.service_name, json = config.json, "Telemetry initialized");
    }

    installed
}
