//! # Nebula Log
//!
//! Structured logging setup for the engine binary. Every other crate logs
//! through `tracing` directly; this crate only owns process-wide
//! subscriber initialization, so it is linked from `apps/cli` and nowhere
//! else.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Output format for the root subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    /// Human-readable ANSI output, for local development.
    #[default]
    Pretty,
    /// One JSON object per line, for ingestion by a log pipeline.
    Json,
}

/// Logger configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Format of the root subscriber.
    pub format: Format,
    /// Default filter directive used when `RUST_LOG` is unset.
    pub default_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            format: Format::default(),
            default_filter: "info".to_owned(),
        }
    }
}

/// Guard returned by [`init`]; dropping it is inert, it exists so callers
/// hold a value for the lifetime of `main` in the same shape as a real
/// file-appender guard would require.
#[derive(Debug)]
pub struct LoggerGuard;

/// Install the global tracing subscriber. Must be called at most once per
/// process; a second call is a no-op (best-effort, logged at `warn`).
pub fn init(config: &Config) -> LoggerGuard {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.default_filter.clone()));

    let registry = tracing_subscriber::registry().with(filter);

    let result = match config.format {
        Format::Pretty => registry.with(fmt::layer().with_target(true)).try_init(),
        Format::Json => registry.with(fmt::layer().json().with_target(true)).try_init(),
    };

    if let Err(err) = result {
        tracing::warn!(%err, "tracing subscriber already initialized");
    }

    LoggerGuard
}
