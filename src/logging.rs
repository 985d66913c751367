//! # Logging Module
//!
//! Structured logging setup on `tracing-subscriber`.
//!
//! Configuration comes from the environment:
//!
//! | Variable | Values | Default |
//! |----------|--------|---------|
//! | `SCHEMAROUTE_LOG_LEVEL` | trace/debug/info/warn/error | `info` |
//! | `SCHEMAROUTE_LOG_FORMAT` | json/pretty | `json` |
//! | `SCHEMAROUTE_LOG_ASYNC` | true/false | `false` |
//! | `SCHEMAROUTE_LOG_TARGET_FILTER` | comma-separated directives | none |
//!
//! `RUST_LOG`, when set, takes precedence over the level.

use anyhow::{Context, Result};
use std::env;
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

impl LogFormat {
    #[must_use]
    pub fn parse(s: &str) -> Self {
        if s.eq_ignore_ascii_case("pretty") {
            LogFormat::Pretty
        } else {
            LogFormat::Json
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub log_level: String,
    pub format: LogFormat,
    /// Write through a non-blocking buffered writer
    pub async_logging: bool,
    pub target_filter: Option<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            format: LogFormat::Json,
            async_logging: false,
            target_filter: None,
        }
    }
}

impl LogConfig {
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            log_level: env::var("SCHEMAROUTE_LOG_LEVEL").unwrap_or(defaults.log_level),
            format: env::var("SCHEMAROUTE_LOG_FORMAT")
                .map(|f| LogFormat::parse(&f))
                .unwrap_or(defaults.format),
            async_logging: env::var("SCHEMAROUTE_LOG_ASYNC")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.async_logging),
            target_filter: env::var("SCHEMAROUTE_LOG_TARGET_FILTER").ok(),
        }
    }

    /// Human-readable output for local runs and tests.
    #[must_use]
    pub fn dev() -> Self {
        Self {
            log_level: "debug".to_string(),
            format: LogFormat::Pretty,
            ..Self::default()
        }
    }

    fn level(&self) -> Level {
        match self.log_level.to_ascii_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        }
    }

    fn env_filter(&self) -> EnvFilter {
        let mut filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(self.level().as_str()));
        // Connection-level noise from the HTTP layer.
        if let Ok(directive) = "may_minihttp=warn".parse() {
            filter = filter.add_directive(directive);
        }
        for raw in self
            .target_filter
            .iter()
            .flat_map(|f| f.split(','))
            .map(str::trim)
            .filter(|f| !f.is_empty())
        {
            match raw.parse() {
                Ok(directive) => filter = filter.add_directive(directive),
                Err(_) => eprintln!("Warning: invalid log filter directive: {raw}"),
            }
        }
        filter
    }
}

fn fmt_layer<S, W>(format: LogFormat, writer: W) -> Box<dyn Layer<S> + Send + Sync>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a> + 'static,
    W: for<'w> tracing_subscriber::fmt::MakeWriter<'w> + Send + Sync + 'static,
{
    match format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(true)
            .with_target(true)
            .with_thread_ids(true)
            .with_writer(writer)
            .boxed(),
        LogFormat::Pretty => tracing_subscriber::fmt::layer()
            .pretty()
            .with_target(true)
            .with_writer(writer)
            .boxed(),
    }
}

/// Install the global subscriber.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_logging(config: &LogConfig) -> Result<()> {
    let registry = tracing_subscriber::registry().with(config.env_filter());
    if config.async_logging {
        let (writer, guard) = tracing_appender::non_blocking(std::io::stdout());
        registry
            .with(fmt_layer(config.format, writer))
            .try_init()
            .context("Failed to initialize async logging")?;
        // Keep the writer flushing for the life of the process.
        std::mem::forget(guard);
    } else {
        registry
            .with(fmt_layer(config.format, std::io::stdout))
            .try_init()
            .context("Failed to initialize logging")?;
    }
    Ok(())
}
