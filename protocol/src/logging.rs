//! # Logging
//!
//! The vault reports deployments, swaps, rejections and rate changes through
//! `tracing` whether or not anything listens. An embedding host installs a
//! subscriber with [`init_logging`] to collect them.

use std::str::FromStr;

use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// How log lines are rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// One human-readable line per event, with source location.
    #[default]
    Pretty,
    /// One JSON object per event, fields flattened for log shippers.
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format '{other}', expected 'pretty' or 'json'")),
        }
    }
}

/// Directives from `RUST_LOG` when set and parseable, `fallback` otherwise.
pub fn env_filter(fallback: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback))
}

/// Installs the global subscriber.
///
/// `fallback` is used when `RUST_LOG` is absent, typically
/// [`DEFAULT_LOG_DIRECTIVE`](crate::config::DEFAULT_LOG_DIRECTIVE). Fails
/// if a global subscriber already exists.
pub fn init_logging(fallback: &str, format: LogFormat) -> Result<(), TryInitError> {
    let registry = tracing_subscriber::registry().with(env_filter(fallback));

    match format {
        LogFormat::Pretty => registry
            .with(fmt::layer().with_target(true).with_file(true).with_line_number(true))
            .try_init()?,
        LogFormat::Json => registry
            .with(fmt::layer().json().flatten_event(true).with_current_span(false))
            .try_init()?,
    }

    tracing::debug!(?format, "subscriber installed");
    Ok(())
}
