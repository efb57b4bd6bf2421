//! Subscriber setup for the calbridge binary.
//!
//! ```ignore
//! use calbridge_core::tracing::{init_tracing, TracingConfig};
//!
//! init_tracing(TracingConfig::server(args.debug, args.log_json))?;
//! ```
//!
//! Filtering precedence: an explicit directive, then `RUST_LOG`, then
//! [`TracingConfig::default_directive`].

use thiserror::Error;
use tracing::Level;
use tracing_subscriber::{EnvFilter, Layer, fmt, prelude::*};

/// Target prefix shared by every calbridge crate.
const TARGET_PREFIX: &str = "calbridge";

#[derive(Debug, Error)]
pub enum TracingError {
    #[error("failed to set global tracing subscriber: {0}")]
    SetGlobalSubscriber(#[from] tracing::subscriber::SetGlobalDefaultError),

    #[error("invalid log filter: {0}")]
    EnvFilter(#[from] tracing_subscriber::filter::ParseError),
}

/// How log lines are rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TracingOutputFormat {
    /// Multi-line, for reading by hand.
    Pretty,
    #[default]
    Compact,
    /// One JSON object per line.
    Json,
}

/// Subscriber settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracingConfig {
    /// Level for calbridge and the HTTP trace layer when nothing else is set.
    pub level: Level,
    pub format: TracingOutputFormat,
    /// Adds file and line to every event.
    pub with_location: bool,
    /// Overrides both `RUST_LOG` and `level`.
    pub directive: Option<String>,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            format: TracingOutputFormat::Compact,
            with_location: false,
            directive: None,
        }
    }
}

impl TracingConfig {
    /// Settings for the bridge server: `debug` raises the level to DEBUG
    /// with source locations, `json` switches to JSON lines.
    #[must_use]
    pub fn server(debug: bool, json: bool) -> Self {
        let config = if debug {
            Self::default().with_level(Level::DEBUG).with_location()
        } else {
            Self::default()
        };
        if json {
            config.with_format(TracingOutputFormat::Json)
        } else {
            config
        }
    }

    #[must_use]
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    #[must_use]
    pub fn with_format(mut self, format: TracingOutputFormat) -> Self {
        self.format = format;
        self
    }

    #[must_use]
    pub fn with_location(mut self) -> Self {
        self.with_location = true;
        self
    }

    #[must_use]
    pub fn with_directive(mut self, directive: impl Into<String>) -> Self {
        self.directive = Some(directive.into());
        self
    }

    /// `calbridge=<level>,tower_http=<level>`
    pub fn default_directive(&self) -> String {
        format!(
            "{prefix}={level},tower_http={level}",
            prefix = TARGET_PREFIX,
            level = self.level
        )
    }

    fn env_filter(&self) -> Result<EnvFilter, TracingError> {
        if let Some(ref directive) = self.directive {
            return Ok(EnvFilter::try_new(directive)?);
        }
        match EnvFilter::try_from_default_env() {
            Ok(filter) => Ok(filter),
            Err(_) => Ok(EnvFilter::try_new(self.default_directive())?),
        }
    }
}

/// Installs the global subscriber.
///
/// # Errors
///
/// Fails if a global subscriber is already installed or the directive does
/// not parse.
pub fn init_tracing(config: TracingConfig) -> Result<(), TracingError> {
    let filter = config.env_filter()?;

    let base = fmt::layer()
        .with_file(config.with_location)
        .with_line_number(config.with_location);
    let layer = match config.format {
        TracingOutputFormat::Pretty => base.pretty().boxed(),
        TracingOutputFormat::Compact => base.compact().boxed(),
        TracingOutputFormat::Json => base.json().boxed(),
    };

    let subscriber = tracing_subscriber::registry().with(layer).with(filter);
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}
