//! Logging configuration

use tracing::error;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::ci::outputs::annotate_error;
use crate::errors::ActionError;

/// Verbosity of the step's logs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
}

impl LogLevel {
    pub fn to_filter_string(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
        }
    }
}

/// Logging options
#[derive(Debug, Clone)]
pub struct LogOptions {
    /// Log level
    pub log_level: LogLevel,

    /// Enable JSON format
    pub json_format: bool,
}

impl Default for LogOptions {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
            json_format: false,
        }
    }
}

impl LogOptions {
    /// Options for a step, raising verbosity when `debug` is set
    pub fn for_step(debug: bool) -> Self {
        Self {
            log_level: if debug { LogLevel::Debug } else { LogLevel::Info },
            ..Default::default()
        }
    }
}

/// Initialize logging
pub fn init_logging(options: LogOptions) -> Result<(), ActionError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(options.log_level.to_filter_string()));

    let subscriber = tracing_subscriber::registry().with(filter);

    if options.json_format {
        subscriber
            .with(fmt::layer().json())
            .try_init()
            .map_err(|e| ActionError::ConfigError(e.to_string()))?;
    } else {
        subscriber
            .with(fmt::layer().without_time().with_target(false))
            .try_init()
            .map_err(|e| ActionError::ConfigError(e.to_string()))?;
    }

    Ok(())
}

/// Report an error that fails the step
pub fn fail(message: &str) {
    error!("{}", message);
    annotate_error(&format!("{} - see logs for more information", message));
}
