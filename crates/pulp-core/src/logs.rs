//! Logging subsystem.
//!
//! The global subscriber is installed once per process with two reloadable slots: an
//! `EnvFilter` and an output layer. Starting binds both slots to the `[server]` section
//! of the given config; stopping silences the filter and detaches the output.

use std::str::FromStr;
use std::sync::OnceLock;

use pulp_config::ServerConfig;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::layer::{Layered, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt, reload};

type Base = Layered<reload::Layer<EnvFilter, Registry>, Registry>;
type OutputLayer = Box<dyn Layer<Base> + Send + Sync>;

struct Handles {
    filter: reload::Handle<EnvFilter, Registry>,
    output: reload::Handle<Option<OutputLayer>, Base>,
}

static HANDLES: OnceLock<Handles> = OnceLock::new();

#[derive(Debug, thiserror::Error)]
pub enum LogError {
    #[error("invalid log level {level:?}")]
    InvalidLevel {
        level: String,
        #[source]
        source: ParseError,
    },
    #[error("invalid log format {0:?}, expected `compact` or `json`")]
    InvalidFormat(String),
    #[error("logging subsystem is not attached to the global subscriber")]
    Reload(#[from] reload::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Json,
}

impl FromStr for LogFormat {
    type Err = LogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "json" => Ok(Self::Json),
            _ => Err(LogError::InvalidFormat(s.to_owned())),
        }
    }
}

/// Start/stop pair the test harness drives around a config reload.
pub trait LoggingSubsystem: Send + Sync {
    fn start_logging(&self, config: &ServerConfig) -> Result<(), LogError>;
    fn stop_logging(&self) -> Result<(), LogError>;
}

/// [`LoggingSubsystem`] backed by the process-wide tracing subscriber.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogging;

impl LoggingSubsystem for TracingLogging {
    fn start_logging(&self, config: &ServerConfig) -> Result<(), LogError> {
        start_logging(config)
    }

    fn stop_logging(&self) -> Result<(), LogError> {
        stop_logging()
    }
}

fn handles() -> &'static Handles {
    HANDLES.get_or_init(|| {
        let (filter, filter_handle) = reload::Layer::new(EnvFilter::new("off"));
        let (output, output_handle) = reload::Layer::new(None::<OutputLayer>);
        // If another subscriber won the race the handles are dangling and reloads report it.
        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(output)
            .try_init();
        Handles {
            filter: filter_handle,
            output: output_handle,
        }
    })
}

/// Bind logging to `[server] log_level` and `[server] log_format`.
///
/// Safe to call repeatedly; each call replaces the active filter and output.
pub fn start_logging(config: &ServerConfig) -> Result<(), LogError> {
    let level = config.get("server", "log_level").unwrap_or("info");
    let filter = EnvFilter::try_new(level).map_err(|source| LogError::InvalidLevel {
        level: level.to_owned(),
        source,
    })?;
    let format: LogFormat = config
        .get("server", "log_format")
        .unwrap_or("compact")
        .parse()?;
    let output: OutputLayer = match format {
        LogFormat::Compact => fmt::layer().compact().boxed(),
        LogFormat::Json => fmt::layer().json().boxed(),
    };

    let handles = handles();
    handles.filter.reload(filter)?;
    handles.output.reload(Some(output))?;
    tracing::info!(level, ?format, "logging started");
    Ok(())
}

/// Silence logging. A no-op before the first [`start_logging`].
pub fn stop_logging() -> Result<(), LogError> {
    let Some(handles) = HANDLES.get() else {
        return Ok(());
    };
    handles.output.reload(None)?;
    handles.filter.reload(EnvFilter::new("off"))?;
    Ok(())
}
