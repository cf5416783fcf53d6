//! Subscriber setup shared by lanewise benches, tests and host launch glue.
//!
//! `lanewise-core` only emits events (launch planning at `debug`, ignored
//! environment overrides at `warn`) through the level macros re-exported
//! here. Installing a subscriber is left to binaries, which pick a
//! [`Profile`] and optionally override it from the environment:
//!
//! ```no_run
//! use lanewise_tracing::{init_global_tracing, TracingConfig};
//!
//! init_global_tracing(&TracingConfig::from_env())?;
//! # Ok::<(), lanewise_tracing::SetupError>(())
//! ```

use std::env;
use std::str::FromStr;

pub use tracing::{debug, error, info, trace, warn};

use tracing::Subscriber;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::{Layer, SubscriberExt};
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{fmt as tracing_fmt, EnvFilter, Registry};

/// Selects the preset: `local`, `ci` or `bench`
pub const PROFILE_ENV: &str = "LANEWISE_TRACING_PROFILE";
/// Replaces the preset's filter directives
pub const DIRECTIVES_ENV: &str = "LANEWISE_TRACING_DIRECTIVES";
/// Replaces the preset's format: `pretty`, `compact` or `json`
pub const FORMAT_ENV: &str = "LANEWISE_TRACING_FORMAT";

/// Formatter layer choices
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = SetupError;

    fn from_str(value: &str) -> Result<Self, SetupError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(SetupError::UnknownFormat(other.to_string())),
        }
    }
}

/// Named presets for [`TracingConfig`]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Profile {
    #[default]
    Local,
    Ci,
    Bench,
}

impl FromStr for Profile {
    type Err = SetupError;

    fn from_str(value: &str) -> Result<Self, SetupError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "ci" => Ok(Self::Ci),
            "bench" => Ok(Self::Bench),
            other => Err(SetupError::UnknownProfile(other.to_string())),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    #[error("invalid tracing directive: {0}")]
    InvalidFilter(String),

    #[error("unknown tracing profile `{0}`")]
    UnknownProfile(String),

    #[error("unknown log format `{0}`")]
    UnknownFormat(String),

    #[error("failed to install global tracing subscriber: {0}")]
    SubscriberInit(#[from] TryInitError),
}

/// How the shared subscriber filters and formats events.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TracingConfig {
    /// Filter directives such as `lanewise_core=debug`. `None` defers to
    /// `RUST_LOG`, then to `fallback_level`.
    pub directives: Option<String>,
    pub fallback_level: String,
    pub with_targets: bool,
    pub ansi: bool,
    /// Emit an event when each span closes, with its timings
    pub span_timings: bool,
    pub format: LogFormat,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self::for_local()
    }
}

impl TracingConfig {
    pub fn preset(profile: Profile) -> Self {
        match profile {
            Profile::Local => Self::for_local(),
            Profile::Ci => Self::for_ci(),
            Profile::Bench => Self::for_bench(),
        }
    }

    /// Coloured multi-line events at `info`
    pub fn for_local() -> Self {
        Self {
            directives: None,
            fallback_level: "info".to_string(),
            with_targets: true,
            ansi: true,
            span_timings: false,
            format: LogFormat::Pretty,
        }
    }

    /// One JSON object per event, for log collectors
    pub fn for_ci() -> Self {
        Self {
            ansi: false,
            format: LogFormat::Json,
            ..Self::for_local()
        }
    }

    /// Warnings only. Planning benches would otherwise log every iteration.
    pub fn for_bench() -> Self {
        Self {
            directives: Some("warn".to_string()),
            fallback_level: "warn".to_string(),
            ansi: false,
            format: LogFormat::Compact,
            ..Self::for_local()
        }
    }

    /// Start from the [`PROFILE_ENV`] preset, then apply [`DIRECTIVES_ENV`]
    /// and [`FORMAT_ENV`].
    ///
    /// Unrecognised profile or format values are ignored so that a typo in a
    /// CI variable never aborts a run.
    pub fn from_env() -> Self {
        let profile: Profile = env::var(PROFILE_ENV)
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or_default();
        let mut config = Self::preset(profile);

        if let Some(directives) = env::var(DIRECTIVES_ENV).ok().filter(|d| !d.trim().is_empty()) {
            config.directives = Some(directives);
        }
        if let Some(format) = env::var(FORMAT_ENV).ok().and_then(|value| value.parse().ok()) {
            config.format = format;
        }
        if config.format == LogFormat::Json {
            config.ansi = false;
        }
        config
    }

    fn env_filter(&self) -> Result<EnvFilter, SetupError> {
        match &self.directives {
            Some(directives) => EnvFilter::try_new(directives).map_err(|err| SetupError::InvalidFilter(err.to_string())),
            None => Ok(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.fallback_level))),
        }
    }

    fn span_events(&self) -> FmtSpan {
        if self.span_timings {
            FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        }
    }
}

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Filter and formatter for callers composing their own registry
pub fn subscriber_layers(config: &TracingConfig) -> Result<(EnvFilter, BoxedLayer), SetupError> {
    let filter = config.env_filter()?;
    let base = tracing_fmt::layer()
        .with_target(config.with_targets)
        .with_span_events(config.span_events());

    let layer: BoxedLayer = match config.format {
        LogFormat::Compact => Box::new(base.compact().with_ansi(config.ansi)),
        LogFormat::Pretty => Box::new(base.pretty().with_ansi(config.ansi)),
        LogFormat::Json => Box::new(base.json().with_ansi(false)),
    };
    Ok((filter, layer))
}

pub fn build_subscriber(config: &TracingConfig) -> Result<impl Subscriber + Send + Sync, SetupError> {
    let (filter, layer) = subscriber_layers(config)?;
    Ok(Registry::default().with(layer).with(filter))
}

/// Install `config` as the process-wide subscriber.
///
/// # Errors
///
/// [`SetupError::SubscriberInit`] when a global subscriber already exists.
pub fn init_global_tracing(config: &TracingConfig) -> Result<(), SetupError> {
    build_subscriber(config)?.try_init()?;
    Ok(())
}

/// Compact `lanewise_core=debug` output for test binaries.
///
/// Safe to call from every test; calls after the first are no-ops.
pub fn init_for_tests() {
    let config = TracingConfig {
        directives: Some("lanewise_core=debug".to_string()),
        ansi: false,
        format: LogFormat::Compact,
        ..TracingConfig::for_local()
    };
    let _ = init_global_tracing(&config);
}
