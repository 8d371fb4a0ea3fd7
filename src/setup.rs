use crate::env::{env_opt, level_from_env, LOG_SINK_TIMEOUT_MS_ENV, LOG_SINK_URL_ENV};
use crate::fields::Data;
use crate::level::{Level, DEFAULT_LEVEL};
use crate::logger::{EncodeFailure, Logger};
use crate::sink::LogSink;
use crate::stdout_sink::StdoutSink;
use std::sync::Arc;
use std::time::Duration;

/// Logger configuration.
///
/// **Fields**
/// - `level`: minimum level written by the logger.
/// - `remote_url`: when set, records are also POSTed to this endpoint.
/// - `remote_timeout`: overall timeout of one POST.
/// - `encode_failure`: what to write when a record fails to serialize.
/// - `enable_diagnostics`: if `true`, a `tracing_subscriber::fmt` layer on
///   stderr is installed (unless a global subscriber already exists) so the
///   crate's own warnings, such as failed POSTs, are visible.
#[derive(Clone, Debug)]
pub struct LoggerConfig {
    pub level: Level,
    pub remote_url: Option<String>,
    pub remote_timeout: Duration,
    pub encode_failure: EncodeFailure,
    pub enable_diagnostics: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LEVEL,
            remote_url: None,
            remote_timeout: Duration::from_secs(3),
            encode_failure: EncodeFailure::Fallback,
            enable_diagnostics: true,
        }
    }
}

impl LoggerConfig {
    /// Defaults overridden by `LOG_LEVEL`, `LOG_SINK_URL` and
    /// `LOG_SINK_TIMEOUT_MS`. Unparseable values keep their default.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let remote_timeout = env_opt(LOG_SINK_TIMEOUT_MS_ENV)
            .and_then(|ms| ms.trim().parse::<u64>().ok())
            .map_or(defaults.remote_timeout, Duration::from_millis);

        Self {
            level: level_from_env(defaults.level),
            remote_url: env_opt(LOG_SINK_URL_ENV),
            remote_timeout,
            ..defaults
        }
    }
}

/// Error type returned by [`init_logger_with_config`].
#[derive(thiserror::Error, Debug)]
pub enum SetupError {
    #[cfg(feature = "remote")]
    #[error("failed to build remote log sink: {0}")]
    Remote(#[from] crate::remote::RemoteSinkError),

    #[error("remote log sink requested but the `remote` feature is not enabled")]
    RemoteFeatureDisabled,
}

/// Install the stderr subscriber for the crate's own diagnostics.
///
/// Does nothing if a global `tracing` subscriber is already set.
pub fn init_diagnostics() {
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Build a logger from an explicit [`LoggerConfig`].
///
/// **Returns**
/// - A logger writing to stdout, plus a remote copy when
///   `config.remote_url` is set.
/// - `Err(..)` if the remote sink could not be built.
pub fn init_logger_with_config(app: &str, config: LoggerConfig) -> Result<Logger, SetupError> {
    if config.enable_diagnostics {
        init_diagnostics();
    }

    let sink = make_sink(&config)?;
    Ok(Logger::with_sink(app, config.level, sink).encode_failure(config.encode_failure))
}

fn make_sink(config: &LoggerConfig) -> Result<Arc<dyn LogSink>, SetupError> {
    let Some(url) = &config.remote_url else {
        return Ok(Arc::new(StdoutSink));
    };

    #[cfg(feature = "remote")]
    {
        use crate::remote::{RemoteConfig, RemoteSink};

        let mut remote = RemoteConfig::new(url.clone());
        remote.timeout = config.remote_timeout;
        Ok(Arc::new(RemoteSink::new(remote)?) as Arc<dyn LogSink>)
    }

    #[cfg(not(feature = "remote"))]
    {
        let _ = url;
        Err(SetupError::RemoteFeatureDisabled)
    }
}

/// Standard logger setup for a service, configured from the environment.
///
/// The returned logger carries a `build` field, which is written on the
/// first record it emits. If the remote sink cannot be built the logger
/// falls back to stdout and a diagnostic warning is emitted.
pub fn setup_logger(app: &str, build: &str) -> Logger {
    let config = LoggerConfig::from_env();
    let level = config.level;
    let encode_failure = config.encode_failure;

    let logger = init_logger_with_config(app, config).unwrap_or_else(|err| {
        tracing::warn!(error = %err, "falling back to stdout log sink");
        Logger::new(app, level).encode_failure(encode_failure)
    });

    logger.with(Data::from([("build", build)]))
}
