//! Environment variable names used by this crate for convenient
//! configuration of loggers from services.
//!
//! These are purely helpers; [`Logger`](crate::Logger) itself never reads
//! the environment.

use crate::level::Level;

/// Minimum level, by label (case-insensitive).
pub const LOG_LEVEL_ENV: &str = "LOG_LEVEL";

/// Optional endpoint receiving a POST copy of every record.
pub const LOG_SINK_URL_ENV: &str = "LOG_SINK_URL";

/// Optional timeout of the remote POST, in milliseconds.
pub const LOG_SINK_TIMEOUT_MS_ENV: &str = "LOG_SINK_TIMEOUT_MS";

/// Read a non-empty environment variable.
pub fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

/// Level named by `LOG_LEVEL`, or `default` when unset or unrecognized.
///
/// Pass [`DEFAULT_LEVEL`](crate::level::DEFAULT_LEVEL) for the usual
/// `notice` fallback.
pub fn level_from_env(default: Level) -> Level {
    env_opt(LOG_LEVEL_ENV).map_or(default, |value| Level::parse_or(value.trim(), default))
}
