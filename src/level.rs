use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Severity of a log record, ordered from [`Level::Debug`] (lowest) to
/// [`Level::Emergency`] (highest).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    Debug,
    Info,
    Notice,
    Warning,
    Error,
    Critical,
    Alert,
    Emergency,
}

/// Level used when a label cannot be resolved.
pub const DEFAULT_LEVEL: Level = Level::Notice;

impl Level {
    /// All levels in ascending severity.
    pub const ALL: [Level; 8] = [
        Level::Debug,
        Level::Info,
        Level::Notice,
        Level::Warning,
        Level::Error,
        Level::Critical,
        Level::Alert,
        Level::Emergency,
    ];

    /// Lowercase label written into the `level` field of a record.
    pub fn as_str(self) -> &'static str {
        match self {
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Notice => "notice",
            Level::Warning => "warning",
            Level::Error => "error",
            Level::Critical => "critical",
            Level::Alert => "alert",
            Level::Emergency => "emergency",
        }
    }

    /// Case-insensitive lookup that resolves unknown labels to `default`
    /// instead of failing.
    pub fn parse_or(value: &str, default: Level) -> Level {
        value.parse().unwrap_or(default)
    }
}

/// Resolve a level label, falling back to [`DEFAULT_LEVEL`].
///
/// ```
/// use fieldlog::level::{to_level, Level};
///
/// assert_eq!(to_level("WARNING"), Level::Warning);
/// assert_eq!(to_level("nope"), Level::Notice);
/// ```
pub fn to_level(value: &str) -> Level {
    Level::parse_or(value, DEFAULT_LEVEL)
}

impl Default for Level {
    fn default() -> Self {
        DEFAULT_LEVEL
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned by the strict [`FromStr`] implementation of [`Level`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown log level: {0:?}")]
pub struct ParseLevelError(pub String);

impl FromStr for Level {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Level::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseLevelError(s.to_string()))
    }
}

impl Serialize for Level {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}
