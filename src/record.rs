use crate::fields::FieldSet;
use crate::level::Level;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::panic::Location;
use std::path::{is_separator, MAIN_SEPARATOR};

/// One serialized log line. Field names are part of the wire format.
#[derive(Debug, Clone, Serialize)]
pub struct LogRecord {
    pub time: DateTime<Utc>,
    pub app: String,
    pub level: Level,
    pub msg: String,
    #[serde(skip_serializing_if = "FieldSet::is_empty")]
    pub data: FieldSet,
    #[serde(rename = "Src")]
    pub src: Src,
}

/// Call site of a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Src {
    pub file: String,
    pub line: u32,
}

impl Src {
    pub fn from_location(location: &Location<'_>) -> Self {
        Src {
            file: truncate_file(location.file()),
            line: location.line(),
        }
    }
}

/// Reduce a path to its parent directory and file name so records do not
/// leak the build path.
///
/// ```
/// use fieldlog::record::truncate_file;
///
/// assert_eq!(truncate_file("project/src/model/user.rs"), "model/user.rs");
/// assert_eq!(truncate_file("main.rs"), "main.rs");
/// ```
pub fn truncate_file(path: &str) -> String {
    let (dir, file) = match path.rfind(is_separator) {
        // separators are ASCII
        Some(idx) => (&path[..idx], &path[idx + 1..]),
        None => ("", path),
    };

    match dir.split(is_separator).filter(|s| !s.is_empty()).last() {
        Some(parent) if file.is_empty() => parent.to_string(),
        Some(parent) => format!("{parent}{MAIN_SEPARATOR}{file}"),
        None => file.to_string(),
    }
}
