use crate::sink::{LogSink, SinkError};
use serde_json::Value;
use std::sync::{Mutex, PoisonError};

/// A sink that keeps every record in memory.
///
/// Useful for unit tests that need to inspect emitted records, and for
/// embedding the logger where output is collected by the host.
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<Vec<u8>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records written so far, as UTF-8 (lossy) strings.
    pub fn lines(&self) -> Vec<String> {
        self.lock()
            .iter()
            .map(|line| String::from_utf8_lossy(line).into_owned())
            .collect()
    }

    /// Records written so far, parsed as JSON. Lines that are not valid
    /// JSON come back as `Value::String`.
    pub fn records(&self) -> Vec<Value> {
        self.lock()
            .iter()
            .map(|line| {
                serde_json::from_slice(line)
                    .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(line).into_owned()))
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Vec<u8>>> {
        self.lines.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl LogSink for MemorySink {
    fn write(&self, payload: &[u8]) -> Result<usize, SinkError> {
        self.lock().push(payload.to_vec());
        Ok(payload.len())
    }
}
