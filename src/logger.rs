use crate::fields::{FieldSet, Loggable};
use crate::level::Level;
use crate::record::{LogRecord, Src};
use crate::sink::LogSink;
use crate::stdout_sink::StdoutSink;
use chrono::Utc;
use serde::Serialize;
use std::fmt;
use std::panic::Location;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// What to write when a record cannot be serialized.
///
/// Records built by [`Logger`] hold only strings and `serde_json::Value`
/// fields, so they always serialize today. The policy applies through
/// [`EncodeFailure::encode`], which also covers any other serializable
/// payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EncodeFailure {
    /// Write a human-readable diagnostic line in place of the record.
    #[default]
    Fallback,
    /// Write nothing.
    Discard,
}

impl EncodeFailure {
    /// Serialize `value` to JSON, applying this policy on failure.
    /// `None` means nothing should be written.
    pub fn encode<T: Serialize + ?Sized>(self, value: &T) -> Option<Vec<u8>> {
        match serde_json::to_vec(value) {
            Ok(payload) => Some(payload),
            Err(err) => match self {
                EncodeFailure::Fallback => Some(fallback_payload(&err)),
                EncodeFailure::Discard => None,
            },
        }
    }
}

/// Leveled JSON logger.
///
/// A logger has an immutable application name, a minimum level, a sink and
/// a buffer of pending structured fields. Fields attached with
/// [`Logger::with`] are drained by the next logging call on the returned
/// logger, whether or not that call passes the level gate.
///
/// ```
/// use std::sync::Arc;
/// use fieldlog::{Data, Level, Logger, MemorySink};
///
/// let sink = Arc::new(MemorySink::new());
/// let logger = Logger::with_sink("billing", Level::Info, sink.clone());
///
/// logger.with(Data::from([("invoice", 17)])).info("invoice sent");
/// logger.debug("not written");
///
/// let records = sink.records();
/// assert_eq!(records.len(), 1);
/// assert_eq!(records[0]["data"]["invoice"], 17);
/// ```
pub struct Logger {
    app: Arc<str>,
    level: Level,
    fields: Mutex<FieldSet>,
    sink: Arc<dyn LogSink>,
    encode_failure: EncodeFailure,
}

impl Logger {
    /// Create a logger writing to standard output.
    pub fn new(app: impl Into<String>, level: Level) -> Self {
        Self::with_sink(app, level, Arc::new(StdoutSink))
    }

    /// Create a logger writing to `sink`.
    pub fn with_sink(app: impl Into<String>, level: Level, sink: Arc<dyn LogSink>) -> Self {
        Logger {
            app: Arc::from(app.into()),
            level,
            fields: Mutex::new(FieldSet::new()),
            sink,
            encode_failure: EncodeFailure::default(),
        }
    }

    /// Choose what is written when a record fails to serialize.
    pub fn encode_failure(mut self, policy: EncodeFailure) -> Self {
        self.encode_failure = policy;
        self
    }

    pub fn app_name(&self) -> &str {
        &self.app
    }

    pub fn level(&self) -> Level {
        self.level
    }

    /// Shared handle to the sink this logger writes to.
    pub fn sink(&self) -> Arc<dyn LogSink> {
        Arc::clone(&self.sink)
    }

    /// Snapshot of the fields that the next logging call will consume.
    pub fn pending_fields(&self) -> FieldSet {
        self.lock_fields().clone()
    }

    /// Return a new logger carrying this logger's pending fields merged
    /// with `item`. The receiver's own buffer is left untouched.
    pub fn with(&self, item: impl Loggable) -> Logger {
        self.with_all([&item as &dyn Loggable])
    }

    /// Like [`Logger::with`], merging several items in argument order.
    pub fn with_all<'a, I>(&self, items: I) -> Logger
    where
        I: IntoIterator<Item = &'a dyn Loggable>,
    {
        let mut merged = self.pending_fields();
        merged.absorb_all(items);

        Logger {
            app: Arc::clone(&self.app),
            level: self.level,
            fields: Mutex::new(merged),
            sink: Arc::clone(&self.sink),
            encode_failure: self.encode_failure,
        }
    }

    /// Detailed debug information.
    #[track_caller]
    pub fn debug(&self, msg: impl fmt::Display) {
        self.output(Location::caller(), Level::Debug, msg);
    }

    /// Interesting events, e.g. a user logging in.
    #[track_caller]
    pub fn info(&self, msg: impl fmt::Display) {
        self.output(Location::caller(), Level::Info, msg);
    }

    /// Normal but significant events.
    #[track_caller]
    pub fn notice(&self, msg: impl fmt::Display) {
        self.output(Location::caller(), Level::Notice, msg);
    }

    /// Exceptional occurrences that are not errors, such as use of a
    /// deprecated API.
    #[track_caller]
    pub fn warn(&self, msg: impl fmt::Display) {
        self.output(Location::caller(), Level::Warning, msg);
    }

    /// Runtime errors that do not need immediate action.
    #[track_caller]
    pub fn error(&self, msg: impl fmt::Display) {
        self.output(Location::caller(), Level::Error, msg);
    }

    /// Critical conditions, e.g. a dependency is unavailable.
    #[track_caller]
    pub fn critical(&self, msg: impl fmt::Display) {
        self.output(Location::caller(), Level::Critical, msg);
    }

    /// Action must be taken immediately. This should wake someone up.
    #[track_caller]
    pub fn alert(&self, msg: impl fmt::Display) {
        self.output(Location::caller(), Level::Alert, msg);
    }

    /// The system is unusable.
    #[track_caller]
    pub fn emergency(&self, msg: impl fmt::Display) {
        self.output(Location::caller(), Level::Emergency, msg);
    }

    /// Write an emergency record, then exit the process with status 1.
    ///
    /// The exit happens even if the record could not be written.
    #[track_caller]
    pub fn fatal(&self, msg: impl fmt::Display) -> ! {
        self.output(Location::caller(), Level::Emergency, msg);
        let _ = self.sink.flush();
        std::process::exit(1)
    }

    /// Log at a level chosen at runtime.
    #[track_caller]
    pub fn log(&self, level: Level, msg: impl fmt::Display) {
        self.output(Location::caller(), level, msg);
    }

    fn output(&self, caller: &'static Location<'static>, level: Level, msg: impl fmt::Display) {
        if level < self.level {
            self.lock_fields().clear();
            return;
        }

        let time = Utc::now();
        let src = Src::from_location(caller);
        let data = self.lock_fields().take();

        let record = LogRecord {
            time,
            app: self.app.to_string(),
            level,
            msg: msg.to_string(),
            data,
            src,
        };

        if let Some(payload) = self.encode_failure.encode(&record) {
            let _ = self.sink.write(&payload);
        }
    }

    fn lock_fields(&self) -> MutexGuard<'_, FieldSet> {
        self.fields.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("app", &self.app)
            .field("level", &self.level)
            .field("fields", &*self.lock_fields())
            .field("encode_failure", &self.encode_failure)
            .finish_non_exhaustive()
    }
}

fn fallback_payload(err: &serde_json::Error) -> Vec<u8> {
    format!("Logger unable to marshal log output to JSON: {err}").into_bytes()
}
