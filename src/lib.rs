//! Leveled JSON logger with chained structured fields.
//!
//! Records are written one per line to a [`LogSink`]: standard output by
//! default, or [`RemoteSink`](remote::RemoteSink) to also POST each line
//! to an HTTP endpoint. [`AccessLog`] builds the matching access-log
//! format for HTTP middleware.

mod macros;

pub mod level;
pub mod fields;
pub mod record;
pub mod logger;
pub mod sink;
pub mod stdout_sink;
pub mod memory_sink;

#[cfg(feature = "remote")]
pub mod remote;

pub mod adapter;
pub mod env;
pub mod setup;

pub use adapter::{AccessEntry, AccessLog};
pub use fields::{Data, FieldSet, FieldValue, Loggable};
pub use level::{to_level, Level};
pub use logger::{EncodeFailure, Logger};
pub use memory_sink::MemorySink;
pub use record::{LogRecord, Src};
pub use setup::{setup_logger, LoggerConfig};
pub use sink::{LogSink, SinkError};
pub use stdout_sink::{StdoutSink, WriterSink};
