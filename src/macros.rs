//! printf-style entry points.
//!
//! Each macro forwards `format_args!` to the matching [`Logger`](crate::Logger)
//! method, so the recorded source location is the macro call site.
//!
//! ```
//! use std::sync::Arc;
//! use fieldlog::{info, Level, Logger, MemorySink};
//!
//! let sink = Arc::new(MemorySink::new());
//! let logger = Logger::with_sink("api", Level::Info, sink.clone());
//! info!(logger, "served {} requests", 3);
//!
//! assert_eq!(sink.records()[0]["msg"], "served 3 requests");
//! ```

#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        $logger.debug(::std::format_args!($($arg)+))
    };
}

#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        $logger.info(::std::format_args!($($arg)+))
    };
}

#[macro_export]
macro_rules! notice {
    ($logger:expr, $($arg:tt)+) => {
        $logger.notice(::std::format_args!($($arg)+))
    };
}

#[macro_export]
macro_rules! warn {
    ($logger:expr, $($arg:tt)+) => {
        $logger.warn(::std::format_args!($($arg)+))
    };
}

#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $logger.error(::std::format_args!($($arg)+))
    };
}

#[macro_export]
macro_rules! critical {
    ($logger:expr, $($arg:tt)+) => {
        $logger.critical(::std::format_args!($($arg)+))
    };
}

#[macro_export]
macro_rules! alert {
    ($logger:expr, $($arg:tt)+) => {
        $logger.alert(::std::format_args!($($arg)+))
    };
}

#[macro_export]
macro_rules! emergency {
    ($logger:expr, $($arg:tt)+) => {
        $logger.emergency(::std::format_args!($($arg)+))
    };
}

/// Writes an emergency record and exits the process with status 1.
#[macro_export]
macro_rules! fatal {
    ($logger:expr, $($arg:tt)+) => {
        $logger.fatal(::std::format_args!($($arg)+))
    };
}
