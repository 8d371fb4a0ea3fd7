use std::io;

/// Destination for fully-serialized log records.
///
/// Implementations receive one record per call, without a trailing
/// newline. The logger discards whatever error a sink returns, so a sink
/// must never panic on I/O failure.
pub trait LogSink: Send + Sync {
    /// Write a single serialized record.
    ///
    /// **Returns**
    /// - `Ok(n)` with the number of bytes written to the primary target.
    /// - `Err(..)` if the primary target failed. Best-effort copies (such
    ///   as a network POST) never influence the result.
    fn write(&self, payload: &[u8]) -> Result<usize, SinkError>;

    /// Flush any buffered output.
    ///
    /// Default implementation is a no-op.
    fn flush(&self) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Error type returned by [`LogSink`] implementations.
#[derive(thiserror::Error, Debug)]
pub enum SinkError {
    #[error("log sink i/o error: {0}")]
    Io(#[from] io::Error),

    #[error("log sink is closed")]
    Closed,
}
