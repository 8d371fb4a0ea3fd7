use crate::sink::{LogSink, SinkError};
use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};

/// Writes each record followed by a newline to standard output.
#[derive(Clone, Copy, Debug, Default)]
pub struct StdoutSink;

impl LogSink for StdoutSink {
    fn write(&self, payload: &[u8]) -> Result<usize, SinkError> {
        write_line(&mut io::stdout().lock(), payload)
    }

    fn flush(&self) -> Result<(), SinkError> {
        io::stdout().lock().flush()?;
        Ok(())
    }
}

/// Adapts any [`Write`] implementation into a newline-delimited sink.
///
/// The writer sits behind a mutex so concurrent records never interleave.
#[derive(Debug)]
pub struct WriterSink<W> {
    writer: Mutex<W>,
}

impl<W: Write + Send> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        WriterSink {
            writer: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<W: Write + Send> LogSink for WriterSink<W> {
    fn write(&self, payload: &[u8]) -> Result<usize, SinkError> {
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        write_line(&mut *writer, payload)
    }

    fn flush(&self) -> Result<(), SinkError> {
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        writer.flush()?;
        Ok(())
    }
}

fn write_line<W: Write + ?Sized>(writer: &mut W, payload: &[u8]) -> Result<usize, SinkError> {
    let mut line = Vec::with_capacity(payload.len() + 1);
    line.extend_from_slice(payload);
    line.push(b'\n');
    writer.write_all(&line)?;
    Ok(line.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writer_sink_appends_newline() {
        let sink = WriterSink::new(Vec::new());
        assert_eq!(sink.write(b"{\"a\":1}").unwrap(), 8);
        sink.write(b"{}").unwrap();
        assert_eq!(sink.into_inner(), b"{\"a\":1}\n{}\n".to_vec());
    }

    struct Broken;

    impl Write for Broken {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn writer_errors_surface_as_sink_errors() {
        let sink = WriterSink::new(Broken);
        assert!(matches!(sink.write(b"x"), Err(SinkError::Io(_))));
    }
}
