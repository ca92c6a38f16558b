//! Blocking adapters between the exchange and the daemon control channel
//!
//! The exchange only needs two capabilities from the channel: pull the next
//! prompt record and push one batch of answer records. The traits here keep
//! the transport out of the session loop; the line adapters cover the common
//! case of a pipe or socket stream already wrapped in standard I/O types.

use std::io::{self, BufRead, Write};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChannelError {
    #[error("control channel read failed: {0}")]
    Read(#[source] io::Error),
    #[error("control channel write failed: {0}")]
    Write(#[source] io::Error),
}

/// Blocking pull of prompt records from the daemon.
pub trait RecordSource {
    /// Next record line, or `None` once the channel is closed.
    fn next_record(&mut self) -> Result<Option<String>, ChannelError>;
}

/// Delivery of one batch of answer records back to the daemon.
pub trait CommandSink {
    fn send_command(&mut self, records: &[String]) -> Result<(), ChannelError>;
}

/// [`RecordSource`] over any buffered reader, one record per line.
pub struct LineSource<R> {
    reader: R,
}

impl<R: BufRead> LineSource<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead> RecordSource for LineSource<R> {
    fn next_record(&mut self) -> Result<Option<String>, ChannelError> {
        let mut line = String::new();
        let n = self.reader.read_line(&mut line).map_err(ChannelError::Read)?;
        if n == 0 {
            return Ok(None);
        }
        while line.ends_with('\n') || line.ends_with('\r') {
            line.pop();
        }
        Ok(Some(line))
    }
}

/// [`CommandSink`] over any writer, one record per line, flushed per batch.
pub struct LineSink<W> {
    writer: W,
}

impl<W: Write> LineSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write> CommandSink for LineSink<W> {
    fn send_command(&mut self, records: &[String]) -> Result<(), ChannelError> {
        for record in records {
            self.writer
                .write_all(record.as_bytes())
                .map_err(ChannelError::Write)?;
            self.writer.write_all(b"\n").map_err(ChannelError::Write)?;
        }
        self.writer.flush().map_err(ChannelError::Write)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_line_source_strips_line_endings() {
        let mut source = LineSource::new(Cursor::new("P user/Username=\r\nE\nX\n"));

        assert_eq!(source.next_record().unwrap().as_deref(), Some("P user/Username="));
        assert_eq!(source.next_record().unwrap().as_deref(), Some("E"));
        assert_eq!(source.next_record().unwrap().as_deref(), Some("X"));
        assert_eq!(source.next_record().unwrap(), None);
    }

    #[test]
    fn test_line_source_keeps_last_unterminated_line() {
        let mut source = LineSource::new(Cursor::new("X"));

        assert_eq!(source.next_record().unwrap().as_deref(), Some("X"));
        assert_eq!(source.next_record().unwrap(), None);
    }

    #[test]
    fn test_line_sink_writes_batch() {
        let mut buf = Vec::new();
        {
            let mut sink = LineSink::new(&mut buf);
            sink.send_command(&["P user=bob".to_string(), "T code=123".to_string()])
                .unwrap();
        }
        assert_eq!(buf, b"P user=bob\nT code=123\n");
    }

    #[test]
    fn test_line_sink_empty_batch_writes_nothing() {
        let mut buf = Vec::new();
        {
            let mut sink = LineSink::new(&mut buf);
            sink.send_command(&[]).unwrap();
        }
        assert!(buf.is_empty());
    }
}
