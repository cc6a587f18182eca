//! Copy loop: forwards chunks from the source to the sink

use crate::config::WriteErrorPolicy;
use crate::core::{ActivityClock, Outcome, ResultSlot};
use crate::error::Side;
use crate::progress::TransferStats;
use std::io::{self, Read, Write};
use std::sync::Arc;

/// Reads the source chunk by chunk and writes each chunk to the sink
/// before the next read. Owns both handles for its lifetime.
pub(crate) struct CopyLoop<R, W> {
    source: R,
    sink: W,
    buffer_size: usize,
    write_errors: WriteErrorPolicy,
    clock: Arc<ActivityClock>,
    stats: Arc<TransferStats>,
    slot: Arc<ResultSlot>,
}

impl<R: Read, W: Write> CopyLoop<R, W> {
    pub(crate) fn new(
        source: R,
        sink: W,
        buffer_size: usize,
        write_errors: WriteErrorPolicy,
        clock: Arc<ActivityClock>,
        stats: Arc<TransferStats>,
        slot: Arc<ResultSlot>,
    ) -> Self {
        Self {
            source,
            sink,
            buffer_size,
            write_errors,
            clock,
            stats,
            slot,
        }
    }

    /// Pump until the source ends or fails, then report the outcome
    pub(crate) fn run(mut self) {
        match self.pump() {
            Some(outcome) => {
                self.slot.deliver(outcome);
            }
            None => tracing::debug!("Copy loop stopped after the pipe finished"),
        }
    }

    /// Returns `None` if the unit finished while a read was pending.
    fn pump(&mut self) -> Option<Outcome> {
        let mut buffer = vec![0u8; self.buffer_size];

        loop {
            let bytes_read = match self.source.read(&mut buffer) {
                Ok(0) => return Some(Outcome::EndOfStream),
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    return Some(Outcome::TransferError {
                        side: Side::Read,
                        source: e,
                    })
                }
            };

            // A timeout already ended the pipe; drop the chunk.
            if self.slot.is_finished() {
                return None;
            }

            if let Err(e) = self.forward(&buffer[..bytes_read]) {
                match self.write_errors {
                    WriteErrorPolicy::Terminate => {
                        return Some(Outcome::TransferError {
                            side: Side::Write,
                            source: e,
                        })
                    }
                    WriteErrorPolicy::Ignore => {
                        tracing::warn!("Dropping {} bytes after write error: {}", bytes_read, e);
                        self.stats.record_dropped(bytes_read as u64);
                        continue;
                    }
                }
            }

            self.clock.touch();
            self.stats.record_chunk(bytes_read as u64);
            tracing::trace!("Forwarded {} bytes", bytes_read);
        }
    }

    fn forward(&mut self, chunk: &[u8]) -> io::Result<()> {
        self.sink.write_all(chunk)?;
        self.sink.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::testutil::{FailingReader, FailingWriter, SharedSink};
    use std::io::Cursor;
    use std::time::Duration;

    fn copy_loop<R: Read, W: Write>(
        source: R,
        sink: W,
        buffer_size: usize,
        policy: WriteErrorPolicy,
    ) -> (CopyLoop<R, W>, crossbeam::channel::Receiver<Outcome>, Arc<TransferStats>) {
        let (slot, rx) = ResultSlot::new();
        let stats = Arc::new(TransferStats::new());
        let pump = CopyLoop::new(
            source,
            sink,
            buffer_size,
            policy,
            Arc::new(ActivityClock::new()),
            Arc::clone(&stats),
            Arc::new(slot),
        );
        (pump, rx, stats)
    }

    #[test]
    fn test_copies_until_end_of_stream() {
        let data: Vec<u8> = (0..10_000u32).map(|i| (i % 251) as u8).collect();
        let sink = SharedSink::new();
        let (pump, rx, stats) = copy_loop(
            Cursor::new(data.clone()),
            sink.clone(),
            64,
            WriteErrorPolicy::Terminate,
        );

        pump.run();

        assert!(rx.recv().unwrap().is_end_of_stream());
        assert_eq!(sink.contents(), data);
        assert_eq!(stats.bytes(), data.len() as u64);
        assert_eq!(stats.chunks(), (data.len() as u64).div_ceil(64));
    }

    #[test]
    fn test_read_error_is_reported() {
        let (pump, rx, _) = copy_loop(
            FailingReader::new(io::ErrorKind::ConnectionReset),
            SharedSink::new(),
            16,
            WriteErrorPolicy::Terminate,
        );

        pump.run();

        match rx.recv().unwrap() {
            Outcome::TransferError { side, source } => {
                assert_eq!(side, Side::Read);
                assert_eq!(source.kind(), io::ErrorKind::ConnectionReset);
            }
            other => panic!("unexpected outcome: {}", other),
        }
    }

    #[test]
    fn test_write_error_terminates_by_default() {
        let (pump, rx, stats) = copy_loop(
            Cursor::new(b"hello".to_vec()),
            FailingWriter,
            16,
            WriteErrorPolicy::Terminate,
        );

        pump.run();

        match rx.recv().unwrap() {
            Outcome::TransferError { side, .. } => assert_eq!(side, Side::Write),
            other => panic!("unexpected outcome: {}", other),
        }
        assert_eq!(stats.bytes(), 0);
    }

    #[test]
    fn test_write_error_ignored_when_permissive() {
        let (pump, rx, stats) = copy_loop(
            Cursor::new(b"hello world".to_vec()),
            FailingWriter,
            4,
            WriteErrorPolicy::Ignore,
        );

        pump.run();

        assert!(rx.recv_timeout(Duration::from_secs(1)).unwrap().is_end_of_stream());
        assert_eq!(stats.bytes(), 0);
        assert_eq!(stats.dropped_bytes(), 11);
    }
}
