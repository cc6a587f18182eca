//! Scripted sources and sinks for exercising the pipe

use crossbeam::channel::{self, Receiver, Sender};
use std::io::{self, Read, Write};
use std::sync::{Arc, Mutex};

/// Reader fed chunk by chunk through a channel.
///
/// `read` blocks until the next chunk arrives and reports end of stream once
/// every sender is dropped.
pub(crate) struct ScriptedReader {
    chunks: Receiver<Vec<u8>>,
    pending: Vec<u8>,
}

pub(crate) fn scripted_source() -> (Sender<Vec<u8>>, ScriptedReader) {
    let (tx, rx) = channel::unbounded();
    let reader = ScriptedReader {
        chunks: rx,
        pending: Vec::new(),
    };
    (tx, reader)
}

impl Read for ScriptedReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.pending.is_empty() {
            match self.chunks.recv() {
                Ok(chunk) => self.pending = chunk,
                Err(_) => return Ok(0),
            }
        }

        let n = buf.len().min(self.pending.len());
        buf[..n].copy_from_slice(&self.pending[..n]);
        self.pending.drain(..n);
        Ok(n)
    }
}

/// Reader failing on every call
pub(crate) struct FailingReader {
    kind: io::ErrorKind,
}

impl FailingReader {
    pub(crate) fn new(kind: io::ErrorKind) -> Self {
        Self { kind }
    }
}

impl Read for FailingReader {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Err(io::Error::new(self.kind, "scripted read failure"))
    }
}

/// Writer rejecting every write
pub(crate) struct FailingWriter;

impl Write for FailingWriter {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "scripted write failure"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Writer panicking on the first write
pub(crate) struct PanickingWriter;

impl Write for PanickingWriter {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        panic!("scripted sink panic");
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// In-memory sink whose contents stay readable after the pipe owns a clone
#[derive(Clone, Default)]
pub(crate) struct SharedSink {
    data: Arc<Mutex<Vec<u8>>>,
}

impl SharedSink {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn contents(&self) -> Vec<u8> {
        self.data.lock().unwrap().clone()
    }
}

impl Write for SharedSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.data.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
