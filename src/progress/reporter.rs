//! Transfer statistics and end-of-pipe summary
//!
//! Counters are updated by the copy loop and read by the caller:
//! - Bytes and chunks forwarded to the sink
//! - Bytes dropped after ignored write errors
//! - Elapsed time and throughput for the summary

use crate::config::{OutputFormat, PipeConfig};
use crate::core::{Outcome, OutcomeKind};
use serde::Serialize;
use std::io::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Live transfer counters shared between the copy loop and the caller
#[derive(Debug)]
pub struct TransferStats {
    /// Start time
    start_time: Instant,
    /// Bytes written to the sink
    bytes: AtomicU64,
    /// Chunks written to the sink
    chunks: AtomicU64,
    /// Bytes read but not written (ignored write errors)
    dropped_bytes: AtomicU64,
}

impl TransferStats {
    /// Create zeroed counters, starting the clock now
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            bytes: AtomicU64::new(0),
            chunks: AtomicU64::new(0),
            dropped_bytes: AtomicU64::new(0),
        }
    }

    /// Count one chunk forwarded to the sink
    pub fn record_chunk(&self, bytes: u64) {
        self.bytes.fetch_add(bytes, Ordering::Relaxed);
        self.chunks.fetch_add(1, Ordering::Relaxed);
    }

    /// Count bytes lost to an ignored write error
    pub fn record_dropped(&self, bytes: u64) {
        self.dropped_bytes.fetch_add(bytes, Ordering::Relaxed);
    }

    /// Bytes forwarded so far
    pub fn bytes(&self) -> u64 {
        self.bytes.load(Ordering::Relaxed)
    }

    /// Chunks forwarded so far
    pub fn chunks(&self) -> u64 {
        self.chunks.load(Ordering::Relaxed)
    }

    /// Bytes dropped so far
    pub fn dropped_bytes(&self) -> u64 {
        self.dropped_bytes.load(Ordering::Relaxed)
    }

    /// Time since the counters were created
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Freeze the counters into a summary for the given outcome
    pub fn summarize(&self, outcome: &Outcome, config: &PipeConfig) -> PipeSummary {
        let elapsed = self.elapsed();
        let bytes = self.bytes();
        let secs = elapsed.as_secs_f64();

        PipeSummary {
            outcome: outcome.kind(),
            detail: outcome.to_string(),
            config: *config,
            bytes,
            chunks: self.chunks(),
            dropped_bytes: self.dropped_bytes(),
            elapsed_secs: secs,
            throughput: if secs > 0.0 { bytes as f64 / secs } else { 0.0 },
        }
    }
}

impl Default for TransferStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of a finished pipe
#[derive(Debug, Clone, Serialize)]
pub struct PipeSummary {
    /// How the pipe ended
    pub outcome: OutcomeKind,
    /// Human-readable outcome, including error details
    pub detail: String,
    /// Settings the pipe ran with
    pub config: PipeConfig,
    /// Bytes forwarded
    pub bytes: u64,
    /// Chunks forwarded
    pub chunks: u64,
    /// Bytes dropped after ignored write errors
    pub dropped_bytes: u64,
    /// Lifetime of the pipe in seconds
    pub elapsed_secs: f64,
    /// Average throughput in bytes/second
    pub throughput: f64,
}

impl PipeSummary {
    /// Render as text or JSON
    pub fn render(&self, format: OutputFormat) -> String {
        match format {
            OutputFormat::Text => self.render_text(),
            OutputFormat::Json => {
                serde_json::to_string(self).unwrap_or_else(|e| format!("{{\"error\":\"{}\"}}", e))
            }
        }
    }

    fn render_text(&self) -> String {
        let elapsed = Duration::from_secs_f64(self.elapsed_secs);
        let mut text = format!(
            "=== Pipe Summary ===\n\
             Outcome:     {}\n\
             Timeout:     {}\n\
             Buffer:      {}\n\
             Transferred: {} in {} chunks\n\
             Duration:    {:.2?}\n\
             Throughput:  {}/s\n",
            self.detail,
            humantime::format_duration(self.config.idle_timeout),
            humansize::format_size(self.config.buffer_size as u64, humansize::BINARY),
            humansize::format_size(self.bytes, humansize::BINARY),
            self.chunks,
            elapsed,
            humansize::format_size(self.throughput as u64, humansize::BINARY),
        );

        if self.dropped_bytes > 0 {
            text.push_str(&format!(
                "Dropped:     {}\n",
                humansize::format_size(self.dropped_bytes, humansize::BINARY)
            ));
        }

        text
    }

    /// Print to stderr; stdout carries the piped data
    pub fn print(&self, format: OutputFormat) {
        let mut stderr = std::io::stderr().lock();
        let _ = writeln!(stderr, "{}", self.render(format).trim_end());
    }
}
