//! Flow control unit: wires the copy loop, idle monitor and result slot

use crate::config::PipeConfig;
use crate::core::{ActivityClock, CopyLoop, IdleMonitor, Outcome, ResultSlot};
use crate::error::{IdlePipeError, Result, Side};
use crate::progress::TransferStats;
use crossbeam::channel::Receiver;
use std::io::{self, Read, Write};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Pipes a reader to a writer and terminates prematurely if nothing has been
/// sent for longer than the idle timeout.
///
/// Both background activities start in [`start`](FlowControlUnit::start) and
/// run on their own threads. The source and sink are moved into the copy
/// thread and dropped when the copy loop ends. A copy loop blocked in `read`
/// after a timeout keeps its thread until the read returns.
///
/// ```no_run
/// use idlepipe::config::PipeConfig;
/// use idlepipe::core::FlowControlUnit;
/// use std::time::Duration;
///
/// let config = PipeConfig::new(Duration::from_secs(5), 64 * 1024)?;
/// let unit = FlowControlUnit::start(std::io::stdin(), std::io::stdout(), config)?;
/// let outcome = unit.wait();
/// eprintln!("quitting: {}", outcome);
/// # Ok::<(), idlepipe::IdlePipeError>(())
/// ```
pub struct FlowControlUnit {
    config: PipeConfig,
    clock: Arc<ActivityClock>,
    stats: Arc<TransferStats>,
    slot: Arc<ResultSlot>,
    outcome_rx: Receiver<Outcome>,
}

impl FlowControlUnit {
    /// Validate the configuration and start copying and monitoring
    pub fn start<R, W>(source: R, sink: W, config: PipeConfig) -> Result<Self>
    where
        R: Read + Send + 'static,
        W: Write + Send + 'static,
    {
        config.validate()?;

        let clock = Arc::new(ActivityClock::new());
        let stats = Arc::new(TransferStats::new());
        let (slot, outcome_rx) = ResultSlot::new();
        let slot = Arc::new(slot);

        let copy_loop = CopyLoop::new(
            source,
            sink,
            config.buffer_size,
            config.write_errors,
            Arc::clone(&clock),
            Arc::clone(&stats),
            Arc::clone(&slot),
        );
        let monitor = IdleMonitor::new(
            config.idle_timeout,
            Arc::clone(&clock),
            Arc::clone(&slot),
        );

        // Copy loop first, so an immediate read error is seen before the first tick.
        thread::Builder::new()
            .name("idlepipe-copy".to_string())
            .spawn(move || copy_loop.run())
            .map_err(|e| IdlePipeError::spawn("copy loop", e))?;

        thread::Builder::new()
            .name("idlepipe-monitor".to_string())
            .spawn(move || monitor.run())
            .map_err(|e| IdlePipeError::spawn("idle monitor", e))?;

        tracing::debug!(
            "Started pipe: timeout={}, buffer={}",
            humantime::format_duration(config.idle_timeout),
            humansize::format_size(config.buffer_size as u64, humansize::BINARY)
        );

        Ok(Self {
            config,
            clock,
            stats,
            slot,
            outcome_rx,
        })
    }

    /// Convenience wrapper building the configuration from raw values
    pub fn with_timeout<R, W>(
        source: R,
        sink: W,
        timeout: Duration,
        buffer_size: usize,
    ) -> Result<Self>
    where
        R: Read + Send + 'static,
        W: Write + Send + 'static,
    {
        Self::start(source, sink, PipeConfig::new(timeout, buffer_size)?)
    }

    /// Block until the pipe ends, returning how it ended.
    ///
    /// Consumes the unit, so the outcome can be observed exactly once.
    pub fn wait(self) -> Outcome {
        let Self { slot, outcome_rx, .. } = self;
        // The threads now hold the only senders.
        drop(slot);

        match outcome_rx.recv() {
            Ok(outcome) => outcome,
            // Both threads panicked before either delivered.
            Err(_) => Outcome::TransferError {
                side: Side::Read,
                source: io::Error::other("pipe threads exited without an outcome"),
            },
        }
    }

    /// Whether an outcome is ready, so [`wait`](FlowControlUnit::wait) will not block
    pub fn is_finished(&self) -> bool {
        self.slot.is_finished()
    }

    /// Configuration the unit was started with
    pub fn config(&self) -> &PipeConfig {
        &self.config
    }

    /// Time since the last chunk moved
    pub fn idle(&self) -> Duration {
        self.clock.idle()
    }

    /// Live transfer counters
    pub fn stats(&self) -> Arc<TransferStats> {
        Arc::clone(&self.stats)
    }
}
