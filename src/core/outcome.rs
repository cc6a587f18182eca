//! Terminal outcome of a pipe and its single-fire delivery

use crate::error::{IdlePipeError, Result, Side};
use crossbeam::channel::{self, Receiver, Sender};
use serde::Serialize;
use std::fmt;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// How a pipe ended
#[derive(Debug)]
pub enum Outcome {
    /// The source reported end of stream
    EndOfStream,
    /// The source or sink reported an I/O fault
    TransferError {
        /// Which end failed
        side: Side,
        /// The underlying fault, verbatim
        source: io::Error,
    },
    /// Nothing moved for at least the configured idle interval
    Timeout {
        /// The idle interval that was exceeded
        idle: Duration,
    },
}

/// Fieldless classification of an [`Outcome`], for reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    /// See [`Outcome::EndOfStream`]
    EndOfStream,
    /// See [`Outcome::TransferError`]
    TransferError,
    /// See [`Outcome::Timeout`]
    Timeout,
}

impl Outcome {
    /// Classification without the error payload
    pub fn kind(&self) -> OutcomeKind {
        match self {
            Self::EndOfStream => OutcomeKind::EndOfStream,
            Self::TransferError { .. } => OutcomeKind::TransferError,
            Self::Timeout { .. } => OutcomeKind::Timeout,
        }
    }

    /// True for a clean end of stream
    pub fn is_end_of_stream(&self) -> bool {
        matches!(self, Self::EndOfStream)
    }

    /// True if the idle monitor ended the pipe
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Convert into a `Result`, treating end of stream as success
    pub fn into_result(self) -> Result<()> {
        match self {
            Self::EndOfStream => Ok(()),
            Self::TransferError { side, source } => Err(IdlePipeError::Transfer { side, source }),
            Self::Timeout { idle } => Err(IdlePipeError::Timeout(idle)),
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EndOfStream => f.write_str("end of stream"),
            Self::TransferError { side, source } => write!(f, "{} error: {}", side, source),
            Self::Timeout { idle } => {
                write!(f, "timeout after {}", humantime::format_duration(*idle))
            }
        }
    }
}

/// Single-assignment slot that both background activities race to fill.
///
/// Only the first [`deliver`](ResultSlot::deliver) is transmitted; later calls
/// return `false` without blocking. The guard is a compare-and-set flag, so the
/// channel behind it only ever sees one value.
#[derive(Debug)]
pub struct ResultSlot {
    fired: AtomicBool,
    outcome_tx: Sender<Outcome>,
    finished_tx: Sender<()>,
    finished_rx: Receiver<()>,
}

impl ResultSlot {
    /// Create a slot and the receiving end the waiting caller blocks on
    pub fn new() -> (Self, Receiver<Outcome>) {
        let (outcome_tx, outcome_rx) = channel::bounded(1);
        let (finished_tx, finished_rx) = channel::bounded(1);

        let slot = Self {
            fired: AtomicBool::new(false),
            outcome_tx,
            finished_tx,
            finished_rx,
        };

        (slot, outcome_rx)
    }

    /// Offer an outcome. Returns `true` if this call won the race.
    pub fn deliver(&self, outcome: Outcome) -> bool {
        if self
            .fired
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::trace!("Discarding late outcome: {}", outcome);
            return false;
        }

        tracing::debug!("Pipe finished: {}", outcome);

        // Both channels have capacity one and a single winner, so neither send blocks.
        // A dropped receiver only means nobody is waiting any more.
        let _ = self.outcome_tx.try_send(outcome);
        let _ = self.finished_tx.try_send(());
        true
    }

    /// Whether an outcome has been delivered
    pub fn is_finished(&self) -> bool {
        self.fired.load(Ordering::Acquire)
    }

    /// Receiver that becomes ready once an outcome has been delivered.
    ///
    /// The signal is consumed by the first receive; it is meant for a single
    /// background listener (the idle monitor).
    pub fn finished(&self) -> Receiver<()> {
        self.finished_rx.clone()
    }
}
