//! # IdlePipe - Stall-Aware Byte Pipe
//!
//! IdlePipe copies a byte stream from a reader to a writer and gives up once
//! no data has moved for longer than a configured idle interval. It sits
//! between two endpoints (for instance a producer's stdout and a consumer's
//! stdin) so that a stalled pipeline ends instead of hanging forever.
//!
//! ## Features
//!
//! - **Chunked Copy Loop**: Every byte read is written before the next read
//! - **Idle Monitor**: Periodic staleness check against the last transfer
//! - **Single Outcome**: End of stream, transfer error or timeout, reported once
//! - **Write Error Policy**: Terminate on sink failure, or keep reading
//! - **Follow-up Command**: Optionally launch a command once the pipe ends
//!
//! ## Quick Start
//!
//! ```no_run
//! use idlepipe::core::FlowControlUnit;
//! use std::time::Duration;
//!
//! let unit = FlowControlUnit::with_timeout(
//!     std::io::stdin(),
//!     std::io::stdout(),
//!     Duration::from_secs(5),
//!     64 * 1024,
//! ).unwrap();
//!
//! match unit.wait().into_result() {
//!     Ok(()) => eprintln!("stream closed"),
//!     Err(e) => eprintln!("pipe aborted: {}", e),
//! }
//! ```
//!
//! ## Tolerating a Broken Sink
//!
//! ```no_run
//! use idlepipe::config::{PipeConfig, WriteErrorPolicy};
//! use idlepipe::core::FlowControlUnit;
//! use std::time::Duration;
//!
//! let config = PipeConfig::new(Duration::from_millis(500), 4096)
//!     .unwrap()
//!     .with_write_errors(WriteErrorPolicy::Ignore);
//!
//! let unit = FlowControlUnit::start(std::io::stdin(), std::io::sink(), config).unwrap();
//! let stats = unit.stats();
//! let outcome = unit.wait();
//!
//! stats.summarize(&outcome, &config).print(idlepipe::config::OutputFormat::Text);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod core;
pub mod error;
pub mod exec;
pub mod progress;

// Re-export commonly used types
pub use config::{PipeConfig, WriteErrorPolicy};
pub use core::{FlowControlUnit, Outcome, OutcomeKind};
pub use error::{IdlePipeError, Result};
pub use progress::{PipeSummary, TransferStats};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports
pub mod prelude {
    //! Convenient re-exports for common usage
    //!
    //! ```no_run
    //! use idlepipe::prelude::*;
    //! ```

    pub use crate::config::{PipeConfig, WriteErrorPolicy};
    pub use crate::core::{FlowControlUnit, Outcome, OutcomeKind};
    pub use crate::error::{IdlePipeError, Result};
    pub use crate::exec::{CommandMode, FollowUpCommand};
    pub use crate::progress::{PipeSummary, TransferStats};
}
