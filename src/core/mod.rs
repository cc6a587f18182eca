//! Core flow control module
//!
//! Provides the supervised copy: a copy loop that forwards chunks,
//! an idle monitor that watches for stalls, and the single-fire
//! outcome delivery both of them race to complete.

mod activity;
mod monitor;
mod outcome;
mod pump;
mod unit;

#[cfg(test)]
pub(crate) mod testutil;

pub use activity::*;
pub use outcome::*;
pub use unit::*;

pub(crate) use monitor::IdleMonitor;
pub(crate) use pump::CopyLoop;
