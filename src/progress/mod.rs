//! Progress reporting module
//!
//! Tracks bytes and chunks moving through a pipe and renders
//! a summary once the pipe has finished.

mod reporter;

pub use reporter::*;
