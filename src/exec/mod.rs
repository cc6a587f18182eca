//! Follow-up command module
//!
//! Builds and launches the command that runs once a pipe has finished.

mod command;

pub use command::*;
