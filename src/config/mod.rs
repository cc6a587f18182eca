//! Configuration module for IdlePipe
//!
//! Provides CLI arguments, size and duration parsing,
//! and the validated runtime settings of a pipe.

mod settings;

pub use settings::*;
