//! Shared utilities for the veil workspace.

pub mod logging;
pub mod spans;

pub use logging::{init_logging, LogFormat, LogFormatError};
