//! Logging utilities.
//!
//! Everything in the workspace logs through the `log` facade; this module
//! owns the one place where the `env_logger` backend is installed.

mod init;

pub use init::{init_logging, LoggingConfig};
