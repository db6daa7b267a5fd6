//! Logging utilities.
//!
//! Library code only talks to the `log` facade; this module owns the one
//! place where an `env_logger` backend is installed.

mod init;

pub use init::{init_logging, LoggingConfig};
