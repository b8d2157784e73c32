//! Logger setup for binaries and tests.
//!
//! The engine itself only emits through the `log` facade; `env_logger` is
//! installed here on request.

mod init;

pub use init::{init_logging, LoggingConfig};
