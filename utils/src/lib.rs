//! Shared utilities for freecpu.

pub mod logging;
pub mod stats;

pub use logging::{init_logging, LogFormat, LoggingError};
pub use stats::StatsCounter;
