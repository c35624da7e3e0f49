//! Logging setup shared by VivaLife binaries.

/// Subscriber configuration (format, filters).
pub mod subscriber;

pub use subscriber::{LogFormat, UnknownLogFormat, init, init_with};
