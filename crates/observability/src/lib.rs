//! # saferchat-observability
//!
//! Structured Logging via tracing-subscriber (Text oder JSON, auf stderr,
//! damit stdout dem Chat gehoert).

pub mod logging;

pub use logging::{logging_initialisieren, LogFormat, LoggingError};
