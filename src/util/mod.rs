//! Shared utilities.

pub mod paths;
pub mod telemetry;

pub use telemetry::init_tracing;
