//! Configuration models for the batch pipeline.

pub mod batch;

pub use batch::{BatchConfig, ConfigError};
