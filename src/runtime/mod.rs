//! Runtime adapters and the output stage.

pub mod output;
pub mod tokio_spawner;

pub use output::{OutputFormat, OutputRecord, RecordWriter};
pub use tokio_spawner::TokioSpawner;
