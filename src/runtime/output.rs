//! Output stage: one serialized record per item result.

use std::io::{self, Write};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::core::ItemResult;
use crate::util::paths;

/// Serialized form of an [`ItemResult`].
///
/// Payload fields are flattened into the top level. `error` is present only
/// on failure and `destination` only when files were produced. Paths are
/// written lossily, so a non-UTF-8 file name still yields a full record.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct OutputRecord<T> {
    /// Payload fields, when the item produced one.
    #[serde(flatten)]
    pub payload: Option<T>,
    /// Source path of the item.
    #[serde(serialize_with = "paths::serialize_lossy")]
    pub source: PathBuf,
    /// Files written for the item.
    #[serde(
        skip_serializing_if = "Vec::is_empty",
        serialize_with = "paths::serialize_lossy_seq"
    )]
    pub destination: Vec<PathBuf>,
    /// Human-readable failure detail.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> From<ItemResult<T>> for OutputRecord<T> {
    fn from(result: ItemResult<T>) -> Self {
        let error = result.error_message();
        Self {
            payload: result.payload,
            source: result.source,
            destination: result.artifacts,
            error,
        }
    }
}

/// Record layout on the output stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// One compact JSON document per line.
    #[default]
    Lines,
    /// Indented JSON documents, one after another.
    Pretty,
}

/// Writes records to an output stream, flushing after each one.
pub struct RecordWriter<W: Write> {
    out: W,
    format: OutputFormat,
    written: usize,
}

impl<W: Write> RecordWriter<W> {
    /// Create a writer over `out`.
    pub const fn new(out: W, format: OutputFormat) -> Self {
        Self {
            out,
            format,
            written: 0,
        }
    }

    /// Serialize and write one result.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the underlying write fails.
    pub fn write_result<T: Serialize>(&mut self, result: ItemResult<T>) -> io::Result<()> {
        self.write_record(&OutputRecord::from(result))
    }

    /// Serialize and write one record.
    ///
    /// The record is serialized in full before anything reaches `out`, so a
    /// failed record leaves no fragment behind.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the underlying write fails.
    pub fn write_record<T: Serialize>(&mut self, record: &OutputRecord<T>) -> io::Result<()> {
        let mut bytes = match self.format {
            OutputFormat::Lines => serde_json::to_vec(record)?,
            OutputFormat::Pretty => serde_json::to_vec_pretty(record)?,
        };
        bytes.push(b'\n');
        self.out.write_all(&bytes)?;
        self.out.flush()?;
        self.written += 1;
        Ok(())
    }

    /// Records written so far.
    #[must_use]
    pub const fn written(&self) -> usize {
        self.written
    }

    /// Recover the underlying writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}
