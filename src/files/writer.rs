//! Result writers
//!
//! Parquet files for row sets worth keeping, JSON lines for the terminal.

use crate::error::Result;
use arrow::json::LineDelimitedWriter;
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Configuration for Parquet output
#[derive(Debug, Clone)]
pub struct ParquetWriterConfig {
    compression: Compression,
    row_group_size: usize,
}

impl Default for ParquetWriterConfig {
    fn default() -> Self {
        Self {
            compression: Compression::SNAPPY,
            row_group_size: 1024 * 1024,
        }
    }
}

impl ParquetWriterConfig {
    /// Create a new config with default settings
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set compression algorithm
    #[must_use]
    pub fn with_compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    /// Set row group size
    #[must_use]
    pub fn with_row_group_size(mut self, size: usize) -> Self {
        self.row_group_size = size;
        self
    }

    fn build_properties(&self) -> WriterProperties {
        WriterProperties::builder()
            .set_compression(self.compression)
            .set_max_row_group_size(self.row_group_size)
            .build()
    }
}

/// Write one batch to a Parquet file, returning the row count
pub fn write_parquet(
    path: impl AsRef<Path>,
    batch: &RecordBatch,
    config: Option<&ParquetWriterConfig>,
) -> Result<usize> {
    let default_config = ParquetWriterConfig::default();
    let config = config.unwrap_or(&default_config);

    let file = File::create(path.as_ref())?;
    let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(config.build_properties()))?;
    writer.write(batch)?;
    writer.close()?;

    tracing::info!(
        "Wrote {} rows to {}",
        batch.num_rows(),
        path.as_ref().display()
    );
    Ok(batch.num_rows())
}

/// Write every row of a batch as one JSON object per line
///
/// Null values are left out of the objects.
pub fn write_json_lines<W: Write>(out: W, batch: &RecordBatch) -> Result<()> {
    let mut writer = LineDelimitedWriter::new(out);
    writer.write(batch)?;
    writer.finish()?;
    Ok(())
}
