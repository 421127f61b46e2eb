//! Input file readers

use crate::error::{Error, Result};
use arrow::compute::concat_batches;
use arrow::csv::reader::Format;
use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::{BufReader, Seek};
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

/// Rows sampled when inferring a CSV or JSON schema
pub const SCHEMA_INFERENCE_ROWS: usize = 1000;

/// Supported input file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputFormat {
    Parquet,
    Csv,
    /// Newline-delimited JSON objects
    Json,
}

impl InputFormat {
    /// Pick the format from a file extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match extension.as_str() {
            "parquet" | "pq" => Ok(InputFormat::Parquet),
            "csv" => Ok(InputFormat::Csv),
            "json" | "jsonl" | "ndjson" => Ok(InputFormat::Json),
            _ => Err(Error::invalid_argument(format!(
                "Cannot tell the format of {} from its extension, use --input-format",
                path.display()
            ))),
        }
    }
}

impl FromStr for InputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "parquet" => Ok(InputFormat::Parquet),
            "csv" => Ok(InputFormat::Csv),
            "json" | "jsonl" | "ndjson" => Ok(InputFormat::Json),
            other => Err(Error::invalid_argument(format!(
                "Unknown input format '{other}', choose between (parquet, csv, json)"
            ))),
        }
    }
}

impl fmt::Display for InputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InputFormat::Parquet => "parquet",
            InputFormat::Csv => "csv",
            InputFormat::Json => "json",
        };
        f.write_str(name)
    }
}

/// Read a whole file into one batch
///
/// The format comes from the extension when `format` is `None`.
pub fn read_batch(path: impl AsRef<Path>, format: Option<InputFormat>) -> Result<RecordBatch> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(Error::FileNotFound {
            path: path.display().to_string(),
        });
    }
    let format = match format {
        Some(format) => format,
        None => InputFormat::from_path(path)?,
    };

    let file = File::open(path)?;
    let (schema, batches) = match format {
        InputFormat::Parquet => read_parquet(file)?,
        InputFormat::Csv => read_csv(file)?,
        InputFormat::Json => read_json(file)?,
    };
    let batch = concat_batches(&schema, &batches)?;
    tracing::info!(
        "Read {} rows and {} columns from {} ({})",
        batch.num_rows(),
        batch.num_columns(),
        path.display(),
        format
    );
    Ok(batch)
}

fn read_parquet(file: File) -> Result<(SchemaRef, Vec<RecordBatch>)> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let schema = Arc::clone(builder.schema());
    let batches = builder.build()?.collect::<std::result::Result<Vec<_>, _>>()?;
    Ok((schema, batches))
}

fn read_csv(mut file: File) -> Result<(SchemaRef, Vec<RecordBatch>)> {
    let format = Format::default().with_header(true);
    let (schema, _) = format.infer_schema(&mut file, Some(SCHEMA_INFERENCE_ROWS))?;
    file.rewind()?;

    let schema = Arc::new(schema);
    let reader = arrow::csv::ReaderBuilder::new(Arc::clone(&schema))
        .with_format(format)
        .build(file)?;
    let batches = reader.collect::<std::result::Result<Vec<_>, _>>()?;
    Ok((schema, batches))
}

fn read_json(file: File) -> Result<(SchemaRef, Vec<RecordBatch>)> {
    let mut reader = BufReader::new(file);
    let (schema, _) = arrow::json::reader::infer_json_schema_from_seekable(
        &mut reader,
        Some(SCHEMA_INFERENCE_ROWS),
    )?;
    reader.rewind()?;

    let schema = Arc::new(schema);
    let reader = arrow::json::ReaderBuilder::new(Arc::clone(&schema)).build(reader)?;
    let batches = reader.collect::<std::result::Result<Vec<_>, _>>()?;
    Ok((schema, batches))
}
