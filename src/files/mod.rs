//! Data files module
//!
//! Reads tabular input files into one Arrow `RecordBatch` and writes
//! results back out.
//!
//! # Overview
//!
//! - `InputFormat` - Parquet, CSV or newline-delimited JSON, picked from
//!   the file extension unless given
//! - `read_batch` - load a whole file as a single batch
//! - `write_parquet` / `write_json_lines` - result output for the CLI

mod reader;
mod writer;

pub use reader::{read_batch, InputFormat, SCHEMA_INFERENCE_ROWS};
pub use writer::{write_json_lines, write_parquet, ParquetWriterConfig};
