// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::match_wildcard_for_single_variants)]
#![allow(clippy::needless_pass_by_value)]

//! # dbharbor
//!
//! Infer SQL Server tables from Arrow data and append only the rows that
//! are not stored yet.
//!
//! ## Features
//!
//! - **Type Inference**: `varchar`, integer classes and `decimal(p,s)` sized
//!   from the observed values
//! - **DDL**: `CREATE TABLE` with optional identity key and load timestamp,
//!   `ALTER TABLE ... ADD` for columns a table is missing
//! - **Key Reconciliation**: drop input rows whose key is already stored
//! - **Backends**: SQL Server over TDS, embedded DuckDB for local work
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use dbharbor::{ConnectionConfig, Harbor, IfExists, LoadOptions, Result, TableRef};
//!
//! fn main() -> Result<()> {
//!     let batch = dbharbor::files::read_batch("sales.parquet", None)?;
//!     let mut harbor = Harbor::connect(&ConnectionConfig::from_env()?)?;
//!
//!     let table = TableRef::dbo("sales");
//!     let fresh = harbor.where_not_exists(&batch, &table, &["order_id"])?;
//!     harbor.load(&fresh, &table, &LoadOptions::new().with_if_exists(IfExists::Append))?;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      Harbor (sync)                           │
//! │  create_table  add_missing_columns  where_not_exists  load   │
//! └──────────────────────────────────────────────────────────────┘
//!                │                │                  │
//! ┌──────────────┴───┬────────────┴─────┬────────────┴──────────┐
//! │  schema          │  sql             │  database             │
//! ├──────────────────┼──────────────────┼───────────────────────┤
//! │ Arrow -> SqlType │ Dialect, DDL,    │ SqlExecutor           │
//! │ sizing rules     │ INSERT batches   │ SQL Server / DuckDB   │
//! └──────────────────┴──────────────────┴───────────────────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]
#![allow(missing_docs)] // TODO: document the public type fields before 1.0

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Connection configuration
pub mod config;

/// SQL type inference from Arrow columns
pub mod schema;

/// SQL statement rendering
pub mod sql;

/// SQL execution backends (SQL Server, DuckDB)
pub mod database;

/// Schema/sync orchestrator
pub mod sync;

/// Data file input and output
pub mod files;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

// Re-export commonly used types
pub use config::ConnectionConfig;
pub use database::{DuckDbExecutor, SqlExecutor, SqlServerExecutor};
pub use sql::{CreateTableOptions, Dialect};
pub use sync::{Harbor, HarborStats, LoadOptions};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
