//! SQL statement rendering
//!
//! Builds the statement text sent to the execution backend.
//!
//! # Overview
//!
//! - `Dialect` - identifier quoting and type spelling per backend
//! - DDL - `CREATE TABLE`, `ALTER TABLE ... ADD`, probe and key `SELECT`s
//! - Values - multi-row `INSERT ... VALUES` batches built from Arrow data
//!
//! Identifiers are quoted but never parameterized; the text is meant for
//! trusted callers.

mod ddl;
mod dialect;
mod values;

pub use ddl::{
    add_column_sql, audit_key_column, create_table_sql, select_columns_sql, select_one_row_sql,
    CreateTableOptions,
};
pub use dialect::Dialect;
pub use values::{insert_statements, sql_literal, INSERT_CHUNK_ROWS};

#[cfg(test)]
mod tests;
