//! SQL type inference
//!
//! Maps Arrow columns to SQL Server column types sized from the observed data.
//!
//! # Rules
//!
//! - **Text**: longest value + 5 characters, `varchar(max)` beyond 8000
//! - **Integer**: `tinyint` / `smallint` / `int` / `bigint` by largest magnitude
//! - **Float**: `decimal(p,s)` from the widest integer and fractional parts
//! - **Boolean**: `bit`
//! - **Date/time**: `datetime`

mod inference;
mod sizing;

pub use inference::{coarse_type, infer_columns, infer_sql_type, SqlTypeInferrer};
pub use sizing::{decimal_digits, size_float, size_integer, size_text, MAX_DECIMAL_PRECISION, TEXT_MARGIN, VARCHAR_LIMIT};

#[cfg(test)]
mod tests;
