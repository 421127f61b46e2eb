//! SQL type inference from Arrow columns

use super::sizing::{
    decimal_digits, decimal_type, longest_text, size_float, size_integer, text_type, TEXT_MARGIN,
    VARCHAR_LIMIT,
};
use crate::error::{Error, Result};
use crate::types::{CoarseType, ColumnDef, SqlType};
use arrow::array::{Array, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Decimal128Type, Float32Type, Float64Type, Int64Type, UInt64Type};
use arrow::record_batch::RecordBatch;

/// Map an Arrow data type onto its coarse tag
///
/// Returns `None` for types with no SQL counterpart here (lists, structs,
/// binary, intervals, ...).
pub fn coarse_type(data_type: &DataType) -> Option<CoarseType> {
    match data_type {
        DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View => Some(CoarseType::Text),
        DataType::Int8
        | DataType::Int16
        | DataType::Int32
        | DataType::Int64
        | DataType::UInt8
        | DataType::UInt16
        | DataType::UInt32
        | DataType::UInt64 => Some(CoarseType::Integer),
        DataType::Float16 | DataType::Float32 | DataType::Float64 | DataType::Decimal128(_, _) => {
            Some(CoarseType::Float)
        }
        DataType::Boolean => Some(CoarseType::Boolean),
        DataType::Timestamp(_, _) | DataType::Date32 | DataType::Date64 => {
            Some(CoarseType::DateTime)
        }
        _ => None,
    }
}

/// SQL type inferrer with configurable text sizing
#[derive(Debug, Clone)]
pub struct SqlTypeInferrer {
    /// Characters added on top of the longest text value
    text_margin: u32,
    /// Lengths above this become `varchar(max)`
    varchar_limit: u32,
}

impl Default for SqlTypeInferrer {
    fn default() -> Self {
        Self::new()
    }
}

impl SqlTypeInferrer {
    /// Create an inferrer with the standard margins
    pub fn new() -> Self {
        Self {
            text_margin: TEXT_MARGIN,
            varchar_limit: VARCHAR_LIMIT,
        }
    }

    /// Set the text safety margin
    #[must_use]
    pub fn with_text_margin(mut self, margin: u32) -> Self {
        self.text_margin = margin;
        self
    }

    /// Set the longest fixed `varchar` length
    #[must_use]
    pub fn with_varchar_limit(mut self, limit: u32) -> Self {
        self.varchar_limit = limit;
        self
    }

    /// Infer the SQL type of a sample under an explicit coarse tag
    ///
    /// When the physical array type does not match the tag the values are
    /// cast first (text renders any value, numbers cast leniently).
    pub fn infer(&self, values: &dyn Array, tag: CoarseType) -> Result<SqlType> {
        match tag {
            CoarseType::Text => self.infer_text(values),
            CoarseType::Integer => infer_integer(values),
            CoarseType::Float => infer_float(values),
            CoarseType::Boolean => Ok(SqlType::Bit),
            CoarseType::DateTime => Ok(SqlType::DateTime),
        }
    }

    /// Infer one named column, deriving the tag from its Arrow type
    pub fn infer_column(&self, name: &str, values: &dyn Array) -> Result<ColumnDef> {
        let tag = coarse_type(values.data_type())
            .ok_or_else(|| Error::unsupported_type(name, values.data_type()))?;
        Ok(ColumnDef::new(name, self.infer(values, tag)?))
    }

    /// Infer every column of a batch, in order, except those named in `skip`
    ///
    /// The first unsupported column aborts the whole call.
    pub fn infer_columns(&self, batch: &RecordBatch, skip: &[&str]) -> Result<Vec<ColumnDef>> {
        let schema = batch.schema();
        schema
            .fields()
            .iter()
            .zip(batch.columns())
            .filter(|(field, _)| !skip.contains(&field.name().as_str()))
            .map(|(field, column)| self.infer_column(field.name(), column.as_ref()))
            .collect()
    }

    fn infer_text(&self, values: &dyn Array) -> Result<SqlType> {
        let longest = match values.data_type() {
            DataType::Utf8 => longest_text(values.as_string::<i32>().iter()),
            DataType::LargeUtf8 => longest_text(values.as_string::<i64>().iter()),
            DataType::Utf8View => longest_text(values.as_string_view().iter()),
            _ => {
                let rendered = cast(values, &DataType::Utf8)?;
                longest_text(rendered.as_string::<i32>().iter())
            }
        };
        Ok(text_type(longest, self.text_margin, self.varchar_limit))
    }
}

fn infer_integer(values: &dyn Array) -> Result<SqlType> {
    let unsigned = matches!(
        values.data_type(),
        DataType::UInt8 | DataType::UInt16 | DataType::UInt32 | DataType::UInt64
    );
    if unsigned {
        let wide = cast(values, &DataType::UInt64)?;
        let wide = wide.as_primitive::<UInt64Type>();
        Ok(size_integer(wide.iter().map(|v| v.map(i128::from))))
    } else {
        let wide = cast(values, &DataType::Int64)?;
        let wide = wide.as_primitive::<Int64Type>();
        Ok(size_integer(wide.iter().map(|v| v.map(i128::from))))
    }
}

fn infer_float(values: &dyn Array) -> Result<SqlType> {
    match values.data_type() {
        DataType::Float64 => Ok(size_float(values.as_primitive::<Float64Type>().iter())),
        // f32 keeps its own shortest rendering; widening would add noise digits
        DataType::Float16 | DataType::Float32 => {
            let narrow = cast(values, &DataType::Float32)?;
            let narrow = narrow.as_primitive::<Float32Type>();
            Ok(decimal_type(
                narrow
                    .iter()
                    .flatten()
                    .filter(|v| v.is_finite())
                    .map(|v| decimal_digits(&v.to_string())),
            ))
        }
        DataType::Decimal128(_, _) => {
            let decimals = values.as_primitive::<Decimal128Type>();
            Ok(decimal_type(
                (0..decimals.len())
                    .filter(|&i| decimals.is_valid(i))
                    .map(|i| decimal_digits(&decimals.value_as_string(i))),
            ))
        }
        _ => {
            let wide = cast(values, &DataType::Float64)?;
            Ok(size_float(wide.as_primitive::<Float64Type>().iter()))
        }
    }
}

/// Infer the SQL type of a sample with the default inferrer
pub fn infer_sql_type(values: &dyn Array, tag: CoarseType) -> Result<SqlType> {
    SqlTypeInferrer::new().infer(values, tag)
}

/// Infer the column definitions of a batch with the default inferrer
pub fn infer_columns(batch: &RecordBatch, skip: &[&str]) -> Result<Vec<ColumnDef>> {
    SqlTypeInferrer::new().infer_columns(batch, skip)
}
