//! INSERT statements from Arrow data

use super::Dialect;
use crate::error::{Error, Result};
use crate::types::TableRef;
use arrow::array::{Array, AsArray};
use arrow::datatypes::{
    DataType, Date32Type, Date64Type, Decimal128Type, Float16Type, Float32Type, Float64Type,
    Int16Type, Int32Type, Int64Type, Int8Type, TimeUnit, TimestampMicrosecondType,
    TimestampMillisecondType, TimestampNanosecondType, TimestampSecondType, UInt16Type,
    UInt32Type, UInt64Type, UInt8Type,
};
use arrow::record_batch::RecordBatch;
use chrono::NaiveDateTime;

/// Rows per `INSERT ... VALUES` statement (the SQL Server ceiling)
pub const INSERT_CHUNK_ROWS: usize = 1000;

/// Render the rows of a batch as `INSERT` statements of at most
/// [`INSERT_CHUNK_ROWS`] rows each
///
/// Nulls and non-finite floats are written as `NULL`. An empty batch yields
/// no statements.
pub fn insert_statements(
    dialect: Dialect,
    table: &TableRef,
    batch: &RecordBatch,
) -> Result<Vec<String>> {
    if batch.num_rows() == 0 || batch.num_columns() == 0 {
        return Ok(Vec::new());
    }

    let schema = batch.schema();
    let column_list: Vec<String> = schema
        .fields()
        .iter()
        .map(|f| dialect.quote_ident(f.name()))
        .collect();
    let header = format!(
        "INSERT INTO {} ({}) VALUES\n",
        dialect.table_name(table),
        column_list.join(", ")
    );

    let mut statements = Vec::with_capacity(batch.num_rows().div_ceil(INSERT_CHUNK_ROWS));
    let mut start = 0;
    while start < batch.num_rows() {
        let end = (start + INSERT_CHUNK_ROWS).min(batch.num_rows());
        let mut rows = Vec::with_capacity(end - start);
        for row in start..end {
            let mut literals = Vec::with_capacity(batch.num_columns());
            for (field, column) in schema.fields().iter().zip(batch.columns()) {
                literals.push(sql_literal(dialect, field.name(), column.as_ref(), row)?);
            }
            rows.push(format!("({})", literals.join(", ")));
        }
        statements.push(format!("{header}{}", rows.join(",\n")));
        start = end;
    }
    Ok(statements)
}

/// Render one cell as a SQL literal
pub fn sql_literal(dialect: Dialect, name: &str, column: &dyn Array, row: usize) -> Result<String> {
    if column.is_null(row) {
        return Ok("NULL".to_string());
    }

    let literal = match column.data_type() {
        DataType::Utf8 => dialect.string_literal(column.as_string::<i32>().value(row)),
        DataType::LargeUtf8 => dialect.string_literal(column.as_string::<i64>().value(row)),
        DataType::Utf8View => dialect.string_literal(column.as_string_view().value(row)),
        DataType::Boolean => dialect.bool_literal(column.as_boolean().value(row)).to_string(),
        DataType::Int8 => column.as_primitive::<Int8Type>().value(row).to_string(),
        DataType::Int16 => column.as_primitive::<Int16Type>().value(row).to_string(),
        DataType::Int32 => column.as_primitive::<Int32Type>().value(row).to_string(),
        DataType::Int64 => column.as_primitive::<Int64Type>().value(row).to_string(),
        DataType::UInt8 => column.as_primitive::<UInt8Type>().value(row).to_string(),
        DataType::UInt16 => column.as_primitive::<UInt16Type>().value(row).to_string(),
        DataType::UInt32 => column.as_primitive::<UInt32Type>().value(row).to_string(),
        DataType::UInt64 => column.as_primitive::<UInt64Type>().value(row).to_string(),
        DataType::Float16 => {
            float_literal(f64::from(column.as_primitive::<Float16Type>().value(row).to_f32()))
        }
        DataType::Float32 => {
            let value = column.as_primitive::<Float32Type>().value(row);
            if value.is_finite() {
                value.to_string()
            } else {
                "NULL".to_string()
            }
        }
        DataType::Float64 => float_literal(column.as_primitive::<Float64Type>().value(row)),
        DataType::Decimal128(_, _) => column
            .as_primitive::<Decimal128Type>()
            .value_as_string(row),
        DataType::Timestamp(_, _) | DataType::Date32 | DataType::Date64 => {
            match datetime_at(column, row) {
                Some(value) => dialect.timestamp_literal(&value),
                None => "NULL".to_string(),
            }
        }
        other => return Err(Error::unsupported_type(name, other)),
    };
    Ok(literal)
}

// Values past 38 digits only fit a float column, so they go out in exponent form
fn float_literal(value: f64) -> String {
    if !value.is_finite() {
        "NULL".to_string()
    } else if value.abs() >= 1e38 {
        format!("{value:e}")
    } else {
        value.to_string()
    }
}

fn datetime_at(column: &dyn Array, row: usize) -> Option<NaiveDateTime> {
    match column.data_type() {
        DataType::Timestamp(TimeUnit::Second, _) => column
            .as_primitive::<TimestampSecondType>()
            .value_as_datetime(row),
        DataType::Timestamp(TimeUnit::Millisecond, _) => column
            .as_primitive::<TimestampMillisecondType>()
            .value_as_datetime(row),
        DataType::Timestamp(TimeUnit::Microsecond, _) => column
            .as_primitive::<TimestampMicrosecondType>()
            .value_as_datetime(row),
        DataType::Timestamp(TimeUnit::Nanosecond, _) => column
            .as_primitive::<TimestampNanosecondType>()
            .value_as_datetime(row),
        DataType::Date32 => column.as_primitive::<Date32Type>().value_as_datetime(row),
        DataType::Date64 => column.as_primitive::<Date64Type>().value_as_datetime(row),
        _ => None,
    }
}
