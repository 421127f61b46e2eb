//! Conversion of tiberius result rows into an Arrow `RecordBatch`

use crate::error::Result;
use arrow::array::{
    ArrayRef, BinaryArray, BooleanArray, Date32Array, Decimal128Array, Float32Array,
    Float64Array, Int16Array, Int32Array, Int64Array, StringArray, TimestampMicrosecondArray,
    UInt8Array,
};
use arrow::datatypes::{DataType, Date32Type, Field, Schema, TimeUnit};
use arrow::record_batch::{RecordBatch, RecordBatchOptions};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use std::sync::Arc;
use tiberius::{Column, ColumnData, ColumnType, FromSql, Row};

/// Widest decimal precision Arrow and SQL Server share
const MAX_DECIMAL_PRECISION: u8 = 38;

/// Build a batch from the column metadata and rows of one result set
pub(crate) fn rows_to_batch(columns: &[Column], rows: Vec<Row>) -> Result<RecordBatch> {
    let row_count = rows.len();
    let mut cells: Vec<Vec<ColumnData<'static>>> = columns
        .iter()
        .map(|_| Vec::with_capacity(row_count))
        .collect();
    for row in rows {
        for (i, data) in row.into_iter().enumerate() {
            if let Some(column) = cells.get_mut(i) {
                column.push(data);
            }
        }
    }

    let mut fields = Vec::with_capacity(columns.len());
    let mut arrays = Vec::with_capacity(columns.len());
    for (column, data) in columns.iter().zip(&cells) {
        let data_type = arrow_type(column.column_type(), data);
        arrays.push(build_array(&data_type, data)?);
        fields.push(Field::new(column.name(), data_type, true));
    }

    let options = RecordBatchOptions::new().with_row_count(Some(row_count));
    Ok(RecordBatch::try_new_with_options(
        Arc::new(Schema::new(fields)),
        arrays,
        &options,
    )?)
}

/// Pick the Arrow type from the first non-null cell, else from the column type
fn arrow_type(column_type: ColumnType, data: &[ColumnData<'static>]) -> DataType {
    let sample = data.iter().find(|cell| !is_null(cell));
    match sample {
        Some(ColumnData::Bit(_)) => DataType::Boolean,
        Some(ColumnData::U8(_)) => DataType::UInt8,
        Some(ColumnData::I16(_)) => DataType::Int16,
        Some(ColumnData::I32(_)) => DataType::Int32,
        Some(ColumnData::I64(_)) => DataType::Int64,
        Some(ColumnData::F32(_)) => DataType::Float32,
        Some(ColumnData::F64(_)) => DataType::Float64,
        Some(ColumnData::Numeric(_)) => {
            DataType::Decimal128(MAX_DECIMAL_PRECISION, max_scale(data) as i8)
        }
        Some(
            ColumnData::DateTime(_)
            | ColumnData::SmallDateTime(_)
            | ColumnData::DateTime2(_)
            | ColumnData::DateTimeOffset(_),
        ) => DataType::Timestamp(TimeUnit::Microsecond, None),
        Some(ColumnData::Date(_)) => DataType::Date32,
        Some(ColumnData::Binary(_)) => DataType::Binary,
        Some(_) => DataType::Utf8,
        None => fallback_type(column_type),
    }
}

fn fallback_type(column_type: ColumnType) -> DataType {
    match column_type {
        ColumnType::Bit | ColumnType::Bitn => DataType::Boolean,
        ColumnType::Int1 => DataType::UInt8,
        ColumnType::Int2 => DataType::Int16,
        ColumnType::Int4 => DataType::Int32,
        ColumnType::Int8 | ColumnType::Intn => DataType::Int64,
        ColumnType::Float4 => DataType::Float32,
        ColumnType::Float8
        | ColumnType::Floatn
        | ColumnType::Money
        | ColumnType::Money4
        | ColumnType::Decimaln
        | ColumnType::Numericn => DataType::Float64,
        ColumnType::Datetime
        | ColumnType::Datetime4
        | ColumnType::Datetimen
        | ColumnType::Datetime2
        | ColumnType::DatetimeOffsetn => DataType::Timestamp(TimeUnit::Microsecond, None),
        ColumnType::Daten => DataType::Date32,
        _ => DataType::Utf8,
    }
}

fn is_null(cell: &ColumnData<'static>) -> bool {
    match cell {
        ColumnData::U8(v) => v.is_none(),
        ColumnData::I16(v) => v.is_none(),
        ColumnData::I32(v) => v.is_none(),
        ColumnData::I64(v) => v.is_none(),
        ColumnData::F32(v) => v.is_none(),
        ColumnData::F64(v) => v.is_none(),
        ColumnData::Bit(v) => v.is_none(),
        ColumnData::String(v) => v.is_none(),
        ColumnData::Guid(v) => v.is_none(),
        ColumnData::Binary(v) => v.is_none(),
        ColumnData::Numeric(v) => v.is_none(),
        ColumnData::Xml(v) => v.is_none(),
        ColumnData::DateTime(v) => v.is_none(),
        ColumnData::SmallDateTime(v) => v.is_none(),
        ColumnData::Time(v) => v.is_none(),
        ColumnData::Date(v) => v.is_none(),
        ColumnData::DateTime2(v) => v.is_none(),
        ColumnData::DateTimeOffset(v) => v.is_none(),
        #[allow(unreachable_patterns)]
        _ => true,
    }
}

fn max_scale(data: &[ColumnData<'static>]) -> u8 {
    data.iter()
        .filter_map(|cell| match cell {
            ColumnData::Numeric(Some(n)) => Some(n.scale()),
            _ => None,
        })
        .max()
        .unwrap_or(0)
}

fn build_array(data_type: &DataType, data: &[ColumnData<'static>]) -> Result<ArrayRef> {
    let array: ArrayRef = match data_type {
        DataType::Boolean => Arc::new(BooleanArray::from_iter(data.iter().map(|c| match c {
            ColumnData::Bit(v) => *v,
            _ => None,
        }))),
        DataType::UInt8 => Arc::new(UInt8Array::from_iter(data.iter().map(|c| match c {
            ColumnData::U8(v) => *v,
            _ => None,
        }))),
        DataType::Int16 => Arc::new(Int16Array::from_iter(data.iter().map(|c| match c {
            ColumnData::I16(v) => *v,
            _ => None,
        }))),
        DataType::Int32 => Arc::new(Int32Array::from_iter(data.iter().map(|c| match c {
            ColumnData::I32(v) => *v,
            _ => None,
        }))),
        DataType::Int64 => Arc::new(Int64Array::from_iter(data.iter().map(|c| match c {
            ColumnData::I64(v) => *v,
            ColumnData::I32(v) => v.map(i64::from),
            ColumnData::I16(v) => v.map(i64::from),
            ColumnData::U8(v) => v.map(i64::from),
            _ => None,
        }))),
        DataType::Float32 => Arc::new(Float32Array::from_iter(data.iter().map(|c| match c {
            ColumnData::F32(v) => *v,
            _ => None,
        }))),
        DataType::Float64 => Arc::new(Float64Array::from_iter(data.iter().map(|c| match c {
            ColumnData::F64(v) => *v,
            ColumnData::F32(v) => v.map(f64::from),
            ColumnData::Numeric(Some(n)) => Some(f64::from(*n)),
            _ => None,
        }))),
        DataType::Decimal128(precision, scale) => {
            let scale = *scale as u8;
            let values = data.iter().map(|c| match c {
                ColumnData::Numeric(Some(n)) => {
                    Some(n.value() * 10_i128.pow(u32::from(scale - n.scale())))
                }
                _ => None,
            });
            Arc::new(
                Decimal128Array::from_iter(values)
                    .with_precision_and_scale(*precision, scale as i8)?,
            )
        }
        DataType::Timestamp(_, _) => Arc::new(TimestampMicrosecondArray::from_iter(
            data.iter().map(timestamp_micros),
        )),
        DataType::Date32 => Arc::new(Date32Array::from_iter(data.iter().map(|c| {
            NaiveDate::from_sql(c)
                .ok()
                .flatten()
                .map(Date32Type::from_naive_date)
        }))),
        DataType::Binary => Arc::new(BinaryArray::from_iter(data.iter().map(|c| match c {
            ColumnData::Binary(Some(bytes)) => Some(bytes.as_ref()),
            _ => None,
        }))),
        _ => Arc::new(StringArray::from_iter(data.iter().map(cell_to_string))),
    };
    Ok(array)
}

fn timestamp_micros(cell: &ColumnData<'static>) -> Option<i64> {
    match cell {
        ColumnData::DateTimeOffset(Some(_)) => DateTime::<Utc>::from_sql(cell)
            .ok()
            .flatten()
            .map(|dt| dt.timestamp_micros()),
        _ => NaiveDateTime::from_sql(cell)
            .ok()
            .flatten()
            .map(|dt| dt.and_utc().timestamp_micros()),
    }
}

fn cell_to_string(cell: &ColumnData<'static>) -> Option<String> {
    match cell {
        ColumnData::String(Some(s)) => Some(s.to_string()),
        ColumnData::Guid(Some(g)) => Some(g.to_string()),
        ColumnData::Xml(Some(xml)) => Some(xml.to_string()),
        ColumnData::Time(Some(_)) => NaiveTime::from_sql(cell)
            .ok()
            .flatten()
            .map(|t| t.format("%H:%M:%S%.f").to_string()),
        _ => None,
    }
}
