//! SQL type inference tests

use super::*;
use crate::error::Error;
use crate::types::{CoarseType, SqlType};
use arrow::array::{
    ArrayRef, BinaryArray, BooleanArray, Date32Array, Decimal128Array, Float32Array,
    Float64Array, Int16Array, Int64Array, LargeStringArray, StringArray,
    TimestampMillisecondArray, UInt64Array,
};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use std::sync::Arc;
use test_case::test_case;

fn varchar(n: u32) -> SqlType {
    SqlType::Varchar { length: Some(n) }
}

fn decimal(precision: u32, scale: u32) -> SqlType {
    SqlType::Decimal { precision, scale }
}

// ============================================================================
// Sizing Rules
// ============================================================================

#[test_case(&[5, 42, 99], SqlType::TinyInt ; "up to 99 is tinyint")]
#[test_case(&[100, 250], SqlType::SmallInt ; "100 is smallint")]
#[test_case(&[9_999], SqlType::SmallInt ; "9999 is smallint")]
#[test_case(&[10_000], SqlType::Int ; "10000 is int")]
#[test_case(&[123_456], SqlType::Int ; "default class")]
#[test_case(&[999_999_999], SqlType::Int ; "999999999 is still int")]
#[test_case(&[1_000_000_000], SqlType::BigInt ; "above 999999999 is bigint")]
#[test_case(&[5_000_000_000], SqlType::BigInt ; "five billion is bigint")]
#[test_case(&[-150, 3], SqlType::SmallInt ; "negative magnitude counts")]
#[test_case(&[], SqlType::TinyInt ; "empty sample")]
fn test_size_integer(values: &[i64], expected: SqlType) {
    let sized = size_integer(values.iter().map(|v| Some(i128::from(*v))));
    assert_eq!(sized, expected);
}

#[test]
fn test_size_integer_class_never_shrinks() {
    let rank = |t: SqlType| match t {
        SqlType::TinyInt => 0,
        SqlType::SmallInt => 1,
        SqlType::Int => 2,
        SqlType::BigInt => 3,
        other => panic!("not an integer class: {other}"),
    };
    let ladder = [0_i128, 99, 100, 9_999, 10_000, 999_999_999, 1_000_000_000, i128::from(i64::MAX)];
    let ranks: Vec<_> = ladder
        .iter()
        .map(|v| rank(size_integer([Some(*v)])))
        .collect();
    assert!(ranks.windows(2).all(|w| w[0] <= w[1]), "{ranks:?}");
}

#[test]
fn test_size_integer_negative_uses_magnitude() {
    // magnitude only; SQL Server's tinyint cannot hold the negative value
    assert_eq!(size_integer([Some(-5), Some(42)]), SqlType::TinyInt);
    assert_eq!(size_integer([Some(-100)]), SqlType::SmallInt);
}

#[test]
fn test_size_integer_ignores_nulls() {
    assert_eq!(size_integer([None, Some(7), None]), SqlType::TinyInt);
}

#[test]
fn test_size_text_example() {
    assert_eq!(size_text([Some("ab"), Some("abcdef")]), varchar(11));
}

#[test]
fn test_size_text_counts_characters() {
    // 4 chars, 8 bytes
    assert_eq!(size_text([Some("ñäöü")]), varchar(9));
}

#[test]
fn test_size_text_all_null() {
    assert_eq!(size_text([None, None]), varchar(5));
}

#[test]
fn test_size_text_limit() {
    let at_limit = "x".repeat(7995);
    assert_eq!(size_text([Some(at_limit.as_str())]), varchar(8000));

    let over = "x".repeat(7996);
    assert_eq!(
        size_text([Some(over.as_str())]),
        SqlType::Varchar { length: None }
    );
}

#[test_case("3.14", (1, 2))]
#[test_case("-12.5", (2, 1))]
#[test_case("100", (3, 0))]
#[test_case("0.001", (1, 3))]
fn test_decimal_digits(text: &str, expected: (u32, u32)) {
    assert_eq!(decimal_digits(text), expected);
}

#[test]
fn test_size_float() {
    let sized = size_float([Some(1.5), Some(1234.25), None, Some(-0.125)]);
    // widest integer part 4, widest fraction 3
    assert_eq!(sized, decimal(9, 3));
}

#[test]
fn test_size_float_whole_numbers() {
    assert_eq!(size_float([Some(100.0), Some(7.0)]), decimal(5, 0));
}

#[test]
fn test_size_float_wide_values_give_up_scale() {
    // 23 integer digits and 16 fraction digits would need decimal(41,16)
    let sized = size_float([Some(1e22), Some(1.0 / 3.0)]);
    assert_eq!(sized, decimal(38, 13));
}

#[test]
fn test_size_float_at_precision_limit() {
    // 20 + 16 + 2 fits exactly
    let sized = size_float([Some(1e19), Some(1.0 / 3.0)]);
    assert_eq!(sized, decimal(38, 16));
}

#[test]
fn test_size_float_beyond_any_decimal() {
    assert_eq!(size_float([Some(1e40), Some(0.5)]), SqlType::Float);
    assert_eq!(size_float([Some(-1e35)]), decimal(38, 0));
}

#[test]
fn test_size_float_skips_nan() {
    assert_eq!(size_float([Some(f64::NAN), Some(2.5)]), decimal(4, 1));
}

// ============================================================================
// Arrow Columns
// ============================================================================

#[test]
fn test_coarse_type_mapping() {
    assert_eq!(coarse_type(&DataType::Utf8), Some(CoarseType::Text));
    assert_eq!(coarse_type(&DataType::LargeUtf8), Some(CoarseType::Text));
    assert_eq!(coarse_type(&DataType::Int32), Some(CoarseType::Integer));
    assert_eq!(coarse_type(&DataType::UInt8), Some(CoarseType::Integer));
    assert_eq!(coarse_type(&DataType::Float32), Some(CoarseType::Float));
    assert_eq!(
        coarse_type(&DataType::Decimal128(10, 2)),
        Some(CoarseType::Float)
    );
    assert_eq!(coarse_type(&DataType::Boolean), Some(CoarseType::Boolean));
    assert_eq!(coarse_type(&DataType::Date32), Some(CoarseType::DateTime));
    assert_eq!(coarse_type(&DataType::Binary), None);
}

#[test]
fn test_infer_string_column() {
    let values = StringArray::from(vec![Some("ab"), None, Some("abcdef")]);
    let sql_type = infer_sql_type(&values, CoarseType::Text).unwrap();
    assert_eq!(sql_type, varchar(11));

    let large = LargeStringArray::from(vec!["abc"]);
    assert_eq!(
        infer_sql_type(&large, CoarseType::Text).unwrap(),
        varchar(8)
    );
}

#[test]
fn test_infer_text_from_numbers() {
    // rendered as "12345"
    let values = Int64Array::from(vec![12_345]);
    assert_eq!(
        infer_sql_type(&values, CoarseType::Text).unwrap(),
        varchar(10)
    );
}

#[test]
fn test_infer_integer_columns() {
    let small = Int16Array::from(vec![Some(-300), None]);
    assert_eq!(
        infer_sql_type(&small, CoarseType::Integer).unwrap(),
        SqlType::SmallInt
    );

    let unsigned = UInt64Array::from(vec![u64::MAX]);
    assert_eq!(
        infer_sql_type(&unsigned, CoarseType::Integer).unwrap(),
        SqlType::BigInt
    );
}

#[test]
fn test_infer_float_columns() {
    let doubles = Float64Array::from(vec![Some(12.75), None, Some(3.5)]);
    assert_eq!(
        infer_sql_type(&doubles, CoarseType::Float).unwrap(),
        decimal(6, 2)
    );

    let singles = Float32Array::from(vec![0.1_f32]);
    assert_eq!(
        infer_sql_type(&singles, CoarseType::Float).unwrap(),
        decimal(4, 1)
    );
}

#[test]
fn test_infer_decimal_column() {
    let values = Decimal128Array::from(vec![Some(12_345), None, Some(-5)])
        .with_precision_and_scale(10, 2)
        .unwrap();
    // "123.45" and "-0.05"
    assert_eq!(
        infer_sql_type(&values, CoarseType::Float).unwrap(),
        decimal(7, 2)
    );
}

#[test]
fn test_infer_fixed_types() {
    let flags = BooleanArray::from(vec![true, false]);
    assert_eq!(
        infer_sql_type(&flags, CoarseType::Boolean).unwrap(),
        SqlType::Bit
    );

    let stamps = TimestampMillisecondArray::from(vec![1_700_000_000_000]);
    assert_eq!(
        infer_sql_type(&stamps, CoarseType::DateTime).unwrap(),
        SqlType::DateTime
    );
}

fn sample_batch() -> RecordBatch {
    let schema = Arc::new(Schema::new(vec![
        Field::new("id", DataType::Int64, false),
        Field::new("name", DataType::Utf8, true),
        Field::new("price", DataType::Float64, true),
        Field::new("day", DataType::Date32, true),
        Field::new("RowLoadDateTime", DataType::Date32, true),
    ]));
    let columns: Vec<ArrayRef> = vec![
        Arc::new(Int64Array::from(vec![1, 2])),
        Arc::new(StringArray::from(vec![Some("apple"), None])),
        Arc::new(Float64Array::from(vec![1.25, 10.5])),
        Arc::new(Date32Array::from(vec![19_000, 19_001])),
        Arc::new(Date32Array::from(vec![19_000, 19_001])),
    ];
    RecordBatch::try_new(schema, columns).unwrap()
}

#[test]
fn test_infer_columns_in_order() {
    let columns = infer_columns(&sample_batch(), &[]).unwrap();
    let rendered: Vec<String> = columns
        .iter()
        .map(|c| format!("{} {}", c.name, c.sql_type))
        .collect();
    assert_eq!(
        rendered,
        vec![
            "id tinyint",
            "name varchar(10)",
            "price decimal(6,2)",
            "day datetime",
            "RowLoadDateTime datetime",
        ]
    );
}

#[test]
fn test_infer_columns_skip() {
    let columns = infer_columns(&sample_batch(), &["RowLoadDateTime"]).unwrap();
    assert_eq!(columns.len(), 4);
    assert!(columns.iter().all(|c| c.name != "RowLoadDateTime"));
}

#[test]
fn test_infer_columns_unsupported_aborts() {
    let schema = Arc::new(Schema::new(vec![
        Field::new("id", DataType::Int64, false),
        Field::new("blob", DataType::Binary, true),
    ]));
    let batch = RecordBatch::try_new(
        schema,
        vec![
            Arc::new(Int64Array::from(vec![1])),
            Arc::new(BinaryArray::from(vec![b"raw".as_ref()])),
        ],
    )
    .unwrap();

    let err = infer_columns(&batch, &[]).unwrap_err();
    assert!(matches!(err, Error::UnsupportedType { ref column, .. } if column == "blob"));
}

#[test]
fn test_inferrer_custom_margin() {
    let values = StringArray::from(vec!["abcd"]);
    let inferrer = SqlTypeInferrer::new()
        .with_text_margin(0)
        .with_varchar_limit(3);
    assert_eq!(
        inferrer.infer(&values, CoarseType::Text).unwrap(),
        SqlType::Varchar { length: None }
    );
}
