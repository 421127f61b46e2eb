//! Tests for SQL rendering

use super::*;
use crate::error::Error;
use crate::types::{ColumnDef, SqlType, TableRef};
use arrow::array::{
    ArrayRef, BinaryArray, BooleanArray, Float64Array, Int64Array, StringArray,
    TimestampMillisecondArray,
};
use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use arrow::record_batch::RecordBatch;
use pretty_assertions::assert_eq;
use std::sync::Arc;

fn sales_columns() -> Vec<ColumnDef> {
    vec![
        ColumnDef::new("id", SqlType::SmallInt),
        ColumnDef::new("customer", SqlType::Varchar { length: Some(12) }),
        ColumnDef::new("notes", SqlType::Varchar { length: None }),
        ColumnDef::new("paid", SqlType::Bit),
    ]
}

// ============================================================================
// Dialect Tests
// ============================================================================

#[test]
fn test_quote_ident() {
    assert_eq!(Dialect::SqlServer.quote_ident("order id"), "[order id]");
    assert_eq!(Dialect::SqlServer.quote_ident("a]b"), "[a]]b]");
    assert_eq!(Dialect::DuckDb.quote_ident("a\"b"), "\"a\"\"b\"");
}

#[test]
fn test_default_schema() {
    assert_eq!(Dialect::SqlServer.default_schema(), "dbo");
    assert_eq!(Dialect::DuckDb.default_schema(), "main");
}

#[test]
fn test_render_type() {
    let max = SqlType::Varchar { length: None };
    assert_eq!(Dialect::SqlServer.render_type(max), "varchar(max)");
    assert_eq!(Dialect::DuckDb.render_type(max), "varchar");
    assert_eq!(Dialect::DuckDb.render_type(SqlType::Bit), "boolean");
    assert_eq!(Dialect::DuckDb.render_type(SqlType::DateTime), "timestamp");
    assert_eq!(Dialect::DuckDb.render_type(SqlType::TinyInt), "tinyint");
    assert_eq!(Dialect::SqlServer.render_type(SqlType::Float), "float");
    assert_eq!(Dialect::DuckDb.render_type(SqlType::Float), "double");
}

#[test]
fn test_timestamp_literal_precision() {
    let at = chrono::DateTime::from_timestamp_micros(1_700_000_000_123_456)
        .unwrap()
        .naive_utc();
    assert_eq!(
        Dialect::SqlServer.timestamp_literal(&at),
        "'2023-11-14T22:13:20.123'"
    );
    assert_eq!(
        Dialect::DuckDb.timestamp_literal(&at),
        "'2023-11-14 22:13:20.123456'"
    );
}

#[test]
fn test_string_literal_escapes_quotes() {
    assert_eq!(Dialect::SqlServer.string_literal("O'Brien"), "N'O''Brien'");
    assert_eq!(Dialect::DuckDb.string_literal("it's"), "'it''s'");
}

// ============================================================================
// DDL Tests
// ============================================================================

#[test]
fn test_create_table_plain() {
    let sql = create_table_sql(
        Dialect::SqlServer,
        &TableRef::dbo("sales"),
        &sales_columns(),
        &CreateTableOptions::new(),
    );
    assert_eq!(
        sql,
        "CREATE TABLE dbo.sales (\n    [id] smallint,\n    [customer] varchar(12),\n    [notes] varchar(max),\n    [paid] bit\n)"
    );
}

#[test]
fn test_create_table_replace() {
    let sql = create_table_sql(
        Dialect::SqlServer,
        &TableRef::new("stage", "sales"),
        &sales_columns()[..1],
        &CreateTableOptions::new().replace(true),
    );
    assert_eq!(
        sql,
        "DROP TABLE IF EXISTS stage.sales\nCREATE TABLE stage.sales (\n    [id] smallint\n)"
    );
}

#[test]
fn test_create_table_audit_columns() {
    let sql = create_table_sql(
        Dialect::SqlServer,
        &TableRef::dbo("sales"),
        &sales_columns()[..1],
        &CreateTableOptions::new().audit_columns(true),
    );
    assert_eq!(
        sql,
        "CREATE TABLE dbo.sales (\n    \
         [IDsales] INT IDENTITY(1, 1) NOT NULL,\n    \
         [id] smallint,\n    \
         [RowLoadDateTime] DATETIME NOT NULL CONSTRAINT [DF_sales_RowLoad] DEFAULT (GETDATE()),\n    \
         CONSTRAINT [PK_sales] PRIMARY KEY ([IDsales])\n)"
    );
}

#[test]
fn test_create_table_duckdb_audit_uses_sequence() {
    let sql = create_table_sql(
        Dialect::DuckDb,
        &TableRef::new("main", "sales"),
        &sales_columns()[..1],
        &CreateTableOptions::new().replace(true).audit_columns(true),
    );
    assert_eq!(
        sql,
        "DROP TABLE IF EXISTS main.sales;\n\
         DROP SEQUENCE IF EXISTS main.seq_sales;\n\
         CREATE SEQUENCE IF NOT EXISTS main.seq_sales;\n\
         CREATE TABLE main.sales (\n    \
         \"IDsales\" INTEGER NOT NULL DEFAULT nextval('main.seq_sales'),\n    \
         \"id\" smallint,\n    \
         \"RowLoadDateTime\" TIMESTAMP NOT NULL DEFAULT current_timestamp,\n    \
         PRIMARY KEY (\"IDsales\")\n)"
    );
}

#[test]
fn test_add_column_sql() {
    let column = ColumnDef::new("region", SqlType::Varchar { length: Some(9) });
    assert_eq!(
        add_column_sql(Dialect::SqlServer, &TableRef::dbo("sales"), &column),
        "ALTER TABLE dbo.sales ADD [region] varchar(9)"
    );
}

#[test]
fn test_select_statements() {
    let table = TableRef::dbo("sales");
    assert_eq!(
        select_columns_sql(Dialect::SqlServer, &table, &["id", "day"]),
        "SELECT [id], [day] FROM dbo.sales"
    );
    assert_eq!(
        select_one_row_sql(Dialect::SqlServer, &table),
        "SELECT TOP 1 * FROM dbo.sales"
    );
    assert_eq!(
        select_one_row_sql(Dialect::DuckDb, &TableRef::new("main", "sales")),
        "SELECT * FROM main.sales LIMIT 1"
    );
}

// ============================================================================
// INSERT Tests
// ============================================================================

fn mixed_batch() -> RecordBatch {
    let schema = Arc::new(Schema::new(vec![
        Field::new("id", DataType::Int64, false),
        Field::new("name", DataType::Utf8, true),
        Field::new("score", DataType::Float64, true),
        Field::new("ok", DataType::Boolean, true),
        Field::new(
            "at",
            DataType::Timestamp(TimeUnit::Millisecond, None),
            true,
        ),
    ]));
    let columns: Vec<ArrayRef> = vec![
        Arc::new(Int64Array::from(vec![1, 2])),
        Arc::new(StringArray::from(vec![Some("O'Neil"), None])),
        Arc::new(Float64Array::from(vec![Some(2.5), Some(f64::NAN)])),
        Arc::new(BooleanArray::from(vec![Some(true), None])),
        Arc::new(TimestampMillisecondArray::from(vec![
            Some(1_700_000_000_123),
            None,
        ])),
    ];
    RecordBatch::try_new(schema, columns).unwrap()
}

#[test]
fn test_insert_statements_literals() {
    let statements =
        insert_statements(Dialect::SqlServer, &TableRef::dbo("t"), &mixed_batch()).unwrap();
    assert_eq!(statements.len(), 1);
    assert_eq!(
        statements[0],
        "INSERT INTO dbo.t ([id], [name], [score], [ok], [at]) VALUES\n\
         (1, N'O''Neil', 2.5, 1, '2023-11-14T22:13:20.123'),\n\
         (2, NULL, NULL, NULL, NULL)"
    );
}

#[test]
fn test_insert_statements_duckdb_booleans() {
    let statements =
        insert_statements(Dialect::DuckDb, &TableRef::new("main", "t"), &mixed_batch()).unwrap();
    assert!(statements[0].contains("(1, 'O''Neil', 2.5, TRUE, '2023-11-14 22:13:20.123000')"));
}

#[test]
fn test_sql_literal_huge_float_uses_exponent() {
    let values = Float64Array::from(vec![1e40, 12.5]);
    assert_eq!(sql_literal(Dialect::DuckDb, "x", &values, 0).unwrap(), "1e40");
    assert_eq!(sql_literal(Dialect::DuckDb, "x", &values, 1).unwrap(), "12.5");
}

#[test]
fn test_insert_statements_chunking() {
    let ids: Vec<i64> = (0..2_500).collect();
    let schema = Arc::new(Schema::new(vec![Field::new("id", DataType::Int64, false)]));
    let batch = RecordBatch::try_new(schema, vec![Arc::new(Int64Array::from(ids))]).unwrap();

    let statements = insert_statements(Dialect::SqlServer, &TableRef::dbo("t"), &batch).unwrap();
    assert_eq!(statements.len(), 3);
    assert_eq!(statements[2].matches("),\n(").count(), 499);
}

#[test]
fn test_insert_statements_empty_batch() {
    let batch = mixed_batch().slice(0, 0);
    let statements = insert_statements(Dialect::SqlServer, &TableRef::dbo("t"), &batch).unwrap();
    assert!(statements.is_empty());
}

#[test]
fn test_insert_statements_unsupported_column() {
    let schema = Arc::new(Schema::new(vec![Field::new("raw", DataType::Binary, false)]));
    let batch = RecordBatch::try_new(
        schema,
        vec![Arc::new(BinaryArray::from(vec![b"x".as_ref()]))],
    )
    .unwrap();
    let err = insert_statements(Dialect::SqlServer, &TableRef::dbo("t"), &batch).unwrap_err();
    assert!(matches!(err, Error::UnsupportedType { .. }));
}
