//! Schema/sync orchestrator
//!
//! Combines type inference, SQL rendering and an execution backend.
//!
//! # Overview
//!
//! - `Harbor` - creates tables sized from data, widens them with missing
//!   columns, filters out rows whose key is already stored, and loads
//! - `LoadOptions` - existing-table behaviour, index column, audit columns
//! - `HarborStats` - counters for tables, columns and rows
//!
//! ```rust,ignore
//! use dbharbor::{ConnectionConfig, Harbor, LoadOptions, TableRef, IfExists};
//!
//! let mut harbor = Harbor::connect(&ConnectionConfig::from_env()?)?;
//! let table = TableRef::dbo("sales");
//! let fresh = harbor.where_not_exists(&batch, &table, &["order_id"])?;
//! harbor.load(&fresh, &table, &LoadOptions::new().with_if_exists(IfExists::Append))?;
//! ```

mod types;

pub use types::{HarborStats, LoadOptions};

use crate::config::ConnectionConfig;
use crate::database::{DuckDbExecutor, SqlExecutor, SqlServerExecutor};
use crate::error::{Error, Result};
use crate::schema::SqlTypeInferrer;
use crate::sql::{
    add_column_sql, create_table_sql, select_columns_sql, select_one_row_sql, CreateTableOptions,
    Dialect,
};
use crate::types::{IfExists, TableRef, INDEX_COLUMN, ROW_LOAD_COLUMN};
use arrow::array::{ArrayRef, BooleanArray, Int64Array};
use arrow::compute::{cast, filter_record_batch};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::{RecordBatch, RecordBatchOptions};
use arrow::row::{Row, RowConverter, SortField};
use std::collections::HashSet;
use std::sync::Arc;

/// Orchestrator over one execution backend
pub struct Harbor<E: SqlExecutor> {
    /// Execution backend
    executor: E,
    /// Column type inference
    inferrer: SqlTypeInferrer,
    /// Statistics
    stats: HarborStats,
}

impl Harbor<SqlServerExecutor> {
    /// Connect to SQL Server (integrated auth first, then user/password)
    pub fn connect(config: &ConnectionConfig) -> Result<Self> {
        Ok(Self::new(SqlServerExecutor::connect(config)?))
    }
}

impl Harbor<DuckDbExecutor> {
    /// Work against a fresh in-memory DuckDB database
    pub fn in_memory() -> Result<Self> {
        Ok(Self::new(DuckDbExecutor::open_in_memory()?))
    }
}

impl<E: SqlExecutor> Harbor<E> {
    /// Create an orchestrator over an executor
    pub fn new(executor: E) -> Self {
        Self {
            executor,
            inferrer: SqlTypeInferrer::new(),
            stats: HarborStats::default(),
        }
    }

    /// Use a custom type inferrer
    #[must_use]
    pub fn with_inferrer(mut self, inferrer: SqlTypeInferrer) -> Self {
        self.inferrer = inferrer;
        self
    }

    /// Dialect of the backend
    pub fn dialect(&self) -> Dialect {
        self.executor.dialect()
    }

    /// Get the executor
    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Get mutable executor
    pub fn executor_mut(&mut self) -> &mut E {
        &mut self.executor
    }

    /// Give back the executor
    pub fn into_executor(self) -> E {
        self.executor
    }

    /// Get statistics
    pub fn stats(&self) -> &HarborStats {
        &self.stats
    }

    /// Reset statistics
    pub fn reset_stats(&mut self) {
        self.stats = HarborStats::default();
    }

    // ========================================================================
    // Pass-through
    // ========================================================================

    /// Run a query and return its first result set
    pub fn read(&mut self, sql: &str) -> Result<RecordBatch> {
        self.stats.add_passthrough();
        self.executor.query(sql)
    }

    /// Run a statement batch, discarding any results
    pub fn run(&mut self, sql: &str) -> Result<()> {
        self.stats.add_passthrough();
        self.executor.execute(sql)
    }

    // ========================================================================
    // Schema
    // ========================================================================

    /// Create a table whose columns are sized from `data`
    ///
    /// With audit columns, an input `RowLoadDateTime` column is left to the
    /// generated default. An existing table surfaces as
    /// [`Error::TableAlreadyExists`] unless `options.replace` is set.
    pub fn create_table(
        &mut self,
        data: &RecordBatch,
        table: &TableRef,
        options: &CreateTableOptions,
    ) -> Result<()> {
        let skip: &[&str] = if options.include_audit_columns {
            &[ROW_LOAD_COLUMN]
        } else {
            &[]
        };
        let columns = self.inferrer.infer_columns(data, skip)?;
        if columns.is_empty() && !options.include_audit_columns {
            return Err(Error::invalid_argument(format!(
                "Cannot create table {table} without columns"
            )));
        }

        let sql = create_table_sql(self.executor.dialect(), table, &columns, options);
        self.executor.execute(&sql)?;
        self.stats.add_table();
        tracing::info!("Created table {} with {} columns", table, columns.len());
        Ok(())
    }

    /// Add every column of `data` the table does not have yet
    ///
    /// Names are compared ASCII case-insensitively. Returns the added names
    /// in input order.
    pub fn add_missing_columns(
        &mut self,
        data: &RecordBatch,
        table: &TableRef,
    ) -> Result<Vec<String>> {
        let dialect = self.executor.dialect();
        let current = self.executor.query(&select_one_row_sql(dialect, table))?;
        let existing: HashSet<String> = current
            .schema()
            .fields()
            .iter()
            .map(|f| f.name().to_ascii_lowercase())
            .collect();

        let schema = data.schema();
        let mut added = Vec::new();
        for (field, values) in schema.fields().iter().zip(data.columns()) {
            if existing.contains(&field.name().to_ascii_lowercase()) {
                continue;
            }
            let column = self.inferrer.infer_column(field.name(), values.as_ref())?;
            self.executor
                .execute(&add_column_sql(dialect, table, &column))?;
            tracing::info!("Added column {} {} to {}", column.name, column.sql_type, table);
            added.push(column.name);
        }

        self.stats.add_columns(added.len());
        Ok(added)
    }

    // ========================================================================
    // Key Reconciliation
    // ========================================================================

    /// Keep only the rows whose key tuple is not already in the table
    ///
    /// Stored keys are cast to the input column types before comparison.
    /// Column order and row order of `data` are preserved.
    pub fn where_not_exists(
        &mut self,
        data: &RecordBatch,
        table: &TableRef,
        key_columns: &[&str],
    ) -> Result<RecordBatch> {
        if key_columns.is_empty() {
            return Err(Error::invalid_argument(
                "At least one key column is required",
            ));
        }

        let schema = data.schema();
        let input_keys = key_columns
            .iter()
            .map(|key| {
                schema
                    .index_of(key)
                    .map(|i| Arc::clone(data.column(i)))
                    .map_err(|_| {
                        Error::invalid_argument(format!("Key column '{key}' is not in the data"))
                    })
            })
            .collect::<Result<Vec<ArrayRef>>>()?;

        let sql = select_columns_sql(self.executor.dialect(), table, key_columns);
        let stored = self.executor.query(&sql)?;
        if stored.num_columns() != key_columns.len() {
            return Err(Error::execution(format!(
                "Key query on {table} returned {} columns, expected {}",
                stored.num_columns(),
                key_columns.len()
            )));
        }

        let stored_keys = input_keys
            .iter()
            .zip(stored.columns())
            .map(|(input, fetched)| Ok(cast(fetched.as_ref(), input.data_type())?))
            .collect::<Result<Vec<ArrayRef>>>()?;

        let converter = RowConverter::new(
            input_keys
                .iter()
                .map(|a| SortField::new(a.data_type().clone()))
                .collect(),
        )?;
        let stored_rows = converter.convert_columns(&stored_keys)?;
        let present: HashSet<Row<'_>> = stored_rows.iter().collect();
        let input_rows = converter.convert_columns(&input_keys)?;
        let keep: BooleanArray = input_rows
            .iter()
            .map(|row| Some(!present.contains(&row)))
            .collect();

        let fresh = filter_record_batch(data, &keep)?;
        let skipped = data.num_rows() - fresh.num_rows();
        self.stats.add_skipped(skipped);
        tracing::info!(
            "{} of {} rows are not yet in {}",
            fresh.num_rows(),
            data.num_rows(),
            table
        );
        Ok(fresh)
    }

    // ========================================================================
    // Load
    // ========================================================================

    /// Create the table as `options.if_exists` says, then insert every row
    ///
    /// In append mode only [`Error::TableAlreadyExists`] from the create step
    /// is ignored; any other failure is returned.
    pub fn load(&mut self, data: &RecordBatch, table: &TableRef, options: &LoadOptions) -> Result<()> {
        let data = if options.include_index {
            with_index_column(data)?
        } else {
            data.clone()
        };

        let create = options.table_options;
        match options.if_exists {
            IfExists::Fail => self.create_table(&data, table, &create.replace(false))?,
            IfExists::Replace => self.create_table(&data, table, &create.replace(true))?,
            IfExists::Append => match self.create_table(&data, table, &create.replace(false)) {
                Ok(()) => {}
                Err(e) if e.is_table_exists() => {
                    tracing::debug!("Table {} already exists, appending", table);
                }
                Err(e) => return Err(e),
            },
        }

        let rows = self.executor.bulk_insert(table, &data)?;
        self.stats.add_rows(rows);
        tracing::info!("Inserted {} rows into {}", rows, table);
        Ok(())
    }
}

/// Prepend an `index` column with the row ordinal
pub(crate) fn with_index_column(data: &RecordBatch) -> Result<RecordBatch> {
    let schema = data.schema();
    if schema.column_with_name(INDEX_COLUMN).is_some() {
        return Err(Error::invalid_argument(format!(
            "Cannot add '{INDEX_COLUMN}' column, it already exists"
        )));
    }

    let mut fields = Vec::with_capacity(schema.fields().len() + 1);
    fields.push(Arc::new(Field::new(INDEX_COLUMN, DataType::Int64, false)));
    fields.extend(schema.fields().iter().cloned());

    let mut columns: Vec<ArrayRef> = Vec::with_capacity(fields.len());
    columns.push(Arc::new(Int64Array::from_iter_values(
        0..data.num_rows() as i64,
    )));
    columns.extend(data.columns().iter().cloned());

    let options = RecordBatchOptions::new().with_row_count(Some(data.num_rows()));
    Ok(RecordBatch::try_new_with_options(
        Arc::new(Schema::new(fields)),
        columns,
        &options,
    )?)
}
