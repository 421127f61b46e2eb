//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat, TableArgs};
use crate::config::{load_config, ConnectionConfig};
use crate::database::{DuckDbExecutor, SqlExecutor, SqlServerExecutor};
use crate::error::Result;
use crate::files::{read_batch, write_json_lines, write_parquet};
use crate::schema::infer_columns;
use crate::sql::{create_table_sql, select_one_row_sql, CreateTableOptions, Dialect};
use crate::sync::{Harbor, LoadOptions};
use crate::types::{IfExists, TableRef, ROW_LOAD_COLUMN};
use serde_json::{json, Value};
use std::io::Write;

type DynHarbor = Harbor<Box<dyn SqlExecutor>>;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Check => self.check(),
            Commands::Ddl {
                target,
                replace,
                audit_columns,
                execute,
            } => {
                let options = CreateTableOptions::new()
                    .replace(*replace)
                    .audit_columns(*audit_columns);
                self.ddl(target, &options, *execute)
            }
            Commands::Load {
                target,
                if_exists,
                index,
                audit_columns,
                keys,
                add_columns,
            } => {
                let options = LoadOptions::new()
                    .with_if_exists(*if_exists)
                    .with_index(*index)
                    .with_audit_columns(*audit_columns);
                self.load(target, &options, keys, *add_columns)
            }
            Commands::AddColumns { target } => self.add_columns(target),
            Commands::Diff {
                target,
                keys,
                output,
            } => self.diff(target, keys, output.as_deref()),
            Commands::Query { sql } => self.query(sql),
            Commands::Run { sql } => self.run_sql(sql),
        }
    }

    /// Resolve connection settings: file or `SQL_*` variables, then flags
    pub fn connection_config(&self) -> Result<ConnectionConfig> {
        let mut config = match &self.cli.config {
            Some(path) => load_config(path)?,
            None => ConnectionConfig::from_env()?,
        };
        if let Some(server) = &self.cli.server {
            config.server.clone_from(server);
        }
        if let Some(database) = &self.cli.database {
            config.database = Some(database.clone());
        }
        if let Some(user) = &self.cli.user {
            config.user = Some(user.clone());
        }
        if let Some(password) = &self.cli.password {
            config.password = Some(password.clone());
        }
        if let Some(driver) = &self.cli.driver {
            config.driver.clone_from(driver);
        }
        Ok(config)
    }

    /// Dialect of the selected backend
    fn dialect(&self) -> Dialect {
        if self.cli.duckdb.is_some() {
            Dialect::DuckDb
        } else {
            Dialect::SqlServer
        }
    }

    /// Open the selected backend
    fn open_harbor(&self) -> Result<DynHarbor> {
        let executor: Box<dyn SqlExecutor> = match &self.cli.duckdb {
            Some(path) => Box::new(DuckDbExecutor::open(path)?),
            None => Box::new(SqlServerExecutor::connect(&self.connection_config()?)?),
        };
        Ok(Harbor::new(executor))
    }

    /// Target table, defaulting the schema per backend
    fn table_ref(&self, target: &TableArgs) -> TableRef {
        let dialect = self.dialect();
        let schema = target
            .schema
            .clone()
            .unwrap_or_else(|| dialect.default_schema().to_string());
        TableRef::new(schema, target.table.clone())
    }

    /// Check connection
    fn check(&self) -> Result<()> {
        match self.open_harbor().and_then(|mut h| h.run("SELECT 1")) {
            Ok(()) => self.output_message(&json!({
                "type": "CONNECTION_STATUS",
                "connectionStatus": {
                    "status": "SUCCEEDED",
                    "message": "Connection successful"
                }
            })),
            Err(e) => self.output_message(&json!({
                "type": "CONNECTION_STATUS",
                "connectionStatus": {
                    "status": "FAILED",
                    "message": format!("Connection failed: {e}")
                }
            })),
        }
        Ok(())
    }

    /// Print or execute the inferred CREATE TABLE
    fn ddl(&self, target: &TableArgs, options: &CreateTableOptions, execute: bool) -> Result<()> {
        let data = read_batch(&target.file, target.input_format)?;
        let table = self.table_ref(target);

        if execute {
            let mut harbor = self.open_harbor()?;
            harbor.create_table(&data, &table, options)?;
            self.output_message(&json!({
                "type": "TABLE_CREATED",
                "table": table.to_string()
            }));
            return Ok(());
        }

        let skip: &[&str] = if options.include_audit_columns {
            &[ROW_LOAD_COLUMN]
        } else {
            &[]
        };
        let columns = infer_columns(&data, skip)?;
        println!("{}", create_table_sql(self.dialect(), &table, &columns, options));
        Ok(())
    }

    /// Load a file into a table
    fn load(
        &self,
        target: &TableArgs,
        options: &LoadOptions,
        keys: &[String],
        add_columns: bool,
    ) -> Result<()> {
        let data = read_batch(&target.file, target.input_format)?;
        let table = self.table_ref(target);
        let mut harbor = self.open_harbor()?;

        let exists = table_exists(&mut harbor, &table);
        let mut added = Vec::new();
        let data = if exists && options.if_exists == IfExists::Append {
            if add_columns {
                added = harbor.add_missing_columns(&data, &table)?;
            }
            if keys.is_empty() {
                data
            } else {
                let keys: Vec<&str> = keys.iter().map(String::as_str).collect();
                harbor.where_not_exists(&data, &table, &keys)?
            }
        } else {
            data
        };

        harbor.load(&data, &table, options)?;

        let stats = harbor.stats();
        self.output_message(&json!({
            "type": "LOAD_STATUS",
            "table": table.to_string(),
            "ifExists": options.if_exists.to_string(),
            "tablesCreated": stats.tables_created,
            "columnsAdded": added,
            "rowsInserted": stats.rows_inserted,
            "rowsSkipped": stats.rows_skipped
        }));
        Ok(())
    }

    /// Add missing columns to a table
    fn add_columns(&self, target: &TableArgs) -> Result<()> {
        let data = read_batch(&target.file, target.input_format)?;
        let table = self.table_ref(target);
        let mut harbor = self.open_harbor()?;

        let added = harbor.add_missing_columns(&data, &table)?;
        self.output_message(&json!({
            "type": "COLUMNS_ADDED",
            "table": table.to_string(),
            "columns": added
        }));
        Ok(())
    }

    /// Emit the rows whose key is not yet in the table
    fn diff(&self, target: &TableArgs, keys: &[String], output: Option<&std::path::Path>) -> Result<()> {
        let data = read_batch(&target.file, target.input_format)?;
        let table = self.table_ref(target);
        let mut harbor = self.open_harbor()?;

        let keys: Vec<&str> = keys.iter().map(String::as_str).collect();
        let fresh = harbor.where_not_exists(&data, &table, &keys)?;

        match output {
            Some(path) => {
                let rows = write_parquet(path, &fresh, None)?;
                self.output_message(&json!({
                    "type": "DIFF_STATUS",
                    "table": table.to_string(),
                    "rows": rows,
                    "output": path.display().to_string()
                }));
            }
            None => write_stdout(&fresh)?,
        }
        Ok(())
    }

    /// Run a query and print its rows
    fn query(&self, sql: &str) -> Result<()> {
        let mut harbor = self.open_harbor()?;
        let batch = harbor.read(sql)?;
        write_stdout(&batch)
    }

    /// Run a statement batch
    fn run_sql(&self, sql: &str) -> Result<()> {
        let mut harbor = self.open_harbor()?;
        harbor.run(sql)?;
        self.output_message(&json!({
            "type": "RUN_STATUS",
            "status": "SUCCEEDED"
        }));
        Ok(())
    }

    /// Output a message
    fn output_message(&self, msg: &Value) {
        match self.cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string(msg).unwrap_or_default());
            }
            OutputFormat::Pretty => {
                println!("{}", serde_json::to_string_pretty(msg).unwrap_or_default());
            }
        }
    }
}

/// Probe a table with a one-row query
fn table_exists(harbor: &mut DynHarbor, table: &TableRef) -> bool {
    let probe = select_one_row_sql(harbor.dialect(), table);
    match harbor.executor_mut().query(&probe) {
        Ok(_) => true,
        Err(e) => {
            tracing::debug!("Table {} not readable, treating as absent: {}", table, e);
            false
        }
    }
}

fn write_stdout(batch: &arrow::record_batch::RecordBatch) -> Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    write_json_lines(&mut out, batch)?;
    out.flush()?;
    Ok(())
}
