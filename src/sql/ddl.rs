//! DDL and probe statements

use super::Dialect;
use crate::types::{ColumnDef, TableRef, ROW_LOAD_COLUMN};
use serde::{Deserialize, Serialize};

/// Options for `CREATE TABLE`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateTableOptions {
    /// Drop the table first if it exists
    #[serde(default)]
    pub replace: bool,
    /// Add an identity primary key `ID<table>` and a `RowLoadDateTime`
    /// column defaulting to the load time
    #[serde(default)]
    pub include_audit_columns: bool,
}

impl CreateTableOptions {
    /// Create options with both flags off
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop the table first if it exists
    #[must_use]
    pub fn replace(mut self, replace: bool) -> Self {
        self.replace = replace;
        self
    }

    /// Add the audit columns
    #[must_use]
    pub fn audit_columns(mut self, include: bool) -> Self {
        self.include_audit_columns = include;
        self
    }
}

/// Name of the identity key column added with the audit columns
pub fn audit_key_column(table: &TableRef) -> String {
    format!("ID{}", table.name)
}

/// Render `CREATE TABLE`, preceded by `DROP TABLE IF EXISTS` on replace
pub fn create_table_sql(
    dialect: Dialect,
    table: &TableRef,
    columns: &[ColumnDef],
    options: &CreateTableOptions,
) -> String {
    let name = dialect.table_name(table);
    let mut statements = Vec::new();

    if options.replace {
        statements.push(format!("DROP TABLE IF EXISTS {name}"));
    }

    let mut body: Vec<String> = Vec::with_capacity(columns.len() + 3);
    let key = dialect.quote_ident(&audit_key_column(table));
    let sequence = format!("{}.seq_{}", table.schema, table.name);

    if options.include_audit_columns {
        match dialect {
            Dialect::SqlServer => {
                body.push(format!("{key} INT IDENTITY(1, 1) NOT NULL"));
            }
            Dialect::DuckDb => {
                if options.replace {
                    statements.push(format!("DROP SEQUENCE IF EXISTS {sequence}"));
                }
                statements.push(format!("CREATE SEQUENCE IF NOT EXISTS {sequence}"));
                body.push(format!(
                    "{key} INTEGER NOT NULL DEFAULT nextval('{sequence}')"
                ));
            }
        }
    }

    body.extend(columns.iter().map(|column| {
        format!(
            "{} {}",
            dialect.quote_ident(&column.name),
            dialect.render_type(column.sql_type)
        )
    }));

    if options.include_audit_columns {
        let row_load = dialect.quote_ident(ROW_LOAD_COLUMN);
        match dialect {
            Dialect::SqlServer => {
                let default_name = dialect.quote_ident(&format!("DF_{}_RowLoad", table.name));
                let pk_name = dialect.quote_ident(&format!("PK_{}", table.name));
                body.push(format!(
                    "{row_load} DATETIME NOT NULL CONSTRAINT {default_name} DEFAULT (GETDATE())"
                ));
                body.push(format!("CONSTRAINT {pk_name} PRIMARY KEY ({key})"));
            }
            Dialect::DuckDb => {
                body.push(format!(
                    "{row_load} TIMESTAMP NOT NULL DEFAULT current_timestamp"
                ));
                body.push(format!("PRIMARY KEY ({key})"));
            }
        }
    }

    statements.push(format!(
        "CREATE TABLE {name} (\n    {}\n)",
        body.join(",\n    ")
    ));
    statements.join(dialect.statement_separator())
}

/// Render `ALTER TABLE ... ADD` for one column
pub fn add_column_sql(dialect: Dialect, table: &TableRef, column: &ColumnDef) -> String {
    format!(
        "ALTER TABLE {} ADD {} {}",
        dialect.table_name(table),
        dialect.quote_ident(&column.name),
        dialect.render_type(column.sql_type)
    )
}

/// Render a `SELECT` of the given columns over the whole table
pub fn select_columns_sql(dialect: Dialect, table: &TableRef, columns: &[&str]) -> String {
    let list: Vec<String> = columns.iter().map(|c| dialect.quote_ident(c)).collect();
    format!("SELECT {} FROM {}", list.join(", "), dialect.table_name(table))
}

/// Render a query returning at most one row with every column
pub fn select_one_row_sql(dialect: Dialect, table: &TableRef) -> String {
    let name = dialect.table_name(table);
    match dialect {
        Dialect::SqlServer => format!("SELECT TOP 1 * FROM {name}"),
        Dialect::DuckDb => format!("SELECT * FROM {name} LIMIT 1"),
    }
}
