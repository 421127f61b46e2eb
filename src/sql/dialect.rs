//! SQL dialect handling

use crate::types::{SqlType, TableRef, DEFAULT_SCHEMA};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// SQL dialect variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dialect {
    /// Microsoft SQL Server (T-SQL)
    #[default]
    SqlServer,
    /// DuckDB
    DuckDb,
}

impl Dialect {
    /// Quote an identifier.
    ///
    /// SQL Server uses square brackets, DuckDB double quotes; the closing
    /// delimiter is doubled inside the name.
    pub fn quote_ident(self, name: &str) -> String {
        match self {
            Dialect::SqlServer => format!("[{}]", name.replace(']', "]]")),
            Dialect::DuckDb => format!("\"{}\"", name.replace('"', "\"\"")),
        }
    }

    /// Schema tables land in when the caller names none.
    pub fn default_schema(self) -> &'static str {
        match self {
            Dialect::SqlServer => DEFAULT_SCHEMA,
            Dialect::DuckDb => "main",
        }
    }

    /// Schema-qualified table name as written in statements.
    pub fn table_name(self, table: &TableRef) -> String {
        table.to_string()
    }

    /// Spell a column type for this dialect.
    pub fn render_type(self, sql_type: SqlType) -> String {
        match (self, sql_type) {
            (Dialect::SqlServer, t) => t.to_string(),
            (Dialect::DuckDb, SqlType::Varchar { length: None }) => "varchar".to_string(),
            (Dialect::DuckDb, SqlType::Float) => "double".to_string(),
            (Dialect::DuckDb, SqlType::Bit) => "boolean".to_string(),
            (Dialect::DuckDb, SqlType::DateTime) => "timestamp".to_string(),
            (Dialect::DuckDb, t) => t.to_string(),
        }
    }

    /// Boolean literal.
    pub fn bool_literal(self, value: bool) -> &'static str {
        match (self, value) {
            (Dialect::SqlServer, true) => "1",
            (Dialect::SqlServer, false) => "0",
            (Dialect::DuckDb, true) => "TRUE",
            (Dialect::DuckDb, false) => "FALSE",
        }
    }

    /// Timestamp literal at the precision the column type keeps.
    ///
    /// SQL Server `datetime` stores milliseconds, DuckDB `timestamp`
    /// microseconds.
    pub fn timestamp_literal(self, value: &NaiveDateTime) -> String {
        match self {
            Dialect::SqlServer => format!("'{}'", value.format("%Y-%m-%dT%H:%M:%S%.3f")),
            Dialect::DuckDb => format!("'{}'", value.format("%Y-%m-%d %H:%M:%S%.6f")),
        }
    }

    /// String literal with embedded quotes doubled.
    pub fn string_literal(self, value: &str) -> String {
        let escaped = value.replace('\'', "''");
        match self {
            // N prefix keeps non-ASCII text intact until the column converts it
            Dialect::SqlServer => format!("N'{escaped}'"),
            Dialect::DuckDb => format!("'{escaped}'"),
        }
    }

    /// Separator between statements sent as one batch.
    pub fn statement_separator(self) -> &'static str {
        match self {
            Dialect::SqlServer => "\n",
            Dialect::DuckDb => ";\n",
        }
    }
}
