//! Common types used throughout dbharbor
//!
//! This module contains the shared vocabulary of the crate: coarse column
//! tags, SQL column type descriptors, table references and load modes.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default schema for SQL Server tables
pub const DEFAULT_SCHEMA: &str = "dbo";

/// Name of the row-load timestamp audit column
pub const ROW_LOAD_COLUMN: &str = "RowLoadDateTime";

/// Name of the row ordinal column added by `LoadOptions::include_index`
pub const INDEX_COLUMN: &str = "index";

// ============================================================================
// Coarse Type Tag
// ============================================================================

/// Caller-declared category of a column's values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoarseType {
    Text,
    Integer,
    Float,
    Boolean,
    DateTime,
}

impl fmt::Display for CoarseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CoarseType::Text => "text",
            CoarseType::Integer => "integer",
            CoarseType::Float => "float",
            CoarseType::Boolean => "boolean",
            CoarseType::DateTime => "datetime",
        };
        f.write_str(name)
    }
}

// ============================================================================
// SQL Column Type Descriptor
// ============================================================================

/// Physical SQL column type sized from observed data
///
/// `Display` renders the SQL Server spelling; other dialects render through
/// [`crate::sql::Dialect::render_type`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SqlType {
    /// `varchar(n)`, or `varchar(max)` when the length is `None`
    Varchar { length: Option<u32> },
    TinyInt,
    SmallInt,
    Int,
    BigInt,
    Decimal { precision: u32, scale: u32 },
    /// Double precision float, for values too wide for any `decimal`
    Float,
    Bit,
    DateTime,
}

impl fmt::Display for SqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlType::Varchar { length: Some(n) } => write!(f, "varchar({n})"),
            SqlType::Varchar { length: None } => f.write_str("varchar(max)"),
            SqlType::TinyInt => f.write_str("tinyint"),
            SqlType::SmallInt => f.write_str("smallint"),
            SqlType::Int => f.write_str("int"),
            SqlType::BigInt => f.write_str("bigint"),
            SqlType::Decimal { precision, scale } => write!(f, "decimal({precision},{scale})"),
            SqlType::Float => f.write_str("float"),
            SqlType::Bit => f.write_str("bit"),
            SqlType::DateTime => f.write_str("datetime"),
        }
    }
}

/// One column of a target table schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDef {
    pub name: String,
    pub sql_type: SqlType,
}

impl ColumnDef {
    pub fn new(name: impl Into<String>, sql_type: SqlType) -> Self {
        Self {
            name: name.into(),
            sql_type,
        }
    }
}

// ============================================================================
// Table Reference
// ============================================================================

/// A schema-qualified table name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TableRef {
    pub schema: String,
    pub name: String,
}

impl TableRef {
    /// Reference a table in an explicit schema
    pub fn new(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            name: name.into(),
        }
    }

    /// Reference a table in the default `dbo` schema
    pub fn dbo(name: impl Into<String>) -> Self {
        Self::new(DEFAULT_SCHEMA, name)
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.schema, self.name)
    }
}

// ============================================================================
// Load Modes
// ============================================================================

/// What `load` does when the target table may already exist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IfExists {
    /// Create the table; an existing table is an error
    #[default]
    Fail,
    /// Drop the table, then create it
    Replace,
    /// Create the table unless it is already there
    Append,
}

impl FromStr for IfExists {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "fail" => Ok(IfExists::Fail),
            "replace" => Ok(IfExists::Replace),
            "append" => Ok(IfExists::Append),
            other => Err(Error::invalid_argument(format!(
                "if_exists value '{other}' is invalid, choose between (fail, replace, append)"
            ))),
        }
    }
}

impl fmt::Display for IfExists {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IfExists::Fail => "fail",
            IfExists::Replace => "replace",
            IfExists::Append => "append",
        };
        f.write_str(name)
    }
}
