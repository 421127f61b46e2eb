//! CLI commands and argument parsing

use crate::files::InputFormat;
use crate::types::IfExists;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Infer SQL Server tables from data files and load only new rows
#[derive(Parser, Debug)]
#[command(name = "dbharbor")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Connection settings file (YAML or JSON); SQL_* variables otherwise
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// SQL Server address (`host`, `host,port` or `host\instance`)
    #[arg(long, global = true)]
    pub server: Option<String>,

    /// Database name
    #[arg(long, global = true)]
    pub database: Option<String>,

    /// Login for the user/password fallback
    #[arg(long, global = true)]
    pub user: Option<String>,

    /// Password for the user/password fallback
    #[arg(long, global = true)]
    pub password: Option<String>,

    /// Client driver name reported to the server
    #[arg(long, global = true)]
    pub driver: Option<String>,

    /// Use a DuckDB database file instead of SQL Server
    #[arg(long, global = true)]
    pub duckdb: Option<PathBuf>,

    /// Output format for status messages
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Target table and input file shared by the data commands
#[derive(Args, Debug, Clone)]
pub struct TableArgs {
    /// Input data file (Parquet, CSV or newline-delimited JSON)
    pub file: PathBuf,

    /// Target table name
    #[arg(short, long)]
    pub table: String,

    /// Target schema (dbo on SQL Server, main on DuckDB)
    #[arg(short, long)]
    pub schema: Option<String>,

    /// Input format, detected from the extension when omitted
    #[arg(long, value_parser = parse_input_format)]
    pub input_format: Option<InputFormat>,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Test the connection
    Check,

    /// Print the CREATE TABLE statement inferred from a file
    Ddl {
        #[command(flatten)]
        target: TableArgs,

        /// Prefix with DROP TABLE IF EXISTS
        #[arg(long)]
        replace: bool,

        /// Add the identity key and RowLoadDateTime columns
        #[arg(long)]
        audit_columns: bool,

        /// Run the statement instead of printing it
        #[arg(long)]
        execute: bool,
    },

    /// Create the table if needed and insert the rows of a file
    Load {
        #[command(flatten)]
        target: TableArgs,

        /// What to do when the table exists: fail, replace or append
        #[arg(long, default_value = "fail", value_parser = parse_if_exists)]
        if_exists: IfExists,

        /// Prepend an `index` column with the row ordinal
        #[arg(long)]
        index: bool,

        /// Add the identity key and RowLoadDateTime columns on create
        #[arg(long)]
        audit_columns: bool,

        /// Only insert rows whose key (comma-separated columns) is new
        #[arg(long, value_delimiter = ',')]
        keys: Vec<String>,

        /// Add columns the table is missing before inserting
        #[arg(long)]
        add_columns: bool,
    },

    /// Add the columns of a file that the table does not have yet
    AddColumns {
        #[command(flatten)]
        target: TableArgs,
    },

    /// Print the rows of a file whose key is not yet in the table
    Diff {
        #[command(flatten)]
        target: TableArgs,

        /// Key columns (comma-separated)
        #[arg(long, value_delimiter = ',', required = true)]
        keys: Vec<String>,

        /// Write the rows to a Parquet file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Run a query and print its rows as JSON lines
    Query {
        /// SQL text
        sql: String,
    },

    /// Run a statement batch
    Run {
        /// SQL text
        sql: String,
    },
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one message per line)
    Json,
    /// Human-readable output
    Pretty,
}

fn parse_if_exists(value: &str) -> std::result::Result<IfExists, String> {
    value.parse().map_err(|e: crate::Error| e.to_string())
}

fn parse_input_format(value: &str) -> std::result::Result<InputFormat, String> {
    value.parse().map_err(|e: crate::Error| e.to_string())
}
