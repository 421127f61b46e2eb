//! CLI module
//!
//! Command-line interface over the orchestrator.
//!
//! # Commands
//!
//! - `check` - Test the connection
//! - `ddl` - Print (or run) the inferred `CREATE TABLE`
//! - `load` - Create the table as needed and insert rows
//! - `add-columns` - Widen a table with the columns it lacks
//! - `diff` - Rows whose key is not yet stored
//! - `query` / `run` - Pass-through SQL

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat, TableArgs};
pub use runner::Runner;
