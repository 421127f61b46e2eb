//! Sync types
//!
//! Load options and running statistics for the orchestrator.

use crate::sql::CreateTableOptions;
use crate::types::IfExists;
use serde::{Deserialize, Serialize};

/// Options for [`super::Harbor::load`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadOptions {
    /// What to do when the table may already exist
    #[serde(default)]
    pub if_exists: IfExists,
    /// Prepend an `index` column holding the row ordinal
    #[serde(default)]
    pub include_index: bool,
    /// Table creation options; `replace` is driven by `if_exists`
    #[serde(default)]
    pub table_options: CreateTableOptions,
}

impl LoadOptions {
    /// Create load options (fail if the table exists, no index)
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the existing-table behaviour
    #[must_use]
    pub fn with_if_exists(mut self, if_exists: IfExists) -> Self {
        self.if_exists = if_exists;
        self
    }

    /// Prepend the row ordinal column
    #[must_use]
    pub fn with_index(mut self, include: bool) -> Self {
        self.include_index = include;
        self
    }

    /// Add the audit columns when the table is created
    #[must_use]
    pub fn with_audit_columns(mut self, include: bool) -> Self {
        self.table_options = self.table_options.audit_columns(include);
        self
    }
}

/// Statistics accumulated by a [`super::Harbor`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HarborStats {
    /// Tables created (replacements included)
    pub tables_created: usize,
    /// Columns added to existing tables
    pub columns_added: usize,
    /// Rows sent to the backend
    pub rows_inserted: u64,
    /// Input rows dropped because their key was already present
    pub rows_skipped: usize,
    /// Statements and queries sent through `run`/`read`
    pub passthrough_calls: usize,
}

impl HarborStats {
    /// Create new stats
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a created table
    pub fn add_table(&mut self) {
        self.tables_created += 1;
    }

    /// Add added columns
    pub fn add_columns(&mut self, count: usize) {
        self.columns_added += count;
    }

    /// Add inserted rows
    pub fn add_rows(&mut self, count: u64) {
        self.rows_inserted += count;
    }

    /// Add skipped rows
    pub fn add_skipped(&mut self, count: usize) {
        self.rows_skipped += count;
    }

    /// Add a pass-through call
    pub fn add_passthrough(&mut self) {
        self.passthrough_calls += 1;
    }
}
