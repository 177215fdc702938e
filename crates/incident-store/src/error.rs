//! Error types for incident store access

/// Store errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Query or connection failure
    #[error("sqlite: {0}")]
    Sql(#[from] rusqlite::Error),

    /// Configured table does not exist
    #[error("table {0} not found")]
    TableNotFound(String),

    /// Identifier not present in the table schema
    #[error("column {column} not found in table {table}")]
    UnknownColumn {
        /// Table that was searched
        table: String,
        /// Missing column
        column: String,
    },

    /// Update carried no assignments
    #[error("update contains no fields")]
    EmptyUpdate,

    /// Pool was shut down
    #[error("connection pool closed")]
    PoolClosed,

    /// Blocking worker panicked or was cancelled
    #[error("database worker failed: {0}")]
    Worker(String),
}

impl StoreError {
    /// Whether the error comes from configuration not matching the schema
    #[inline]
    #[must_use]
    pub fn is_schema_error(&self) -> bool {
        matches!(self, Self::TableNotFound(_) | Self::UnknownColumn { .. })
    }
}
