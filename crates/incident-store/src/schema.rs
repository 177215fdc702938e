//! Table schema validation and query construction
//!
//! The schema is read from the database once, when the store opens.
//! Query text is then assembled only from identifiers found in that
//! schema; values always travel as bound parameters.

use crate::error::StoreError;
use incident_core::{DatabaseConfig, FieldName, FieldUpdate};
use rusqlite::Connection;

/// Validated shape of the incident table
#[derive(Debug, Clone)]
pub struct TableSchema {
    table: FieldName,
    key_column: FieldName,
    columns: Vec<FieldName>,
    selected: Vec<FieldName>,
}

impl TableSchema {
    /// Introspect the configured table and validate configuration against it
    ///
    /// # Errors
    /// - `StoreError::TableNotFound` if the table has no columns
    /// - `StoreError::UnknownColumn` if the key column or a configured field
    ///   is not a column of the table
    pub fn introspect(conn: &Connection, config: &DatabaseConfig) -> Result<Self, StoreError> {
        let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", config.table.quoted()))?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(1))?
            .collect::<Result<Vec<_>, _>>()?;

        if names.is_empty() {
            return Err(StoreError::TableNotFound(config.table.to_string()));
        }

        let mut columns = Vec::with_capacity(names.len());
        for name in names {
            match FieldName::new(name) {
                Ok(field) => columns.push(field),
                Err(err) => tracing::warn!("Skipping column that is not a plain identifier: {}", err),
            }
        }

        Self::from_columns(config, columns)
    }

    /// Build from a known column list
    ///
    /// # Errors
    /// `StoreError::UnknownColumn` if the key column or a configured field
    /// is missing from `columns`
    pub fn from_columns(
        config: &DatabaseConfig,
        columns: Vec<FieldName>,
    ) -> Result<Self, StoreError> {
        let unknown = |column: &FieldName| StoreError::UnknownColumn {
            table: config.table.to_string(),
            column: column.to_string(),
        };

        if !columns.contains(&config.key_column) {
            return Err(unknown(&config.key_column));
        }

        let selected = if config.fields.is_empty() {
            columns.clone()
        } else {
            let mut selected = Vec::with_capacity(config.fields.len());
            for field in &config.fields {
                if !columns.contains(field) {
                    return Err(unknown(field));
                }
                selected.push(field.clone());
            }
            selected
        };

        Ok(Self {
            table: config.table.clone(),
            key_column: config.key_column.clone(),
            columns,
            selected,
        })
    }

    /// Table name
    #[inline]
    #[must_use]
    pub fn table(&self) -> &FieldName {
        &self.table
    }

    /// Key column
    #[inline]
    #[must_use]
    pub fn key_column(&self) -> &FieldName {
        &self.key_column
    }

    /// All columns of the table
    #[inline]
    #[must_use]
    pub fn columns(&self) -> &[FieldName] {
        &self.columns
    }

    /// Columns returned by lookups, in order
    #[inline]
    #[must_use]
    pub fn selected(&self) -> &[FieldName] {
        &self.selected
    }

    /// Point lookup; `?1` binds the incident number
    #[must_use]
    pub fn select_sql(&self) -> String {
        let list = self
            .selected
            .iter()
            .map(FieldName::quoted)
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "SELECT {} FROM {} WHERE {} = ?1",
            list,
            self.table.quoted(),
            self.key_column.quoted()
        )
    }

    /// Field-subset update; `?1` binds the incident number, `?2..` the
    /// values in update order
    ///
    /// # Errors
    /// - `StoreError::EmptyUpdate` if there is nothing to set
    /// - `StoreError::UnknownColumn` if a field is not in the table
    pub fn update_sql(&self, update: &FieldUpdate) -> Result<String, StoreError> {
        if update.is_empty() {
            return Err(StoreError::EmptyUpdate);
        }

        let mut assignments = Vec::with_capacity(update.len());
        for (i, name) in update.names().enumerate() {
            if !self.columns.contains(name) {
                return Err(StoreError::UnknownColumn {
                    table: self.table.to_string(),
                    column: name.to_string(),
                });
            }
            assignments.push(format!("{} = ?{}", name.quoted(), i + 2));
        }

        Ok(format!(
            "UPDATE {} SET {} WHERE {} = ?1",
            self.table.quoted(),
            assignments.join(", "),
            self.key_column.quoted()
        ))
    }
}
