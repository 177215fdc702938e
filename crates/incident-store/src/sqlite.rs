//! SQLite-backed incident store

use crate::error::StoreError;
use crate::pool::{ConnectionPool, PoolStats};
use crate::schema::TableSchema;
use crate::store::IncidentStore;
use async_trait::async_trait;
use incident_core::{DatabaseConfig, FieldName, FieldUpdate, FieldValue, Incident, IncidentNumber};
use rusqlite::types::{Value, ValueRef};
use rusqlite::{Connection, OptionalExtension, Row};
use std::sync::Arc;

/// Incident store over a pooled SQLite database
#[derive(Debug, Clone)]
pub struct SqliteIncidentStore {
    pool: ConnectionPool,
    schema: Arc<TableSchema>,
}

impl SqliteIncidentStore {
    /// Open the pool and validate configuration against the table schema
    ///
    /// # Errors
    /// - `StoreError::Sql` if the database cannot be opened
    /// - `StoreError::TableNotFound` / `StoreError::UnknownColumn` if the
    ///   configured identifiers do not match the table
    pub async fn open(config: &DatabaseConfig) -> Result<Self, StoreError> {
        let pool = ConnectionPool::open(&config.path, config.pool_max)?;

        let schema_config = config.clone();
        let schema = pool
            .with_connection(move |conn| TableSchema::introspect(conn, &schema_config))
            .await?;

        tracing::info!(
            "Incident table {} ready: key {}, {} of {} columns selected",
            schema.table(),
            schema.key_column(),
            schema.selected().len(),
            schema.columns().len()
        );

        Ok(Self {
            pool,
            schema: Arc::new(schema),
        })
    }

    /// Validated table schema
    #[inline]
    #[must_use]
    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    /// Connection pool statistics
    #[inline]
    #[must_use]
    pub fn pool_stats(&self) -> PoolStats {
        self.pool.stats()
    }
}

#[async_trait]
impl IncidentStore for SqliteIncidentStore {
    async fn fetch_by_key(&self, key: &IncidentNumber) -> Result<Option<Incident>, StoreError> {
        let schema = Arc::clone(&self.schema);
        let key = key.clone();
        self.pool
            .with_connection(move |conn| read_incident(conn, &schema, &key))
            .await
    }

    async fn update_fields(
        &self,
        key: &IncidentNumber,
        fields: &FieldUpdate,
    ) -> Result<Option<Incident>, StoreError> {
        let schema = Arc::clone(&self.schema);
        let key = key.clone();
        let fields = fields.clone();
        self.pool
            .with_connection(move |conn| {
                let sql = schema.update_sql(&fields)?;

                let mut params = Vec::with_capacity(fields.len() + 1);
                params.push(Value::Text(key.as_str().to_string()));
                params.extend(fields.iter().map(|(_, value)| to_sql_value(value)));

                let changed = conn.execute(&sql, rusqlite::params_from_iter(params.iter()))?;
                tracing::debug!("Updated {} row(s) for incident {}", changed, key);

                read_incident(conn, &schema, &key)
            })
            .await
    }
}

fn read_incident(
    conn: &Connection,
    schema: &TableSchema,
    key: &IncidentNumber,
) -> Result<Option<Incident>, StoreError> {
    let mut stmt = conn.prepare_cached(&schema.select_sql())?;
    let incident = stmt
        .query_row([key.as_str()], |row| incident_from_row(row, schema.selected()))
        .optional()?;
    Ok(incident)
}

fn incident_from_row(row: &Row<'_>, columns: &[FieldName]) -> rusqlite::Result<Incident> {
    let mut incident = Incident::new();
    for (i, name) in columns.iter().enumerate() {
        let value = match row.get_ref(i)? {
            ValueRef::Null => FieldValue::Null,
            ValueRef::Integer(v) => FieldValue::Integer(v),
            ValueRef::Real(v) => FieldValue::Real(v),
            ValueRef::Text(bytes) => FieldValue::Text(String::from_utf8_lossy(bytes).into_owned()),
            ValueRef::Blob(bytes) => FieldValue::Text(hex::encode(bytes)),
        };
        incident.insert(name.as_str(), value);
    }
    Ok(incident)
}

fn to_sql_value(value: &FieldValue) -> Value {
    match value {
        FieldValue::Null => Value::Null,
        FieldValue::Integer(v) => Value::Integer(*v),
        FieldValue::Real(v) => Value::Real(*v),
        FieldValue::Text(v) => Value::Text(v.clone()),
    }
}
