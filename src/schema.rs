//! Schema inspector for PostgreSQL
//!
//! Answers "which tables exist?" and "which columns does this table have?"
//! from information_schema. Lookup failures are non-fatal: they are logged
//! and degrade to an empty list, which callers treat as "no tables known".

use crate::error::SqlFixError;
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::warn;

/// A table name plus its column names, in ordinal order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    pub name: String,
    pub columns: Vec<String>,
}

/// Source of live schema information.
///
/// The validator only needs table and column name lists, so this seam lets
/// tests run against an in-memory fixture instead of a database.
#[async_trait]
pub trait SchemaSource {
    async fn list_tables(&self) -> Vec<String>;
    async fn list_columns(&self, table_name: &str) -> Vec<String>;
}

pub struct SchemaInspector {
    pool: PgPool,
}

impl SchemaInspector {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SchemaSource for SchemaInspector {
    /// List user tables in the public schema.
    async fn list_tables(&self) -> Vec<String> {
        let result = sqlx::query_scalar::<_, String>(
            "SELECT table_name FROM information_schema.tables WHERE table_schema = 'public'",
        )
        .fetch_all(&self.pool)
        .await;

        match result {
            Ok(tables) => tables,
            Err(e) => {
                warn!("❌ {}", SqlFixError::SchemaQuery(e.to_string()));
                Vec::new()
            }
        }
    }

    /// List column names for one table, bound as a query parameter.
    async fn list_columns(&self, table_name: &str) -> Vec<String> {
        let result = sqlx::query_scalar::<_, String>(
            "SELECT column_name FROM information_schema.columns \
             WHERE table_name = $1 ORDER BY ordinal_position",
        )
        .bind(table_name)
        .fetch_all(&self.pool)
        .await;

        match result {
            Ok(columns) => columns,
            Err(e) => {
                warn!(
                    "❌ {}",
                    SqlFixError::SchemaQuery(format!("columns of {}: {}", table_name, e))
                );
                Vec::new()
            }
        }
    }
}
