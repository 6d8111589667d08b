//! SQL execution against the live connection
//!
//! The final statement runs verbatim inside a single transaction: committed
//! on success, rolled back on any error. SELECT statements return their full
//! result set; everything else returns an affected-row summary.

use crate::error::{Result, SqlFixError};
use sqlx::postgres::PgRow;
use sqlx::{Column, PgPool, Row, TypeInfo};
use std::fmt;
use tracing::info;

/// Outcome of executing one statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionResult {
    /// Result set of a read query, values rendered as display strings
    Rows {
        columns: Vec<String>,
        rows: Vec<Vec<String>>,
    },
    /// Affected-row count of a write statement
    RowCount(u64),
}

impl fmt::Display for ExecutionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionResult::Rows { columns, rows } => {
                writeln!(f, "{}", columns.join(" | "))?;
                for row in rows {
                    writeln!(f, "({})", row.join(", "))?;
                }
                write!(f, "({} rows)", rows.len())
            }
            ExecutionResult::RowCount(n) => {
                write!(f, "Query executed successfully. Rows affected: {}", n)
            }
        }
    }
}

/// Whether a statement should be run through the row-fetching branch.
pub fn is_select(sql: &str) -> bool {
    sql.trim().to_ascii_uppercase().starts_with("SELECT")
}

pub struct SqlExecutor {
    pool: PgPool,
}

impl SqlExecutor {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Execute one statement verbatim.
    ///
    /// Commits on success. On failure the transaction is rolled back and the
    /// error is returned as `SqlFixError::Execution`; the driver reports it
    /// without aborting the process.
    pub async fn run(&self, sql: &str) -> Result<ExecutionResult> {
        info!("Executing query: {}", sql);

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| SqlFixError::Execution(e.to_string()))?;

        if is_select(sql) {
            match sqlx::query(sql).fetch_all(&mut *tx).await {
                Ok(rows) => {
                    tx.commit()
                        .await
                        .map_err(|e| SqlFixError::Execution(e.to_string()))?;
                    Ok(render_rows(&rows))
                }
                Err(e) => {
                    let _ = tx.rollback().await;
                    Err(SqlFixError::Execution(e.to_string()))
                }
            }
        } else {
            match sqlx::query(sql).execute(&mut *tx).await {
                Ok(done) => {
                    tx.commit()
                        .await
                        .map_err(|e| SqlFixError::Execution(e.to_string()))?;
                    Ok(ExecutionResult::RowCount(done.rows_affected()))
                }
                Err(e) => {
                    let _ = tx.rollback().await;
                    Err(SqlFixError::Execution(e.to_string()))
                }
            }
        }
    }
}

fn render_rows(rows: &[PgRow]) -> ExecutionResult {
    let columns: Vec<String> = rows
        .first()
        .map(|row| row.columns().iter().map(|c| c.name().to_string()).collect())
        .unwrap_or_default();

    let rendered = rows
        .iter()
        .map(|row| (0..row.len()).map(|i| render_value(row, i)).collect())
        .collect();

    ExecutionResult::Rows {
        columns,
        rows: rendered,
    }
}

/// Render one cell as a display string, dispatching on the Postgres type
/// name. NULL renders as `NULL`; types outside the demo's reach render as a
/// `<type>` placeholder instead of failing the whole result set.
fn render_value(row: &PgRow, idx: usize) -> String {
    let type_name = row.columns()[idx].type_info().name().to_string();
    match type_name.as_str() {
        "INT2" => display_opt(row.try_get::<Option<i16>, _>(idx)),
        "INT4" => display_opt(row.try_get::<Option<i32>, _>(idx)),
        "INT8" => display_opt(row.try_get::<Option<i64>, _>(idx)),
        "FLOAT4" => display_opt(row.try_get::<Option<f32>, _>(idx)),
        "FLOAT8" => display_opt(row.try_get::<Option<f64>, _>(idx)),
        "NUMERIC" => display_opt(row.try_get::<Option<sqlx::types::Decimal>, _>(idx)),
        "BOOL" => display_opt(row.try_get::<Option<bool>, _>(idx)),
        "TEXT" | "VARCHAR" | "CHAR" | "BPCHAR" | "NAME" => {
            display_opt(row.try_get::<Option<String>, _>(idx))
        }
        other => format!("<{}>", other.to_lowercase()),
    }
}

fn display_opt<T: fmt::Display>(value: sqlx::Result<Option<T>>) -> String {
    match value {
        Ok(Some(v)) => v.to_string(),
        Ok(None) => "NULL".to_string(),
        Err(e) => format!("<decode error: {}>", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_select_trims_and_ignores_case() {
        assert!(is_select("  select * from orders"));
        assert!(is_select("SELECT 1"));
        assert!(!is_select("UPDATE orders SET amount = 0"));
        assert!(!is_select("  insert into orders values (1)"));
    }

    #[test]
    fn test_row_count_summary_format() {
        let result = ExecutionResult::RowCount(3);
        assert_eq!(
            result.to_string(),
            "Query executed successfully. Rows affected: 3"
        );
    }

    #[test]
    fn test_rows_display_includes_header_and_count() {
        let result = ExecutionResult::Rows {
            columns: vec!["total".to_string()],
            rows: vec![vec!["42".to_string()]],
        };
        let text = result.to_string();
        assert!(text.starts_with("total"));
        assert!(text.contains("(42)"));
        assert!(text.ends_with("(1 rows)"));
    }
}
