//! SQL validation and correction pipeline
//!
//! Best-effort heuristic validation: table and column references are pulled
//! out of the query text with regular expressions, not a SQL parser, so
//! joins, aliases, multi-column selects and statements without a FROM clause
//! slip through unchecked. That is an accepted limit of this demo.
//!
//! Pipeline over one candidate query: extract table -> check against live
//! tables -> extract columns -> check against the table's columns -> ask the
//! correction provider for a fixed query -> clean the reply. Any rejection
//! short-circuits; schema rejections never reach the correction provider.

use crate::error::Result;
use crate::llm::CorrectionProvider;
use crate::schema::SchemaSource;
use regex::Regex;
use tracing::{info, warn};

/// Leading keywords a cleaned statement is allowed to start with.
const SQL_KEYWORDS: &[&str] = &[
    "SELECT", "INSERT", "UPDATE", "DELETE", "CREATE", "ALTER", "DROP", "TRUNCATE",
];

/// Terminal result of validating one candidate query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    /// Cleaned, corrected SQL ready for execution
    Valid(String),
    /// Human-readable reason the query was rejected
    Rejected(String),
}

pub struct SqlValidator {
    from_table: Regex,
    select_column: Regex,
    code_fence: Regex,
}

impl SqlValidator {
    pub fn new() -> Self {
        Self {
            from_table: Regex::new(r"(?i)FROM\s+(\w+)").expect("valid FROM pattern"),
            select_column: Regex::new(r"(?i)SELECT\s+(?:SUM\((\w+)\)|(\w+))")
                .expect("valid SELECT pattern"),
            code_fence: Regex::new(r"(?i)```sql|```").expect("valid fence pattern"),
        }
    }

    /// First table name following a FROM keyword, if any.
    pub fn extract_table_name(&self, sql: &str) -> Option<String> {
        self.from_table
            .captures(sql)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    }

    /// Column references of the two recognized forms: `SUM(col)` or a bare
    /// identifier immediately after SELECT. Anything else is skipped.
    pub fn extract_column_refs(&self, sql: &str) -> Vec<String> {
        self.select_column
            .captures_iter(sql)
            .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)))
            .map(|m| m.as_str().to_string())
            .collect()
    }

    /// Strip formatting artifacts from a raw model reply.
    ///
    /// Removes Markdown code fences, drops any conversational preamble
    /// before the first SQL keyword, and unescapes backslash sequences the
    /// model sometimes emits around underscores and hyphens.
    pub fn clean_correction(&self, raw: &str) -> String {
        let cleaned = self.code_fence.replace_all(raw, "");
        let mut cleaned = cleaned.trim().to_string();

        // ASCII-only uppercase keeps byte offsets aligned with `cleaned`
        let upper = cleaned.to_ascii_uppercase();
        if let Some(start) = SQL_KEYWORDS.iter().filter_map(|kw| upper.find(kw)).min() {
            cleaned = cleaned[start..].to_string();
        }

        cleaned = cleaned.replace("\\_", "_").replace("\\-", "-");
        cleaned = cleaned.replace('\\', "");
        cleaned.trim().to_string()
    }

    /// Validate one query against the live schema and, if it passes, obtain
    /// a corrected version from the provider.
    ///
    /// Queries with no FROM match skip the schema checks and go straight to
    /// the correction step.
    pub async fn validate_and_correct(
        &self,
        sql: &str,
        schema: &dyn SchemaSource,
        corrector: &dyn CorrectionProvider,
    ) -> Result<ValidationOutcome> {
        let tables = schema.list_tables().await;
        info!("✅ Available tables: {}", format_name_list(&tables));

        if let Some(table_name) = self.extract_table_name(sql) {
            if !tables.contains(&table_name) {
                warn!("❌ Table '{}' does not exist in the database", table_name);
                return Ok(ValidationOutcome::Rejected(format!(
                    "Table '{}' not found. Available tables: {}",
                    table_name,
                    format_name_list(&tables)
                )));
            }

            let columns = schema.list_columns(&table_name).await;
            info!("✅ Columns in {}: {}", table_name, format_name_list(&columns));

            for col in self.extract_column_refs(sql) {
                if col != "*" && !columns.contains(&col) {
                    warn!(
                        "❌ Column '{}' does not exist in table '{}'",
                        col, table_name
                    );
                    return Ok(ValidationOutcome::Rejected(format!(
                        "Column '{}' not found in table '{}'. Available columns: {}",
                        col,
                        table_name,
                        format_name_list(&columns)
                    )));
                }
            }
        }

        let corrected = corrector.correct_sql(sql).await?;
        if corrected.is_empty() {
            return Ok(ValidationOutcome::Rejected(
                "The corrected SQL query is empty.".to_string(),
            ));
        }

        Ok(ValidationOutcome::Valid(self.clean_correction(&corrected)))
    }
}

impl Default for SqlValidator {
    fn default() -> Self {
        Self::new()
    }
}

/// Render a name list the way the rejection messages expect: `['a', 'b']`.
pub fn format_name_list(names: &[String]) -> String {
    let quoted: Vec<String> = names.iter().map(|n| format!("'{}'", n)).collect();
    format!("[{}]", quoted.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_table_after_from() {
        let v = SqlValidator::new();
        assert_eq!(
            v.extract_table_name("SELECT * FROM orders WHERE id = 1"),
            Some("orders".to_string())
        );
        assert_eq!(
            v.extract_table_name("select sum(amount) from Orders;"),
            Some("Orders".to_string())
        );
    }

    #[test]
    fn test_extract_table_no_from() {
        let v = SqlValidator::new();
        assert_eq!(v.extract_table_name("TRUNCATE TABLE orders"), None);
    }

    #[test]
    fn test_extract_sum_column() {
        let v = SqlValidator::new();
        assert_eq!(
            v.extract_column_refs("SELECT SUM(amount) AS total_amount FROM orders;"),
            vec!["amount".to_string()]
        );
    }

    #[test]
    fn test_extract_bare_column() {
        let v = SqlValidator::new();
        assert_eq!(
            v.extract_column_refs("SELECT amount FROM orders"),
            vec!["amount".to_string()]
        );
    }

    #[test]
    fn test_star_yields_no_column_refs() {
        let v = SqlValidator::new();
        assert!(v.extract_column_refs("SELECT * FROM orders").is_empty());
    }

    #[test]
    fn test_clean_strips_code_fences() {
        let v = SqlValidator::new();
        let cleaned = v.clean_correction("```sql\nSELECT SUM(amount) AS total FROM orders;\n```");
        assert_eq!(cleaned, "SELECT SUM(amount) AS total FROM orders;");
        assert!(!cleaned.contains("```"));
    }

    #[test]
    fn test_clean_drops_preamble_before_keyword() {
        let v = SqlValidator::new();
        let cleaned =
            v.clean_correction("Here is the corrected query: SELECT amount FROM orders;");
        assert_eq!(cleaned, "SELECT amount FROM orders;");
    }

    #[test]
    fn test_clean_starts_at_earliest_keyword() {
        let v = SqlValidator::new();
        let cleaned = v.clean_correction("Sure! UPDATE orders SET amount = 5;");
        assert_eq!(cleaned, "UPDATE orders SET amount = 5;");
    }

    #[test]
    fn test_clean_strips_escape_sequences() {
        let v = SqlValidator::new();
        let cleaned = v.clean_correction("SELECT total\\_amount FROM order\\-history;");
        assert_eq!(cleaned, "SELECT total_amount FROM order-history;");
    }

    #[test]
    fn test_clean_is_idempotent() {
        let v = SqlValidator::new();
        let once = v.clean_correction("```sql\nSELECT sum(amount) FROM orders;\n```");
        let twice = v.clean_correction(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_format_name_list() {
        assert_eq!(
            format_name_list(&["orders".to_string(), "customers".to_string()]),
            "['orders', 'customers']"
        );
        assert_eq!(format_name_list(&[]), "[]");
    }
}
