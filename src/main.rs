//! One-shot demonstration run: connect, introspect, correct, execute.

use anyhow::Result;
use sqlfix::config::Config;
use sqlfix::error::SqlFixError;
use sqlfix::executor::SqlExecutor;
use sqlfix::llm::LlmClient;
use sqlfix::schema::{SchemaInspector, SchemaSource};
use sqlfix::validator::{SqlValidator, ValidationOutcome};
use sqlx::postgres::PgPoolOptions;
use tracing::info;

/// Catalog query used when the database has no user tables to sample.
const FALLBACK_QUERY: &str = "SELECT * FROM information_schema.tables LIMIT 5;";

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            println!("❌ {}", e);
            return Ok(());
        }
    };
    println!("✅ Groq API key loaded successfully!");

    let llm = LlmClient::new(&config);

    // One informational call; a failure here aborts the run early.
    match llm.list_models().await {
        Ok(models) => {
            println!("\n✅ Available Models:");
            for model in &models {
                println!("  - {}", model);
            }
        }
        Err(e) => {
            println!("\n❌ Error fetching models: {}", e);
            return Ok(());
        }
    }

    let pool = match PgPoolOptions::new()
        .max_connections(1)
        .connect(&config.database_url)
        .await
    {
        Ok(pool) => pool,
        Err(e) => {
            println!("❌ {}", SqlFixError::Connection(e.to_string()));
            return Ok(());
        }
    };
    info!("Connected to PostgreSQL");

    let inspector = SchemaInspector::new(pool.clone());
    let tables = inspector.list_tables().await;

    let sample_sql = build_sample_query(&inspector, &tables).await;
    println!("\n✅ Sample query based on your database: {}", sample_sql);

    let validator = SqlValidator::new();
    match validator
        .validate_and_correct(&sample_sql, &inspector, &llm)
        .await?
    {
        ValidationOutcome::Rejected(message) => {
            println!("\n❌ {}", SqlFixError::Validation(message));
        }
        ValidationOutcome::Valid(corrected) => {
            println!("\n✅ Corrected SQL Query:\n{}", corrected);

            let executor = SqlExecutor::new(pool.clone());
            match executor.run(&corrected).await {
                Ok(result) => println!("\n✅ Query Result:\n{}", result),
                // Execution failures are reported, not fatal; the
                // transaction was already rolled back.
                Err(e) => println!("\n❌ {}", e),
            }
        }
    }

    pool.close().await;
    Ok(())
}

/// Build a fixed-shape sample query from the first table and column the
/// schema offers, falling back to a catalog query when there is nothing to
/// sample.
async fn build_sample_query(inspector: &SchemaInspector, tables: &[String]) -> String {
    let Some(table) = tables.first() else {
        return FALLBACK_QUERY.to_string();
    };

    let columns = inspector.list_columns(table).await;
    match columns.first() {
        Some(column) => format!("SELECT SUM({0}) AS total_{0} FROM {1};", column, table),
        None => FALLBACK_QUERY.to_string(),
    }
}
