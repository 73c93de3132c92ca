use sqlx::{Pool, Postgres, Sqlite};

use crate::config::ConfigError;
use crate::db::Database;

const SQLITE_SCHEMA: &str = include_str!("../res/sql/sqlite/schema.sql");
const POSTGRES_SCHEMA: &str = include_str!("../res/sql/postgres/schema.sql");

/// Creates missing tables and seeds the fixed category list. Idempotent.
pub async fn apply_server_schema(db: &Database) -> Result<(), ConfigError> {
    match db {
        Database::Sqlite(pool) => execute_schema_sqlite(pool, SQLITE_SCHEMA).await?,
        Database::Postgres { pool, .. } => execute_schema_postgres(pool, POSTGRES_SCHEMA).await?,
    }
    tracing::info!(dialect = ?db.dialect(), "schema applied");
    Ok(())
}

async fn execute_schema_sqlite(pool: &Pool<Sqlite>, content: &str) -> Result<(), ConfigError> {
    for stmt in statements(content) {
        sqlx::query(stmt)
            .execute(pool)
            .await
            .map_err(|e| ConfigError::Invalid(format!("schema apply error: {e}")))?;
    }
    Ok(())
}

async fn execute_schema_postgres(pool: &Pool<Postgres>, content: &str) -> Result<(), ConfigError> {
    let mut tx = pool
        .begin()
        .await
        .map_err(|e| ConfigError::Invalid(format!("schema apply error: {e}")))?;
    for stmt in statements(content) {
        sqlx::query(stmt)
            .execute(&mut *tx)
            .await
            .map_err(|e| ConfigError::Invalid(format!("schema apply error: {e}")))?;
    }
    tx.commit()
        .await
        .map_err(|e| ConfigError::Invalid(format!("schema apply error: {e}")))?;
    Ok(())
}

fn statements(content: &str) -> impl Iterator<Item = &str> {
    content.split(';').map(str::trim).filter(|s| !s.is_empty())
}
