use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use cafe_trivia_core::domain::drink::{Ingredient, NewDrink};
use cafe_trivia_core::domain::question::NewQuestion;
use cafe_trivia_core::ports::store::{Store, StoreError};
use sqlx::postgres::PgPoolOptions;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{PgPool, SqlitePool};

use crate::config::{validate_schema_name, ConfigError, ServerConfig, SqlDialect};
use crate::store::postgres::PostgresStore;
use crate::store::sqlite::SqliteStore;

/// A connected pool, before it is wrapped into a [`Store`].
pub enum Database {
    Sqlite(SqlitePool),
    Postgres { pool: PgPool, schema: String },
}

impl Database {
    pub fn dialect(&self) -> SqlDialect {
        match self {
            Database::Sqlite(_) => SqlDialect::Sqlite,
            Database::Postgres { .. } => SqlDialect::Postgres,
        }
    }

    pub fn store(&self) -> Arc<dyn Store> {
        match self {
            Database::Sqlite(pool) => Arc::new(SqliteStore::new(pool.clone())),
            Database::Postgres { pool, .. } => Arc::new(PostgresStore::new(pool.clone())),
        }
    }
}

pub async fn connect_db(config: &ServerConfig, config_path: &Path) -> Result<Database, ConfigError> {
    match config.dialect()? {
        SqlDialect::Sqlite => {
            let base_dir = config_path
                .parent()
                .ok_or_else(|| ConfigError::Invalid("config path has no parent".into()))?;
            let path = config.sqlite_path(base_dir);
            let url = format!("sqlite://{}", path.display());

            let opts = SqliteConnectOptions::from_str(&url)
                .map_err(|e| ConfigError::Invalid(format!("sqlite options error: {e}")))?
                .create_if_missing(true)
                .busy_timeout(Duration::from_secs(5))
                .foreign_keys(true);

            let pool = SqlitePoolOptions::new()
                .max_connections(10)
                .connect_with(opts)
                .await
                .map_err(|e| ConfigError::Invalid(format!("sqlite connect failed: {e}")))?;

            tracing::info!(path = %path.display(), "sqlite connected");
            Ok(Database::Sqlite(pool))
        }
        SqlDialect::Postgres => {
            let pg = config
                .postgres
                .as_ref()
                .ok_or_else(|| ConfigError::Invalid("postgres section missing".into()))?;
            let schema = validate_schema_name(&pg.schema)?;

            let url = format!(
                "postgres://{}:{}@{}:{}/{}?sslmode={}",
                pg.user, pg.password, pg.host, pg.port, pg.database, pg.ssl_mode
            );

            let pool = PgPoolOptions::new()
                .max_connections(10)
                .after_connect(set_search_path(schema.clone()))
                .connect(&url)
                .await
                .map_err(|e| ConfigError::Invalid(format!("postgres connect failed: {e}")))?;

            tracing::info!(host = %pg.host, database = %pg.database, schema = %schema, "postgres connected");
            Ok(Database::Postgres { pool, schema })
        }
    }
}

/// Private in-memory SQLite database. One connection, never recycled,
/// since every new connection would open an empty database.
pub async fn connect_sqlite_memory() -> Result<Database, ConfigError> {
    let opts = SqliteConnectOptions::from_str("sqlite::memory:")
        .map_err(|e| ConfigError::Invalid(format!("sqlite options error: {e}")))?
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(opts)
        .await
        .map_err(|e| ConfigError::Invalid(format!("sqlite connect failed: {e}")))?;

    Ok(Database::Sqlite(pool))
}

/// Drops every table so the next schema apply starts from scratch.
pub async fn reset_server_data(db: &Database) -> Result<(), ConfigError> {
    let tables = ["drinks", "questions", "categories"];

    match db {
        Database::Sqlite(pool) => {
            for table in tables {
                sqlx::query(&format!("DROP TABLE IF EXISTS {}", quote_ident(table)))
                    .execute(pool)
                    .await
                    .map_err(|e| ConfigError::Invalid(format!("drop {table} failed: {e}")))?;
            }
        }
        Database::Postgres { pool, schema } => {
            let table_list = tables
                .iter()
                .map(|t| format!("{}.{}", quote_ident(schema), quote_ident(t)))
                .collect::<Vec<_>>()
                .join(", ");
            sqlx::query(&format!("DROP TABLE IF EXISTS {table_list} CASCADE"))
                .execute(pool)
                .await
                .map_err(|e| ConfigError::Invalid(format!("drop tables failed: {e}")))?;
        }
    }

    tracing::warn!("dev reset: all tables dropped");
    Ok(())
}

/// Inserts the starter drink and a handful of questions into empty tables.
pub async fn seed_demo_data(store: &dyn Store) -> Result<(), ConfigError> {
    let seed_err = |e: StoreError| ConfigError::Invalid(format!("seed failed: {e}"));

    if store.drinks().await.map_err(seed_err)?.is_empty() {
        let water = NewDrink::new(
            "water",
            vec![Ingredient {
                color: "blue".into(),
                name: "water".into(),
                parts: 1,
            }],
        )
        .map_err(|e| ConfigError::Invalid(format!("seed drink invalid: {e}")))?;
        store.insert_drink(&water).await.map_err(seed_err)?;
        tracing::info!("demo drink seeded");
    }

    if store.questions().await.map_err(seed_err)?.is_empty() {
        let samples = [
            ("What is the heaviest organ in the human body?", "The Liver", 1, 4),
            ("Which Dutch graphic artist is known for impossible constructions?", "Escher", 2, 1),
            ("What is the largest lake in Africa?", "Lake Victoria", 3, 2),
            ("Whose autobiography is entitled 'I Know Why the Caged Bird Sings'?", "Maya Angelou", 4, 2),
            ("What movie earned Tom Hanks his third straight Oscar nomination, in 1996?", "Apollo 13", 5, 4),
            ("Which country won the first ever soccer World Cup in 1930?", "Uruguay", 6, 4),
        ];
        for (question, answer, category, difficulty) in samples {
            let q = NewQuestion::new(question, answer, category, difficulty)
                .map_err(|e| ConfigError::Invalid(format!("seed question invalid: {e}")))?;
            store.insert_question(&q).await.map_err(seed_err)?;
        }
        tracing::info!(count = samples.len(), "demo questions seeded");
    }

    Ok(())
}

#[allow(clippy::type_complexity)]
pub fn set_search_path(
    schema: String,
) -> impl Fn(
    &mut sqlx::PgConnection,
    sqlx::pool::PoolConnectionMetadata,
) -> std::pin::Pin<
    Box<dyn std::future::Future<Output = Result<(), sqlx::Error>> + Send + '_>,
> {
    move |conn, _meta| {
        let schema_copy = schema.clone();
        Box::pin(async move {
            let schema_ident = quote_ident(&schema_copy);
            sqlx::query(&format!("CREATE SCHEMA IF NOT EXISTS {schema_ident}"))
                .execute(&mut *conn)
                .await?;
            sqlx::query(&format!("SET search_path TO {schema_ident}"))
                .execute(&mut *conn)
                .await?;
            Ok(())
        })
    }
}

pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
