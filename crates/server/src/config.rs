use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("config invalid: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppMode {
    Dev,
    Prod,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlDialect {
    Sqlite,
    Postgres,
}

#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    pub app: AppConfig,
    pub http: HttpConfig,
    pub database: DatabaseConfig,
    pub sqlite: SqliteConfig,
    pub postgres: Option<PostgresConfig>,
    pub logging: LoggingConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub cors: CorsConfig,
    #[serde(default)]
    pub trivia: TriviaConfig,
    #[serde(default)]
    pub dev: DevConfig,
}

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    pub mode: AppMode,
}

#[derive(Debug, Deserialize)]
pub struct HttpConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
pub struct DatabaseConfig {
    pub dialect: String,
}

#[derive(Debug, Deserialize)]
pub struct SqliteConfig {
    pub path: String,
}

#[derive(Debug, Deserialize)]
pub struct PostgresConfig {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    pub password: String,
    pub ssl_mode: String,
    pub schema: String,
}

#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    pub level: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum JwtAlgorithm {
    HS256,
    RS256,
}

#[derive(Debug, Deserialize)]
pub struct AuthConfig {
    pub algorithm: JwtAlgorithm,
    pub audience: String,
    pub issuer: String,
    pub secret: Option<String>,
    pub jwks_url: Option<String>,
    pub jwks_path: Option<String>,
    #[serde(default)]
    pub leeway_seconds: u64,
}

#[derive(Debug, Deserialize)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["*".to_string()],
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct TriviaConfig {
    pub questions_per_page: usize,
}

impl Default for TriviaConfig {
    fn default() -> Self {
        Self {
            questions_per_page: cafe_trivia_core::domain::pagination::DEFAULT_PAGE_SIZE,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct DevConfig {
    #[serde(default)]
    pub reset_on_start: bool,
    #[serde(default)]
    pub seed_demo_data: bool,
}

impl ServerConfig {
    pub async fn load(path: &Path) -> Result<Self, ConfigError> {
        let base_dir = path
            .parent()
            .ok_or_else(|| ConfigError::Invalid("config path has no parent".into()))?;

        let schema_path = base_dir.join("schemas").join("server.schema.json");
        let schema = load_schema(&schema_path).await?;
        let content = tokio::fs::read_to_string(path).await?;

        Self::parse(&schema, &content, &path.display().to_string())
    }

    /// Validates `content` against the JSON schema, then deserializes it.
    pub fn parse(schema: &str, content: &str, name: &str) -> Result<Self, ConfigError> {
        validate_toml(schema, content, name)?;
        let config: ServerConfig = toml::from_str(content)?;
        config.check_auth()?;
        Ok(config)
    }

    pub fn dialect(&self) -> Result<SqlDialect, ConfigError> {
        match self.database.dialect.trim().to_lowercase().as_str() {
            "sqlite" => Ok(SqlDialect::Sqlite),
            "postgres" => Ok(SqlDialect::Postgres),
            other => Err(ConfigError::Invalid(format!(
                "invalid database.dialect '{other}'"
            ))),
        }
    }

    pub fn sqlite_path(&self, base_dir: &Path) -> PathBuf {
        let raw = self.sqlite.path.trim();
        if raw.is_empty() {
            return base_dir.join("server.sqlite");
        }
        base_dir.join(raw)
    }

    fn check_auth(&self) -> Result<(), ConfigError> {
        match self.auth.algorithm {
            JwtAlgorithm::HS256 => {
                if self.auth.secret.as_deref().map_or(true, |s| s.trim().is_empty()) {
                    return Err(ConfigError::Invalid(
                        "auth.secret is required for HS256".into(),
                    ));
                }
            }
            JwtAlgorithm::RS256 => {
                if self.auth.jwks_url.is_none() && self.auth.jwks_path.is_none() {
                    return Err(ConfigError::Invalid(
                        "auth.jwks_url or auth.jwks_path is required for RS256".into(),
                    ));
                }
            }
        }
        Ok(())
    }
}

async fn load_schema(path: &Path) -> Result<String, ConfigError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|_| ConfigError::Invalid(format!("schema not found at {}", path.display())))
}

fn validate_toml(schema: &str, toml_input: &str, name: &str) -> Result<(), ConfigError> {
    let schema_json: serde_json::Value = serde_json::from_str(schema)
        .map_err(|e| ConfigError::Invalid(format!("schema parse error: {e}")))?;

    let compiled = jsonschema::validator_for(&schema_json)
        .map_err(|e| ConfigError::Invalid(format!("schema compile error: {e}")))?;

    let toml_value: toml::Value = toml::from_str(toml_input)
        .map_err(|e| ConfigError::Invalid(format!("{name}: {e}")))?;

    let json_value =
        serde_json::to_value(toml_value).map_err(|e| ConfigError::Invalid(e.to_string()))?;

    let mut errors = compiled.iter_errors(&json_value);
    if let Some(err) = errors.next() {
        let mut messages = vec![err.to_string()];
        for e in errors.take(4) {
            messages.push(e.to_string());
        }
        return Err(ConfigError::Invalid(format!(
            "schema validation failed for {name}: {}",
            messages.join("; ")
        )));
    }

    Ok(())
}

pub(crate) fn validate_schema_name(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid("postgres schema cannot be empty".into()));
    }
    if !trimmed.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(ConfigError::Invalid(format!(
            "invalid postgres schema '{trimmed}': only alphanumeric and '_' allowed"
        )));
    }
    Ok(trimmed.to_string())
}
