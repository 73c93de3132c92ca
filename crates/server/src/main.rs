use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use cafe_trivia_core::infra::random::MutexRng;
use cafe_trivia_server::app_state::AppState;
use cafe_trivia_server::auth::TokenVerifier;
use cafe_trivia_server::config::{AppMode, ConfigError, ServerConfig};
use cafe_trivia_server::{db, logging, router, schema};

#[tokio::main]
async fn main() -> Result<(), ConfigError> {
    let config_path = std::env::var("SERVER_CONFIG_PATH")
        .unwrap_or_else(|_| "crates/server/res/config.toml".to_string());
    let config_path = Path::new(&config_path);

    let config = ServerConfig::load(config_path).await?;
    logging::init_tracing(&config)?;

    tracing::info!(mode = ?config.app.mode, "server mode configured");
    tracing::info!(host = %config.http.host, port = config.http.port, "server http bind");

    let database = db::connect_db(&config, config_path).await?;
    let dev = config.app.mode == AppMode::Dev;

    if dev && config.dev.reset_on_start {
        db::reset_server_data(&database).await?;
    }
    schema::apply_server_schema(&database).await?;

    let store = database.store();
    if dev && config.dev.seed_demo_data {
        db::seed_demo_data(store.as_ref()).await?;
    }

    let base_dir = config_path.parent().unwrap_or_else(|| Path::new("."));
    let verifier = TokenVerifier::from_config(&config.auth, base_dir).await?;
    tracing::info!(algorithm = ?config.auth.algorithm, "token verifier ready");

    let state = AppState {
        store,
        rng: Arc::new(MutexRng::new()),
        verifier: Arc::new(verifier),
        questions_per_page: config.trivia.questions_per_page,
        allowed_origins: config.cors.allowed_origins.clone(),
    };

    let addr: SocketAddr = format!("{}:{}", config.http.host, config.http.port)
        .parse()
        .map_err(|e| ConfigError::Invalid(format!("invalid http bind: {e}")))?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "listening");
    axum::serve(listener, router(state))
        .await
        .map_err(|e| ConfigError::Invalid(format!("http server error: {e}")))?;

    Ok(())
}
