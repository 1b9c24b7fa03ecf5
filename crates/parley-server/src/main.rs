use std::sync::Arc;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use parley_api::auth::{AppState, AppStateInner};
use parley_api::chat_router;
use parley_api::completion::OpenAiCompletions;
use parley_auth::{AuthService, PasswordHasher, TokenIssuer};
use parley_db::Database;
use parley_server::config::ServerConfig;
use parley_server::{init_tracing, shutdown_signal};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    init_tracing("parley=debug,parley_api=debug,tower_http=debug");

    let config = ServerConfig::from_env()?;

    // Init database
    let db = Arc::new(Database::open(&config.db_path)?);

    let auth = AuthService::new(
        db,
        PasswordHasher::default(),
        TokenIssuer::new(&config.jwt_secret),
        config.token_ttl,
    );
    let completions = Arc::new(OpenAiCompletions::new(config.completions.clone())?);
    info!(
        "Forwarding completions to {} (model {}, timeout {:?})",
        config.completions.url, config.completions.model, config.completions.timeout
    );

    let state: AppState = Arc::new(AppStateInner { auth, completions });

    let app = chat_router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    info!("Parley server listening on {}", config.addr);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
