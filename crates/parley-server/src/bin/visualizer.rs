use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

use parley_api::feed::MessageFeed;
use parley_api::feed_router;
use parley_server::config::VisualizerConfig;
use parley_server::{init_tracing, shutdown_signal};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    init_tracing("parley_visualizer=debug,parley_api=debug,tower_http=debug");

    let config = VisualizerConfig::from_env()?;

    let mut app = feed_router(MessageFeed::new());
    if let Some(dir) = &config.static_dir {
        info!("Serving static files from {}", dir.display());
        app = app.fallback_service(ServeDir::new(dir));
    }

    let app = app
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    info!("Parley visualizer listening on {}", config.addr);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
