use std::time::Duration;

use tokio::sync::mpsc;
use tracing::info;

use parley_client::{HttpMessageSource, Poller, RenderedFeed};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "parley_client=info".into()),
        )
        .init();

    let base_url =
        std::env::var("PARLEY_WATCH_URL").unwrap_or_else(|_| "http://127.0.0.1:8000".into());
    let interval_ms: u64 = std::env::var("PARLEY_WATCH_INTERVAL_MS")
        .unwrap_or_else(|_| "1000".into())
        .parse()?;
    let period = Duration::from_millis(interval_ms);

    let source = HttpMessageSource::new(&base_url, period.max(Duration::from_secs(1)))?;
    let (tx, mut rx) = mpsc::unbounded_channel();
    let handle = Poller::new(source, RenderedFeed::new())
        .with_updates(tx)
        .spawn(period);

    info!("Watching {} every {} ms", base_url, interval_ms);

    loop {
        tokio::select! {
            Some(message) = rx.recv() => println!("{}", message.to_html()),
            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down...");
                break;
            }
        }
    }

    handle.stop().await;
    Ok(())
}
