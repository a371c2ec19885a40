use rollcall_backend::cache::SnapshotCache;
use rollcall_backend::config::Config;
use rollcall_backend::create_app;
use rollcall_backend::fetch::HttpFetcher;
use rollcall_backend::refresh::Refresher;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Notify;

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize tracing for structured logging
    #[cfg(debug_assertions)]
    let log_level = tracing::Level::DEBUG;
    #[cfg(not(debug_assertions))]
    let log_level = tracing::Level::INFO;

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .compact()
        .init();
    tracing::info!("Starting rollcall backend server...");

    let config = Config::from_env();
    let Some(data_url) = config.data_url.clone() else {
        tracing::error!("DATA_URL is not set");
        return ExitCode::FAILURE;
    };
    tracing::info!(
        "Configuration: port={}, auto_refresh={}, wait_after_update={}s, wait_between_refreshes={}s, poll={}s, timeout={}s",
        config.port,
        config.auto_refresh,
        config.wait_after_update.as_secs(),
        config.wait_between_refreshes.as_secs(),
        config.poll_interval.as_secs(),
        config.request_timeout.as_secs()
    );

    let fetcher = match HttpFetcher::new(data_url, config.fetch_timeout) {
        Ok(fetcher) => fetcher,
        Err(e) => {
            tracing::error!("Failed to build HTTP client: {}", e);
            return ExitCode::FAILURE;
        }
    };
    tracing::info!("Snapshot source: {}", fetcher.url());

    let cache = SnapshotCache::new();
    let refresh_requests = Arc::new(Notify::new());
    let refresher = Arc::new(Refresher::new(
        fetcher,
        cache.clone(),
        config.refresh_settings(),
    ));

    let app = create_app(cache, Arc::clone(&refresh_requests), config.request_timeout);
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Failed to bind {}: {}", addr, e);
            return ExitCode::FAILURE;
        }
    };
    tracing::info!("Server listening on {}", addr);

    tokio::select! {
        result = axum::serve(listener, app) => {
            if let Err(e) = result {
                tracing::error!("Axum server error: {}", e);
                return ExitCode::FAILURE;
            }
        }
        _ = refresher.run(refresh_requests) => {}
    }

    ExitCode::SUCCESS
}
