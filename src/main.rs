use anyhow::{Context, Result};
use hnbest::api;
use hnbest::config::Config;
use hnbest::error::RefreshError;
use hnbest::refresher::Refresher;
use hnbest::snapshot_store::SnapshotStore;
use hnbest::story_fetcher::FirebaseStoryFetcher;
use std::future::IntoFuture;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinError;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::from_env()?;
    info!(
        base_url = %config.base_url,
        refresh_minutes = config.refresh_interval.as_secs() / 60,
        max_concurrent_fetches = config.max_concurrent_fetches,
        "Starting hnbest"
    );

    let store = Arc::new(SnapshotStore::new());
    let fetcher = FirebaseStoryFetcher::new(&config.base_url);
    let refresher = Refresher::new(fetcher, Arc::clone(&store), &config);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let mut refresh_task = tokio::spawn(refresher.run(shutdown_rx));

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    info!(addr = %config.bind_addr, "Listening");

    tokio::select! {
        result = axum::serve(listener, api::router(store)).into_future() => {
            result.context("HTTP server terminated")?;
        }
        result = &mut refresh_task => {
            // The refresh loop only ends on its own when something fatal
            // escaped a cycle.
            return refresh_exit(result);
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
        }
    }

    let _ = shutdown_tx.send(true);
    refresh_exit(refresh_task.await)
}

fn refresh_exit(result: Result<Result<(), RefreshError>, JoinError>) -> Result<()> {
    match result {
        Ok(Ok(())) => {
            info!("Refresh loop stopped");
            Ok(())
        }
        Ok(Err(e)) => {
            error!(error = %e, "Refresh loop failed; no further snapshots will be published");
            Err(e.into())
        }
        Err(e) => Err(anyhow::anyhow!("refresh task panicked: {e}")),
    }
}
