use std::process::ExitCode;
use std::sync::Arc;

use status_server::backends::{BackendRegistry, ExecutorConfig, RequestExecutor};
use status_server::cache::{CacheConfig, CachedStatusClient};
use status_server::config::AppConfig;
use status_server::ntes::{NtesClient, NtesConfig};
use status_server::stations::{StationIndex, StationResolver};
use status_server::status::{BackendLiveSource, NtesSource, StatusAggregator, StatusSource};
use status_server::web::{AppState, ServeOptions, create_router};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=info".into()),
        )
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::from_env()?;

    // One registry shared by every backend user, so a failover seen by one
    // request benefits the next.
    let registry = Arc::new(BackendRegistry::with_defaults(&config.credentials));
    let executor = RequestExecutor::new(registry.clone(), ExecutorConfig::default())?;
    info!(
        backends = registry.len(),
        active = %registry.current().name,
        "backend registry ready"
    );

    let mut ntes_config = NtesConfig::default();
    if let Some(url) = &config.ntes_base_url {
        ntes_config = ntes_config.with_base_url(url);
    }

    let sources: Vec<Arc<dyn StatusSource>> = vec![
        Arc::new(NtesSource::new(NtesClient::new(ntes_config))),
        Arc::new(BackendLiveSource::new(executor.clone())),
    ];
    let aggregator = StatusAggregator::new(sources).with_schedules(executor.clone());
    let status = CachedStatusClient::new(aggregator, &CacheConfig::default());

    let index = StationIndex::builtin();
    info!(stations = index.len(), "station index loaded");
    let stations = StationResolver::new(Arc::new(index)).with_backend(executor);

    let options = ServeOptions {
        sample_fallback: config.sample_fallback,
        request_budget: config.request_budget,
    };
    let app = create_router(AppState::new(status, stations, options));

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!(addr = %config.bind_addr, "running-status server listening");
    info!("  GET /health");
    info!("  GET /api/stations/resolve?name=...");
    info!("  GET /api/trains/:number/{{status,events,position,schedule}}");

    axum::serve(listener, app).await?;
    Ok(())
}
