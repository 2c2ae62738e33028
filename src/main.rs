use property_search::{
    api::{build_router, AppState},
    config::Config,
    geo::SearchIndexPostcodeResolver,
    ingest::ImportService,
    search::{
        blob_connection_string, AzureSearchClient, IndexInitOutcome, IndexManager, IndexTargets,
        PropertySearchService, SearchBackend,
    },
    storage::{AzureBlobStore, BlobStore},
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::timeout::TimeoutLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = Config::load()?;

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!(
            "property_search={},tower_http=info",
            config.observability.log_level
        )
        .into()
    });
    let registry = tracing_subscriber::registry().with(filter);
    if config.observability.json_logs {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!("Starting property search v{}", env!("CARGO_PKG_VERSION"));

    // Initialize Prometheus metrics
    if config.observability.prometheus_enabled {
        if let Err(e) = property_search::metrics::init_metrics() {
            tracing::warn!("Failed to initialize metrics: {}", e);
            tracing::warn!("Continuing without metrics");
        }
    } else {
        tracing::info!("Prometheus metrics disabled in configuration");
    }

    // Service clients, built once and shared
    let backend: Arc<dyn SearchBackend> = Arc::new(AzureSearchClient::new(&config.search)?);
    let blobs: Arc<dyn BlobStore> = Arc::new(AzureBlobStore::new(&config.storage)?);
    tracing::info!(endpoint = %config.search.endpoint, "Search client initialized");

    let targets = IndexTargets::from_config(&config.search, &config.storage);
    let indexes = Arc::new(IndexManager::new(
        backend.clone(),
        blobs.clone(),
        blob_connection_string(&config.storage),
        config.search.indexer_interval.clone(),
    ));

    match config.startup.index_mode.as_index_mode() {
        Some(mode) => {
            for target in targets.iter() {
                match indexes.initialize(target, mode).await? {
                    IndexInitOutcome::AlreadyPresent => {
                        tracing::info!(index = %target.index_name, "Index ready")
                    }
                    IndexInitOutcome::Created { blobs_removed } => tracing::info!(
                        index = %target.index_name,
                        blobs_removed = blobs_removed,
                        "Index created"
                    ),
                }
            }
        }
        None => tracing::info!("Index initialization skipped"),
    }

    let resolver = Arc::new(SearchIndexPostcodeResolver::new(
        backend.clone(),
        config.search.postcodes_index.clone(),
    ));
    let search = Arc::new(PropertySearchService::new(
        backend.clone(),
        resolver.clone(),
        config.search.properties_index.clone(),
    ));
    let importer = Arc::new(ImportService::new(
        backend,
        blobs,
        resolver,
        targets.clone(),
        config.import.batch_size,
    ));

    let app_state = AppState::new(search, indexes, importer, targets);
    let app = build_router(app_state).layer(TimeoutLayer::new(Duration::from_secs(
        config.server.request_timeout_secs,
    )));

    // Start HTTP server
    let http_addr = format!("{}:{}", config.server.host, config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_addr).await?;

    tracing::info!("HTTP API server listening on http://{}", http_addr);
    tracing::info!("   Health check: http://{}/health", http_addr);
    tracing::info!("   Property search: http://{}/api/property/find/{{text}}/{{page}}", http_addr);

    axum::serve(http_listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {}", e);
            }
            tracing::info!("Shutdown signal received");
        })
        .await?;

    tracing::info!("Shut down gracefully");
    Ok(())
}
