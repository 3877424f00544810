use std::process::ExitCode;
use std::sync::Arc;

use tracing::{error, info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use route_planner::config::ServerConfig;
use route_planner::topology::{JsonFileSource, TopologyStore};
use route_planner::web::{AppState, create_router};

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
    let config = ServerConfig::from_env()?;
    let planner_config = config.planner_config()?;
    info!(
        topology = %config.topology_path.display(),
        strategy = ?planner_config.strategy,
        refresh_secs = config.refresh_interval.as_secs(),
        "Loaded configuration"
    );

    // Fail fast if the network can't be loaded
    let store = TopologyStore::open(
        Arc::new(JsonFileSource::new(config.topology_path.clone())),
        planner_config.place_rule.predicate(),
        planner_config.cost_model.clone(),
    )
    .await?;

    // Reload the network in the background
    let refresh_store = store.clone();
    let refresh_interval = config.refresh_interval;
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(refresh_interval);
        interval.tick().await; // First tick is immediate, skip it
        loop {
            interval.tick().await;
            match refresh_store.refresh().await {
                Ok(summary) => info!(
                    stops = summary.stops,
                    edges = summary.edges,
                    "Refreshed topology"
                ),
                Err(e) => warn!(error = %e, "Topology refresh failed, keeping previous snapshot"),
            }
        }
    });

    let app = create_router(AppState::new(store, planner_config));

    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    info!("Journey planner listening on http://{}", config.bind);
    info!("  GET /route-planner?from=&to=&max_transfers=&max_gap=&alternatives=");
    info!("  GET /stops/search?q=&limit=");
    info!("  GET /topology");
    info!("  GET /health");

    axum::serve(listener, app).await?;
    Ok(())
}
