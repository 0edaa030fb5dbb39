use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use jobgraph_core::Config;
use jobgraph_graph::Neo4jGraphStore;
use jobgraph_probe::HttpProbe;
use tracing::info;
use tracing_subscriber::EnvFilter;

use jobgraph_manager::{build_router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("jobgraph=info".parse()?))
        .init();

    let config = Config::manager_from_env();
    config.log_redacted();

    let store =
        Neo4jGraphStore::connect(&config.store_host, &config.store_user, &config.store_password)
            .await?;
    store.migrate().await?;

    let probe = HttpProbe::new().map_err(|e| anyhow::anyhow!("probe init failed: {e}"))?;

    let state = Arc::new(AppState {
        graph: Arc::new(store),
        probe: Arc::new(probe),
        probe_timeout_secs: 5,
    });

    let app = build_router(state);

    let addr: SocketAddr = format!("{}:{}", config.manager_host, config.manager_port).parse()?;
    info!(%addr, "jobgraph-manager starting");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
