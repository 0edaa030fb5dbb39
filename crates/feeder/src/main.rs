use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use jobgraph_core::config::FeederMode;
use jobgraph_core::Config;
use jobgraph_graph::Neo4jGraphStore;
use jobgraph_probe::HttpProbe;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use jobgraph_feeder::metrics::FeederMetrics;
use jobgraph_feeder::tick::{FeederLoop, TickOutcome};

const METRICS_LOG_EVERY: u64 = 50;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("jobgraph=info".parse()?))
        .init();

    let config = Config::feeder_from_env();
    config.log_redacted();

    let store =
        Neo4jGraphStore::connect(&config.store_host, &config.store_user, &config.store_password)
            .await?;
    let probe = HttpProbe::new().map_err(|e| anyhow::anyhow!("probe init failed: {e}"))?;
    let metrics = Arc::new(FeederMetrics::new());

    let feeder = FeederLoop::new(
        Arc::new(store),
        Arc::new(probe),
        metrics.clone(),
        config.feeder_jitter_min_ms,
        config.feeder_jitter_max_ms,
        config.feeder_reclaim_after_secs,
    );

    match config.feeder_mode {
        FeederMode::Oneshot => {
            info!("jobgraph-feeder running in one-shot mode");
            let code: u8 = match feeder.tick().await {
                Ok(TickOutcome::Worked) => 0,
                Ok(TickOutcome::NoWork) => 2,
                Err(e) => {
                    error!(error = %e, "feeder tick failed");
                    1
                }
            };
            metrics.log_if_due(1);
            Ok(ExitCode::from(code))
        }
        FeederMode::Daemon => {
            info!("jobgraph-feeder running in daemon mode");
            let mut shutdown = shutdown_signal();
            loop {
                tokio::select! {
                    _ = &mut shutdown => {
                        info!("shutdown signal received");
                        break;
                    }
                    result = feeder.tick() => {
                        match result {
                            Ok(_) => {}
                            Err(e) => error!(error = %e, "feeder tick failed, retrying next tick"),
                        }
                        metrics.log_if_due(METRICS_LOG_EVERY);
                    }
                }
            }
            info!("jobgraph-feeder shutdown complete");
            Ok(ExitCode::from(0))
        }
    }
}

fn shutdown_signal() -> impl std::future::Future<Output = ()> {
    Box::pin(async {
        let _ = tokio::signal::ctrl_c().await;
    })
}
