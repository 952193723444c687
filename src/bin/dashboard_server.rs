use std::{net::SocketAddr, sync::Arc};

use pmdash::{
    dashboard_config_from_env, dashboard_router, init_logging, log_app_bind, log_app_start,
    log_source_selected, logging_config_from_env, DashboardConfig, DashboardSnapshotSource,
    InMemorySnapshotSource, LiveMarketSnapshotSource, LiveSourceError,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let logging_cfg = logging_config_from_env();
    init_logging(&logging_cfg)?;
    log_app_start(&logging_cfg);

    let config = dashboard_config_from_env()?;
    let addr: SocketAddr = config.dashboard_addr.parse()?;

    let source = source_from_config(config)?;
    let app = dashboard_router(source);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let bound_addr = listener.local_addr()?;

    log_app_bind(bound_addr);
    axum::serve(listener, app).await?;

    Ok(())
}

fn source_from_config(
    config: DashboardConfig,
) -> Result<Arc<dyn DashboardSnapshotSource>, LiveSourceError> {
    if config.use_demo {
        log_source_selected("demo", &config.view, None);
        return Ok(Arc::new(InMemorySnapshotSource::demo(&config)));
    }

    let interval = config.auto_refresh.then_some(config.refresh_interval_secs);
    log_source_selected("live_endpoint", &config.view, interval);
    Ok(Arc::new(LiveMarketSnapshotSource::spawn(config)?))
}
