use std::sync::Arc;

use anyhow::{Context, Result};
use forecast_service::{
    api::{self, AppState},
    config::AppConfig,
    metrics_server, observability,
    registry::ModelRegistry,
    sources::UsageCsvFileSource,
};

#[tokio::main]
async fn main() -> Result<()> {
    observability::init_tracing();

    let cfg = AppConfig::load()?;

    if let Some(metrics_cfg) = &cfg.metrics {
        metrics_server::init(&metrics_cfg.bind_addr)?;
    }

    let dataset_path = cfg.data.dataset_path.clone();
    let store = tokio::task::spawn_blocking(move || UsageCsvFileSource::new(dataset_path).load())
        .await?
        .with_context(|| format!("loading dataset {}", cfg.data.dataset_path.display()))?;

    let model_dir = cfg.data.model_dir.clone();
    let registry = tokio::task::spawn_blocking(move || ModelRegistry::open(model_dir)).await?;

    tracing::info!(
        rows = store.len(),
        latest = %store.latest_timestamp(),
        dominant_house = store.dominant_house(),
        models_on_disk = registry.models_on_disk(),
        using_ml = registry.using_ml(),
        "forecast service ready"
    );

    let state = AppState {
        store: Arc::new(store),
        registry: Arc::new(registry),
        port: cfg.server.bind_addr.port(),
    };
    api::serve(cfg.server.bind_addr, state).await?;

    Ok(())
}
