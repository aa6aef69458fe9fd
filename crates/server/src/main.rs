use anyhow::Context;
use clap::Parser;

use gallery_server::{app, config::Config, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = Config::parse();
    let state = AppState::from_config(&config);

    let datasets = state.datasets.list();
    tracing::info!(
        "tiles_root={} datasets={} annotations_dir={}",
        config.tiles_root.display(),
        datasets.len(),
        config.annotations_dir.display()
    );
    if state.gateway.is_some() {
        tracing::info!("visual queries enabled model={}", config.gemini_model);
    } else {
        tracing::warn!("GEMINI_API_KEY not set; /ask will answer 503");
    }
    if !state.pairs.is_empty() {
        tracing::info!("comparison pairs={}", state.pairs.len());
    }

    let listener = tokio::net::TcpListener::bind(&config.bind)
        .await
        .with_context(|| format!("binding {}", config.bind))?;
    tracing::info!("Server running on http://{}", listener.local_addr()?);
    for name in &datasets {
        tracing::info!("viewer url: http://{}/viewer/{}", config.bind, name);
    }

    axum::serve(listener, app(state)).await?;
    Ok(())
}
