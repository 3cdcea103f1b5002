use std::sync::Arc;

use anyhow::Context;

use stockroom_api::{app, config::AppConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    stockroom_observability::init();

    let config = AppConfig::from_env()?;
    let services = app::services::build_services(&config.storage).await?;
    let router = app::build_app(Arc::new(services));

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, router).await?;
    Ok(())
}
