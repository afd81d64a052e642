use anyhow::Context;

use talentdesk_api::app::{self, services};
use talentdesk_api::config::ApiConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is not an error.
    let _ = dotenvy::dotenv();
    talentdesk_observability::init();

    let config = ApiConfig::from_env().context("invalid configuration")?;
    tracing::debug!(?config, "configuration loaded");

    let store = services::build_store(&config)
        .await
        .context("failed to set up membership store")?;

    if let Some(owner) = config.bootstrap_owner {
        if let Err(e) = services::bootstrap_owner(store.as_ref(), owner).await {
            tracing::error!(error = %e, principal_id = %owner, "failed to bootstrap owner membership");
        }
    }

    let app = app::build_app(config.jwt_secret.clone(), store);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
