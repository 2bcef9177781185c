use anyhow::Context;

use permkit_api::config::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    permkit_observability::init();

    let config = ServerConfig::from_env()?;
    let app = permkit_api::app::build_app().context("failed to build permission trees")?;

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
