use std::net::SocketAddr;

use juniper_relay_pagination_test::config::AppConfig;
use juniper_relay_pagination_test::schema::Context;
use juniper_relay_pagination_test::{AppState, app};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "juniper_relay_pagination_test=debug,juniper_relay_pagination=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;
    tracing::info!(?config, "configuration loaded");

    let state = AppState::new(Context::new(config.pagination));
    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("listening on http://{addr}/graphiql");

    axum::serve(listener, app(state)).await?;
    Ok(())
}
