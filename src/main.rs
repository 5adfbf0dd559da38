//! Studiobook server entry point.

use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use studiobook::{app, config::AppConfig, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "studiobook=info,tower_http=info".into());
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;
    tracing::info!("Starting Studiobook v{}", env!("CARGO_PKG_VERSION"));
    if config.scale_long_stays_by_duration {
        tracing::info!("Daily and weekly rates scale with booking duration");
    }

    // Connections are opened on first use; rate lookups fail per request if the database is down
    let db = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect_lazy(&config.database_url)?;

    let addr = config.bind_addr();
    let router = app(AppState::new(db, config));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", addr);
    axum::serve(listener, router).await?;

    Ok(())
}
