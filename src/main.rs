use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use portfolio_api::auth::password::PasswordHasher;
use portfolio_api::database::{self, Repository};
use portfolio_api::services::AdminSeeder;
use portfolio_api::{app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("portfolio_api=info,tower_http=info")),
        )
        .init();

    let mut config = portfolio_api::config::config().clone();
    config.load_seed_file()?;
    config.validate()?;
    if config.security.jwt_secret_is_default {
        tracing::warn!("JWT_SECRET not set; using the development fallback secret");
    }
    tracing::info!("Starting Portfolio API in {:?} mode", config.environment);

    let store = database::connect_store(&config)
        .await
        .context("failed to open document store")?;
    database::ensure_collections(store.as_ref()).await?;

    let seeder = AdminSeeder::new(
        Repository::new(Arc::clone(&store)),
        PasswordHasher::new(config.security.bcrypt_cost),
    );
    match seeder.run(&config.seed).await {
        Ok(outcome) => tracing::info!("Admin seeding finished: {:?}", outcome),
        Err(e) => tracing::error!("Admin seeding failed: {}", e),
    }

    let port = config.server.port;
    let state = AppState::new(store, config);
    let app = app(state);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Portfolio API listening on http://{}", bind_addr);
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
