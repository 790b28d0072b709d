use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use wholesale_signup_api::config::Config;
use wholesale_signup_api::handlers::AppState;
use wholesale_signup_api::routes::build_router;

/// Main entry point for the application.
///
/// This function initializes logging, loads configuration, builds the
/// Shopify client and router, then starts the Axum server.
///
/// # Returns
///
/// * `anyhow::Result<()>` - Ok if the server runs, or an error if initialization fails.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wholesale_signup_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;

    let app_state = Arc::new(AppState::new(config.clone())?);
    tracing::info!(
        "✓ Shopify client initialized: {}",
        app_state.shopify.customers_endpoint()
    );

    let app = build_router(app_state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(
        "Server listening on {} (submissions at {})",
        addr,
        config.submission_path
    );

    axum::serve(listener, app).await?;

    Ok(())
}
