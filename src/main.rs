use anyhow::{Context, Result};
use axum::Router;
use carguide_rust::{catalog::Catalog, config, routes, AppState};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file first. Ignore errors (e.g., file not found)
    dotenv::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "carguide_rust=info,tower_http=info".into())) // Default to info if RUST_LOG not set
        .with(fmt::layer())
        .init();

    tracing::info!("Initializing car guide server...");

    // Load configuration
    let settings = match config::Settings::new() {
        Ok(s) => {
            tracing::info!("Configuration loaded successfully.");
            s
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e);
        }
    };

    // The catalog is loaded once and never mutated afterwards
    let catalog = Catalog::load(&settings.catalog_path)
        .with_context(|| format!("Failed to load vehicle catalog from '{}'", settings.catalog_path))?;
    if catalog.is_empty() {
        tracing::warn!("Catalog at '{}' has no records; pages will be empty.", settings.catalog_path);
    }

    let static_dir = settings.static_dir.clone();
    let app_state = AppState::new(settings, catalog);

    let router: Router = routes::create_router(app_state.clone());

    // Combine the router with static file serving and request tracing
    let app = router
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(TraceLayer::new_for_http());

    // Parse the server address from settings
    let addr: SocketAddr = match app_state.settings.server_address.parse() {
        Ok(a) => a,
        Err(e) => {
            tracing::error!("Invalid server address format in configuration ('{}'): {}", app_state.settings.server_address, e);
            return Err(anyhow::anyhow!("Invalid server address format: {}", app_state.settings.server_address));
        }
    };

    let listener = match TcpListener::bind(&addr).await {
        Ok(l) => {
            tracing::info!("Server listening on {}", addr);
            l
        }
        Err(e) => {
            tracing::error!("Failed to bind to address {}: {}", addr, e);
            return Err(e.into());
        }
    };

    axum::serve(listener, app.into_make_service())
        .await
        .context("Server error")?;

    Ok(())
}
