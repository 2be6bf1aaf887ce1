// Photogram server - photo-sharing social network over HTTP/JSON

use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

use photogram::{api, app_state::AppState, config::Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load configuration
    let config = Config::from_env()?;

    // Initialize application state
    let state = AppState::new(config.clone());

    // Build application router
    let app = api::router(state).layer(CorsLayer::permissive());

    // Start server
    let addr = config.server_address();
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("photogram server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
