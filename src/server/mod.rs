mod error;
pub mod handlers;
pub mod types;

pub use error::ApiError;
pub use handlers::AppState;

use crate::{Error, Result, config::Config};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, header},
    routing::{get, post},
};
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

/// Builds the API router. CORS admits only `allowed_origin`.
pub fn router(state: AppState, config: &Config) -> Result<Router> {
    let origin = HeaderValue::from_str(&config.server.allowed_origin).map_err(|_| {
        Error::config(format!(
            "Invalid allowed_origin: '{}'",
            config.server.allowed_origin
        ))
    })?;

    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    let app = Router::new()
        .route("/api/generate-summary", post(handlers::generate_summary))
        .route("/api/recommend-movie", post(handlers::recommend_movie))
        .route("/api/transcribe-video", post(handlers::transcribe_video))
        .route("/api/generate-titles", post(handlers::generate_titles))
        .route("/api/health", get(handlers::health))
        .layer(DefaultBodyLimit::max(
            config.server.max_upload_mb.saturating_mul(1024 * 1024),
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state);

    Ok(app)
}

pub async fn run(config: Config) -> Result<()> {
    // Initialize relays and providers
    let app_state = AppState::from_config(&config).await?;

    // Create router
    let app = router(app_state, &config)?;

    // Start server
    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);

    info!("Starting server on {}", addr);
    info!("Accepting browser requests from {}", config.server.allowed_origin);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
