//! fieldcred Server Library
//!
//! HTTP front for the credential issuer and verifier. The library exposes
//! the router for integration testing and `serve` for the binaries.

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use config::ServerConfig;
use state::AppState;

/// Build CORS layer from the configured origin list.
///
/// `*` allows every origin; otherwise only the listed origins are allowed.
fn cors_layer(origins: &str) -> CorsLayer {
    let allow_origin = if origins.trim() == "*" {
        AllowOrigin::any()
    } else {
        let parsed: Vec<_> = origins
            .split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect();
        AllowOrigin::list(parsed)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .max_age(std::time::Duration::from_secs(3600))
}

fn core_routes() -> Router<AppState> {
    Router::new()
        .route("/credentials/issue", post(routes::issue_credential))
        .route("/credentials/verify", post(routes::verify_credential))
        .route("/roles", get(routes::list_roles))
        .route("/roles/:id", get(routes::get_role))
        .route("/issuer/public-key", get(routes::issuer_public_key))
        .route("/health", get(routes::health))
        .route("/health/detailed", get(routes::detailed_health))
}

/// Create the router with all routes and layers configured
pub fn create_router(state: AppState, config: &ServerConfig) -> Router {
    core_routes()
        .with_state(state)
        .layer(axum_middleware::from_fn(
            middleware::security_headers_middleware,
        ))
        .layer(cors_layer(&config.cors_origins))
        .layer(TraceLayer::new_for_http())
}

/// Load the issuer key, bind and serve until the process is stopped
pub async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    let state = AppState::bootstrap(&config)?;
    let app = create_router(state, &config);

    let listener = tokio::net::TcpListener::bind(&config.bind).await?;
    tracing::info!("Starting fieldcred server on {}", config.bind);

    axum::serve(listener, app).await?;
    Ok(())
}
