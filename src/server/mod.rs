pub mod handlers;
pub mod types;

use axum::http::Method;
use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::app::AppState;
use crate::error::Result;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health and info endpoints
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        // Chat endpoints
        .route("/chat", post(handlers::chat))
        .route("/sessions", get(handlers::list_sessions))
        .route("/session/:session_id", delete(handlers::delete_session))
        // Direct tool endpoints
        .route("/tools/blockchain/:chain_name", get(handlers::blockchain_info))
        .route("/tools/validate-address", get(handlers::validate_address))
        .route("/tools/gas-fees/:chain", get(handlers::gas_fees))
        .route(
            "/tools/contract-template/:contract_type",
            get(handlers::contract_template),
        )
        .route("/tools/convert", get(handlers::convert_units))
        // CORS for browser frontends
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST, Method::DELETE])
                .allow_headers(Any),
        )
        .with_state(state)
}

pub async fn serve(state: AppState) -> Result<()> {
    let config = state.get_config();
    let addr = format!("{}:{}", config.server.host, config.server.port);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("ChainBuddy API listening on http://{}", addr);

    axum::serve(listener, create_router(state).into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    info!("Shutdown signal received");
}
