//! # Lobby Gateway Crate
//!
//! HTTP and WebSocket transport for Lobby. Each WebSocket connection is a
//! session with its own attribute store; clients subscribe to broker
//! destinations and send to `/app/...` routes handled by the chat controller.
//! When a connection closes, its disconnect event is handed to the presence
//! notifier, which announces the departure on the public topic.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use lobby_config::AppConfig;
//! use lobby_gateway::{create_router, GatewayState};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let state = GatewayState::from_config(&AppConfig::default())?;
//! let app = create_router(state);
//!
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:8080").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod middleware;
pub mod rest;
pub mod state;
pub mod websocket;

// Re-export main types for convenience
pub use error::{GatewayError, GatewayResult};
pub use state::{GatewayState, SessionRegistry};

use axum::{middleware as axum_middleware, Router};
use std::sync::Arc;

/// Create the main application router with all routes
pub fn create_router(state: GatewayState) -> Router {
    let arc_state = Arc::new(state);
    Router::new()
        // REST routes
        .merge(rest::create_rest_routes().with_state(arc_state.clone()))
        // WebSocket routes
        .merge(websocket::create_websocket_routes().with_state(arc_state))
        // CORS middleware
        .layer(middleware::create_cors_layer())
        // Logging middleware
        .layer(axum_middleware::from_fn(middleware::logging_middleware))
}
