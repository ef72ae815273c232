//! # Shiftdesk API
//!
//! HTTP surface of the schedule batch engine.
//!
//! ## Architecture
//!
//! - **Routes**: Define API endpoints and URL structure
//! - **Handlers**: Translate requests into [`ScheduleEngine`] calls
//! - **Middleware**: Caller identity and error-to-response mapping
//! - **Notify**: Background delivery of the notifications an operation produced
//! - **Config**: Environment configuration

/// Configuration module for API settings
pub mod config;
/// Request handlers
pub mod handlers;
/// Caller identity and error mapping
pub mod middleware;
/// Notification delivery
pub mod notify;
/// Route definitions and API endpoint structure
pub mod routes;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    error_handling::HandleErrorLayer,
    http::{header, HeaderName, Method, StatusCode},
    response::{IntoResponse, Response},
    BoxError, Json, Router,
};
use eyre::Result;
use shiftdesk_core::notification::Notifier;
use shiftdesk_core::store::ScheduleStore;
use shiftdesk_core::ScheduleEngine;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::FmtSubscriber;

use crate::middleware::auth::USER_ID_HEADER;
use crate::middleware::error_handling::ErrorBody;

/// Shared application state that is accessible to all request handlers
pub struct ApiState {
    pub engine: ScheduleEngine,
    /// Receives the notifications produced by create and publish
    pub notifier: Arc<dyn Notifier>,
}

impl ApiState {
    pub fn new(store: Arc<dyn ScheduleStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            engine: ScheduleEngine::new(store),
            notifier,
        }
    }
}

/// Every route with request tracing, before CORS and timeouts.
pub fn app(state: Arc<ApiState>) -> Router {
    Router::new()
        // Health check endpoints
        .merge(routes::health::routes())
        // Batch and entry endpoints
        .merge(routes::schedule::routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Starts the API server on top of `store`
///
/// Initializes logging, wires the router with CORS and a request timeout,
/// and serves until the listener fails.
pub async fn start_server(config: config::ApiConfig, store: Arc<dyn ScheduleStore>) -> Result<()> {
    // Initialize tracing for logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let notifier = Arc::new(notify::LogNotifier::new(config.notify_from.clone()));
    let state = Arc::new(ApiState::new(store, notifier));
    let app = app(state);

    // Apply CORS configuration if origins are specified
    let app = if let Some(origins) = &config.cors_origins {
        let cors = CorsLayer::new()
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([
                header::CONTENT_TYPE,
                header::AUTHORIZATION,
                header::ACCEPT,
                HeaderName::from_static(USER_ID_HEADER),
            ])
            .allow_origin(origins.clone())
            .allow_credentials(true);

        app.layer(cors)
    } else {
        app
    };

    // Add request timeout middleware
    let app = app.layer(
        ServiceBuilder::new()
            .layer(HandleErrorLayer::new(handle_timeout))
            .timeout(Duration::from_secs(config.request_timeout)),
    );

    // Start the HTTP server
    let addr = config.server_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}

async fn handle_timeout(err: BoxError) -> Response {
    if err.is::<tower::timeout::error::Elapsed>() {
        (
            StatusCode::REQUEST_TIMEOUT,
            Json(ErrorBody::new("Request timed out", "TIMEOUT")),
        )
            .into_response()
    } else {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorBody::new(format!("Unhandled error: {}", err), "INTERNAL_ERROR")),
        )
            .into_response()
    }
}
