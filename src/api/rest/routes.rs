//! # REST Routes
//!
//! Router construction and the HTTP server loop.

use super::handlers::{self, AppState};
use axum::Router;
use axum::routing::{get, post, put};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Builds the router with every endpoint.
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health))
        // Public; the fixed segments are matched before `{id}`
        .route("/listings", get(handlers::list_listings))
        .route("/listings/featured", get(handlers::featured_listings))
        .route("/listings/search", get(handlers::search_listings))
        .route("/listings/{id}", get(handlers::get_listing))
        // Admin
        .route(
            "/admin/listings",
            get(handlers::admin_list)
                .post(handlers::admin_create)
                .put(handlers::admin_update_body)
                .patch(handlers::admin_update_body),
        )
        .route(
            "/admin/listings/{id}",
            put(handlers::admin_update)
                .patch(handlers::admin_update)
                .delete(handlers::admin_delete),
        )
        .route("/admin/test-connection", get(handlers::test_connection))
        // Webhook
        .route("/webhook/listings", post(handlers::receive_webhook))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "request",
                        method = %request.method(),
                        uri = %request.uri(),
                    )
                })
                .on_request(())
                .on_response(
                    |response: &axum::http::Response<_>, latency: Duration, _span: &tracing::Span| {
                        let status = response.status();
                        if status.is_server_error() {
                            tracing::error!(status = %status, latency_ms = latency.as_millis(), "request failed");
                        } else if !status.is_success() {
                            tracing::warn!(status = %status, latency_ms = latency.as_millis(), "request rejected");
                        } else {
                            tracing::debug!(status = %status, latency_ms = latency.as_millis(), "request served");
                        }
                    },
                ),
        )
        .with_state(state)
}

/// Serves the API until `shutdown` resolves.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails.
pub async fn serve(
    state: Arc<AppState>,
    bind_addr: SocketAddr,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;

    tracing::info!(addr = %bind_addr, "listing API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
}
