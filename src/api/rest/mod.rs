//! # REST API
//!
//! HTTP endpoints using axum.
//!
//! # Endpoints
//!
//! ## Public
//! - `GET /listings` - Active listings, filtered and limited
//! - `GET /listings/featured` - Featured listings
//! - `GET /listings/search` - Full-text search over title and description
//! - `GET /listings/{id}` - Single active listing
//! - `GET /health` - Health check
//!
//! ## Admin
//! - `GET /admin/listings` - All listings, inactive included
//! - `POST /admin/listings` - Create a listing
//! - `PUT|PATCH /admin/listings` - Update, id in body
//! - `PUT|PATCH /admin/listings/{id}` - Update
//! - `DELETE /admin/listings/{id}` - Delete
//! - `GET /admin/test-connection` - Probe the remote origin
//!
//! ## Webhook
//! - `POST /webhook/listings` - Listing batch, `x-webhook-secret` header
//!
//! # Usage
//!
//! ```ignore
//! use cannx_listings::api::rest::{create_router, AppState};
//! use std::sync::Arc;
//!
//! let state = Arc::new(AppState::new(store, remote, webhook));
//! let router = create_router(state);
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//! axum::serve(listener, router).await?;
//! ```

pub mod handlers;
pub mod routes;

pub use handlers::{
    ApiError, AppState, ErrorResponse, HealthResponse, LimitParams, MutationResponse, SearchParams,
};
pub use routes::{create_router, serve};
