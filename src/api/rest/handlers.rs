//! # REST Handlers
//!
//! Request handlers for the public, admin and webhook endpoints.
//!
//! Every failure is answered with an [`ErrorResponse`] body, including
//! malformed JSON and query strings.

use crate::application::error::ApplicationError;
use crate::application::services::{
    AdminService, ListingCatalog, ListingQuery, SECRET_HEADER, WebhookReceipt, WebhookReceiver,
};
use crate::config::Settings;
use crate::domain::entities::{Listing, ListingFields};
use crate::domain::value_objects::ListingId;
use crate::infrastructure::persistence::{SharedListingStore, open_store};
use crate::infrastructure::remote::{ProbeReport, RemoteResult, RemoteSyncClient};
use axum::Json;
use axum::body::Bytes;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// Shared state for all handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Public reads.
    pub catalog: ListingCatalog,
    /// Admin mutations.
    pub admin: AdminService,
    /// Webhook batches.
    pub webhook: WebhookReceiver,
    /// Remote chain, for the connection probe.
    pub remote: RemoteSyncClient,
    /// Store backend description.
    pub store_backend: String,
}

impl AppState {
    /// Wires every service to the same store.
    #[must_use]
    pub fn new(
        store: SharedListingStore,
        remote: RemoteSyncClient,
        webhook: WebhookReceiver,
    ) -> Self {
        Self {
            catalog: ListingCatalog::new(store.clone(), remote.clone()),
            admin: AdminService::new(store.clone()),
            webhook,
            remote,
            store_backend: store.describe(),
        }
    }

    /// Builds the store, the remote chain and every service from settings.
    ///
    /// # Errors
    ///
    /// Returns `RemoteError::Internal` if the HTTP client cannot be built.
    pub fn from_settings(settings: &Settings) -> RemoteResult<Self> {
        let store = open_store(&settings.store);
        let remote = RemoteSyncClient::from_settings(&settings.remote)?;
        let webhook = WebhookReceiver::new(
            store.clone(),
            settings.webhook.secret.clone(),
            settings.webhook.mode,
        );
        Ok(Self::new(store, remote, webhook))
    }
}

// ============================================================================
// Errors
// ============================================================================

/// JSON error body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable message.
    pub error: String,
    /// Machine-readable code.
    pub code: String,
}

/// Error returned by handlers.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl ApiError {
    /// Creates an error.
    #[must_use]
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    /// Creates a 400 error.
    #[must_use]
    pub fn bad_request(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, code, message)
    }

    /// Returns the HTTP status.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<ApplicationError> for ApiError {
    fn from(error: ApplicationError) -> Self {
        match &error {
            ApplicationError::NotFound { resource_type, .. } => Self::new(
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                format!("{} not found", resource_type),
            ),
            ApplicationError::Repository(e) if e.is_not_found() => {
                Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", e.to_string())
            }
            ApplicationError::Unauthorized => {
                Self::new(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", "Unauthorized")
            }
            ApplicationError::InvalidPayload(message) => {
                Self::bad_request("INVALID_PAYLOAD", message.clone())
            }
            ApplicationError::Validation(_) | ApplicationError::Domain(_) => {
                Self::bad_request("VALIDATION_ERROR", error.to_string())
            }
            ApplicationError::Repository(e) => {
                tracing::error!(error = %e, "listing store failure");
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORE_ERROR",
                    "Failed to update listings",
                )
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request("INVALID_JSON", rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::bad_request("INVALID_QUERY", rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.message,
            code: self.code.to_string(),
        };
        (self.status, Json(body)).into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

fn parse_id(raw: &str) -> ApiResult<ListingId> {
    raw.parse::<ListingId>()
        .map_err(|_| ApiError::bad_request("INVALID_ID", format!("invalid listing id: {}", raw)))
}

fn parse_fields(payload: Result<Json<Value>, JsonRejection>) -> ApiResult<ListingFields> {
    let Json(value) = payload?;
    ListingFields::from_value(value).map_err(|e| ApiError::from(ApplicationError::from(e)))
}

// ============================================================================
// Public
// ============================================================================

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
    /// Crate version.
    pub version: String,
    /// Listings in the local store.
    pub listings: usize,
    /// Store backend.
    pub store: String,
}

/// `GET /health`
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        listings: state.catalog.local_count().await,
        store: state.store_backend.clone(),
    })
}

/// `GET /listings?limit=&type=&category=&location=`
pub async fn list_listings(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ListingQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<Listing>>> {
    let Query(query) = query?;
    Ok(Json(state.catalog.public_listings(&query).await?))
}

/// Query string of the featured endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct LimitParams {
    /// Maximum number of listings.
    pub limit: Option<usize>,
}

/// `GET /listings/featured?limit=`
pub async fn featured_listings(
    State(state): State<Arc<AppState>>,
    params: Result<Query<LimitParams>, QueryRejection>,
) -> ApiResult<Json<Vec<Listing>>> {
    let Query(params) = params?;
    Ok(Json(state.catalog.featured(params.limit).await))
}

/// Query string of the search endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    /// Text to look for.
    #[serde(default)]
    pub q: String,
    /// Maximum number of listings.
    pub limit: Option<usize>,
}

/// `GET /listings/search?q=&limit=`
pub async fn search_listings(
    State(state): State<Arc<AppState>>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> ApiResult<Json<Vec<Listing>>> {
    let Query(params) = params?;
    Ok(Json(state.catalog.search(&params.q, params.limit).await?))
}

/// `GET /listings/{id}`
pub async fn get_listing(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Listing>> {
    let id = parse_id(&id)?;
    Ok(Json(state.catalog.get(id).await?))
}

// ============================================================================
// Admin
// ============================================================================

/// Body of a successful admin mutation.
#[derive(Debug, Serialize, Deserialize)]
pub struct MutationResponse {
    /// Always true.
    pub success: bool,
    /// Human-readable summary.
    pub message: String,
    /// The listing after the mutation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub listing: Option<Listing>,
}

impl MutationResponse {
    fn new(message: &str, listing: Option<Listing>) -> Json<Self> {
        Json(Self {
            success: true,
            message: message.to_string(),
            listing,
        })
    }
}

/// `GET /admin/listings`
pub async fn admin_list(State(state): State<Arc<AppState>>) -> Json<Vec<Listing>> {
    Json(state.admin.list_all().await)
}

/// `POST /admin/listings`
pub async fn admin_create(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<MutationResponse>)> {
    let fields = parse_fields(payload)?;
    let listing = state.admin.create(fields).await?;
    Ok((
        StatusCode::CREATED,
        MutationResponse::new("Listing created successfully", Some(listing)),
    ))
}

/// `PUT|PATCH /admin/listings` with the id in the body.
pub async fn admin_update_body(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<MutationResponse>> {
    let fields = parse_fields(payload)?;
    let listing = state.admin.update_from_body(fields).await?;
    Ok(MutationResponse::new(
        "Listing updated successfully",
        Some(listing),
    ))
}

/// `PUT|PATCH /admin/listings/{id}`
pub async fn admin_update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<MutationResponse>> {
    let id = parse_id(&id)?;
    let mut fields = parse_fields(payload)?;
    fields.take_id().map_err(ApplicationError::from)?;

    let listing = match fields.active_toggle() {
        Some(active) => state.admin.set_active(id, active).await?,
        None => state.admin.update(id, fields).await?,
    };
    Ok(MutationResponse::new(
        "Listing updated successfully",
        Some(listing),
    ))
}

/// `DELETE /admin/listings/{id}`
pub async fn admin_delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<MutationResponse>> {
    let id = parse_id(&id)?;
    state.admin.delete(id).await?;
    Ok(MutationResponse::new("Listing deleted successfully", None))
}

/// `GET /admin/test-connection`
pub async fn test_connection(State(state): State<Arc<AppState>>) -> Json<ProbeReport> {
    Json(state.remote.probe().await)
}

// ============================================================================
// Webhook
// ============================================================================

/// `POST /webhook/listings`
///
/// The body is read raw so the secret is checked before any parsing.
pub async fn receive_webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<WebhookReceipt>> {
    let secret = headers
        .get(SECRET_HEADER)
        .and_then(|value| value.to_str().ok());
    Ok(Json(state.webhook.receive_raw(secret, &body).await?))
}
