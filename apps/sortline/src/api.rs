//! # API Module
//!
//! Axum HTTP surface over the core entry points.
//!
//! Routes:
//! - `GET  /health` - liveness probe
//! - `POST /v1/classify` - classify from explicit dimensions and mass
//! - `POST /v1/classify/estimate` - classify with the image fallback;
//!   manual dimensions win when all three are present
//!
//! Handlers contain no decision logic: they deserialize, delegate to
//! `sortline-core`, and map errors to status codes. Estimator calls run
//! on the blocking pool since the core port is synchronous.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use sortline_core::{
    DimensionEstimator, FallbackRequest, ImageRef, ResolveError, Resolver, classify_with_details,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Estimator handle shared across requests.
pub type SharedEstimator = Arc<dyn DimensionEstimator>;

// =============================================================================
// REQUEST / ERROR TYPES
// =============================================================================

/// Body of `POST /v1/classify`.
#[derive(Debug, Deserialize)]
pub struct ClassifyBody {
    /// Width in centimeters.
    pub width: f64,
    /// Height in centimeters.
    pub height: f64,
    /// Length in centimeters.
    pub length: f64,
    /// Mass in kilograms.
    pub mass: f64,
}

/// Body of `POST /v1/classify/estimate`.
#[derive(Debug, Deserialize)]
pub struct EstimateBody {
    /// Mass in kilograms (always required).
    pub mass: f64,
    /// Manually measured width, if available.
    #[serde(default)]
    pub width: Option<f64>,
    /// Manually measured height, if available.
    #[serde(default)]
    pub height: Option<f64>,
    /// Manually measured length, if available.
    #[serde(default)]
    pub length: Option<f64>,
    /// Image reference for the estimator fallback (a path visible to
    /// the server, e.g. a camera capture drop directory).
    #[serde(default)]
    pub image: Option<String>,
}

/// Error envelope returned by every failing route.
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    /// Estimator failures are upstream-service failures, not client
    /// mistakes.
    fn from_resolve(err: ResolveError) -> Self {
        let status = match err {
            ResolveError::Estimation(_) => StatusCode::BAD_GATEWAY,
            ResolveError::InvalidInput(_) | ResolveError::MissingInput => StatusCode::BAD_REQUEST,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

// =============================================================================
// ROUTER
// =============================================================================

/// Build the application router around an injected estimator.
pub fn router(estimator: SharedEstimator) -> Router {
    let resolver = Resolver::new(estimator);
    Router::new()
        .route("/health", get(health))
        .route("/v1/classify", post(classify))
        .route("/v1/classify/estimate", post(classify_estimate))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(resolver))
}

/// Serve the API on the given address until ctrl-c.
pub async fn serve(addr: &str, estimator: SharedEstimator) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "sortline API listening");
    axum::serve(listener, router(estimator))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    // Fall through on error: a missing signal handler should not keep
    // the server from running.
    let _ = tokio::signal::ctrl_c().await;
    info!("shutdown signal received");
}

// =============================================================================
// HANDLERS
// =============================================================================

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn classify(Json(body): Json<ClassifyBody>) -> Response {
    match classify_with_details(body.width, body.height, body.length, body.mass) {
        Ok(details) => Json(details).into_response(),
        Err(err) => ApiError::bad_request(err.to_string()).into_response(),
    }
}

async fn classify_estimate(
    State(resolver): State<Arc<Resolver<SharedEstimator>>>,
    Json(body): Json<EstimateBody>,
) -> Response {
    let request = FallbackRequest {
        mass_kg: body.mass,
        width: body.width,
        height: body.height,
        length: body.length,
        image: body.image.map(ImageRef::new),
    };

    // The estimator port is synchronous and may sit on a network call.
    let outcome =
        tokio::task::spawn_blocking(move || resolver.classify_with_fallback(&request)).await;

    match outcome {
        Ok(Ok(resolved)) => Json(resolved).into_response(),
        Ok(Err(err)) => ApiError::from_resolve(err).into_response(),
        Err(join_err) => ApiError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: join_err.to_string(),
        }
        .into_response(),
    }
}
