pub mod cabs;
pub mod employees;

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Json;
use axum::Router;
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::error::AppError;
use crate::state::AppState;

pub const ALL_FIELDS_REQUIRED: &str = "All fields are required";

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .merge(employees::router())
        .merge(cabs::router())
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Treats absent and blank strings alike.
fn required(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}

fn outcome<T>(result: &Result<T, AppError>) -> &'static str {
    match result {
        Ok(_) => "success",
        Err(AppError::BadRequest(_)) => "invalid",
        Err(AppError::Geocode(_)) => "geocode_failed",
        Err(AppError::NotFound(_)) => "not_found",
        Err(AppError::Conflict(_)) => "conflict",
        Err(AppError::Internal(_)) => "error",
    }
}

async fn index() -> &'static str {
    "Cab Compass is ready to serve hot APIs!"
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    store: &'static str,
}

async fn health(State(state): State<Arc<AppState>>) -> (StatusCode, Json<HealthResponse>) {
    let store = state.store.backend();
    match state.store.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "ok",
                store,
            }),
        ),
        Err(err) => {
            warn!(error = %err, store, "store ping failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "degraded",
                    store,
                }),
            )
        }
    }
}

async fn metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.metrics.encode() {
        Ok(body) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            body,
        )
            .into_response(),
        Err(err) => (StatusCode::INTERNAL_SERVER_ERROR, err).into_response(),
    }
}
