//! Orchestrator-facing health endpoints.
//!
//! Liveness and readiness answer 200 with timing telemetry, or 503 with a
//! `Retry-After` when the datastore cannot be reached. Ping never touches the
//! datastore.

use crate::dtos::{LivenessAttributes, ReadinessAttributes, Resource, HEALTH_RESOURCE_ID};
use crate::services::BuildInfo;
use crate::startup::AppState;
use axum::{extract::State, response::IntoResponse, Json};
use service_core::error::AppError;

pub async fn liveness(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let report = state.probes.liveness().await.map_err(|e| {
        tracing::warn!(error = %e, "Liveness probe failed");
        AppError::from(e)
    })?;

    Ok(Json(Resource::new(
        "liveness",
        HEALTH_RESOURCE_ID,
        LivenessAttributes::ok(report.duration_micros),
    )))
}

pub async fn readiness(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let report = state.probes.readiness().await.map_err(|e| {
        tracing::warn!(error = %e, "Readiness probe failed");
        AppError::from(e)
    })?;

    Ok(Json(Resource::new(
        "readiness",
        HEALTH_RESOURCE_ID,
        ReadinessAttributes::ok(report.duration_micros),
    )))
}

pub async fn ping() -> impl IntoResponse {
    Json(Resource::new("ping", HEALTH_RESOURCE_ID, BuildInfo::current()))
}
