//! Measurement ingest and retrieval handlers
//!
//! POST runs the full pipeline: validate, invoke the engine, persist on
//! success. Engine-rejected analyses surface to the client as 422 with the
//! engine's diagnostic text; process and protocol failures are server
//! faults and are logged with full invocation context.

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

use crate::{
    db,
    engine::AnalysisOutcome,
    error::{ApiError, ApiResult},
    models::RawSampleBatch,
    AppState,
};

/// POST /api/ppm
///
/// Ingest a raw sample batch, analyze it, persist the result.
pub async fn create_measurement(
    State(state): State<AppState>,
    Json(batch): Json<RawSampleBatch>,
) -> ApiResult<impl IntoResponse> {
    let sample_count = batch.validate()?;

    tracing::debug!(
        sample_rate = batch.sample_rate,
        taken_at = batch.taken_at,
        sample_count,
        "Sample batch accepted for analysis"
    );

    let outcome = state.invoker.invoke(&batch).await.map_err(|e| {
        tracing::error!(
            error = %e,
            sample_rate = batch.sample_rate,
            taken_at = batch.taken_at,
            "Analysis engine invocation failed"
        );
        ApiError::from(e)
    })?;

    match outcome {
        AnalysisOutcome::Success(measurement) => {
            let stored = db::measurements::insert_measurement(&state.db, &measurement).await?;
            let id = stored
                .id
                .ok_or_else(|| ApiError::Internal("stored measurement has no id".to_string()))?;

            tracing::info!(%id, taken_at = stored.taken_at, "Measurement stored");

            Ok((
                StatusCode::CREATED,
                [(header::LOCATION, format!("/api/ppm/{}", id))],
                Json(stored),
            ))
        }
        AnalysisOutcome::Failure(reason) => {
            tracing::info!(reason = %reason, taken_at = batch.taken_at, "Analysis rejected");
            Err(ApiError::AnalysisFailed(reason))
        }
    }
}

/// GET /api/ppm/:id
pub async fn get_measurement(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let measurement = db::measurements::get_measurement(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("measurement {}", id)))?;

    Ok(Json(measurement))
}

/// GET /api/ppm
pub async fn list_measurements(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let measurements = db::measurements::list_measurements(&state.db).await?;
    Ok(Json(measurements))
}

/// Build measurement routes
pub fn ppm_routes() -> Router<AppState> {
    Router::new()
        .route("/api/ppm", post(create_measurement).get(list_measurements))
        .route("/api/ppm/:id", get(get_measurement))
}
