//! HTTP surface for the screening service

use crate::metrics::ScreeningMetrics;
use crate::model::inference::InferenceEngine;
use crate::row_builder::RowBuilder;
use crate::types::observation::PatientObservation;
use crate::types::prediction::{PredictionResult, ScreeningOutcome};
use crate::view::{self, Skin};
use axum::extract::{Form, Query, State};
use axum::http::{Method, StatusCode};
use axum::response::Html;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

/// Shared read-only application state.
///
/// Built once at startup and handed by reference into every request; the
/// loaded model and manifest never change for the process lifetime.
pub struct AppState {
    pub engine: InferenceEngine,
    pub builder: RowBuilder,
    pub metrics: Arc<ScreeningMetrics>,
}

#[derive(Debug, Deserialize)]
struct SkinParams {
    #[serde(default)]
    skin: Skin,
}

/// Why a submission produced no result
enum ScreeningError {
    /// Rejected before reaching the model (validation, reindexing)
    Rejected(anyhow::Error),
    /// Model invocation or output extraction failed
    Inference(anyhow::Error),
}

impl ScreeningError {
    fn message(&self) -> String {
        match self {
            ScreeningError::Rejected(e) => format!("{:#}", e),
            ScreeningError::Inference(e) => format!("{:#}", e),
        }
    }
}

/// Build the service router.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    Router::new()
        .route("/", get(form_card))
        .route("/plain", get(form_plain))
        .route("/predict", post(predict_form))
        .route("/api/predict", post(predict_api))
        .route("/health", get(health))
        .layer(cors)
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

async fn form_card() -> Html<String> {
    Html(view::render_form(Skin::Card))
}

async fn form_plain() -> Html<String> {
    Html(view::render_form(Skin::Plain))
}

async fn predict_form(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SkinParams>,
    Form(observation): Form<PatientObservation>,
) -> Html<String> {
    match run_screening(&state, &observation) {
        Ok(result) => Html(view::render_result(params.skin, &result)),
        Err(e) => Html(view::render_error(params.skin, &e.message())),
    }
}

async fn predict_api(
    State(state): State<Arc<AppState>>,
    Json(observation): Json<PatientObservation>,
) -> Result<Json<PredictionResult>, (StatusCode, Json<serde_json::Value>)> {
    match run_screening(&state, &observation) {
        Ok(result) => Ok(Json(result)),
        Err(ScreeningError::Rejected(e)) => Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "error": format!("{:#}", e) })),
        )),
        Err(ScreeningError::Inference(e)) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": format!("{:#}", e) })),
        )),
    }
}

/// One synchronous screening: build the row, invoke the model, map the
/// label. Failures abort this submission only; loaded model state is
/// untouched.
fn run_screening(
    state: &AppState,
    observation: &PatientObservation,
) -> Result<PredictionResult, ScreeningError> {
    let start = Instant::now();

    let named_row = state.builder.build_named(observation).map_err(|e| {
        state.metrics.record_rejection();
        warn!(error = %e, "Submission rejected");
        ScreeningError::Rejected(e)
    })?;

    let row: Vec<f32> = named_row.iter().map(|(_, value)| *value as f32).collect();

    let output = state
        .engine
        .predict(&row)
        .map_err(ScreeningError::Inference)?;
    let outcome =
        ScreeningOutcome::from_label(output.label).map_err(ScreeningError::Inference)?;

    let result = PredictionResult::new(outcome, output.probabilities, named_row);
    let processing_time = start.elapsed();

    state
        .metrics
        .record_screening(processing_time, outcome, result.confidence());

    info!(
        screening_id = %result.screening_id,
        outcome = ?outcome,
        confidence = result.confidence(),
        processing_time_us = processing_time.as_micros(),
        "Screening classified"
    );

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Handler tests require a loaded model artifact; the row builder,
    // outcome mapping and views carry their own coverage.

    #[test]
    fn test_skin_params_default_to_card() {
        let params: SkinParams = serde_json::from_str("{}").unwrap();
        assert_eq!(params.skin, Skin::Card);
    }
}
