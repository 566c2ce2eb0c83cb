/// Prediction API Handlers
///
/// Scores a single customer feature record against the loaded churn model
use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Instant;
use tracing::debug;
use utoipa::ToSchema;

use crate::error::{ErrorResponse, Result};
use crate::metrics;
use crate::models::{field_order, FeatureRecord, ScoreResult};
use crate::services::Scorer;

/// Handler state for prediction endpoints
pub struct PredictionHandlerState {
    pub scorer: Scorer,
}

impl PredictionHandlerState {
    pub fn new(scorer: Scorer) -> Self {
        Self { scorer }
    }
}

/// Prediction response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PredictionResponse {
    /// Probability of churn, one entry per scored record
    pub soft_prediction: Vec<f64>,
    /// Binary prediction of churn (1 = churn)
    pub hard_prediction: u8,
}

impl From<ScoreResult> for PredictionResponse {
    fn from(result: ScoreResult) -> Self {
        Self {
            soft_prediction: vec![result.soft_prediction],
            hard_prediction: result.hard_prediction,
        }
    }
}

/// Model info response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ModelInfoResponse {
    pub kind: String,
    pub source: String,
    pub input_width: usize,
    /// Feature names in the column order the model consumes
    pub features: Vec<String>,
}

/// POST /predictions/predict
/// Score one customer feature record
#[utoipa::path(
    post,
    path = "/predictions/predict",
    tag = "predictions",
    request_body = FeatureRecord,
    responses(
        (status = 200, description = "Success", body = PredictionResponse),
        (status = 400, description = "Validation Error", body = ErrorResponse),
        (status = 500, description = "Model artifact cannot score the record", body = ErrorResponse)
    )
)]
pub async fn predict(
    state: web::Data<PredictionHandlerState>,
    body: web::Json<Value>,
) -> Result<HttpResponse> {
    let record = FeatureRecord::validate(&body).map_err(|err| {
        metrics::record_prediction("schema_error");
        err
    })?;

    let start = Instant::now();
    let result = state.scorer.score(&record).map_err(|err| {
        metrics::record_prediction("scoring_error");
        err
    })?;
    metrics::observe_scoring(start.elapsed());
    metrics::record_prediction(if result.hard_prediction == 1 {
        "churn"
    } else {
        "retain"
    });

    debug!(
        soft_prediction = result.soft_prediction,
        hard_prediction = result.hard_prediction,
        "Scored feature record"
    );

    Ok(HttpResponse::Ok().json(PredictionResponse::from(result)))
}

/// GET /predictions/model
/// Describe the loaded model and its expected column order
#[utoipa::path(
    get,
    path = "/predictions/model",
    tag = "predictions",
    responses(
        (status = 200, description = "Loaded model", body = ModelInfoResponse)
    )
)]
pub async fn model_info(state: web::Data<PredictionHandlerState>) -> HttpResponse {
    let info = state.scorer.model_info();

    HttpResponse::Ok().json(ModelInfoResponse {
        kind: info.kind,
        source: info.source,
        input_width: info.input_width,
        features: field_order().iter().map(|name| name.to_string()).collect(),
    })
}
