pub mod health;
pub mod predictions;
pub mod records;

use actix_web::web;

use crate::error::AppError;

pub use predictions::{model_info, predict, ModelInfoResponse, PredictionHandlerState, PredictionResponse};
pub use records::{random_record, RandomRecordQuery};

/// Register every HTTP route of the service.
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health::health))
        .route("/health/live", web::get().to(health::health))
        .route("/health/ready", web::get().to(health::ready))
        .route("/predictions/predict", web::post().to(predict))
        // short alias kept for existing clients
        .route("/predict", web::post().to(predict))
        .route("/predictions/model", web::get().to(model_info))
        .route("/rnd", web::get().to(random_record));
}

/// JSON extractor config turning payload errors into structured 400s.
pub fn json_config(limit: usize) -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(limit)
        .error_handler(|err, _req| AppError::InvalidJson(err.to_string()).into())
}
