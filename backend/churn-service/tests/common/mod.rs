#![allow(dead_code)]

use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{web, App};
use serde_json::{json, Value};
use std::io::Write;
use std::sync::Arc;
use tempfile::NamedTempFile;

use churn_service::error::ScoringError;
use churn_service::handlers::{self, PredictionHandlerState};
use churn_service::models::{FEATURE_COUNT, FIELDS};
use churn_service::services::{ChurnClassifier, ModelInfo, Scorer};

/// Test double returning the same outputs for every record.
pub struct FixedClassifier {
    pub probability: f64,
    pub label: i64,
    pub input_width: usize,
}

impl FixedClassifier {
    pub fn new(probability: f64, label: i64) -> Self {
        Self {
            probability,
            label,
            input_width: FEATURE_COUNT,
        }
    }
}

impl ChurnClassifier for FixedClassifier {
    fn input_width(&self) -> usize {
        self.input_width
    }

    fn predict_proba(&self, _features: &[f32]) -> Result<f64, ScoringError> {
        Ok(self.probability)
    }

    fn predict_label(&self, _features: &[f32]) -> Result<i64, ScoringError> {
        Ok(self.label)
    }

    fn info(&self) -> ModelInfo {
        ModelInfo {
            kind: "fixed".to_string(),
            source: "test".to_string(),
            input_width: self.input_width,
        }
    }
}

pub fn fixed_scorer(probability: f64, label: i64) -> Scorer {
    Scorer::new(Arc::new(FixedClassifier::new(probability, label)))
}

/// App with the production routes and JSON limits.
pub fn app(
    scorer: Scorer,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(PredictionHandlerState::new(scorer)))
        .app_data(handlers::json_config(16 * 1024))
        .configure(handlers::routes)
}

/// Valid record: female, DSL, electronic check, month-to-month, first tenure
/// bucket, 79.99 charges, every plain indicator off.
pub fn scenario_payload() -> Value {
    json!({
        "SeniorCitizen": 0,
        "Partner": 0,
        "Dependents": 0,
        "PhoneService": 0,
        "MultipleLines": 0,
        "OnlineSecurity": 0,
        "OnlineBackup": 0,
        "DeviceProtection": 0,
        "TechSupport": 0,
        "StreamingTV": 0,
        "StreamingMovies": 0,
        "PaperlessBilling": 0,
        "MonthlyCharges": 79.99,
        "TotalCharges": 79.99,
        "HasInternetService": 0,
        "HasContract": 0,
        "Gender_Female": 1,
        "Gender_Male": 0,
        "InternetService_DSL": 1,
        "InternetService_Fiber optic": 0,
        "InternetService_No": 0,
        "PaymentMethod_Bank transfer (automatic)": 0,
        "PaymentMethod_Credit card (automatic)": 0,
        "PaymentMethod_Electronic check": 1,
        "PaymentMethod_Mailed check": 0,
        "ContractType_Month-to-month": 1,
        "ContractType_One year": 0,
        "ContractType_Two year": 0,
        "TenureGroup_1 - 12": 1,
        "TenureGroup_13 - 24": 0,
        "TenureGroup_25 - 36": 0,
        "TenureGroup_37 - 48": 0,
        "TenureGroup_49 - 60": 0,
        "TenureGroup_61 - 72": 0
    })
}

/// Logistic artifact resembling a churn model: month-to-month contracts,
/// fiber and electronic checks push towards churn, long tenure away from it.
pub fn logistic_artifact() -> Value {
    let mut coefficients = serde_json::Map::new();
    for field in FIELDS.iter() {
        let weight = match field.name {
            "ContractType_Month-to-month" => 0.9,
            "ContractType_Two year" => -1.1,
            "InternetService_Fiber optic" => 0.7,
            "PaymentMethod_Electronic check" => 0.4,
            "TenureGroup_1 - 12" => 0.8,
            "TenureGroup_61 - 72" => -1.0,
            "MonthlyCharges" => 0.004,
            "TotalCharges" => -0.0003,
            "SeniorCitizen" => 0.2,
            _ => 0.0,
        };
        coefficients.insert(field.name.to_string(), json!(weight));
    }

    json!({
        "intercept": -1.5,
        "coefficients": coefficients,
        "threshold": 0.5
    })
}

pub fn write_artifact(contents: &Value, suffix: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(suffix)
        .tempfile()
        .expect("create temp artifact");
    file.write_all(contents.to_string().as_bytes())
        .expect("write temp artifact");
    file
}
