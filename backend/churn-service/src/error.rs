use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use crate::models::OneHotGroup;

pub type Result<T> = std::result::Result<T, AppError>;

/// A feature record that violates the schema contract.
///
/// Validation stops at the first violation, so each variant names exactly one
/// field or group.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaError {
    #[error("feature record must be a JSON object")]
    NotAnObject,

    #[error("missing required field '{field}'")]
    MissingField { field: &'static str },

    #[error("unknown field '{field}'")]
    UnknownField { field: String },

    #[error("field '{field}' must be {expected}")]
    WrongType {
        field: &'static str,
        expected: &'static str,
    },

    #[error("field '{field}' must be 0 or 1, got {value}")]
    NotBinary { field: &'static str, value: String },

    #[error("field '{field}' must be a non-negative number representable as f32, got {value}")]
    OutOfDomain { field: &'static str, value: f64 },

    #[error("one-hot group '{group}' must have exactly one active member, got {active}")]
    GroupSum { group: OneHotGroup, active: u32 },
}

impl SchemaError {
    /// Stable machine-readable tag for the violation.
    pub fn kind(&self) -> &'static str {
        match self {
            SchemaError::NotAnObject => "not_an_object",
            SchemaError::MissingField { .. } => "missing_field",
            SchemaError::UnknownField { .. } => "unknown_field",
            SchemaError::WrongType { .. } => "wrong_type",
            SchemaError::NotBinary { .. } => "not_binary",
            SchemaError::OutOfDomain { .. } => "out_of_domain",
            SchemaError::GroupSum { .. } => "group_sum",
        }
    }

    pub fn field(&self) -> Option<&str> {
        match self {
            SchemaError::MissingField { field }
            | SchemaError::WrongType { field, .. }
            | SchemaError::NotBinary { field, .. }
            | SchemaError::OutOfDomain { field, .. } => Some(field),
            SchemaError::UnknownField { field } => Some(field.as_str()),
            SchemaError::NotAnObject | SchemaError::GroupSum { .. } => None,
        }
    }

    pub fn group(&self) -> Option<OneHotGroup> {
        match self {
            SchemaError::GroupSum { group, .. } => Some(*group),
            _ => None,
        }
    }
}

/// The loaded model cannot score a schema-valid record.
///
/// This always points at a deployment defect (artifact and schema drifted
/// apart), never at the caller, so it is not retried.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScoringError {
    #[error("model expects {expected} input features, record provides {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("model inference failed: {0}")]
    Inference(String),

    #[error("model produced an invalid {output}: {detail}")]
    InvalidOutput {
        output: &'static str,
        detail: String,
    },
}

/// Failures that keep the process from serving traffic.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] envy::Error),

    #[error("model artifact not found: {0}")]
    ModelNotFound(String),

    #[error("unsupported model artifact format: {0}")]
    UnsupportedFormat(String),

    #[error("failed to load model artifact {path}: {reason}")]
    ModelLoad { path: String, reason: String },

    #[error("model artifact {path} is incompatible with the feature schema: {reason}")]
    IncompatibleModel { path: String, reason: String },
}

/// Request-time errors surfaced over HTTP.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("Scoring error: {0}")]
    Scoring(#[from] ScoringError),

    #[error("Invalid JSON payload: {0}")]
    InvalidJson(String),
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// HTTP reason phrase
    pub error: String,
    pub message: String,
    pub code: u16,
    /// `schema_error`, `invalid_json` or `scoring_error`
    pub error_type: String,
    /// Specific violation, e.g. `missing_field` or `group_sum`
    pub kind: Option<String>,
    pub field: Option<String>,
    pub group: Option<String>,
}

impl AppError {
    fn error_type(&self) -> &'static str {
        match self {
            AppError::Schema(_) => "schema_error",
            AppError::InvalidJson(_) => "invalid_json",
            AppError::Scoring(_) => "scoring_error",
        }
    }

    pub fn to_response_body(&self) -> ErrorResponse {
        let status = self.status_code();
        let (message, kind, field, group) = match self {
            AppError::Schema(err) => (
                err.to_string(),
                Some(err.kind().to_string()),
                err.field().map(str::to_string),
                err.group().map(|g| g.name().to_string()),
            ),
            AppError::InvalidJson(msg) => (msg.clone(), None, None, None),
            AppError::Scoring(err) => (err.to_string(), None, None, None),
        };

        ErrorResponse {
            error: status
                .canonical_reason()
                .unwrap_or("Error")
                .to_string(),
            message,
            code: status.as_u16(),
            error_type: self.error_type().to_string(),
            kind,
            field,
            group,
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Schema(_) | AppError::InvalidJson(_) => StatusCode::BAD_REQUEST,
            AppError::Scoring(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::Scoring(err) => {
                tracing::error!(error = %err, "Scoring failed, model artifact is unusable");
            }
            AppError::Schema(err) => tracing::debug!(kind = err.kind(), "Rejected feature record: {}", err),
            AppError::InvalidJson(msg) => tracing::debug!("Rejected JSON payload: {}", msg),
        }

        HttpResponse::build(self.status_code()).json(self.to_response_body())
    }
}
