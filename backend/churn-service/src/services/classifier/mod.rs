//! Model backends behind the two capabilities the scorer needs.

mod logistic;
mod onnx;

pub use logistic::{LogisticArtifact, LogisticChurnModel};
pub use onnx::OnnxChurnModel;

use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info};
use utoipa::ToSchema;

use crate::error::{ScoringError, StartupError};
use crate::models::FeatureRecord;
use crate::services::Scorer;

/// Opaque binary classifier.
///
/// Implementations are loaded once and shared read-only across workers, so
/// both capabilities take `&self` and must not need a lock.
pub trait ChurnClassifier: Send + Sync {
    /// Number of input columns the model accepts.
    fn input_width(&self) -> usize;

    /// Probability of the positive (churn) class.
    fn predict_proba(&self, features: &[f32]) -> Result<f64, ScoringError>;

    /// Class label from the model's own decision rule.
    fn predict_label(&self, features: &[f32]) -> Result<i64, ScoringError>;

    fn info(&self) -> ModelInfo;
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ModelInfo {
    /// Backend kind, `onnx` or `logistic`
    pub kind: String,
    /// Artifact the model was loaded from
    pub source: String,
    pub input_width: usize,
}

/// Load the model artifact at `path`, picking the backend from the file
/// extension, and probe it once with a valid record.
///
/// Any failure here is fatal: the service must not start with a model that
/// cannot score.
pub fn load_classifier(path: impl AsRef<Path>) -> Result<Arc<dyn ChurnClassifier>, StartupError> {
    let path = path.as_ref();
    let source = path.display().to_string();

    if !path.exists() {
        return Err(StartupError::ModelNotFound(source));
    }

    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    let classifier: Arc<dyn ChurnClassifier> = match extension.as_deref() {
        Some("onnx") => Arc::new(OnnxChurnModel::load(path)?),
        Some("json") => Arc::new(LogisticChurnModel::load(path)?),
        _ => return Err(StartupError::UnsupportedFormat(source)),
    };

    probe(&classifier).map_err(|e| {
        error!(path = %source, error = %e, "Model probe failed");
        StartupError::IncompatibleModel {
            path: source.clone(),
            reason: e.to_string(),
        }
    })?;

    let info = classifier.info();
    info!(
        kind = %info.kind,
        path = %source,
        input_width = info.input_width,
        "Loaded churn model"
    );

    Ok(classifier)
}

fn probe(classifier: &Arc<dyn ChurnClassifier>) -> Result<(), ScoringError> {
    Scorer::new(Arc::clone(classifier))
        .score(&FeatureRecord::baseline())
        .map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_artifact_fails_fast() {
        let err = load_classifier("/nonexistent/churn_model.onnx").err().unwrap();
        assert!(matches!(err, StartupError::ModelNotFound(_)));
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        let mut file = tempfile::Builder::new().suffix(".pkl").tempfile().unwrap();
        file.write_all(b"not a model").unwrap();

        let err = load_classifier(file.path()).err().unwrap();
        assert!(matches!(err, StartupError::UnsupportedFormat(_)));
    }

    #[test]
    fn json_artifact_loads_through_probe() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        let artifact = LogisticArtifact {
            intercept: -0.4,
            coefficients: crate::models::FIELDS
                .iter()
                .map(|f| (f.name.to_string(), 0.01))
                .collect(),
            threshold: 0.5,
        };
        file.write_all(serde_json::to_string(&artifact).unwrap().as_bytes())
            .unwrap();

        let classifier = load_classifier(file.path()).unwrap();
        let info = classifier.info();
        assert_eq!(info.kind, "logistic");
        assert_eq!(info.source, file.path().display().to_string());
    }

    #[test]
    fn corrupt_onnx_artifact_is_rejected() {
        let mut file = tempfile::Builder::new().suffix(".onnx").tempfile().unwrap();
        file.write_all(b"\x00\x01garbage").unwrap();

        let err = load_classifier(file.path()).err().unwrap();
        assert!(matches!(err, StartupError::ModelLoad { .. }));
    }
}
