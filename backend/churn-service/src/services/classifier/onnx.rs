/// ONNX Model Inference Module
///
/// Runs a churn classifier exported to ONNX with tract-onnx.
///
/// Expected layout (scikit-learn classifier exported by skl2onnx with
/// `zipmap=False`):
/// - input 0: `float32[1, 34]` in canonical field order
/// - output 0: predicted label, any numeric type
/// - output 1: class probabilities `[1, 2]`, churn at index 1
use std::path::Path;
use tract_onnx::prelude::*;
use tracing::debug;

use super::{ChurnClassifier, ModelInfo};
use crate::error::{ScoringError, StartupError};
use crate::models::FEATURE_COUNT;

/// Type alias for the optimized tract model
type TractModel = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

const LABEL_OUTPUT: usize = 0;
const PROBABILITY_OUTPUT: usize = 1;
const POSITIVE_CLASS: usize = 1;

pub struct OnnxChurnModel {
    plan: TractModel,
    source: String,
}

impl OnnxChurnModel {
    /// Load and optimize the ONNX graph for a single-row input.
    pub fn load(path: &Path) -> Result<Self, StartupError> {
        let source = path.display().to_string();

        let plan = Self::load_tract_model(path).map_err(|e| StartupError::ModelLoad {
            path: source.clone(),
            reason: e.to_string(),
        })?;

        let outputs = plan.model().outputs.len();
        if outputs <= PROBABILITY_OUTPUT {
            return Err(StartupError::IncompatibleModel {
                path: source,
                reason: format!(
                    "expected label and probability outputs, graph has {} output(s)",
                    outputs
                ),
            });
        }

        debug!("ONNX churn model optimized from: {}", source);
        Ok(Self { plan, source })
    }

    fn load_tract_model(path: &Path) -> TractResult<TractModel> {
        tract_onnx::onnx()
            .model_for_path(path)?
            .with_input_fact(0, f32::fact([1, FEATURE_COUNT]).into())?
            .into_optimized()?
            .into_runnable()
    }

    fn run(&self, features: &[f32]) -> Result<TVec<TValue>, ScoringError> {
        if features.len() != FEATURE_COUNT {
            return Err(ScoringError::ShapeMismatch {
                expected: FEATURE_COUNT,
                actual: features.len(),
            });
        }

        let input = Tensor::from_shape(&[1, FEATURE_COUNT], features)
            .map_err(|e| ScoringError::Inference(format!("Failed to build input tensor: {}", e)))?;

        self.plan
            .run(tvec!(input.into()))
            .map_err(|e| ScoringError::Inference(format!("Tract inference failed: {}", e)))
    }
}

impl ChurnClassifier for OnnxChurnModel {
    fn input_width(&self) -> usize {
        FEATURE_COUNT
    }

    fn predict_proba(&self, features: &[f32]) -> Result<f64, ScoringError> {
        let outputs = self.run(features)?;
        let invalid = |detail: String| ScoringError::InvalidOutput {
            output: "probability",
            detail,
        };

        let tensor = outputs
            .get(PROBABILITY_OUTPUT)
            .ok_or_else(|| invalid("probability output missing".to_string()))?;
        let probabilities = tensor
            .cast_to::<f32>()
            .map_err(|e| invalid(e.to_string()))?;
        let probabilities = probabilities
            .as_slice::<f32>()
            .map_err(|e| invalid(e.to_string()))?;

        probabilities
            .get(POSITIVE_CLASS)
            .map(|p| f64::from(*p))
            .ok_or_else(|| {
                invalid(format!(
                    "expected 2 class probabilities, got {}",
                    probabilities.len()
                ))
            })
    }

    fn predict_label(&self, features: &[f32]) -> Result<i64, ScoringError> {
        let outputs = self.run(features)?;
        let invalid = |detail: String| ScoringError::InvalidOutput {
            output: "label",
            detail,
        };

        let tensor = outputs
            .get(LABEL_OUTPUT)
            .ok_or_else(|| invalid("label output missing".to_string()))?;
        let labels = tensor.cast_to::<i64>().map_err(|e| invalid(e.to_string()))?;
        let labels = labels.as_slice::<i64>().map_err(|e| invalid(e.to_string()))?;

        labels
            .first()
            .copied()
            .ok_or_else(|| invalid("empty label tensor".to_string()))
    }

    fn info(&self) -> ModelInfo {
        ModelInfo {
            kind: "onnx".to_string(),
            source: self.source.clone(),
            input_width: FEATURE_COUNT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FeatureRecord;

    fn fixture(name: &str) -> std::path::PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("tests/fixtures")
            .join(name)
    }

    #[test]
    fn reads_label_and_positive_class_probability() {
        let model = OnnxChurnModel::load(&fixture("churn_linear.onnx")).unwrap();
        let input = FeatureRecord::baseline().to_model_input();

        let probability = model.predict_proba(&input).unwrap();
        let label = model.predict_label(&input).unwrap();

        assert!((0.0..=1.0).contains(&probability));
        assert_eq!(label, i64::from(probability > 0.5));
    }

    #[test]
    fn rejects_graph_with_single_output() {
        let err = OnnxChurnModel::load(&fixture("churn_proba_only.onnx"))
            .err()
            .unwrap();
        assert!(matches!(err, StartupError::IncompatibleModel { .. }));
    }

    #[test]
    fn short_row_is_a_shape_mismatch() {
        let model = OnnxChurnModel::load(&fixture("churn_linear.onnx")).unwrap();
        let err = model.predict_proba(&[0.0; 12]).unwrap_err();
        assert_eq!(
            err,
            ScoringError::ShapeMismatch {
                expected: FEATURE_COUNT,
                actual: 12
            }
        );
    }
}
