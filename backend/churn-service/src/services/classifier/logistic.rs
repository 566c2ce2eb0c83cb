//! Logistic regression loaded from exported coefficients.
//!
//! The artifact is a JSON document keyed by feature name:
//!
//! ```json
//! { "intercept": -1.7, "coefficients": { "SeniorCitizen": 0.21, ... }, "threshold": 0.5 }
//! ```
//!
//! Every field of the feature record needs exactly one coefficient.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use super::{ChurnClassifier, ModelInfo};
use crate::error::{ScoringError, StartupError};
use crate::models::{field_index, FEATURE_COUNT, FIELDS};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticArtifact {
    pub intercept: f64,
    pub coefficients: BTreeMap<String, f64>,
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

fn default_threshold() -> f64 {
    0.5
}

#[derive(Debug, Clone)]
pub struct LogisticChurnModel {
    weights: [f64; FEATURE_COUNT],
    intercept: f64,
    threshold: f64,
    source: String,
}

impl LogisticChurnModel {
    pub fn load(path: &Path) -> Result<Self, StartupError> {
        let source = path.display().to_string();
        let load_error = |reason: String| StartupError::ModelLoad {
            path: source.clone(),
            reason,
        };

        let text = std::fs::read_to_string(path).map_err(|e| load_error(e.to_string()))?;
        let artifact: LogisticArtifact =
            serde_json::from_str(&text).map_err(|e| load_error(e.to_string()))?;

        Self::from_artifact(artifact, &source).map_err(|reason| StartupError::IncompatibleModel {
            path: source.clone(),
            reason,
        })
    }

    /// Map named coefficients onto the canonical column order.
    pub fn from_artifact(artifact: LogisticArtifact, source: &str) -> Result<Self, String> {
        if !artifact.intercept.is_finite() {
            return Err("intercept must be finite".to_string());
        }
        if !(0.0..=1.0).contains(&artifact.threshold) {
            return Err(format!(
                "threshold must lie in [0, 1], got {}",
                artifact.threshold
            ));
        }

        if let Some(unknown) = artifact
            .coefficients
            .keys()
            .find(|name| field_index(name).is_none())
        {
            return Err(format!("coefficient for unknown feature '{}'", unknown));
        }

        let mut weights = [0.0; FEATURE_COUNT];
        for (weight, field) in weights.iter_mut().zip(FIELDS.iter()) {
            let value = artifact
                .coefficients
                .get(field.name)
                .copied()
                .ok_or_else(|| format!("missing coefficient for '{}'", field.name))?;
            if !value.is_finite() {
                return Err(format!("coefficient for '{}' must be finite", field.name));
            }
            *weight = value;
        }

        Ok(Self {
            weights,
            intercept: artifact.intercept,
            threshold: artifact.threshold,
            source: source.to_string(),
        })
    }

    fn check_width(features: &[f32]) -> Result<(), ScoringError> {
        if features.len() != FEATURE_COUNT {
            return Err(ScoringError::ShapeMismatch {
                expected: FEATURE_COUNT,
                actual: features.len(),
            });
        }
        Ok(())
    }

    fn probability(&self, features: &[f32]) -> f64 {
        let logit = self
            .weights
            .iter()
            .zip(features)
            .fold(self.intercept, |acc, (w, x)| acc + w * f64::from(*x));
        1.0 / (1.0 + (-logit).exp())
    }
}

impl ChurnClassifier for LogisticChurnModel {
    fn input_width(&self) -> usize {
        FEATURE_COUNT
    }

    fn predict_proba(&self, features: &[f32]) -> Result<f64, ScoringError> {
        Self::check_width(features)?;
        Ok(self.probability(features))
    }

    fn predict_label(&self, features: &[f32]) -> Result<i64, ScoringError> {
        Self::check_width(features)?;
        Ok(i64::from(self.probability(features) >= self.threshold))
    }

    fn info(&self) -> ModelInfo {
        ModelInfo {
            kind: "logistic".to_string(),
            source: self.source.clone(),
            input_width: FEATURE_COUNT,
        }
    }
}
