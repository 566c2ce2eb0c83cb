use std::sync::Arc;

use super::classifier::{ChurnClassifier, ModelInfo};
use crate::error::ScoringError;
use crate::models::{FeatureRecord, ScoreResult};

/// Bridges a validated [`FeatureRecord`] to the loaded classifier.
///
/// Stateless apart from the shared model handle; cloning is cheap.
#[derive(Clone)]
pub struct Scorer {
    classifier: Arc<dyn ChurnClassifier>,
}

impl Scorer {
    pub fn new(classifier: Arc<dyn ChurnClassifier>) -> Self {
        Self { classifier }
    }

    /// Score one record.
    ///
    /// Probability and label come from two independent model calls; the label
    /// is never derived by thresholding the probability here.
    pub fn score(&self, record: &FeatureRecord) -> Result<ScoreResult, ScoringError> {
        let input = record.to_model_input();

        let expected = self.classifier.input_width();
        if input.len() != expected {
            return Err(ScoringError::ShapeMismatch {
                expected,
                actual: input.len(),
            });
        }

        let probability = self.classifier.predict_proba(&input)?;
        if !(0.0..=1.0).contains(&probability) {
            return Err(ScoringError::InvalidOutput {
                output: "probability",
                detail: format!("{} is outside [0, 1]", probability),
            });
        }

        let hard_prediction = match self.classifier.predict_label(&input)? {
            0 => 0,
            1 => 1,
            other => {
                return Err(ScoringError::InvalidOutput {
                    output: "label",
                    detail: format!("{} is not a binary class", other),
                })
            }
        };

        Ok(ScoreResult {
            soft_prediction: probability,
            hard_prediction,
        })
    }

    pub fn model_info(&self) -> ModelInfo {
        self.classifier.info()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FEATURE_COUNT;
    use mockall::mock;

    mock! {
        Classifier {}

        impl ChurnClassifier for Classifier {
            fn input_width(&self) -> usize;
            fn predict_proba(&self, features: &[f32]) -> Result<f64, ScoringError>;
            fn predict_label(&self, features: &[f32]) -> Result<i64, ScoringError>;
            fn info(&self) -> ModelInfo;
        }
    }

    fn scorer_with(proba: f64, label: i64) -> Scorer {
        let mut classifier = MockClassifier::new();
        classifier.expect_input_width().return_const(FEATURE_COUNT);
        classifier
            .expect_predict_proba()
            .returning(move |_| Ok(proba));
        classifier
            .expect_predict_label()
            .returning(move |_| Ok(label));
        Scorer::new(Arc::new(classifier))
    }

    #[test]
    fn packages_both_model_outputs() {
        let result = scorer_with(0.73, 1).score(&FeatureRecord::baseline()).unwrap();
        assert_eq!(
            result,
            ScoreResult {
                soft_prediction: 0.73,
                hard_prediction: 1
            }
        );
    }

    #[test]
    fn label_is_not_derived_from_probability() {
        // a model with a high internal threshold may return 0 for p = 0.6
        let result = scorer_with(0.6, 0).score(&FeatureRecord::baseline()).unwrap();
        assert_eq!(result.soft_prediction, 0.6);
        assert_eq!(result.hard_prediction, 0);
    }

    #[test]
    fn passes_record_in_canonical_order() {
        let record = FeatureRecord::baseline();
        let expected = record.to_model_input();

        let mut classifier = MockClassifier::new();
        classifier.expect_input_width().return_const(FEATURE_COUNT);
        let expected_proba = expected.clone();
        classifier
            .expect_predict_proba()
            .withf(move |features| features.to_vec() == expected_proba)
            .times(1)
            .returning(|_| Ok(0.2));
        classifier
            .expect_predict_label()
            .withf(move |features| features.to_vec() == expected)
            .times(1)
            .returning(|_| Ok(0));

        Scorer::new(Arc::new(classifier)).score(&record).unwrap();
    }

    #[test]
    fn repeated_scoring_is_deterministic() {
        let scorer = scorer_with(0.41, 0);
        let record = FeatureRecord::baseline();
        assert_eq!(scorer.score(&record).unwrap(), scorer.score(&record).unwrap());
    }

    #[test]
    fn width_drift_is_a_scoring_error() {
        let mut classifier = MockClassifier::new();
        classifier.expect_input_width().return_const(30usize);
        classifier.expect_predict_proba().never();

        let err = Scorer::new(Arc::new(classifier))
            .score(&FeatureRecord::baseline())
            .unwrap_err();
        assert_eq!(
            err,
            ScoringError::ShapeMismatch {
                expected: 30,
                actual: FEATURE_COUNT
            }
        );
    }

    #[test]
    fn rejects_out_of_range_probability() {
        let err = scorer_with(1.2, 1).score(&FeatureRecord::baseline()).unwrap_err();
        assert!(matches!(
            err,
            ScoringError::InvalidOutput {
                output: "probability",
                ..
            }
        ));

        let err = scorer_with(f64::NAN, 1).score(&FeatureRecord::baseline()).unwrap_err();
        assert!(matches!(err, ScoringError::InvalidOutput { .. }));
    }

    #[test]
    fn rejects_non_binary_label() {
        let err = scorer_with(0.5, 2).score(&FeatureRecord::baseline()).unwrap_err();
        assert!(matches!(err, ScoringError::InvalidOutput { output: "label", .. }));
    }

    #[test]
    fn propagates_inference_failure() {
        let mut classifier = MockClassifier::new();
        classifier.expect_input_width().return_const(FEATURE_COUNT);
        classifier
            .expect_predict_proba()
            .returning(|_| Err(ScoringError::Inference("graph exploded".to_string())));

        let err = Scorer::new(Arc::new(classifier))
            .score(&FeatureRecord::baseline())
            .unwrap_err();
        assert_eq!(err, ScoringError::Inference("graph exploded".to_string()));
    }
}
