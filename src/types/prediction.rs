//! Screening outcome and per-submission prediction result

use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Binary screening outcome.
///
/// The training data encodes class 0 as CKD present and class 1 as CKD
/// absent. This is inverted relative to the usual 1=positive convention and
/// must stay that way: re-mapping the labels without retraining would flip
/// the diagnosis direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScreeningOutcome {
    /// Class 0: chronic kidney disease indicated
    CkdIndicated,
    /// Class 1: chronic kidney disease not indicated
    NotIndicated,
}

impl ScreeningOutcome {
    /// Map a model class label to an outcome.
    ///
    /// Labels outside {0, 1} are an error, not a guess.
    pub fn from_label(label: i64) -> Result<Self> {
        match label {
            0 => Ok(ScreeningOutcome::CkdIndicated),
            1 => Ok(ScreeningOutcome::NotIndicated),
            other => bail!("Model returned unexpected class label {}", other),
        }
    }

    /// The class label this outcome corresponds to.
    pub fn label(&self) -> i64 {
        match self {
            ScreeningOutcome::CkdIndicated => 0,
            ScreeningOutcome::NotIndicated => 1,
        }
    }

    /// User-facing result message.
    pub fn message(&self) -> &'static str {
        match self {
            ScreeningOutcome::CkdIndicated => "Chronic kidney disease indicated",
            ScreeningOutcome::NotIndicated => "Chronic kidney disease not indicated",
        }
    }

    /// Label of the probability shown alongside the message.
    pub fn probability_caption(&self) -> &'static str {
        match self {
            ScreeningOutcome::CkdIndicated => "Probability of CKD",
            ScreeningOutcome::NotIndicated => "Probability of no CKD",
        }
    }
}

/// Result of one screening submission.
///
/// Created per submission and discarded after rendering; nothing here is
/// persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Unique screening identifier
    pub screening_id: String,

    /// Predicted outcome
    pub outcome: ScreeningOutcome,

    /// Class probabilities, index 0 corresponding to label 0 (CKD)
    pub probabilities: [f64; 2],

    /// The exact row passed to the model, in manifest column order
    pub model_row: Vec<(String, f64)>,

    /// Result generation timestamp
    pub timestamp: DateTime<Utc>,
}

impl PredictionResult {
    /// Create a result for a freshly classified submission.
    pub fn new(
        outcome: ScreeningOutcome,
        probabilities: [f64; 2],
        model_row: Vec<(String, f64)>,
    ) -> Self {
        Self {
            screening_id: uuid::Uuid::new_v4().to_string(),
            outcome,
            probabilities,
            model_row,
            timestamp: Utc::now(),
        }
    }

    /// Probability backing the rendered outcome: `probabilities[0]` for
    /// label 0, `probabilities[1]` for label 1.
    pub fn confidence(&self) -> f64 {
        self.probabilities[self.outcome.label() as usize]
    }

    /// Confidence as a percentage string with two decimal places.
    pub fn confidence_percent(&self) -> String {
        format!("{:.2}%", self.confidence() * 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_from_label() {
        assert_eq!(
            ScreeningOutcome::from_label(0).unwrap(),
            ScreeningOutcome::CkdIndicated
        );
        assert_eq!(
            ScreeningOutcome::from_label(1).unwrap(),
            ScreeningOutcome::NotIndicated
        );
        assert!(ScreeningOutcome::from_label(2).is_err());
        assert!(ScreeningOutcome::from_label(-1).is_err());
    }

    #[test]
    fn test_label_round_trip() {
        for label in [0, 1] {
            let outcome = ScreeningOutcome::from_label(label).unwrap();
            assert_eq!(outcome.label(), label);
        }
    }

    #[test]
    fn test_confidence_pairs_with_label() {
        let positive = PredictionResult::new(
            ScreeningOutcome::CkdIndicated,
            [0.91, 0.09],
            Vec::new(),
        );
        assert_eq!(positive.confidence(), 0.91);

        let negative = PredictionResult::new(
            ScreeningOutcome::NotIndicated,
            [0.1266, 0.8734],
            Vec::new(),
        );
        assert_eq!(negative.confidence(), 0.8734);
    }

    #[test]
    fn test_confidence_percent_formatting() {
        let result = PredictionResult::new(
            ScreeningOutcome::NotIndicated,
            [0.1266, 0.8734],
            Vec::new(),
        );
        assert_eq!(result.confidence_percent(), "87.34%");
    }

    #[test]
    fn test_result_serialization() {
        let result = PredictionResult::new(
            ScreeningOutcome::CkdIndicated,
            [0.75, 0.25],
            vec![("BMI".to_string(), 25.0)],
        );

        let json = serde_json::to_string(&result).unwrap();
        let deserialized: PredictionResult = serde_json::from_str(&json).unwrap();

        assert_eq!(result.screening_id, deserialized.screening_id);
        assert_eq!(result.outcome, deserialized.outcome);
        assert_eq!(result.probabilities, deserialized.probabilities);
    }
}
