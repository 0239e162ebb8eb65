//! Inference request construction for the screening classifier.
//!
//! Turns a patient observation into the single feature row the model
//! consumes. The manifest from training owns the column ordering; the
//! observation is reindexed to match it before every inference call.

use crate::model::manifest::FeatureManifest;
use crate::types::observation::PatientObservation;
use anyhow::{bail, Result};

/// Builds model input rows in the exact order the manifest declares.
///
/// The binding boundary is sequence-sensitive: a row in any other order
/// yields silently wrong predictions, so ordering is never taken from the
/// form or the struct layout.
pub struct RowBuilder {
    manifest: FeatureManifest,
}

impl RowBuilder {
    /// Create a builder over the loaded feature manifest.
    pub fn new(manifest: FeatureManifest) -> Self {
        Self { manifest }
    }

    /// Build the model input row for an observation.
    ///
    /// Validates the observation's domains first, then emits values in
    /// manifest order. A manifest column with no corresponding observation
    /// field is an error, never a silent default.
    pub fn build(&self, observation: &PatientObservation) -> Result<Vec<f32>> {
        observation.validate()?;

        let mut row = Vec::with_capacity(self.manifest.len());
        for column in self.manifest.names() {
            match observation.value(column) {
                Some(value) => row.push(value as f32),
                None => bail!(
                    "Feature '{}' required by the model manifest is not part of the patient observation",
                    column
                ),
            }
        }

        Ok(row)
    }

    /// The row as (column, value) pairs in manifest order, for display.
    pub fn build_named(&self, observation: &PatientObservation) -> Result<Vec<(String, f64)>> {
        observation.validate()?;

        let mut row = Vec::with_capacity(self.manifest.len());
        for column in self.manifest.names() {
            match observation.value(column) {
                Some(value) => row.push((column.clone(), value)),
                None => bail!(
                    "Feature '{}' required by the model manifest is not part of the patient observation",
                    column
                ),
            }
        }

        Ok(row)
    }

    /// Number of features the built row will contain.
    pub fn feature_count(&self) -> usize {
        self.manifest.len()
    }

    /// The manifest backing this builder.
    pub fn manifest(&self) -> &FeatureManifest {
        &self.manifest
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> PatientObservation {
        PatientObservation {
            bmi: 25.0,
            smoking: 0,
            alcohol_consumption: 1.5,
            physical_activity: 3.0,
            diet_quality: 4.0,
            family_history_kidney_disease: 0,
            antidiabetic_medications: 0,
            fatigue_levels: 2.0,
        }
    }

    fn training_manifest() -> FeatureManifest {
        FeatureManifest::from_names([
            "BMI",
            "Smoking",
            "AlcoholConsumption",
            "PhysicalActivity",
            "DietQuality",
            "FamilyHistoryKidneyDisease",
            "AntidiabeticMedications",
            "FatigueLevels",
        ])
    }

    #[test]
    fn test_row_follows_manifest_order() {
        let builder = RowBuilder::new(training_manifest());
        let row = builder.build(&sample()).unwrap();

        assert_eq!(row, vec![25.0, 0.0, 1.5, 3.0, 4.0, 0.0, 0.0, 2.0]);
    }

    #[test]
    fn test_row_follows_permuted_manifest_order() {
        // Manifest ordering wins over collection ordering
        let builder = RowBuilder::new(FeatureManifest::from_names([
            "FatigueLevels",
            "BMI",
            "Smoking",
            "DietQuality",
        ]));
        let row = builder.build(&sample()).unwrap();

        assert_eq!(row, vec![2.0, 25.0, 0.0, 4.0]);
    }

    #[test]
    fn test_build_is_deterministic() {
        let builder = RowBuilder::new(training_manifest());
        let obs = sample();

        assert_eq!(builder.build(&obs).unwrap(), builder.build(&obs).unwrap());
    }

    #[test]
    fn test_unknown_manifest_column_fails() {
        let mut names = training_manifest().names().to_vec();
        names.push("SerumCreatinine".to_string());
        let builder = RowBuilder::new(FeatureManifest::from_names(names));

        let err = builder.build(&sample()).unwrap_err();
        assert!(err.to_string().contains("SerumCreatinine"));
    }

    #[test]
    fn test_out_of_domain_observation_fails() {
        let builder = RowBuilder::new(training_manifest());
        let mut obs = sample();
        obs.alcohol_consumption = -0.5;

        let err = builder.build(&obs).unwrap_err();
        assert!(err.to_string().contains("AlcoholConsumption"));
    }

    #[test]
    fn test_named_row_matches_numeric_row() {
        let builder = RowBuilder::new(training_manifest());
        let obs = sample();

        let row = builder.build(&obs).unwrap();
        let named = builder.build_named(&obs).unwrap();

        assert_eq!(row.len(), named.len());
        for (value, (_, named_value)) in row.iter().zip(named.iter()) {
            assert_eq!(*value, *named_value as f32);
        }
    }

    #[test]
    fn test_feature_count() {
        let builder = RowBuilder::new(training_manifest());
        assert_eq!(builder.feature_count(), 8);
    }
}
