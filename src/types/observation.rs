//! Patient observation record collected by the screening form

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

/// The eight training columns, in the order the form collects them.
///
/// The model's own input ordering comes from the feature manifest artifact,
/// not from this list.
pub const COLUMNS: [&str; 8] = [
    "BMI",
    "Smoking",
    "AlcoholConsumption",
    "PhysicalActivity",
    "DietQuality",
    "FamilyHistoryKidneyDisease",
    "AntidiabeticMedications",
    "FatigueLevels",
];

/// A single patient record submitted for screening
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientObservation {
    /// Body mass index
    #[serde(alias = "BMI")]
    pub bmi: f64,

    /// Smoking status (0 = non-smoker, 1 = smoker)
    #[serde(alias = "Smoking")]
    pub smoking: u8,

    /// Alcohol consumption score
    #[serde(alias = "AlcoholConsumption")]
    pub alcohol_consumption: f64,

    /// Physical activity score
    #[serde(alias = "PhysicalActivity")]
    pub physical_activity: f64,

    /// Diet quality score
    #[serde(alias = "DietQuality")]
    pub diet_quality: f64,

    /// Family history of kidney disease (0 = absent, 1 = present)
    #[serde(alias = "FamilyHistoryKidneyDisease")]
    pub family_history_kidney_disease: u8,

    /// Currently taking antidiabetic medications (0 = no, 1 = yes)
    #[serde(alias = "AntidiabeticMedications")]
    pub antidiabetic_medications: u8,

    /// Fatigue level score
    #[serde(alias = "FatigueLevels")]
    pub fatigue_levels: f64,
}

impl PatientObservation {
    /// Field values keyed by training column name, in collection order.
    pub fn named_values(&self) -> [(&'static str, f64); 8] {
        [
            ("BMI", self.bmi),
            ("Smoking", self.smoking as f64),
            ("AlcoholConsumption", self.alcohol_consumption),
            ("PhysicalActivity", self.physical_activity),
            ("DietQuality", self.diet_quality),
            (
                "FamilyHistoryKidneyDisease",
                self.family_history_kidney_disease as f64,
            ),
            ("AntidiabeticMedications", self.antidiabetic_medications as f64),
            ("FatigueLevels", self.fatigue_levels),
        ]
    }

    /// Look up a field value by its training column name.
    pub fn value(&self, column: &str) -> Option<f64> {
        self.named_values()
            .iter()
            .find(|(name, _)| *name == column)
            .map(|(_, value)| *value)
    }

    /// Check that every field is inside its declared domain.
    ///
    /// Numeric scores must be finite and non-negative; flags must be 0 or 1.
    /// The form widgets enforce the same bounds client-side, but values
    /// arriving through the JSON API bypass them.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("BMI", self.bmi),
            ("AlcoholConsumption", self.alcohol_consumption),
            ("PhysicalActivity", self.physical_activity),
            ("DietQuality", self.diet_quality),
            ("FatigueLevels", self.fatigue_levels),
        ] {
            if !value.is_finite() {
                bail!("{} must be a finite number, got {}", name, value);
            }
            if value < 0.0 {
                bail!("{} must be non-negative, got {}", name, value);
            }
        }

        for (name, flag) in [
            ("Smoking", self.smoking),
            ("FamilyHistoryKidneyDisease", self.family_history_kidney_disease),
            ("AntidiabeticMedications", self.antidiabetic_medications),
        ] {
            if flag > 1 {
                bail!("{} must be 0 or 1, got {}", name, flag);
            }
        }

        Ok(())
    }
}
