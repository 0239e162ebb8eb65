//! Feature manifest artifact

use anyhow::{Context, Result};
use std::path::Path;
use tracing::{info, warn};

/// Number of columns the screening model was trained on.
pub const EXPECTED_FEATURES: usize = 8;

/// Ordered list of the column names the model was trained on.
///
/// The manifest alone defines the model's input ordering; the binding
/// boundary is sequence-sensitive, not name-sensitive.
#[derive(Debug, Clone)]
pub struct FeatureManifest {
    names: Vec<String>,
}

impl FeatureManifest {
    /// Build a manifest from an ordered list of column names.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Load the manifest from a JSON artifact (an array of column names).
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let raw = std::fs::read_to_string(path)
            .context(format!("Failed to read feature manifest from {:?}", path))?;
        let names: Vec<String> = serde_json::from_str(&raw)
            .context(format!("Feature manifest {:?} is not a JSON string array", path))?;

        if names.len() != EXPECTED_FEATURES {
            warn!(
                path = %path.display(),
                features = names.len(),
                expected = EXPECTED_FEATURES,
                "Feature manifest does not match the trained column count"
            );
        }

        info!(
            path = %path.display(),
            features = names.len(),
            "Feature manifest loaded"
        );

        Ok(Self { names })
    }

    /// Column names in model input order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Number of columns the model expects.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether the manifest is empty.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_names_preserves_order() {
        let manifest = FeatureManifest::from_names(["Smoking", "BMI", "FatigueLevels"]);
        assert_eq!(manifest.names(), ["Smoking", "BMI", "FatigueLevels"]);
        assert_eq!(manifest.len(), 3);
    }

    #[test]
    fn test_parse_json_array() {
        let raw = r#"["BMI", "Smoking", "AlcoholConsumption"]"#;
        let names: Vec<String> = serde_json::from_str(raw).unwrap();
        let manifest = FeatureManifest::from_names(names);

        assert_eq!(manifest.names()[0], "BMI");
        assert_eq!(manifest.len(), 3);
    }

    #[test]
    fn test_rejects_non_array_artifact() {
        let raw = r#"{"features": ["BMI"]}"#;
        let parsed: std::result::Result<Vec<String>, _> = serde_json::from_str(raw);
        assert!(parsed.is_err());
    }
}
