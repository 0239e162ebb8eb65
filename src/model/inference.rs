//! Inference engine for the screening classifier

use crate::config::AppConfig;
use crate::model::loader::{LoadedModel, ModelLoader};
use anyhow::{bail, Context, Result};
use ort::memory::Allocator;
use ort::value::{DowncastableTarget, DynMapValueType, DynSequenceValueType};
use std::sync::RwLock;
use tracing::{debug, warn};

/// Tolerance for the probability pair summing to 1.0
const PROBA_SUM_TOLERANCE: f64 = 1e-3;

/// Raw model output for one screening row
#[derive(Debug, Clone, Copy)]
pub struct ModelOutput {
    /// Predicted class label (0 = CKD, 1 = no CKD)
    pub label: i64,
    /// Class probabilities, index 0 corresponding to label 0
    pub probabilities: [f64; 2],
}

/// Single-model inference engine using ONNX Runtime
pub struct InferenceEngine {
    /// Loaded classifier (session runs need exclusive access)
    model: RwLock<LoadedModel>,
}

impl InferenceEngine {
    /// Create an inference engine from configuration
    pub fn new(config: &AppConfig) -> Result<Self> {
        Self::from_artifact(&config.model.model_path, config.model.onnx_threads)
    }

    /// Create an inference engine from a model artifact path
    pub fn from_artifact(model_path: &str, onnx_threads: usize) -> Result<Self> {
        let loader = ModelLoader::with_threads(onnx_threads)?;
        let model = loader.load_model(model_path)?;

        Ok(Self {
            model: RwLock::new(model),
        })
    }

    /// Run the classifier on a feature row built in manifest order.
    ///
    /// One synchronous session run per call; no retries.
    pub fn predict(&self, row: &[f32]) -> Result<ModelOutput> {
        use ort::value::Tensor;

        // Input tensor shape [1, num_features]
        let shape = vec![1_i64, row.len() as i64];
        let input_tensor =
            Tensor::from_array((shape, row.to_vec())).context("Failed to create input tensor")?;

        let mut model = self
            .model
            .write()
            .map_err(|e| anyhow::anyhow!("Lock error: {}", e))?;

        let input_name = model.input_name.clone();
        let label_output = model.label_output.clone();
        let proba_output = model.proba_output.clone();

        let outputs = model
            .session
            .run(ort::inputs![&input_name => input_tensor])?;

        let label = extract_label(&outputs, &label_output)?;
        let probabilities = self.extract_probabilities(&outputs, &proba_output)?;

        let sum = probabilities[0] + probabilities[1];
        if (sum - 1.0).abs() > PROBA_SUM_TOLERANCE {
            warn!(
                p0 = probabilities[0],
                p1 = probabilities[1],
                "Class probabilities do not sum to 1"
            );
        }

        debug!(label = label, p0 = probabilities[0], p1 = probabilities[1], "Inference complete");

        Ok(ModelOutput {
            label,
            probabilities,
        })
    }

    /// Extract the class probability pair from model output.
    ///
    /// Handles both tensor outputs and seq(map) outputs; classifier
    /// exporters differ on which they emit.
    fn extract_probabilities(
        &self,
        outputs: &ort::session::SessionOutputs,
        proba_output: &str,
    ) -> Result<[f64; 2]> {
        // First, try the probabilities output by name
        if let Some(output) = outputs.get(proba_output) {
            let dtype = output.dtype();

            // Tensor format: [1, 2] or [2]
            if let Ok(tensor) = output.try_extract_tensor::<f32>() {
                let (shape, data) = tensor;
                let dims: Vec<i64> = shape.iter().copied().collect();
                return proba_pair_from_tensor(&dims, data);
            }

            // Sequence format: seq(map(int64, float)) keyed by class id
            if DynSequenceValueType::can_downcast(&dtype) {
                return self.extract_from_sequence_map(output);
            }
        }

        // Fallback: any non-label output that yields a pair
        for (name, output) in outputs.iter() {
            if name.contains("label") {
                continue;
            }

            let dtype = output.dtype();

            if let Ok(tensor) = output.try_extract_tensor::<f32>() {
                let (shape, data) = tensor;
                let dims: Vec<i64> = shape.iter().copied().collect();
                if let Ok(pair) = proba_pair_from_tensor(&dims, data) {
                    debug!(output = %name, "Extracted probabilities from fallback output");
                    return Ok(pair);
                }
            }

            if DynSequenceValueType::can_downcast(&dtype) {
                if let Ok(pair) = self.extract_from_sequence_map(&output) {
                    return Ok(pair);
                }
            }
        }

        bail!("No class probability pair found in model outputs")
    }

    /// Extract the probability pair from seq(map(int64, float)) output
    fn extract_from_sequence_map(&self, output: &ort::value::DynValue) -> Result<[f64; 2]> {
        let allocator = Allocator::default();

        let sequence = output
            .downcast_ref::<DynSequenceValueType>()
            .map_err(|e| anyhow::anyhow!("Failed to downcast to sequence: {}", e))?;

        let maps = sequence.try_extract_sequence::<DynMapValueType>(&allocator)?;

        if maps.is_empty() {
            bail!("Empty probability sequence");
        }

        // Batch size is 1: only the first map matters
        let kv_pairs = maps[0].try_extract_key_values::<i64, f32>()?;

        let mut pair = [None, None];
        for (class_id, prob) in &kv_pairs {
            match class_id {
                0 => pair[0] = Some(*prob as f64),
                1 => pair[1] = Some(*prob as f64),
                _ => {}
            }
        }

        match pair {
            [Some(p0), Some(p1)] => Ok([p0, p1]),
            _ => bail!("Probability map is missing class 0 or class 1"),
        }
    }
}

/// Extract the class label from model output
fn extract_label(outputs: &ort::session::SessionOutputs, label_output: &str) -> Result<i64> {
    let output = outputs
        .get(label_output)
        .with_context(|| format!("Model has no output named '{}'", label_output))?;

    if let Ok((shape, data)) = output.try_extract_tensor::<i64>() {
        let dims: Vec<i64> = shape.iter().copied().collect();
        return label_from_tensor(&dims, data);
    }

    // Some exporters emit int32 labels
    if let Ok((shape, data)) = output.try_extract_tensor::<i32>() {
        let dims: Vec<i64> = shape.iter().copied().collect();
        let widened: Vec<i64> = data.iter().map(|&v| v as i64).collect();
        return label_from_tensor(&dims, &widened);
    }

    bail!("Label output '{}' is not an integer tensor", label_output)
}

/// Pull the single class label out of a label tensor
fn label_from_tensor(dims: &[i64], data: &[i64]) -> Result<i64> {
    let elements: i64 = dims.iter().product();
    if elements != 1 || data.is_empty() {
        bail!("Expected a single-element label tensor, got shape {:?}", dims);
    }
    Ok(data[0])
}

/// Pull the class probability pair out of a probability tensor
fn proba_pair_from_tensor(dims: &[i64], data: &[f32]) -> Result<[f64; 2]> {
    if !matches!(dims, [1, 2] | [2]) || data.len() < 2 {
        bail!(
            "Expected a two-class probability tensor, got shape {:?} with {} values",
            dims,
            data.len()
        );
    }

    Ok([data[0] as f64, data[1] as f64])
}

#[cfg(test)]
mod tests {
    use super::*;

    // Tests exercising a live session require a model artifact; the
    // sample-screening tool covers that path against local artifacts.

    #[test]
    fn test_label_from_tensor() {
        assert_eq!(label_from_tensor(&[1], &[0]).unwrap(), 0);
        assert_eq!(label_from_tensor(&[1, 1], &[1]).unwrap(), 1);
    }

    #[test]
    fn test_label_from_tensor_rejects_batches() {
        assert!(label_from_tensor(&[2], &[0, 1]).is_err());
        assert!(label_from_tensor(&[0], &[]).is_err());
    }

    #[test]
    fn test_proba_pair_from_tensor() {
        let pair = proba_pair_from_tensor(&[1, 2], &[0.1266, 0.8734]).unwrap();
        assert!((pair[0] - 0.1266).abs() < 1e-6);
        assert!((pair[1] - 0.8734).abs() < 1e-6);

        let flat = proba_pair_from_tensor(&[2], &[0.9, 0.1]).unwrap();
        assert!((flat[0] - 0.9).abs() < 1e-6);
    }

    #[test]
    fn test_proba_pair_rejects_wrong_shape() {
        assert!(proba_pair_from_tensor(&[1, 1], &[1.0]).is_err());
        assert!(proba_pair_from_tensor(&[1, 3], &[0.2, 0.3, 0.5]).is_err());
        assert!(proba_pair_from_tensor(&[], &[]).is_err());
    }

    #[test]
    fn test_proba_pair_sums_within_tolerance() {
        let pair = proba_pair_from_tensor(&[1, 2], &[0.25, 0.75]).unwrap();
        assert!((pair[0] + pair[1] - 1.0).abs() < PROBA_SUM_TOLERANCE);
    }
}
