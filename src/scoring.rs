//! Binding classifier inference via ONNX Runtime.
//!
//! Runs a pre-trained model that takes the [N, 50, 20, 1] binding-matrix
//! tensor and produces one binding score per record. Only available with the
//! `neural` feature; without it, constructing a scorer fails with
//! `ScoreError::Disabled`.

#[cfg(feature = "neural")]
use ort::session::{builder::GraphOptimizationLevel, Session};
#[cfg(feature = "neural")]
use std::sync::Mutex;

use std::path::Path;

use tracing::info;

use crate::encoding::BindingMatrixBatch;

/// Errors from loading or running a scoring model.
#[derive(Debug, thiserror::Error)]
pub enum ScoreError {
    #[error("model scoring unavailable (compiled without the 'neural' feature)")]
    Disabled,

    #[error("failed to load model {path}: {message}")]
    Load { path: String, message: String },

    #[error("inference failed: {0}")]
    Inference(String),

    #[error("model session lock poisoned")]
    Poisoned,

    #[error("model returned {found} values for {records} records")]
    OutputSize { found: usize, records: usize },
}

/// A loaded binding classifier.
pub struct BindingScorer {
    #[cfg(feature = "neural")]
    session: Mutex<Session>,
}

impl BindingScorer {
    /// Loads an ONNX model from `model_path`.
    pub fn new(model_path: &Path) -> Result<Self, ScoreError> {
        #[cfg(feature = "neural")]
        {
            let session = load_session(model_path)?;
            info!(model = %model_path.display(), "loaded binding model");
            Ok(BindingScorer {
                session: Mutex::new(session),
            })
        }

        #[cfg(not(feature = "neural"))]
        {
            info!(model = %model_path.display(), "model scoring disabled at compile time");
            Err(ScoreError::Disabled)
        }
    }

    /// Scores every record in the batch, in batch order.
    pub fn score(&self, batch: &BindingMatrixBatch) -> Result<Vec<f32>, ScoreError> {
        if batch.is_empty() {
            return Ok(Vec::new());
        }

        #[cfg(feature = "neural")]
        {
            let mut session = self.session.lock().map_err(|_| ScoreError::Poisoned)?;
            run_batch(&mut session, batch)
        }

        #[cfg(not(feature = "neural"))]
        {
            Err(ScoreError::Disabled)
        }
    }
}

#[cfg(feature = "neural")]
fn load_session(path: &Path) -> Result<Session, ScoreError> {
    Session::builder()
        .and_then(|b| b.with_optimization_level(GraphOptimizationLevel::Level3))
        .and_then(|b| b.with_intra_threads(4))
        .and_then(|b| b.commit_from_file(path))
        .map_err(|e| ScoreError::Load {
            path: path.display().to_string(),
            message: e.to_string(),
        })
}

#[cfg(feature = "neural")]
fn run_batch(session: &mut Session, batch: &BindingMatrixBatch) -> Result<Vec<f32>, ScoreError> {
    use ort::value::Value;

    let input = Value::from_array((batch.shape(), batch.to_flat_vec()))
        .map_err(|e| ScoreError::Inference(e.to_string()))?;
    let outputs = session
        .run(ort::inputs![input])
        .map_err(|e| ScoreError::Inference(e.to_string()))?;

    let (_shape, data) = outputs[0]
        .try_extract_tensor::<f32>()
        .map_err(|e| ScoreError::Inference(e.to_string()))?;
    binding_column(data, batch.len())
}

/// Picks one score per record from the raw model output.
///
/// Two values per record are read as softmax over [no binding, binding] and
/// the binding column is returned; one value per record is returned as is.
#[cfg_attr(not(feature = "neural"), allow(dead_code))]
fn binding_column(data: &[f32], records: usize) -> Result<Vec<f32>, ScoreError> {
    if data.len() == records * 2 {
        Ok(data.chunks_exact(2).map(|row| row[1]).collect())
    } else if data.len() == records {
        Ok(data.to_vec())
    } else {
        Err(ScoreError::OutputSize {
            found: data.len(),
            records,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_class_output_takes_binding_column() {
        let data = [0.9, 0.1, 0.2, 0.8, 0.5, 0.5];
        assert_eq!(binding_column(&data, 3).unwrap(), vec![0.1, 0.8, 0.5]);
    }

    #[test]
    fn single_column_output_passes_through() {
        let data = [0.3, 0.7];
        assert_eq!(binding_column(&data, 2).unwrap(), vec![0.3, 0.7]);
    }

    #[test]
    fn unexpected_output_size_is_an_error() {
        let err = binding_column(&[0.1, 0.2, 0.3], 2).unwrap_err();
        assert!(matches!(
            err,
            ScoreError::OutputSize {
                found: 3,
                records: 2
            }
        ));
    }

    #[test]
    fn missing_model_fails_to_load() {
        let result = BindingScorer::new(Path::new("/nonexistent/mirbind.onnx"));
        assert!(result.is_err());
    }

    #[cfg(not(feature = "neural"))]
    #[test]
    fn scorer_disabled_without_feature() {
        let result = BindingScorer::new(Path::new("model.onnx"));
        assert!(matches!(result, Err(ScoreError::Disabled)));
    }
}
