//! ONNX Runtime backend

use std::path::Path;

use ndarray::ArrayD;
use ort::session::{builder::GraphOptimizationLevel, Session};
use tracing::error;

use crate::engine::{Evaluator, InputDescriptor};
use crate::model::Device;
use crate::InferenceError;

/// ONNX graph loaded into an ONNX Runtime session (CPU execution provider)
pub struct OrtModel {
    session: Session,
    input: InputDescriptor,
}

impl OrtModel {
    pub fn load(path: &Path, input_shape: &[usize]) -> Result<Self, InferenceError> {
        let session = Session::builder()
            .and_then(|builder| builder.with_optimization_level(GraphOptimizationLevel::Level3))
            .and_then(|builder| builder.commit_from_file(path))
            .map_err(|e| {
                error!("Failed to load model: {}", e);
                InferenceError::ModelLoad {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                }
            })?;

        let name = session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .ok_or_else(|| InferenceError::ModelLoad {
                path: path.to_path_buf(),
                reason: "graph declares no inputs".to_string(),
            })?;

        Ok(Self {
            session,
            input: InputDescriptor::new(name, input_shape.to_vec()),
        })
    }
}

impl Evaluator for OrtModel {
    fn input(&self) -> &InputDescriptor {
        &self.input
    }

    fn device(&self) -> Device {
        Device::Cpu
    }

    fn evaluate(&self, input: ArrayD<f32>) -> Result<ArrayD<f32>, InferenceError> {
        let failed = |e: ort::Error| InferenceError::InferenceFailed(e.to_string());

        let inputs = ort::inputs![input].map_err(failed)?;
        let outputs = self.session.run(inputs).map_err(failed)?;
        let scores = outputs[0].try_extract_tensor::<f32>().map_err(failed)?;

        Ok(scores.to_owned())
    }
}
