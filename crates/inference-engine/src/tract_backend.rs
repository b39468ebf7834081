//! tract-onnx backend

use std::path::Path;

use ndarray::{ArrayD, IxDyn};
use tract_onnx::prelude::*;

use crate::engine::{Evaluator, InputDescriptor};
use crate::model::Device;
use crate::InferenceError;

pub(crate) type TractRunnableModel =
    RunnableModel<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// ONNX graph optimized and planned by tract
pub struct TractModel {
    plan: TractRunnableModel,
    input: InputDescriptor,
}

impl TractModel {
    /// Load a graph, pinning its first input to `input_shape` (f32)
    pub fn load(path: &Path, input_shape: &[usize]) -> Result<Self, InferenceError> {
        let load_err = |e: TractError| InferenceError::ModelLoad {
            path: path.to_path_buf(),
            reason: format!("{e:#}"),
        };

        let model = tract_onnx::onnx().model_for_path(path).map_err(load_err)?;
        let name = model
            .input_outlets()
            .ok()
            .and_then(|outlets| outlets.first().copied())
            .map(|outlet| model.node(outlet.node).name.clone())
            .unwrap_or_else(|| "input".to_string());

        let plan = model
            .with_input_fact(0, f32::fact(input_shape.to_vec()).into())
            .and_then(|model| model.into_optimized())
            .and_then(|model| model.into_runnable())
            .map_err(load_err)?;

        Ok(Self {
            plan,
            input: InputDescriptor::new(name, input_shape.to_vec()),
        })
    }
}

impl Evaluator for TractModel {
    fn input(&self) -> &InputDescriptor {
        &self.input
    }

    fn device(&self) -> Device {
        Device::Cpu
    }

    fn evaluate(&self, input: ArrayD<f32>) -> Result<ArrayD<f32>, InferenceError> {
        let failed = |e: TractError| InferenceError::InferenceFailed(format!("{e:#}"));

        let shape = input.shape().to_vec();
        let data: Vec<f32> = input.iter().copied().collect();
        let tensor = Tensor::from_shape(&shape, &data).map_err(failed)?;

        let outputs = self.plan.run(tvec!(tensor.into())).map_err(failed)?;
        let output = outputs
            .first()
            .ok_or_else(|| InferenceError::InferenceFailed("model produced no outputs".into()))?;

        let values = output.as_slice::<f32>().map_err(failed)?.to_vec();
        ArrayD::from_shape_vec(IxDyn(output.shape()), values)
            .map_err(|e| InferenceError::InvalidOutputShape(e.to_string()))
    }
}
