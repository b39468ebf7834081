//! Model loading

use std::path::Path;
use std::time::Instant;

use ndarray::ArrayD;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::engine::{Evaluator, InputDescriptor};
#[cfg(feature = "ort")]
use crate::ort_backend::OrtModel;
use crate::tract_backend::TractModel;
use crate::InferenceError;

/// Compute device a model is bound to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Device {
    #[default]
    Cpu,
}

/// Evaluation backend
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    /// Pure Rust, always available
    #[default]
    Tract,
    /// ONNX Runtime, requires the `ort` feature
    Ort,
}

impl Backend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Backend::Tract => "tract",
            Backend::Ort => "ort",
        }
    }
}

/// A loaded ONNX graph on one of the available backends
pub enum OnnxModel {
    Tract(TractModel),
    #[cfg(feature = "ort")]
    Ort(OrtModel),
}

impl OnnxModel {
    /// Load a serialized ONNX graph whose first input takes `input_shape`
    pub fn load(
        path: impl AsRef<Path>,
        backend: Backend,
        device: Device,
        input_shape: &[usize],
    ) -> Result<Self, InferenceError> {
        let path = path.as_ref();
        info!(
            "Loading ONNX model from {} ({} backend, {:?})",
            path.display(),
            backend.as_str(),
            device
        );
        let start = Instant::now();

        if !path.is_file() {
            error!("Model file not found: {}", path.display());
            return Err(InferenceError::ModelLoad {
                path: path.to_path_buf(),
                reason: "file not found".to_string(),
            });
        }

        let model = match backend {
            Backend::Tract => OnnxModel::Tract(TractModel::load(path, input_shape)?),
            #[cfg(feature = "ort")]
            Backend::Ort => OnnxModel::Ort(OrtModel::load(path, input_shape)?),
            #[cfg(not(feature = "ort"))]
            Backend::Ort => return Err(InferenceError::BackendUnavailable(backend.as_str())),
        };

        info!("Model loaded in {}ms", start.elapsed().as_millis());
        Ok(model)
    }
}

impl Evaluator for OnnxModel {
    fn input(&self) -> &InputDescriptor {
        match self {
            OnnxModel::Tract(model) => model.input(),
            #[cfg(feature = "ort")]
            OnnxModel::Ort(model) => model.input(),
        }
    }

    fn device(&self) -> Device {
        match self {
            OnnxModel::Tract(model) => model.device(),
            #[cfg(feature = "ort")]
            OnnxModel::Ort(model) => model.device(),
        }
    }

    fn evaluate(&self, input: ArrayD<f32>) -> Result<ArrayD<f32>, InferenceError> {
        match self {
            OnnxModel::Tract(model) => model.evaluate(input),
            #[cfg(feature = "ort")]
            OnnxModel::Ort(model) => model.evaluate(input),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VGG_INPUT: [usize; 4] = [1, 3, 224, 224];

    #[test]
    fn test_missing_model_file() {
        let result = OnnxModel::load("/nonexistent/vgg16.onnx", Backend::Tract, Device::Cpu, &VGG_INPUT);
        match result {
            Err(InferenceError::ModelLoad { path, .. }) => {
                assert_eq!(path, Path::new("/nonexistent/vgg16.onnx"));
            }
            _ => panic!("expected ModelLoad error"),
        }
    }

    #[test]
    fn test_corrupt_model_file() {
        let path = std::env::temp_dir().join(format!("corrupt-{}.onnx", std::process::id()));
        std::fs::write(&path, b"\x08\x07garbage that is not a protobuf graph").unwrap();

        let result = OnnxModel::load(&path, Backend::Tract, Device::Cpu, &VGG_INPUT);
        std::fs::remove_file(&path).ok();

        assert!(matches!(result, Err(InferenceError::ModelLoad { .. })));
    }

    #[cfg(not(feature = "ort"))]
    #[test]
    fn test_ort_backend_unavailable() {
        let path = std::env::temp_dir().join(format!("ort-unavailable-{}.onnx", std::process::id()));
        std::fs::write(&path, b"").unwrap();

        let result = OnnxModel::load(&path, Backend::Ort, Device::Cpu, &VGG_INPUT);
        std::fs::remove_file(&path).ok();

        assert!(matches!(result, Err(InferenceError::BackendUnavailable("ort"))));
    }
}
