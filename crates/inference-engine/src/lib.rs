//! ONNX Inference Engine
//!
//! Loads an ONNX classification graph and evaluates it on a single
//! preprocessed image. tract is the default backend; ONNX Runtime is
//! available behind the `ort` feature.

mod engine;
mod model;
#[cfg(feature = "ort")]
mod ort_backend;
mod tract_backend;

pub use engine::{Evaluator, InferenceEngine, InferenceResult, InputDescriptor, ScoreVector};
pub use model::{Backend, Device, OnnxModel};
#[cfg(feature = "ort")]
pub use ort_backend::OrtModel;
pub use tract_backend::TractModel;

use std::path::PathBuf;
use thiserror::Error;

/// Errors during model loading and inference
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("Model load failed for {path}: {reason}")]
    ModelLoad { path: PathBuf, reason: String },
    #[error("Backend '{0}' is not available in this build")]
    BackendUnavailable(&'static str),
    #[error("Inference failed: {0}")]
    InferenceFailed(String),
    #[error("Invalid input shape: expected {expected}, got {actual}")]
    InvalidInputShape { expected: String, actual: String },
    #[error("Invalid output shape: {0}")]
    InvalidOutputShape(String),
}
