//! Single-Image ONNX Classifier
//!
//! Loads a pretrained ImageNet classifier, runs it on one image and
//! reports the predicted class label.

pub mod config;
pub mod pipeline;

pub use self::config::{ClassifierConfig, LogFormat};
pub use pipeline::{run, Classification, Pipeline};

use image_preprocess::PreprocessError;
use inference_engine::InferenceError;
use label_resolver::LabelError;
use thiserror::Error;
use tracing::subscriber::SetGlobalDefaultError;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Classifier error types
#[derive(Error, Debug)]
pub enum ClassifierError {
    #[error(transparent)]
    Preprocess(#[from] PreprocessError),

    #[error(transparent)]
    Inference(#[from] InferenceError),

    #[error(transparent)]
    Label(#[from] LabelError),

    #[error("Failed to write result: {0}")]
    Output(#[from] std::io::Error),
}

/// Initialize logging on stderr; stdout carries only the result
pub fn init_logging(format: LogFormat) -> Result<(), SetGlobalDefaultError> {
    let builder = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(true)
        .with_writer(std::io::stderr);

    match format {
        LogFormat::Text => tracing::subscriber::set_global_default(builder.finish()),
        LogFormat::Json => tracing::subscriber::set_global_default(builder.json().finish()),
    }
}
