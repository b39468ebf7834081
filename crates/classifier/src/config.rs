//! Classifier configuration

use std::path::{Path, PathBuf};

use ::config::{Config, ConfigError, Environment, File};
use image_preprocess::PreprocessConfig;
use inference_engine::{Backend, Device};
use serde::{Deserialize, Serialize};

/// Optional settings file looked up in the working directory
pub const CONFIG_FILE: &str = "classifier.toml";

/// Prefix for environment overrides, e.g. `CLASSIFIER_MODEL_PATH`.
/// Nested keys use `__`: `CLASSIFIER_PREPROCESS__BIAS`.
pub const ENV_PREFIX: &str = "CLASSIFIER";

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Classifier configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Serialized ONNX graph
    pub model_path: PathBuf,

    /// Image to classify
    pub image_path: PathBuf,

    /// Class index to label table
    pub labels_path: PathBuf,

    /// Evaluation backend
    pub backend: Backend,

    /// Compute device
    pub device: Device,

    /// Image preprocessing
    pub preprocess: PreprocessConfig,

    /// Log output format (stderr)
    pub log_format: LogFormat,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("vgg16.onnx"),
            image_path: PathBuf::from("Siberian_Husky_bi-eyed_Flickr.jpg"),
            labels_path: PathBuf::from("imagenet1000_clsid_to_human.pkl"),
            backend: Backend::default(),
            device: Device::default(),
            preprocess: PreprocessConfig::default(),
            log_format: LogFormat::default(),
        }
    }
}

impl ClassifierConfig {
    /// Load from `classifier.toml` (if present) and `CLASSIFIER_*` variables
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Path::new(CONFIG_FILE))
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// Model input shape: a batch of one preprocessed image
    pub fn input_shape(&self) -> Vec<usize> {
        let mut shape = vec![1];
        shape.extend(self.preprocess.output_shape());
        shape
    }
}
