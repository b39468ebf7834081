//! Load, preprocess, infer, resolve

use std::io::Write;
use std::path::Path;

use image_preprocess::{preprocess_path, PreprocessConfig};
use inference_engine::{Evaluator, InferenceEngine, OnnxModel, ScoreVector};
use label_resolver::LabelTable;
use tracing::info;

use crate::{ClassifierConfig, ClassifierError};

/// Final pipeline output
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    /// Winning class index
    pub index: usize,
    /// Its human-readable label
    pub label: String,
    /// Its raw score
    pub score: f32,
}

/// A loaded model plus the preprocessing its input expects
pub struct Pipeline<E> {
    engine: InferenceEngine<E>,
    preprocess: PreprocessConfig,
}

impl Pipeline<OnnxModel> {
    /// Load the configured ONNX model
    pub fn load(config: &ClassifierConfig) -> Result<Self, ClassifierError> {
        let model = OnnxModel::load(
            &config.model_path,
            config.backend,
            config.device,
            &config.input_shape(),
        )?;
        Ok(Self::new(model, config.preprocess.clone()))
    }
}

impl<E: Evaluator> Pipeline<E> {
    pub fn new(evaluator: E, preprocess: PreprocessConfig) -> Self {
        Self {
            engine: InferenceEngine::new(evaluator),
            preprocess,
        }
    }

    /// Preprocess an image file and score it
    pub fn scores(&self, image_path: &Path) -> Result<ScoreVector, ClassifierError> {
        let tensor = preprocess_path(image_path, &self.preprocess)?;
        let result = self.engine.predict(tensor)?;
        info!("Scored {} classes in {}ms", result.scores.len(), result.latency_ms);
        Ok(result.scores)
    }

    /// Score an image and resolve its label against `labels`
    pub fn classify(
        &self,
        image_path: &Path,
        labels: &LabelTable,
    ) -> Result<Classification, ClassifierError> {
        let scores = self.scores(image_path)?;
        let (index, label) = labels.resolve(scores.as_slice())?;
        Ok(Classification {
            index,
            label: label.to_string(),
            score: scores.get(index).unwrap_or(f32::NAN),
        })
    }

    /// Classify, writing the index as soon as it is known, then the label.
    ///
    /// The label table is only read after inference succeeds.
    pub fn report(
        &self,
        image_path: &Path,
        labels_path: &Path,
        out: &mut impl Write,
    ) -> Result<Classification, ClassifierError> {
        let scores = self.scores(image_path)?;
        let index = label_resolver::argmax(scores.as_slice())
            .ok_or(label_resolver::LabelError::NoMaximum)?;
        writeln!(out, "{}", index)?;

        let labels = LabelTable::load(labels_path)?;
        let label = labels.get(index)?.to_string();
        writeln!(out, "{}", label)?;

        Ok(Classification {
            index,
            label,
            score: scores.get(index).unwrap_or(f32::NAN),
        })
    }
}

/// Run the whole pipeline described by `config`, printing to `out`:
/// a load confirmation, the predicted index and the label.
pub fn run(config: &ClassifierConfig, out: &mut impl Write) -> Result<Classification, ClassifierError> {
    let pipeline = Pipeline::load(config)?;
    writeln!(out, "Loaded {}!", config.model_path.display())?;

    let classification = pipeline.report(&config.image_path, &config.labels_path, out)?;
    info!(
        "Predicted class {} ({}) with score {:.4}",
        classification.index, classification.label, classification.score
    );
    Ok(classification)
}
