//! Inference Engine Implementation

use std::time::Instant;

use image_preprocess::ImageTensor;
use ndarray::{Array1, ArrayD, Axis};
use tracing::{debug, info};

use crate::model::Device;
use crate::InferenceError;

/// Description of a model's first input argument
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputDescriptor {
    /// Input name as declared in the graph
    pub name: String,
    /// Expected shape, batch axis included
    pub shape: Vec<usize>,
}

impl InputDescriptor {
    pub fn new(name: impl Into<String>, shape: Vec<usize>) -> Self {
        Self {
            name: name.into(),
            shape,
        }
    }
}

/// Something that can evaluate a loaded classification graph
pub trait Evaluator {
    /// The first declared input argument
    fn input(&self) -> &InputDescriptor;

    /// Device the graph is bound to
    fn device(&self) -> Device;

    /// Evaluate the graph on a batched input tensor
    fn evaluate(&self, input: ArrayD<f32>) -> Result<ArrayD<f32>, InferenceError>;
}

/// Per-class scores with the batch dimension removed
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreVector(Array1<f32>);

impl ScoreVector {
    pub fn new(scores: Array1<f32>) -> Self {
        Self(scores)
    }

    /// Squeeze all unit axes out of a model output.
    ///
    /// Fails unless exactly one non-unit axis (or a single value) remains.
    pub fn from_output(output: ArrayD<f32>) -> Result<Self, InferenceError> {
        let non_unit = output.shape().iter().filter(|&&d| d != 1).count();
        if output.is_empty() || non_unit > 1 {
            return Err(InferenceError::InvalidOutputShape(format!(
                "{:?} does not squeeze to a score vector",
                output.shape()
            )));
        }
        Ok(Self(output.iter().copied().collect()))
    }

    pub fn as_slice(&self) -> &[f32] {
        self.0.as_slice().unwrap_or(&[])
    }

    pub fn get(&self, index: usize) -> Option<f32> {
        self.0.get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Result of an inference pass
#[derive(Debug, Clone)]
pub struct InferenceResult {
    /// Class scores
    pub scores: ScoreVector,
    /// Inference latency in milliseconds
    pub latency_ms: u64,
}

/// Runs one image through an evaluator
pub struct InferenceEngine<E> {
    evaluator: E,
}

impl<E: Evaluator> InferenceEngine<E> {
    pub fn new(evaluator: E) -> Self {
        info!(
            "Creating inference engine: input '{}' {:?} on {:?}",
            evaluator.input().name,
            evaluator.input().shape,
            evaluator.device()
        );
        Self { evaluator }
    }

    /// Wrap the tensor as a batch of one, evaluate, and squeeze the batch axis
    pub fn predict(&self, tensor: ImageTensor) -> Result<InferenceResult, InferenceError> {
        let start = Instant::now();

        let batch = tensor.into_array().insert_axis(Axis(0)).into_dyn();
        let expected = &self.evaluator.input().shape;
        if batch.shape() != expected.as_slice() {
            return Err(InferenceError::InvalidInputShape {
                expected: format!("{:?}", expected),
                actual: format!("{:?}", batch.shape()),
            });
        }

        let output = self.evaluator.evaluate(batch)?;
        let scores = ScoreVector::from_output(output)?;

        let latency_ms = start.elapsed().as_millis() as u64;
        debug!("Inference completed in {}ms, {} classes", latency_ms, scores.len());

        Ok(InferenceResult { scores, latency_ms })
    }

    pub fn evaluator(&self) -> &E {
        &self.evaluator
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array3, IxDyn};
    use proptest::prelude::*;

    /// Returns a fixed output regardless of input
    struct FixedEvaluator {
        input: InputDescriptor,
        output: ArrayD<f32>,
    }

    impl FixedEvaluator {
        fn new(output: ArrayD<f32>) -> Self {
            Self {
                input: InputDescriptor::new("data", vec![1, 3, 4, 4]),
                output,
            }
        }
    }

    impl Evaluator for FixedEvaluator {
        fn input(&self) -> &InputDescriptor {
            &self.input
        }

        fn device(&self) -> Device {
            Device::Cpu
        }

        fn evaluate(&self, input: ArrayD<f32>) -> Result<ArrayD<f32>, InferenceError> {
            assert_eq!(input.shape(), &[1, 3, 4, 4]);
            Ok(self.output.clone())
        }
    }

    fn tensor(h: usize, w: usize) -> ImageTensor {
        ImageTensor::from_array(Array3::from_elem((3, h, w), -128.0))
    }

    #[test]
    fn test_batch_axis_removed() {
        let output = ArrayD::from_shape_vec(IxDyn(&[1, 3]), vec![0.1, 0.9, 0.05]).unwrap();
        let engine = InferenceEngine::new(FixedEvaluator::new(output));

        let result = engine.predict(tensor(4, 4)).unwrap();
        assert_eq!(result.scores.as_slice(), &[0.1, 0.9, 0.05]);
    }

    #[test]
    fn test_spatial_unit_axes_squeezed() {
        // Fully convolutional heads emit (1, classes, 1, 1)
        let output = ArrayD::from_shape_vec(IxDyn(&[1, 4, 1, 1]), vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        let engine = InferenceEngine::new(FixedEvaluator::new(output));

        let result = engine.predict(tensor(4, 4)).unwrap();
        assert_eq!(result.scores.len(), 4);
        assert_eq!(result.scores.get(3), Some(4.0));
    }

    #[test]
    fn test_shape_mismatch_rejected_before_evaluation() {
        let output = ArrayD::zeros(IxDyn(&[1, 3]));
        let engine = InferenceEngine::new(FixedEvaluator::new(output));

        let err = engine.predict(tensor(5, 4)).unwrap_err();
        assert!(matches!(err, InferenceError::InvalidInputShape { .. }));
    }

    #[test]
    fn test_multi_row_output_rejected() {
        let output = ArrayD::zeros(IxDyn(&[2, 3]));
        let engine = InferenceEngine::new(FixedEvaluator::new(output));

        let err = engine.predict(tensor(4, 4)).unwrap_err();
        assert!(matches!(err, InferenceError::InvalidOutputShape(_)));
    }

    #[test]
    fn test_empty_output_rejected() {
        let result = ScoreVector::from_output(ArrayD::zeros(IxDyn(&[1, 0])));
        assert!(matches!(result, Err(InferenceError::InvalidOutputShape(_))));
    }

    proptest! {
        #[test]
        fn prop_batched_output_squeezes_to_class_count(
            scores in proptest::collection::vec(-10.0f32..10.0, 2..1000)
        ) {
            let output = ArrayD::from_shape_vec(IxDyn(&[1, scores.len()]), scores.clone()).unwrap();
            let squeezed = ScoreVector::from_output(output).unwrap();
            prop_assert_eq!(squeezed.as_slice(), scores.as_slice());
        }
    }
}
