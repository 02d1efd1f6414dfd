use ndarray::Array4;
use shared::INPUT_SHAPE;
use std::path::Path;
use tract_onnx::prelude::*;

use super::Classifier;
use crate::error::{InferenceError, StartupError};

/// ONNX model executed by tract. Keras models can be exported with tf2onnx.
pub struct OnnxClassifier {
    plan: TypedRunnableModel<TypedModel>,
}

impl OnnxClassifier {
    pub fn load(path: &Path) -> Result<Self, StartupError> {
        let input_fact = InferenceFact::dt_shape(
            f32::datum_type(),
            tvec!(INPUT_SHAPE[0], INPUT_SHAPE[1], INPUT_SHAPE[2], INPUT_SHAPE[3]),
        );

        tract_onnx::onnx()
            .model_for_path(path)
            .and_then(|model| model.with_input_fact(0, input_fact))
            .and_then(|model| model.into_optimized())
            .and_then(Self::from_model)
            .map_err(|e| StartupError::ModelLoad(format!("{:?}", e)))
    }

    fn from_model(model: TypedModel) -> TractResult<Self> {
        Ok(Self {
            plan: model.into_runnable()?,
        })
    }
}

impl Classifier for OnnxClassifier {
    fn predict(&self, input: &Array4<f32>) -> Result<Vec<f32>, InferenceError> {
        let data: Vec<f32> = input.iter().copied().collect();
        let tensor = Tensor::from_shape(input.shape(), &data)
            .map_err(|e| InferenceError::Model(e.to_string()))?;

        let outputs = self
            .plan
            .run(tvec!(tensor.into()))
            .map_err(|e| InferenceError::Model(e.to_string()))?;

        let output = outputs
            .first()
            .ok_or_else(|| InferenceError::Model("model produced no outputs".to_string()))?;
        let scores = output
            .to_array_view::<f32>()
            .map_err(|e| InferenceError::Model(e.to_string()))?;

        Ok(scores.iter().copied().collect())
    }

    fn backend_name(&self) -> &'static str {
        "tract-onnx"
    }
}
