use ndarray::Array4;
use std::path::Path;

use crate::config::ModelConfig;
use crate::error::{InferenceError, StartupError};

#[cfg(feature = "onnx")]
pub mod onnx;
#[cfg(feature = "torch")]
pub mod torch;

/// A loaded model that maps one NHWC input batch to per-class scores.
pub trait Classifier: Send + Sync {
    fn predict(&self, input: &Array4<f32>) -> Result<Vec<f32>, InferenceError>;

    fn backend_name(&self) -> &'static str;
}

pub fn softmax(scores: &[f32]) -> Vec<f32> {
    let max = scores.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = scores.iter().map(|s| (s - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

/// Loads the model artifact named in the config. The engine is picked from
/// the file extension.
pub fn load_classifier(config: &ModelConfig) -> Result<Box<dyn Classifier>, StartupError> {
    let path = config.path.as_path();
    if !path.is_file() {
        return Err(StartupError::ModelNotFound(path.to_path_buf()));
    }

    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    log::info!("Loading model from {}", path.display());
    match extension.as_str() {
        "onnx" => load_onnx(path),
        "pt" | "pth" => load_torch(path),
        _ => Err(StartupError::UnsupportedModelFormat(path.to_path_buf())),
    }
}

#[cfg(feature = "onnx")]
fn load_onnx(path: &Path) -> Result<Box<dyn Classifier>, StartupError> {
    Ok(Box::new(onnx::OnnxClassifier::load(path)?))
}

#[cfg(not(feature = "onnx"))]
fn load_onnx(path: &Path) -> Result<Box<dyn Classifier>, StartupError> {
    Err(StartupError::EngineDisabled {
        path: path.to_path_buf(),
        feature: "onnx",
    })
}

#[cfg(feature = "torch")]
fn load_torch(path: &Path) -> Result<Box<dyn Classifier>, StartupError> {
    Ok(Box::new(torch::TorchClassifier::load(path)?))
}

#[cfg(not(feature = "torch"))]
fn load_torch(path: &Path) -> Result<Box<dyn Classifier>, StartupError> {
    Err(StartupError::EngineDisabled {
        path: path.to_path_buf(),
        feature: "torch",
    })
}
