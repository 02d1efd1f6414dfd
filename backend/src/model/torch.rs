use ndarray::Array4;
use shared::{INPUT_CHANNELS, INPUT_SIZE};
use std::path::Path;
use std::sync::Mutex;
use tch::{CModule, Device, Kind, Tensor};

use super::Classifier;
use crate::error::{InferenceError, StartupError};

impl From<tch::TchError> for InferenceError {
    fn from(err: tch::TchError) -> Self {
        InferenceError::Model(err.to_string())
    }
}

/// TorchScript model. `CModule` is not `Sync`, so forward passes are serialised.
pub struct TorchClassifier {
    model: Mutex<CModule>,
    device: Device,
}

impl TorchClassifier {
    pub fn load(path: &Path) -> Result<Self, StartupError> {
        let device = Device::cuda_if_available();
        let model = CModule::load_on_device(path, device)
            .map_err(|e| StartupError::ModelLoad(e.to_string()))?;
        log::info!("TorchScript model loaded on {:?}", device);

        Ok(Self {
            model: Mutex::new(model),
            device,
        })
    }
}

impl Classifier for TorchClassifier {
    fn predict(&self, input: &Array4<f32>) -> Result<Vec<f32>, InferenceError> {
        let data: Vec<f32> = input.iter().copied().collect();
        let tensor = Tensor::from_slice(&data)
            .view([1, INPUT_SIZE as i64, INPUT_SIZE as i64, INPUT_CHANNELS as i64])
            .to_device(self.device);

        let output = self
            .model
            .lock()
            .map_err(|_| InferenceError::Model("model lock poisoned".to_string()))?
            .forward_ts(&[tensor])?;

        let output_flat = output.to_kind(Kind::Float).to_device(Device::Cpu).view([-1]);
        let num_elements = output_flat.size()[0] as usize;
        let mut output_vec = vec![0.0f32; num_elements];
        output_flat.copy_data(&mut output_vec, num_elements);
        Ok(output_vec)
    }

    fn backend_name(&self) -> &'static str {
        "tch"
    }
}
