use serde::{Deserialize, Serialize};
use shared::{INPUT_SHAPE, LabelSet, ModelInfo};
use std::env;
use std::path::{Path, PathBuf};

use crate::error::StartupError;

const CONFIG_ENV: &str = "WILDVISION_CONFIG";
const CONFIG_FILE: &str = "config/wildvision.yaml";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub model: ModelConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub frontend_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub workers: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8081,
            frontend_dir: workspace_path("frontend/dist"),
            max_upload_bytes: 20 * 1024 * 1024,
            workers: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub path: PathBuf,
    /// Set for models whose last layer emits logits instead of probabilities.
    pub apply_softmax: bool,
    pub name: String,
    pub tagline: String,
    pub architecture: String,
    pub features: Vec<String>,
    pub test_accuracy: f32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: workspace_path("models/final_model.onnx"),
            apply_softmax: false,
            name: "WildVision Pro".to_string(),
            tagline: "Advanced Animal Recognition with 96% Accuracy".to_string(),
            architecture: "Xception Backbone".to_string(),
            features: vec![
                "Global Average Pooling 2D".to_string(),
                "512-neuron Dense Layer".to_string(),
                "Dropout Regularization".to_string(),
                "15-class Output".to_string(),
            ],
            test_accuracy: 0.96,
        }
    }
}

impl ModelConfig {
    pub fn info(&self, labels: &LabelSet, backend: &str) -> ModelInfo {
        ModelInfo {
            name: self.name.clone(),
            tagline: self.tagline.clone(),
            architecture: self.architecture.clone(),
            features: self.features.clone(),
            test_accuracy: self.test_accuracy,
            input_shape: INPUT_SHAPE,
            labels: labels.as_slice().to_vec(),
            backend: backend.to_string(),
        }
    }
}

// Paths relative to the workspace root when run through cargo, otherwise
// relative to the working directory.
fn workspace_path(relative: &str) -> PathBuf {
    match env::var("CARGO_MANIFEST_DIR") {
        Ok(manifest_dir) => {
            let manifest_dir = Path::new(&manifest_dir);
            manifest_dir.parent().unwrap_or(manifest_dir).join(relative)
        }
        Err(_) => PathBuf::from(relative),
    }
}

fn resolve_against(root: &Path, path: &Path) -> PathBuf {
    if path.is_relative() {
        root.join(path)
    } else {
        path.to_path_buf()
    }
}

impl AppConfig {
    /// Reads the YAML config (if present) and applies environment overrides.
    pub fn load() -> Result<Self, StartupError> {
        let path = env::var(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| workspace_path(CONFIG_FILE));

        let mut config = if path.exists() {
            log::info!("Loading configuration from {}", path.display());
            Self::from_file(&path)?
        } else {
            log::warn!(
                "No configuration file at {}, using defaults",
                path.display()
            );
            Self::default()
        };

        config.apply_env_overrides(|key| env::var(key).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, StartupError> {
        let contents = std::fs::read_to_string(path).map_err(|source| StartupError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: Self =
            serde_yaml::from_str(&contents).map_err(|source| StartupError::ConfigParse {
                path: path.to_path_buf(),
                source,
            })?;

        // Relative paths in the file are relative to the directory above
        // `config/`, the workspace root for the bundled file.
        let root = path.parent().and_then(Path::parent).unwrap_or(Path::new(""));
        config.server.frontend_dir = resolve_against(root, &config.server.frontend_dir);
        config.model.path = resolve_against(root, &config.model.path);
        Ok(config)
    }

    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("PORT") {
            match port.parse() {
                Ok(port) => self.server.port = port,
                Err(_) => log::warn!("Ignoring invalid PORT value: {}", port),
            }
        }
        if let Some(frontend_dir) = lookup("FRONTEND_DIR") {
            self.server.frontend_dir = PathBuf::from(frontend_dir);
        }
        if let Some(model_path) = lookup("MODEL_PATH") {
            self.model.path = PathBuf::from(model_path);
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
