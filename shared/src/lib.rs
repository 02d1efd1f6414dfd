use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod labels;
pub mod ranking;

pub use labels::{Animal, LabelMismatch, LabelSet, NUM_CLASSES};
pub use ranking::{Prediction, bar_width, format_confidence, rank, top_k};

pub const INPUT_SIZE: usize = 224;
pub const INPUT_CHANNELS: usize = 3;
pub const INPUT_SHAPE: [usize; 4] = [1, INPUT_SIZE, INPUT_SIZE, INPUT_CHANNELS];
pub const TOP_K: usize = 3;

pub const ACCEPTED_MIME_TYPES: [&str; 3] = ["image/jpeg", "image/jpg", "image/png"];

pub fn is_accepted_mime(mime: &str) -> bool {
    ACCEPTED_MIME_TYPES
        .iter()
        .any(|accepted| accepted.eq_ignore_ascii_case(mime.trim()))
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct InferenceResponse {
    pub request_id: Uuid,
    pub file_name: Option<String>,
    /// Best classes first.
    pub predictions: Vec<Prediction>,
    /// Full model output, index-aligned with the label set.
    pub probabilities: Vec<f32>,
    pub elapsed_ms: f64,
    pub analyzed_at: DateTime<Utc>,
}

impl InferenceResponse {
    pub fn top(&self) -> Option<&Prediction> {
        self.predictions.first()
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ModelInfo {
    pub name: String,
    pub tagline: String,
    pub architecture: String,
    pub features: Vec<String>,
    pub test_accuracy: f32,
    pub input_shape: [usize; 4],
    pub labels: Vec<String>,
    pub backend: String,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Decode,
    UnsupportedMediaType,
    MissingImage,
    PayloadTooLarge,
    Inference,
    Internal,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ErrorResponse {
    pub error: String,
    pub kind: ErrorKind,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct HealthResponse {
    pub status: String,
    pub backend: String,
}
