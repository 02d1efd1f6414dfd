use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use shared::{ErrorKind, ErrorResponse, LabelMismatch};
use std::path::PathBuf;

/// Failures scoped to a single analysis request.
#[derive(Debug, thiserror::Error)]
pub enum InferenceError {
    #[error("Failed to decode image: {0}")]
    Decode(String),
    #[error("Unsupported media type {0}, expected a JPEG or PNG image")]
    UnsupportedMediaType(String),
    #[error("No image was uploaded")]
    MissingImage,
    #[error("Upload exceeds the limit of {limit} bytes")]
    PayloadTooLarge { limit: usize },
    #[error("Failed to read upload: {0}")]
    Upload(String),
    #[error("Model error: {0}")]
    Model(String),
    #[error("Unexpected model output: {0}")]
    ShapeMismatch(#[from] LabelMismatch),
    #[error("Inference worker failed: {0}")]
    Worker(String),
}

impl InferenceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            InferenceError::Decode(_) => ErrorKind::Decode,
            InferenceError::UnsupportedMediaType(_) => ErrorKind::UnsupportedMediaType,
            InferenceError::MissingImage | InferenceError::Upload(_) => ErrorKind::MissingImage,
            InferenceError::PayloadTooLarge { .. } => ErrorKind::PayloadTooLarge,
            InferenceError::Model(_) | InferenceError::ShapeMismatch(_) => ErrorKind::Inference,
            InferenceError::Worker(_) => ErrorKind::Internal,
        }
    }
}

impl ResponseError for InferenceError {
    fn status_code(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::Decode => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorKind::UnsupportedMediaType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ErrorKind::MissingImage => StatusCode::BAD_REQUEST,
            ErrorKind::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ErrorKind::Inference | ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: self.to_string(),
            kind: self.kind(),
        })
    }
}

/// Failures that stop the server from starting.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("Failed to read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    #[error("Model file not found: {0}")]
    ModelNotFound(PathBuf),
    #[error("Unsupported model format for {0}, expected .onnx, .pt or .pth")]
    UnsupportedModelFormat(PathBuf),
    #[error("Cannot load {path}: rebuild with `--features {feature}`")]
    EngineDisabled {
        path: PathBuf,
        feature: &'static str,
    },
    #[error("Failed to load model: {0}")]
    ModelLoad(String),
    #[error("Model probe failed: {0}")]
    Probe(#[from] InferenceError),
    #[error("Label set does not match the model: {0}")]
    LabelMismatch(#[from] LabelMismatch),
}

impl From<StartupError> for std::io::Error {
    fn from(err: StartupError) -> Self {
        std::io::Error::new(std::io::ErrorKind::Other, err.to_string())
    }
}
