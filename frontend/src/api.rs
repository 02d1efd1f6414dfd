use gloo_console::error;
use gloo_file::File as GlooFile;
use gloo_net::http::{Request, Response};
use shared::{ErrorResponse, InferenceResponse, ModelInfo};

const INFERENCE_URL: &str = "/api/inference";
const MODEL_INFO_URL: &str = "/api/model";

async fn error_message(response: Response) -> String {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    match serde_json::from_str::<ErrorResponse>(&body) {
        Ok(parsed) => parsed.error,
        Err(_) => format!("Server error: {} - {}", status, body),
    }
}

pub async fn analyze_image(file: &GlooFile) -> Result<InferenceResponse, String> {
    let form_data = web_sys::FormData::new().map_err(|_| "Failed to build form data.".to_string())?;
    form_data
        .append_with_blob_and_filename("image", file.as_ref(), &file.name())
        .map_err(|_| "Failed to attach the image.".to_string())?;

    let request = Request::post(INFERENCE_URL)
        .body(form_data)
        .map_err(|e| format!("Failed to build request: {}", e))?;

    let response = request.send().await.map_err(|e| {
        error!(format!("Network error: {:?}", e));
        format!("Network error: {}", e)
    })?;

    if response.ok() {
        response
            .json::<InferenceResponse>()
            .await
            .map_err(|e| format!("Failed to parse response: {}", e))
    } else {
        Err(error_message(response).await)
    }
}

pub async fn fetch_model_info() -> Result<ModelInfo, String> {
    let response = Request::get(MODEL_INFO_URL)
        .send()
        .await
        .map_err(|e| format!("Network error: {}", e))?;

    if response.ok() {
        response
            .json::<ModelInfo>()
            .await
            .map_err(|e| format!("Failed to parse model info: {}", e))
    } else {
        Err(error_message(response).await)
    }
}
