use actix_files::Files;
use actix_multipart::{Field, Multipart};
use actix_web::{web, HttpResponse};
use futures::{StreamExt, TryStreamExt};
use log::{error, warn};
use shared::{HealthResponse, ModelInfo};
use std::path::PathBuf;

use crate::error::InferenceError;
use crate::service::{Analyzer, Upload};

const IMAGE_FIELD: &str = "image";

#[derive(Debug, Clone, Copy)]
pub struct UploadLimits {
    pub max_bytes: usize,
}

pub fn configure_routes(cfg: &mut web::ServiceConfig, frontend_dir: PathBuf) {
    cfg.service(web::resource("/api/inference").route(web::post().to(handle_inference)))
        .service(web::resource("/api/labels").route(web::get().to(get_labels)))
        .service(web::resource("/api/model").route(web::get().to(get_model_info)))
        .service(web::resource("/api/health").route(web::get().to(health)));

    if frontend_dir.is_dir() {
        cfg.service(Files::new("/", frontend_dir).index_file("index.html"));
    } else {
        warn!(
            "Frontend bundle not found at {}, serving the API only",
            frontend_dir.display()
        );
    }
}

async fn handle_inference(
    analyzer: web::Data<Analyzer>,
    limits: web::Data<UploadLimits>,
    payload: Multipart,
) -> Result<HttpResponse, InferenceError> {
    let upload = read_upload(payload, limits.max_bytes).await?;

    let result = web::block(move || analyzer.analyze(&upload))
        .await
        .map_err(|e| InferenceError::Worker(e.to_string()))?;

    match result {
        Ok(response) => Ok(HttpResponse::Ok().json(response)),
        Err(e) => {
            match e.kind() {
                shared::ErrorKind::Inference | shared::ErrorKind::Internal => {
                    error!("Model inference error: {}", e)
                }
                _ => warn!("Rejected upload: {}", e),
            }
            Err(e)
        }
    }
}

// The image is the field named `image`, or failing that the first field
// that carries a file name.
fn is_image_field(field: &Field) -> bool {
    field.name() == Some(IMAGE_FIELD)
        || field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .is_some()
}

async fn read_upload(mut payload: Multipart, max_bytes: usize) -> Result<Upload, InferenceError> {
    while let Some(mut field) = payload
        .try_next()
        .await
        .map_err(|e| InferenceError::Upload(e.to_string()))?
    {
        let wanted = is_image_field(&field);
        let content_type = field.content_type().map(|m| m.essence_str().to_string());
        let file_name = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .map(str::to_string);

        let mut bytes = Vec::new();
        while let Some(chunk) = field.next().await {
            let data = chunk.map_err(|e| InferenceError::Upload(e.to_string()))?;
            if !wanted {
                continue;
            }
            if bytes.len() + data.len() > max_bytes {
                return Err(InferenceError::PayloadTooLarge { limit: max_bytes });
            }
            bytes.extend_from_slice(&data);
        }

        if wanted && !bytes.is_empty() {
            return Ok(Upload {
                bytes,
                content_type,
                file_name,
            });
        }
    }

    Err(InferenceError::MissingImage)
}

async fn get_labels(analyzer: web::Data<Analyzer>) -> HttpResponse {
    HttpResponse::Ok().json(analyzer.labels().as_slice())
}

async fn get_model_info(info: web::Data<ModelInfo>) -> HttpResponse {
    HttpResponse::Ok().json(info.get_ref())
}

async fn health(analyzer: web::Data<Analyzer>) -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        status: "ok".to_string(),
        backend: analyzer.backend_name().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModelConfig;
    use crate::preprocess::tests::gradient_png;
    use crate::service::tests::sample_analyzer;
    use actix_web::http::StatusCode;
    use actix_web::http::header::CONTENT_TYPE;
    use actix_web::{test, App};
    use shared::{ErrorKind, ErrorResponse, InferenceResponse, LabelSet};

    const BOUNDARY: &str = "----wildvision-test-boundary";

    struct Part<'a> {
        name: &'a str,
        file_name: Option<&'a str>,
        content_type: Option<&'a str>,
        data: &'a [u8],
    }

    fn multipart_body(parts: &[Part]) -> Vec<u8> {
        let mut body = Vec::new();
        for part in parts {
            body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
            let mut disposition = format!("Content-Disposition: form-data; name=\"{}\"", part.name);
            if let Some(file_name) = part.file_name {
                disposition.push_str(&format!("; filename=\"{}\"", file_name));
            }
            body.extend_from_slice(disposition.as_bytes());
            body.extend_from_slice(b"\r\n");
            if let Some(content_type) = part.content_type {
                body.extend_from_slice(format!("Content-Type: {}\r\n", content_type).as_bytes());
            }
            body.extend_from_slice(b"\r\n");
            body.extend_from_slice(part.data);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
        body
    }

    fn inference_request(parts: &[Part]) -> test::TestRequest {
        test::TestRequest::post()
            .uri("/api/inference")
            .insert_header((
                CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            ))
            .set_payload(multipart_body(parts))
    }

    macro_rules! test_app {
        ($max_bytes:expr) => {{
            let analyzer = sample_analyzer();
            let info = ModelConfig::default().info(&LabelSet::animals(), analyzer.backend_name());
            test::init_service(
                App::new()
                    .app_data(web::Data::new(analyzer))
                    .app_data(web::Data::new(info))
                    .app_data(web::Data::new(UploadLimits { max_bytes: $max_bytes }))
                    .configure(|cfg| configure_routes(cfg, PathBuf::from("/nonexistent/dist"))),
            )
            .await
        }};
    }

    #[actix_web::test]
    async fn test_inference_returns_top_three() {
        let app = test_app!(1024 * 1024);
        let png = gradient_png(200, 150);
        let req = inference_request(&[Part {
            name: "image",
            file_name: Some("zoo.png"),
            content_type: Some("image/png"),
            data: &png,
        }])
        .to_request();

        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: InferenceResponse = test::read_body_json(resp).await;
        let labels: Vec<&str> = body.predictions.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, vec!["Horse", "Bear", "Lion"]);
        assert_eq!(body.file_name.as_deref(), Some("zoo.png"));
    }

    #[actix_web::test]
    async fn test_inference_skips_non_file_fields() {
        let app = test_app!(1024 * 1024);
        let png = gradient_png(64, 64);
        let req = inference_request(&[
            Part {
                name: "note",
                file_name: None,
                content_type: None,
                data: b"hello",
            },
            Part {
                name: "upload",
                file_name: Some("cat.png"),
                content_type: Some("image/png"),
                data: &png,
            },
        ])
        .to_request();

        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn test_corrupt_image_is_unprocessable() {
        let app = test_app!(1024 * 1024);
        let req = inference_request(&[Part {
            name: "image",
            file_name: Some("broken.jpg"),
            content_type: Some("image/jpeg"),
            data: b"\xff\xd8\xff\xe0 truncated",
        }])
        .to_request();

        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body: ErrorResponse = test::read_body_json(resp).await;
        assert_eq!(body.kind, ErrorKind::Decode);
    }

    #[actix_web::test]
    async fn test_wrong_media_type_is_rejected() {
        let app = test_app!(1024 * 1024);
        let req = inference_request(&[Part {
            name: "image",
            file_name: Some("notes.txt"),
            content_type: Some("text/plain"),
            data: b"just some text",
        }])
        .to_request();

        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }

    #[actix_web::test]
    async fn test_missing_image_is_bad_request() {
        let app = test_app!(1024 * 1024);
        let req = inference_request(&[Part {
            name: "note",
            file_name: None,
            content_type: None,
            data: b"no file here",
        }])
        .to_request();

        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: ErrorResponse = test::read_body_json(resp).await;
        assert_eq!(body.kind, ErrorKind::MissingImage);
    }

    #[actix_web::test]
    async fn test_oversized_upload_is_rejected() {
        let app = test_app!(64);
        let png = gradient_png(100, 100);
        let req = inference_request(&[Part {
            name: "image",
            file_name: Some("big.png"),
            content_type: Some("image/png"),
            data: &png,
        }])
        .to_request();

        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[actix_web::test]
    async fn test_labels_endpoint() {
        let app = test_app!(1024);
        let req = test::TestRequest::get().uri("/api/labels").to_request();
        let labels: Vec<String> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(labels.len(), 15);
        assert_eq!(labels[9], "Horse");
    }

    #[actix_web::test]
    async fn test_model_and_health_endpoints() {
        let app = test_app!(1024);

        let req = test::TestRequest::get().uri("/api/model").to_request();
        let info: ModelInfo = test::call_and_read_body_json(&app, req).await;
        assert_eq!(info.architecture, "Xception Backbone");
        assert_eq!(info.backend, "fixed");

        let req = test::TestRequest::get().uri("/api/health").to_request();
        let health: HealthResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(health.status, "ok");
    }
}
