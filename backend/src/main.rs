mod config;
mod error;
mod model;
mod preprocess;
mod routes;
mod service;

use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use config::AppConfig;
use error::StartupError;
use routes::{configure_routes, UploadLimits};
use service::Analyzer;
use shared::LabelSet;
use std::env;

fn startup_failure(err: StartupError) -> std::io::Error {
    log::error!("{}", err);
    err.into()
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    if let Ok(current_dir) = env::current_dir() {
        log::info!("Current working directory: {}", current_dir.display());
    } else {
        log::error!("Failed to get the current working directory.");
    }

    let config = AppConfig::load().map_err(startup_failure)?;

    // The model is loaded once here and shared read-only by every worker.
    let classifier = model::load_classifier(&config.model).map_err(startup_failure)?;
    let analyzer = Analyzer::new(classifier, LabelSet::animals(), config.model.apply_softmax)
        .map_err(startup_failure)?;

    let model_info = web::Data::new(
        config
            .model
            .info(analyzer.labels(), analyzer.backend_name()),
    );
    let analyzer = web::Data::new(analyzer);
    let limits = web::Data::new(UploadLimits {
        max_bytes: config.server.max_upload_bytes,
    });
    let frontend_dir = config.server.frontend_dir.clone();

    let bind_address = config.bind_address();
    log::info!("Starting server on {}", bind_address);

    let mut server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allowed_methods(vec!["GET", "POST", "OPTIONS"])
                    .allowed_headers(vec![
                        actix_web::http::header::ACCEPT,
                        actix_web::http::header::CONTENT_TYPE,
                    ])
                    .max_age(3600),
            )
            .app_data(analyzer.clone())
            .app_data(model_info.clone())
            .app_data(limits.clone())
            .configure(|cfg| configure_routes(cfg, frontend_dir.clone()))
    });

    if let Some(workers) = config.server.workers {
        server = server.workers(workers);
    }

    server.bind(&bind_address)?.run().await
}
