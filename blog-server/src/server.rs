use crate::application::blog_manager::BlogManager;
use crate::infrastructure::config::AppConfig;
use crate::presentation::handlers;
use crate::presentation::middleware::RequestContextMiddleware;
use crate::presentation::utils::{path_config, query_config};
use actix_cors::Cors;
use actix_web::middleware::{DefaultHeaders, Logger};
use actix_web::{App, HttpResponse, HttpServer, Responder, web};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;
use utoipa_swagger_ui::{Config, SwaggerUi};

const API_DOCUMENT: &str = include_str!("../static/masterblog.json");
const API_DOCUMENT_URL: &str = "/static/masterblog.json";

/// Registers the API routes. Shared by the binary and the HTTP tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    // the docs UI goes before the /api scope, which would otherwise swallow it
    cfg.app_data(query_config())
        .app_data(path_config())
        .service(SwaggerUi::new("/api/docs/{_:.*}").config(Config::from(API_DOCUMENT_URL)))
        .service(
            web::scope("/api")
                .route("/health", web::get().to(health))
                .service(handlers::post::scope()),
        )
        .route(API_DOCUMENT_URL, web::get().to(api_document));
}

pub async fn start_http_server(config: AppConfig, manager: BlogManager) -> anyhow::Result<()> {
    let bind_address = (config.host.clone(), config.port);
    info!(host = %bind_address.0, port = bind_address.1, "HTTP server starting");

    HttpServer::new(move || {
        let cors = build_cors(&config);

        App::new()
            .wrap(Logger::default())
            .wrap(RequestContextMiddleware)
            .wrap(
                DefaultHeaders::new()
                    .add(("X-Content-Type-Options", "nosniff"))
                    .add(("Referrer-Policy", "no-referrer"))
                    .add(("Permissions-Policy", "geolocation=()"))
                    .add(("Cross-Origin-Opener-Policy", "same-origin")),
            )
            .wrap(cors)
            .app_data(web::Data::new(manager.clone()))
            .configure(configure)
    })
    .bind(bind_address)?
    .run()
    .await?;

    info!("HTTP server stopped");
    Ok(())
}

pub fn build_cors(config: &AppConfig) -> Cors {
    let mut cors = Cors::default()
        .allowed_methods(vec!["GET", "POST", "PUT", "DELETE"])
        .allowed_headers(vec![
            actix_web::http::header::CONTENT_TYPE,
            actix_web::http::header::ACCEPT,
        ])
        .expose_headers(vec!["x-request-id"])
        .max_age(3600);

    if config.cors_origins.iter().any(|origin| origin == "*") {
        return cors.allow_any_origin();
    }
    for origin in &config.cors_origins {
        cors = cors.allowed_origin(origin);
    }

    cors
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
}

async fn health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "ok",
        timestamp: Utc::now(),
    })
}

async fn api_document() -> impl Responder {
    HttpResponse::Ok()
        .content_type("application/json")
        .body(API_DOCUMENT)
}
