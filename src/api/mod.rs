pub mod analysis;
pub mod auth;
pub mod claims;
pub mod error;
pub mod health;
pub mod notes;
pub mod openapi;
pub mod policyholders;

use actix_web::{HttpResponse, Responder, get, web};

use error::ApiError;

/// JSON body settings; an unreadable body is reported as an internal error
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        tracing::debug!(error = %err, "Rejected JSON request body");
        ApiError::Internal(err.to_string()).into()
    })
}

/// API root
#[utoipa::path(
    get,
    path = "/",
    responses((status = 200, description = "API root")),
    tag = "health"
)]
#[get("/")]
pub async fn root() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({"message": "Claims Intelligence API Root"}))
}

/// Configure every route and the request body settings
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .service(root)
        .configure(health::configure)
        .configure(openapi::configure)
        .configure(analysis::configure)
        .configure(claims::configure)
        .configure(policyholders::configure)
        .configure(notes::configure);
}
