//! Policyholder endpoints

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::api::auth::AuthenticatedUser;
use crate::api::error::ApiError;
use crate::model::Policyholder;
use crate::service::PolicyholderService;

#[derive(Debug, Serialize, ToSchema)]
pub struct PolicyholderListResponse {
    pub policyholders: Vec<Policyholder>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PolicyholderResponse {
    pub policyholder: Policyholder,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SearchPolicyholdersRequest {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AverageAmountResponse {
    pub average_amount: f64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct GeneratePolicyholdersRequest {
    pub number_of_policyholders: u32,
    #[serde(default)]
    pub add_to_database: bool,
}

/// Create or replace a policyholder
#[utoipa::path(
    post,
    path = "/policyholders",
    request_body = Policyholder,
    responses(
        (status = 200, description = "Stored policyholder", body = Policyholder),
        (status = 401, description = "Missing or invalid bearer token", body = crate::api::error::ErrorResponse)
    ),
    tag = "policyholders"
)]
#[post("/policyholders")]
pub async fn create_policyholder(
    _user: AuthenticatedUser,
    service: web::Data<PolicyholderService>,
    policyholder: web::Json<Policyholder>,
) -> Result<HttpResponse, ApiError> {
    let stored = service.create(&policyholder).await?;
    Ok(HttpResponse::Ok().json(stored))
}

#[utoipa::path(
    get,
    path = "/policyholders",
    responses(
        (status = 200, description = "All policyholders", body = PolicyholderListResponse),
        (status = 401, description = "Missing or invalid bearer token", body = crate::api::error::ErrorResponse)
    ),
    tag = "policyholders"
)]
#[get("/policyholders")]
pub async fn list_policyholders(
    _user: AuthenticatedUser,
    service: web::Data<PolicyholderService>,
) -> Result<HttpResponse, ApiError> {
    let policyholders = service.list().await?;
    Ok(HttpResponse::Ok().json(PolicyholderListResponse { policyholders }))
}

/// Mean policy amount over all policyholders, 0 when there are none
#[utoipa::path(
    get,
    path = "/policyholders/average-amount",
    responses(
        (status = 200, description = "Average policy amount", body = AverageAmountResponse),
        (status = 401, description = "Missing or invalid bearer token", body = crate::api::error::ErrorResponse)
    ),
    tag = "policyholders"
)]
#[get("/policyholders/average-amount")]
pub async fn average_policy_amount(
    _user: AuthenticatedUser,
    service: web::Data<PolicyholderService>,
) -> Result<HttpResponse, ApiError> {
    let average_amount = service.average_policy_amount().await?;
    Ok(HttpResponse::Ok().json(AverageAmountResponse { average_amount }))
}

#[utoipa::path(
    get,
    path = "/policyholders/{id}",
    params(("id" = String, Path, description = "Policyholder ID")),
    responses(
        (status = 200, description = "Policyholder", body = PolicyholderResponse),
        (status = 404, description = "Policyholder not found", body = crate::api::error::ErrorResponse)
    ),
    tag = "policyholders"
)]
#[get("/policyholders/{id}")]
pub async fn get_policyholder(
    _user: AuthenticatedUser,
    service: web::Data<PolicyholderService>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let policyholder = service.get(&path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(PolicyholderResponse { policyholder }))
}

/// Replace a policyholder; the path id wins over the body id
#[utoipa::path(
    put,
    path = "/policyholders/{id}",
    params(("id" = String, Path, description = "Policyholder ID")),
    request_body = Policyholder,
    responses(
        (status = 200, description = "Updated policyholder", body = Policyholder),
        (status = 404, description = "Policyholder not found", body = crate::api::error::ErrorResponse)
    ),
    tag = "policyholders"
)]
#[put("/policyholders/{id}")]
pub async fn update_policyholder(
    _user: AuthenticatedUser,
    service: web::Data<PolicyholderService>,
    path: web::Path<String>,
    policyholder: web::Json<Policyholder>,
) -> Result<HttpResponse, ApiError> {
    let updated = service
        .update(&path.into_inner(), policyholder.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(updated))
}

#[utoipa::path(
    delete,
    path = "/policyholders/{id}",
    params(("id" = String, Path, description = "Policyholder ID")),
    responses(
        (status = 200, description = "Policyholder deleted"),
        (status = 404, description = "Policyholder not found", body = crate::api::error::ErrorResponse)
    ),
    tag = "policyholders"
)]
#[delete("/policyholders/{id}")]
pub async fn delete_policyholder(
    _user: AuthenticatedUser,
    service: web::Data<PolicyholderService>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    service.delete(&id).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Policyholder deleted",
        "id": id
    })))
}

/// Policyholders with exactly this name
#[utoipa::path(
    post,
    path = "/policyholders/search",
    request_body = SearchPolicyholdersRequest,
    responses(
        (status = 200, description = "Matching policyholders", body = PolicyholderListResponse),
        (status = 401, description = "Missing or invalid bearer token", body = crate::api::error::ErrorResponse)
    ),
    tag = "policyholders"
)]
#[post("/policyholders/search")]
pub async fn search_policyholders(
    _user: AuthenticatedUser,
    service: web::Data<PolicyholderService>,
    request: web::Json<SearchPolicyholdersRequest>,
) -> Result<HttpResponse, ApiError> {
    let policyholders = service.search_by_name(&request.name).await?;
    Ok(HttpResponse::Ok().json(PolicyholderListResponse { policyholders }))
}

/// Generate random policyholders, optionally storing them
#[utoipa::path(
    post,
    path = "/generate-synthetic-policyholders",
    request_body = GeneratePolicyholdersRequest,
    responses(
        (status = 200, description = "Generated policyholders", body = Vec<Policyholder>),
        (status = 401, description = "Missing or invalid bearer token", body = crate::api::error::ErrorResponse)
    ),
    tag = "policyholders"
)]
#[post("/generate-synthetic-policyholders")]
pub async fn generate_synthetic_policyholders(
    _user: AuthenticatedUser,
    service: web::Data<PolicyholderService>,
    request: web::Json<GeneratePolicyholdersRequest>,
) -> Result<HttpResponse, ApiError> {
    let policyholders = service
        .generate_synthetic(request.number_of_policyholders, request.add_to_database)
        .await?;
    Ok(HttpResponse::Ok().json(policyholders))
}

/// Configure policyholder routes
///
/// `average-amount` and `search` are registered before the `{id}` routes so
/// they aren't captured as ids.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(average_policy_amount)
        .service(search_policyholders)
        .service(create_policyholder)
        .service(list_policyholders)
        .service(get_policyholder)
        .service(update_policyholder)
        .service(delete_policyholder)
        .service(generate_synthetic_policyholders);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::{authorized, test_app, test_state};
    use crate::service::testing::ScriptedGenerator;
    use actix_web::http::StatusCode;
    use actix_web::test::{TestRequest, call_service, init_service, read_body_json};
    use serde_json::{Value, json};
    use std::sync::Arc;

    fn body(id: &str, name: &str, amount: f64) -> Value {
        json!({
            "id": id,
            "name": name,
            "age": 52,
            "policy_start_date": "2021-06-15",
            "policy_amount": amount
        })
    }

    #[actix_web::test]
    async fn test_policyholder_lifecycle() {
        let (_dir, state) = test_state(Arc::new(ScriptedGenerator::always("{}")));
        let app = init_service(test_app(&state)).await;

        let req = authorized(TestRequest::post().uri("/policyholders"))
            .set_json(body("p1", "Mary Jackson", 100_000.0))
            .to_request();
        assert_eq!(call_service(&app, req).await.status(), StatusCode::OK);

        let req = authorized(TestRequest::post().uri("/policyholders"))
            .set_json(body("p2", "Dorothy Vaughan", 200_000.0))
            .to_request();
        call_service(&app, req).await;

        let req = authorized(TestRequest::get().uri("/policyholders/average-amount")).to_request();
        let resp: Value = read_body_json(call_service(&app, req).await).await;
        assert_eq!(resp["average_amount"], 150_000.0);

        let req = authorized(TestRequest::get().uri("/policyholders/p1")).to_request();
        let resp: Value = read_body_json(call_service(&app, req).await).await;
        assert_eq!(resp["policyholder"]["name"], "Mary Jackson");

        let req = authorized(TestRequest::put().uri("/policyholders/p1"))
            .set_json(body("other", "Mary W. Jackson", 110_000.0))
            .to_request();
        let resp: Value = read_body_json(call_service(&app, req).await).await;
        assert_eq!(resp["id"], "p1");

        let req = authorized(TestRequest::post().uri("/policyholders/search"))
            .set_json(json!({"name": "Mary W. Jackson"}))
            .to_request();
        let resp: Value = read_body_json(call_service(&app, req).await).await;
        assert_eq!(resp["policyholders"].as_array().unwrap().len(), 1);

        let req = authorized(TestRequest::delete().uri("/policyholders/p1")).to_request();
        assert_eq!(call_service(&app, req).await.status(), StatusCode::OK);

        let req = authorized(TestRequest::get().uri("/policyholders/p1")).to_request();
        assert_eq!(call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

        let req = authorized(TestRequest::delete().uri("/policyholders/p1")).to_request();
        assert_eq!(call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_average_amount_without_policyholders() {
        let (_dir, state) = test_state(Arc::new(ScriptedGenerator::always("{}")));
        let app = init_service(test_app(&state)).await;

        let req = authorized(TestRequest::get().uri("/policyholders/average-amount")).to_request();
        let resp: Value = read_body_json(call_service(&app, req).await).await;
        assert_eq!(resp["average_amount"], 0.0);
    }

    #[actix_web::test]
    async fn test_generate_synthetic_policyholders() {
        let (_dir, state) = test_state(Arc::new(ScriptedGenerator::always("{}")));
        let app = init_service(test_app(&state)).await;

        let req = authorized(TestRequest::post().uri("/generate-synthetic-policyholders"))
            .set_json(json!({"number_of_policyholders": 3, "add_to_database": true}))
            .to_request();
        let resp: Value = read_body_json(call_service(&app, req).await).await;
        assert_eq!(resp.as_array().unwrap().len(), 3);

        let req = authorized(TestRequest::get().uri("/policyholders")).to_request();
        let resp: Value = read_body_json(call_service(&app, req).await).await;
        assert_eq!(resp["policyholders"].as_array().unwrap().len(), 3);
    }
}
