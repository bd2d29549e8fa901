//! Claims analysis endpoints

use actix_web::{HttpResponse, post, web};

use crate::api::auth::AuthenticatedUser;
use crate::api::error::ApiError;
use crate::model::{
    AnalysisSummary, ClaimIdsRequest, ClaimsAnalysisRequest, ClaimsAnalysisResponse,
};
use crate::service::claims::PromptVariant;
use crate::service::{ClaimElaborator, ClaimsAnalysisService};

/// Categorize a batch of claims and store each analysis
#[utoipa::path(
    post,
    path = "/claims-analysis",
    request_body = ClaimsAnalysisRequest,
    responses(
        (status = 200, description = "Per-claim analysis in request order", body = ClaimsAnalysisResponse),
        (status = 401, description = "Missing or invalid bearer token", body = crate::api::error::ErrorResponse),
        (status = 500, description = "Malformed request body", body = crate::api::error::ErrorResponse)
    ),
    tag = "analysis"
)]
#[post("/claims-analysis")]
pub async fn claims_analysis(
    user: AuthenticatedUser,
    service: web::Data<ClaimsAnalysisService>,
    request: web::Json<ClaimsAnalysisRequest>,
) -> Result<HttpResponse, ApiError> {
    let request = request.into_inner();
    let variant = PromptVariant::from_better_prompt(request.better_prompt);

    tracing::info!(
        user = %user.subject(),
        claims = request.claims.len(),
        variant = ?variant,
        "Claims analysis requested"
    );

    let analysis = service.analyze_batch(&request.claims, variant).await;
    Ok(HttpResponse::Ok().json(ClaimsAnalysisResponse { analysis }))
}

/// Aggregate category counts and averages over every analyzed claim
#[utoipa::path(
    post,
    path = "/analyze-claims",
    responses(
        (status = 200, description = "Category statistics per text variant", body = AnalysisSummary),
        (status = 401, description = "Missing or invalid bearer token", body = crate::api::error::ErrorResponse),
        (status = 500, description = "Document store error", body = crate::api::error::ErrorResponse)
    ),
    tag = "analysis"
)]
#[post("/analyze-claims")]
pub async fn analyze_claims(
    _user: AuthenticatedUser,
    service: web::Data<ClaimsAnalysisService>,
) -> Result<HttpResponse, ApiError> {
    let summary = service.summarize().await?;
    Ok(HttpResponse::Ok().json(summary))
}

/// Elaborate claim notes with the text-generation service
#[utoipa::path(
    post,
    path = "/process-claims",
    request_body = ClaimIdsRequest,
    responses(
        (status = 200, description = "Elaborated note per claim id; failed claims are omitted", body = std::collections::BTreeMap<String, String>),
        (status = 401, description = "Missing or invalid bearer token", body = crate::api::error::ErrorResponse)
    ),
    tag = "analysis"
)]
#[post("/process-claims")]
pub async fn process_claims(
    _user: AuthenticatedUser,
    elaborator: web::Data<ClaimElaborator>,
    request: web::Json<ClaimIdsRequest>,
) -> Result<HttpResponse, ApiError> {
    let elaborated = elaborator.process_claims(&request.claim_ids).await;
    Ok(HttpResponse::Ok().json(elaborated))
}

/// Configure analysis routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(claims_analysis)
        .service(analyze_claims)
        .service(process_claims);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::{authorized, test_app, test_state, test_state_with_store};
    use crate::service::testing::{ScriptedGenerator, UnavailableStore, extraction_json};
    use actix_web::http::StatusCode;
    use actix_web::test::{TestRequest, call_service, init_service, read_body_json};
    use serde_json::{Value, json};
    use std::sync::Arc;

    #[actix_web::test]
    async fn test_claims_analysis_contract() {
        let generator = Arc::new(ScriptedGenerator::always(&extraction_json("Fire", json!("$100"))));
        let (_dir, state) = test_state(generator);
        let claim = state
            .claim_service
            .add_claim("ph-1", Some("Kitchen fire".to_string()), false)
            .await
            .unwrap();
        let app = init_service(test_app(&state)).await;

        let req = authorized(TestRequest::post().uri("/claims-analysis"))
            .set_json(json!({
                "claims": [
                    {"id": claim.id, "textfile": "Kitchen fire", "gptmsg": null},
                    {"id": "not-stored", "textfile": "Flood"}
                ],
                "betterPrompt": true
            }))
            .to_request();
        let resp = call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: Value = read_body_json(resp).await;
        let analysis = body["analysis"].as_array().unwrap();
        assert_eq!(analysis.len(), 2);
        assert_eq!(analysis[0]["id"], json!(claim.id));
        assert_eq!(analysis[0]["textfile_analysis"]["Claims Category"], "Fire");
        assert_eq!(analysis[0]["gptmsg_analysis"], Value::Null);
        assert_eq!(analysis[0]["persisted"], true);
        assert_eq!(analysis[1]["persisted"], false);
    }

    #[actix_web::test]
    async fn test_sentinel_record_on_the_wire() {
        let (_dir, state) = test_state(Arc::new(ScriptedGenerator::always("not json")));
        let app = init_service(test_app(&state)).await;

        let req = authorized(TestRequest::post().uri("/claims-analysis"))
            .set_json(json!({"claims": [{"id": "c1", "textfile": "???"}]}))
            .to_request();
        let body: Value = read_body_json(call_service(&app, req).await).await;

        assert_eq!(
            body["analysis"][0]["textfile_analysis"],
            json!({
                "Date": "error",
                "PolicyholderId": "error",
                "ClaimAmount": "error",
                "ClaimsCategory": "error",
                "BadReturn": "not json"
            })
        );
    }

    #[actix_web::test]
    async fn test_malformed_body_is_internal_error() {
        let (_dir, state) = test_state(Arc::new(ScriptedGenerator::always("{}")));
        let app = init_service(test_app(&state)).await;

        let req = authorized(TestRequest::post().uri("/claims-analysis"))
            .insert_header(("Content-Type", "application/json"))
            .set_payload("{\"claims\": [")
            .to_request();
        let resp = call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body: Value = read_body_json(resp).await;
        assert_eq!(body["error"], "internal_error");
    }

    #[actix_web::test]
    async fn test_requires_bearer_token() {
        let (_dir, state) = test_state(Arc::new(ScriptedGenerator::always("{}")));
        let app = init_service(test_app(&state)).await;

        let req = TestRequest::post().uri("/analyze-claims").to_request();
        assert_eq!(call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn test_analyze_claims_summary() {
        let generator = Arc::new(ScriptedGenerator::always(&extraction_json("Fire", json!(300))));
        let (_dir, state) = test_state(generator);
        let claim = state
            .claim_service
            .add_claim("ph-1", Some("fire".to_string()), false)
            .await
            .unwrap();
        let app = init_service(test_app(&state)).await;

        let req = authorized(TestRequest::post().uri("/claims-analysis"))
            .set_json(json!({"claims": [{"id": claim.id, "textfile": "fire"}]}))
            .to_request();
        call_service(&app, req).await;

        let req = authorized(TestRequest::post().uri("/analyze-claims")).to_request();
        let body: Value = read_body_json(call_service(&app, req).await).await;
        assert_eq!(body["textfile_category_counts"], json!({"Fire": 1}));
        assert_eq!(body["textfile_category_averages"], json!({"Fire": 300.0}));
        assert_eq!(body["gptmsg_category_counts"], json!({}));
        assert_eq!(body["gptmsg_category_averages"], json!({}));
    }

    #[actix_web::test]
    async fn test_summary_store_failure_is_500() {
        let (_dir, state) = test_state_with_store(
            Arc::new(ScriptedGenerator::always("{}")),
            Arc::new(UnavailableStore),
        );
        let app = init_service(test_app(&state)).await;

        let req = authorized(TestRequest::post().uri("/analyze-claims")).to_request();
        let resp = call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[actix_web::test]
    async fn test_process_claims_stores_gptmsg() {
        let generator = Arc::new(ScriptedGenerator::always("A detailed adjuster note."));
        let (_dir, state) = test_state(generator);
        let claim = state
            .claim_service
            .add_claim("ph-1", Some("hail".to_string()), false)
            .await
            .unwrap();
        let app = init_service(test_app(&state)).await;

        let req = authorized(TestRequest::post().uri("/process-claims"))
            .set_json(json!({"claimIds": [claim.id, "missing"]}))
            .to_request();
        let body: Value = read_body_json(call_service(&app, req).await).await;

        assert_eq!(body.as_object().unwrap().len(), 1);
        assert_eq!(body[claim.id.as_str()], "A detailed adjuster note.");
        let stored = state.claim_service.get(&claim.id).await.unwrap();
        assert_eq!(stored.gptmsg.as_deref(), Some("A detailed adjuster note."));
    }
}
