//! OpenAPI specification endpoints

use actix_web::{HttpResponse, get};
use utoipa::OpenApi;

use crate::api::error::ApiError;
use crate::api::{analysis, claims, health, notes, policyholders};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Claims Intelligence API",
        description = "Claims and policyholder records with LLM claim categorization and category analytics"
    ),
    paths(
        crate::api::root,
        health::liveness,
        health::readiness,
        analysis::claims_analysis,
        analysis::analyze_claims,
        analysis::process_claims,
        claims::add_claim,
        claims::list_claims,
        claims::delete_claims,
        claims::generate_claim_notes,
        policyholders::create_policyholder,
        policyholders::list_policyholders,
        policyholders::average_policy_amount,
        policyholders::get_policyholder,
        policyholders::update_policyholder,
        policyholders::delete_policyholder,
        policyholders::search_policyholders,
        policyholders::generate_synthetic_policyholders,
        notes::upload_claim_note,
        notes::list_claim_notes,
        notes::get_claim_note,
        notes::download_blob,
        notes::search_blob_filenames,
    ),
    components(schemas(
        crate::api::error::ErrorResponse,
        health::HealthStatus,
        health::ReadinessStatus,
        health::DependencyHealth,
        crate::model::Claim,
        crate::model::ClaimAnalysis,
        crate::model::Policyholder,
        crate::model::ClaimToAnalyze,
        crate::model::ClaimsAnalysisRequest,
        crate::model::ClaimAnalysisEntry,
        crate::model::ClaimsAnalysisResponse,
        crate::model::ClaimIdsRequest,
        crate::model::AnalysisSummary,
        crate::model::CategoryReport,
        claims::AddClaimRequest,
        claims::AddClaimResponse,
        claims::GenerateClaimNotesRequest,
        claims::GeneratedClaimNote,
        claims::GenerateClaimNotesResponse,
        claims::ClaimListResponse,
        claims::DeleteClaimsResponse,
        policyholders::PolicyholderListResponse,
        policyholders::PolicyholderResponse,
        policyholders::SearchPolicyholdersRequest,
        policyholders::AverageAmountResponse,
        policyholders::GeneratePolicyholdersRequest,
        notes::UploadNoteRequest,
        notes::UploadNoteResponse,
        notes::ClaimNotesResponse,
        notes::ClaimNoteResponse,
        notes::BlobNamesResponse,
        crate::service::blob::BlobInfo,
    )),
    tags(
        (name = "health", description = "Liveness and readiness probes"),
        (name = "analysis", description = "Claim categorization, elaboration and category statistics"),
        (name = "claims", description = "Claim records"),
        (name = "policyholders", description = "Policyholder records"),
        (name = "notes", description = "Claim note files")
    )
)]
pub struct ApiDoc;

/// Serve OpenAPI JSON specification
#[get("/openapi.json")]
pub async fn openapi_json() -> HttpResponse {
    HttpResponse::Ok().json(ApiDoc::openapi())
}

/// Serve OpenAPI YAML specification
#[get("/openapi.yaml")]
pub async fn openapi_yaml() -> Result<HttpResponse, ApiError> {
    let yaml = ApiDoc::openapi()
        .to_yaml()
        .map_err(|e| ApiError::Internal(format!("OpenAPI rendering failed: {e}")))?;

    Ok(HttpResponse::Ok().content_type("text/yaml").body(yaml))
}

/// Configure OpenAPI routes
pub fn configure(cfg: &mut actix_web::web::ServiceConfig) {
    cfg.service(openapi_json).service(openapi_yaml);
}
