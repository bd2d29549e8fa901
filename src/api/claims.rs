//! Claim record endpoints

use actix_web::{HttpRequest, HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::api::auth::AuthenticatedUser;
use crate::api::error::ApiError;
use crate::model::{Claim, ClaimIdsRequest};
use crate::service::ClaimService;

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddClaimRequest {
    pub policyholder_id: String,
    #[serde(default)]
    pub details: Option<String>,
    /// Ignore `details` and generate a synthetic note
    #[serde(default)]
    pub generate_random: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AddClaimResponse {
    pub message: String,
    pub claim_note: Claim,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct GenerateClaimNotesRequest {
    pub number_of_notes: u32,
    #[serde(default)]
    pub policyholder_ids: Vec<String>,
    /// Single-policyholder form, merged into `policyholder_ids`
    #[serde(default)]
    pub policyholder_id: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct GeneratedClaimNote {
    pub policyholder_id: String,
    pub claim_note: Claim,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct GenerateClaimNotesResponse {
    pub message: String,
    pub uploaded_notes: Vec<GeneratedClaimNote>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ClaimListResponse {
    pub claims: Vec<Claim>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteClaimsResponse {
    pub message: String,
    pub deleted: usize,
}

/// Query parameters for listing claims
#[derive(Debug, Deserialize, IntoParams)]
pub struct ListClaimsParams {
    /// Policyholder ids to filter by; repeat the parameter or separate ids with commas
    pub policyholder_ids: Option<String>,
}

/// Every `policyholder_ids` value in the query string, comma lists split
fn policyholder_ids_from_query(query: &str) -> Option<Vec<String>> {
    let ids: Vec<String> = url::form_urlencoded::parse(query.as_bytes())
        .filter(|(key, _)| key == "policyholder_ids")
        .flat_map(|(_, value)| {
            value
                .split(',')
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(str::to_string)
                .collect::<Vec<_>>()
        })
        .collect();

    (!ids.is_empty()).then_some(ids)
}

/// Add a claim from explicit details or a generated note
#[utoipa::path(
    post,
    path = "/add-claim",
    request_body = AddClaimRequest,
    responses(
        (status = 200, description = "Claim created", body = AddClaimResponse),
        (status = 401, description = "Missing or invalid bearer token", body = crate::api::error::ErrorResponse),
        (status = 500, description = "Document store error", body = crate::api::error::ErrorResponse)
    ),
    tag = "claims"
)]
#[post("/add-claim")]
pub async fn add_claim(
    _user: AuthenticatedUser,
    service: web::Data<ClaimService>,
    request: web::Json<AddClaimRequest>,
) -> Result<HttpResponse, ApiError> {
    let request = request.into_inner();
    let claim = service
        .add_claim(&request.policyholder_id, request.details, request.generate_random)
        .await?;

    Ok(HttpResponse::Ok().json(AddClaimResponse {
        message: "Claim note added".to_string(),
        claim_note: claim,
    }))
}

/// List claims, optionally only those of some policyholders
#[utoipa::path(
    get,
    path = "/claims",
    params(ListClaimsParams),
    responses(
        (status = 200, description = "Claims", body = ClaimListResponse),
        (status = 401, description = "Missing or invalid bearer token", body = crate::api::error::ErrorResponse),
        (status = 500, description = "Document store error", body = crate::api::error::ErrorResponse)
    ),
    tag = "claims"
)]
#[get("/claims")]
pub async fn list_claims(
    _user: AuthenticatedUser,
    service: web::Data<ClaimService>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let policyholder_ids = policyholder_ids_from_query(req.query_string());
    let claims = service.list(policyholder_ids).await?;
    Ok(HttpResponse::Ok().json(ClaimListResponse { claims }))
}

/// Delete claims by id
#[utoipa::path(
    post,
    path = "/delete-claims",
    request_body = ClaimIdsRequest,
    responses(
        (status = 200, description = "Claims deleted", body = DeleteClaimsResponse),
        (status = 401, description = "Missing or invalid bearer token", body = crate::api::error::ErrorResponse),
        (status = 500, description = "Document store error", body = crate::api::error::ErrorResponse)
    ),
    tag = "claims"
)]
#[post("/delete-claims")]
pub async fn delete_claims(
    user: AuthenticatedUser,
    service: web::Data<ClaimService>,
    request: web::Json<ClaimIdsRequest>,
) -> Result<HttpResponse, ApiError> {
    let deleted = service.delete_many(&request.claim_ids).await?;
    tracing::info!(user = %user.subject(), requested = request.claim_ids.len(), deleted = deleted, "Claims deleted");

    Ok(HttpResponse::Ok().json(DeleteClaimsResponse {
        message: "Claims deleted successfully".to_string(),
        deleted,
    }))
}

/// Generate synthetic claim notes for policyholders and store them as claims
#[utoipa::path(
    post,
    path = "/generate-claim-notes",
    request_body = GenerateClaimNotesRequest,
    responses(
        (status = 200, description = "Claims created", body = GenerateClaimNotesResponse),
        (status = 401, description = "Missing or invalid bearer token", body = crate::api::error::ErrorResponse),
        (status = 500, description = "Document store error", body = crate::api::error::ErrorResponse)
    ),
    tag = "claims"
)]
#[post("/generate-claim-notes")]
pub async fn generate_claim_notes(
    _user: AuthenticatedUser,
    service: web::Data<ClaimService>,
    request: web::Json<GenerateClaimNotesRequest>,
) -> Result<HttpResponse, ApiError> {
    let request = request.into_inner();
    let mut policyholder_ids = request.policyholder_ids;
    if let Some(id) = request.policyholder_id
        && !policyholder_ids.contains(&id)
    {
        policyholder_ids.push(id);
    }

    let created = service
        .generate_claim_notes(request.number_of_notes, &policyholder_ids)
        .await?;

    let uploaded_notes = created
        .into_iter()
        .map(|claim| GeneratedClaimNote {
            policyholder_id: claim.policyholder_id.clone(),
            claim_note: claim,
        })
        .collect();

    Ok(HttpResponse::Ok().json(GenerateClaimNotesResponse {
        message: "Claim notes generated".to_string(),
        uploaded_notes,
    }))
}

/// Configure claim routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(add_claim)
        .service(list_claims)
        .service(delete_claims)
        .service(generate_claim_notes);
}
