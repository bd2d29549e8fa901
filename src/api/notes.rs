//! Claim note file endpoints

use actix_multipart::form::bytes::Bytes as FilePart;
use actix_multipart::form::text::Text;
use actix_multipart::form::{MultipartForm, MultipartFormConfig};
use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::api::auth::AuthenticatedUser;
use crate::api::error::ApiError;
use crate::service::ClaimNoteService;
use crate::service::blob::BlobInfo;

/// Largest accepted claim note upload
const MAX_NOTE_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Multipart claim note upload: the note file plus the claim it belongs to
#[derive(MultipartForm)]
pub struct UploadNoteForm {
    pub file: FilePart,
    #[multipart(rename = "claimId")]
    pub claim_id: Text<String>,
}

/// Documented shape of `UploadNoteForm`
#[derive(Deserialize, ToSchema)]
#[allow(dead_code)]
pub struct UploadNoteRequest {
    /// Note file; its file name becomes part of the blob name
    #[schema(value_type = String, format = Binary)]
    file: Vec<u8>,
    #[serde(rename = "claimId")]
    claim_id: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UploadNoteResponse {
    pub message: String,
    pub blob_name: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ClaimNotesResponse {
    pub claim_notes: Vec<BlobInfo>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ClaimNoteResponse {
    pub claim_note: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BlobNamesResponse {
    pub blob_names: Vec<String>,
}

/// Multipart limits; a form that can't be read is a bad request
pub fn multipart_config() -> MultipartFormConfig {
    MultipartFormConfig::default()
        .total_limit(MAX_NOTE_UPLOAD_BYTES)
        .memory_limit(MAX_NOTE_UPLOAD_BYTES)
        .error_handler(|err, _req| {
            tracing::debug!(error = %err, "Rejected multipart request body");
            ApiError::BadRequest(err.to_string()).into()
        })
}

/// Upload a note file for a claim
#[utoipa::path(
    post,
    path = "/claim-notes",
    request_body(content = UploadNoteRequest, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Note stored and linked to the claim", body = UploadNoteResponse),
        (status = 400, description = "Unreadable form or invalid file name", body = crate::api::error::ErrorResponse),
        (status = 404, description = "Claim not found", body = crate::api::error::ErrorResponse)
    ),
    tag = "notes"
)]
#[post("/claim-notes")]
pub async fn upload_claim_note(
    _user: AuthenticatedUser,
    service: web::Data<ClaimNoteService>,
    MultipartForm(form): MultipartForm<UploadNoteForm>,
) -> Result<HttpResponse, ApiError> {
    let filename = form
        .file
        .file_name
        .as_deref()
        .filter(|name| !name.is_empty())
        .ok_or_else(|| ApiError::BadRequest("file part has no file name".to_string()))?;

    let blob_name = service
        .upload_claim_note(&form.claim_id, filename, &form.file.data)
        .await?;

    Ok(HttpResponse::Ok().json(UploadNoteResponse {
        message: "Claim note uploaded".to_string(),
        blob_name,
    }))
}

/// Every stored note with its metadata
#[utoipa::path(
    get,
    path = "/claim-notes",
    responses(
        (status = 200, description = "Stored notes", body = ClaimNotesResponse),
        (status = 401, description = "Missing or invalid bearer token", body = crate::api::error::ErrorResponse)
    ),
    tag = "notes"
)]
#[get("/claim-notes")]
pub async fn list_claim_notes(
    _user: AuthenticatedUser,
    service: web::Data<ClaimNoteService>,
) -> Result<HttpResponse, ApiError> {
    let claim_notes = service.list_notes().await?;
    Ok(HttpResponse::Ok().json(ClaimNotesResponse { claim_notes }))
}

#[utoipa::path(
    get,
    path = "/claim-notes/{blob_name}",
    params(("blob_name" = String, Path, description = "Blob name")),
    responses(
        (status = 200, description = "Note text", body = ClaimNoteResponse),
        (status = 404, description = "Note not found", body = crate::api::error::ErrorResponse)
    ),
    tag = "notes"
)]
#[get("/claim-notes/{blob_name}")]
pub async fn get_claim_note(
    _user: AuthenticatedUser,
    service: web::Data<ClaimNoteService>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let claim_note = service.read_note(&path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ClaimNoteResponse { claim_note }))
}

/// Raw blob content
#[utoipa::path(
    get,
    path = "/download/{filename}",
    params(("filename" = String, Path, description = "Blob name")),
    responses(
        (status = 200, description = "Blob content", content_type = "application/octet-stream", body = Vec<u8>),
        (status = 404, description = "Blob not found", body = crate::api::error::ErrorResponse)
    ),
    tag = "notes"
)]
#[get("/download/{filename}")]
pub async fn download_blob(
    _user: AuthenticatedUser,
    service: web::Data<ClaimNoteService>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let bytes = service.download(&path.into_inner()).await?;
    Ok(HttpResponse::Ok()
        .content_type("application/octet-stream")
        .body(bytes))
}

#[utoipa::path(
    get,
    path = "/search-blob-filenames",
    responses(
        (status = 200, description = "Names of every stored blob", body = BlobNamesResponse),
        (status = 401, description = "Missing or invalid bearer token", body = crate::api::error::ErrorResponse)
    ),
    tag = "notes"
)]
#[get("/search-blob-filenames")]
pub async fn search_blob_filenames(
    _user: AuthenticatedUser,
    service: web::Data<ClaimNoteService>,
) -> Result<HttpResponse, ApiError> {
    let blob_names = service.blob_names().await?;
    Ok(HttpResponse::Ok().json(BlobNamesResponse { blob_names }))
}

/// Configure note routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(multipart_config())
        .service(upload_claim_note)
        .service(list_claim_notes)
        .service(get_claim_note)
        .service(download_blob)
        .service(search_blob_filenames);
}

#[cfg(test)]
mod tests {
    use crate::api::testing::{authorized, test_app, test_state};
    use crate::service::testing::ScriptedGenerator;
    use actix_web::http::StatusCode;
    use actix_web::test::{TestRequest, call_service, init_service, read_body, read_body_json};
    use serde_json::Value;
    use std::sync::Arc;

    const BOUNDARY: &str = "claim-note-form-boundary";

    /// Multipart body with optional `claimId` field and `file` part
    fn note_form(claim_id: Option<&str>, filename: &str, content: &str) -> String {
        let mut body = String::new();
        if let Some(claim_id) = claim_id {
            body.push_str(&format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"claimId\"\r\nContent-Type: text/plain\r\n\r\n{claim_id}\r\n"
            ));
        }
        body.push_str(&format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\nContent-Type: text/plain\r\n\r\n{content}\r\n--{BOUNDARY}--\r\n"
        ));
        body
    }

    fn upload_request(body: String) -> TestRequest {
        authorized(TestRequest::post().uri("/claim-notes"))
            .insert_header((
                "Content-Type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            ))
            .set_payload(body)
    }

    #[actix_web::test]
    async fn test_upload_then_read_back() {
        let (_dir, state) = test_state(Arc::new(ScriptedGenerator::always("{}")));
        let claim = state
            .claim_service
            .add_claim("ph-1", Some("hail".to_string()), false)
            .await
            .unwrap();
        let app = init_service(test_app(&state)).await;

        let req = upload_request(note_form(
            Some(&claim.id),
            "roof.txt",
            "Hail dented the roof on April 3rd.",
        ))
        .to_request();
        let resp = call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = read_body_json(resp).await;
        assert_eq!(body["message"], "Claim note uploaded");
        let blob_name = body["blob_name"].as_str().unwrap().to_string();
        assert_eq!(blob_name, format!("claim_note_{}_roof.txt", claim.id));

        let req = authorized(TestRequest::get().uri(&format!("/claim-notes/{blob_name}"))).to_request();
        let body: Value = read_body_json(call_service(&app, req).await).await;
        assert_eq!(body["claim_note"], "Hail dented the roof on April 3rd.");

        let req = authorized(TestRequest::get().uri(&format!("/download/{blob_name}"))).to_request();
        let resp = call_service(&app, req).await;
        assert_eq!(
            resp.headers().get("content-type").unwrap(),
            "application/octet-stream"
        );
        assert_eq!(read_body(resp).await, "Hail dented the roof on April 3rd.");

        let req = authorized(TestRequest::get().uri("/claim-notes")).to_request();
        let body: Value = read_body_json(call_service(&app, req).await).await;
        assert_eq!(body["claim_notes"][0]["metadata"]["claim_id"], claim.id.as_str());

        let req = authorized(TestRequest::get().uri("/search-blob-filenames")).to_request();
        let body: Value = read_body_json(call_service(&app, req).await).await;
        assert_eq!(body["blob_names"], serde_json::json!([blob_name]));

        let stored = state.claim_service.get(&claim.id).await.unwrap();
        assert_eq!(stored.file_blob_name.as_deref(), Some(blob_name.as_str()));
    }

    #[actix_web::test]
    async fn test_upload_for_unknown_claim_is_404() {
        let (_dir, state) = test_state(Arc::new(ScriptedGenerator::always("{}")));
        let app = init_service(test_app(&state)).await;

        let req = upload_request(note_form(Some("nope"), "a.txt", "x")).to_request();
        assert_eq!(call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

        let req = authorized(TestRequest::get().uri("/search-blob-filenames")).to_request();
        let body: Value = read_body_json(call_service(&app, req).await).await;
        assert_eq!(body["blob_names"], serde_json::json!([]));
    }

    #[actix_web::test]
    async fn test_form_without_claim_id_is_bad_request() {
        let (_dir, state) = test_state(Arc::new(ScriptedGenerator::always("{}")));
        let app = init_service(test_app(&state)).await;

        let req = upload_request(note_form(None, "a.txt", "x")).to_request();
        let resp = call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = read_body_json(resp).await;
        assert_eq!(body["error"], "bad_request");
    }

    #[actix_web::test]
    async fn test_missing_note_is_404() {
        let (_dir, state) = test_state(Arc::new(ScriptedGenerator::always("{}")));
        let app = init_service(test_app(&state)).await;

        let req = authorized(TestRequest::get().uri("/claim-notes/absent.txt")).to_request();
        assert_eq!(call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

        let req = authorized(TestRequest::get().uri("/download/absent.txt")).to_request();
        assert_eq!(call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
    }
}
