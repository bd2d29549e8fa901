//! Bearer token extractor for protected endpoints

use actix_web::dev::Payload;
use actix_web::http::header::AUTHORIZATION;
use actix_web::{FromRequest, HttpRequest, web};
use futures::future::LocalBoxFuture;

use crate::api::error::ApiError;
use crate::service::auth::{AuthError, Identity, TokenVerifier};

/// The caller of a protected endpoint, verified by the configured `TokenVerifier`
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub Identity);

impl AuthenticatedUser {
    /// `sub` claim, else the user name or email the provider returned
    pub fn subject(&self) -> &str {
        let identity = &self.0;
        identity
            .subject
            .as_deref()
            .or_else(|| identity.claims.get("preferred_username").and_then(|v| v.as_str()))
            .or_else(|| identity.claims.get("email").and_then(|v| v.as_str()))
            .unwrap_or("anonymous")
    }
}

/// Token from an `Authorization: Bearer <token>` header
fn bearer_token(req: &HttpRequest) -> Option<String> {
    let value = req.headers().get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then(|| token.to_string())
}

impl FromRequest for AuthenticatedUser {
    type Error = ApiError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let verifier = req.app_data::<web::Data<dyn TokenVerifier>>().cloned();
        let token = bearer_token(req);
        let path = req.path().to_string();

        Box::pin(async move {
            let verifier = verifier
                .ok_or_else(|| ApiError::Internal("Token verifier not configured".to_string()))?;
            let token = token.ok_or(AuthError::MissingToken)?;

            match verifier.verify(&token).await {
                Ok(identity) => Ok(AuthenticatedUser(identity)),
                Err(e) => {
                    tracing::debug!(path = %path, error = %e, "Request not authenticated");
                    Err(e.into())
                }
            }
        })
    }
}
