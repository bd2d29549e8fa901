//! Bearer token verification

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

const USERINFO_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AuthError {
    #[error("Missing bearer token")]
    MissingToken,

    #[error("Token rejected by identity provider (status {0})")]
    Rejected(u16),

    #[error("Identity provider request failed: {0}")]
    Upstream(#[from] reqwest::Error),
}

/// Who a verified token belongs to
#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    /// `sub` claim, when the provider returned one
    pub subject: Option<String>,
    /// Everything the provider returned about the user
    pub claims: Value,
}

impl Identity {
    pub fn from_claims(claims: Value) -> Self {
        let subject = claims.get("sub").and_then(Value::as_str).map(str::to_string);
        Self { subject, claims }
    }
}

#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<Identity, AuthError>;
}

/// Verifies tokens against an OpenID Connect user-info endpoint
pub struct UserInfoVerifier {
    client: reqwest::Client,
    userinfo_url: String,
}

impl UserInfoVerifier {
    pub fn new(userinfo_url: impl Into<String>) -> Result<Self, AuthError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(USERINFO_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            userinfo_url: userinfo_url.into(),
        })
    }
}

#[async_trait]
impl TokenVerifier for UserInfoVerifier {
    async fn verify(&self, token: &str) -> Result<Identity, AuthError> {
        if token.trim().is_empty() {
            return Err(AuthError::MissingToken);
        }

        let response = self
            .client
            .post(&self.userinfo_url)
            .bearer_auth(token)
            .send()
            .await?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            tracing::debug!(status = status.as_u16(), "User-info endpoint rejected token");
            return Err(AuthError::Rejected(status.as_u16()));
        }

        let claims = response.json::<Value>().await.unwrap_or(Value::Null);
        Ok(Identity::from_claims(claims))
    }
}

/// Accepts any non-empty token; for local runs without an identity provider
#[derive(Debug, Default, Clone, Copy)]
pub struct PermissiveVerifier;

#[async_trait]
impl TokenVerifier for PermissiveVerifier {
    async fn verify(&self, token: &str) -> Result<Identity, AuthError> {
        if token.trim().is_empty() {
            return Err(AuthError::MissingToken);
        }
        Ok(Identity {
            subject: None,
            claims: Value::Null,
        })
    }
}
