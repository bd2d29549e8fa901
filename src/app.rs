//! Application state and service initialization
//!
//! Builds the storage backends, outbound clients and services once, then
//! hands them to every actix worker as `web::Data`.

use std::sync::Arc;

use actix_web::web;

use crate::db::{DocumentStore, MemoryDocumentStore, PgDocumentStore};
use crate::model::{Config, StorageBackend, TextGenerationConfig};
use crate::service::llm::TextGeneration;
use crate::service::{
    BlobStore, ClaimCategorizer, ClaimElaborator, ClaimNoteService, ClaimService,
    ClaimsAnalysisService, FsBlobStore, PermissiveVerifier, PolicyholderService,
    TemplateNoteGenerator, TextGenerationClient, TokenVerifier, UserInfoVerifier,
};

/// Application state containing all services and shared resources
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub verifier: Arc<dyn TokenVerifier>,
    pub claim_service: Arc<ClaimService>,
    pub policyholder_service: Arc<PolicyholderService>,
    pub analysis_service: Arc<ClaimsAnalysisService>,
    pub elaborator: Arc<ClaimElaborator>,
    pub note_service: Arc<ClaimNoteService>,
}

impl AppState {
    /// Initialize all services from configuration
    ///
    /// This performs:
    /// 1. Document store setup (PostgreSQL with schema, or in-memory)
    /// 2. Blob store directory setup
    /// 3. Text-generation client and token verifier construction
    pub async fn new(config: Config) -> Result<Self, AppError> {
        config.validate().map_err(AppError::InvalidConfig)?;

        let store: Arc<dyn DocumentStore> = match config.storage.backend {
            StorageBackend::Postgres => {
                let pool = crate::db::create_pool()
                    .await
                    .map_err(|e| AppError::DatabaseInit(e.to_string()))?;
                crate::db::init_schema(&pool)
                    .await
                    .map_err(|e| AppError::DatabaseInit(e.to_string()))?;
                Arc::new(PgDocumentStore::new(pool))
            }
            StorageBackend::Memory => {
                tracing::warn!("Using in-memory document store, records are lost on restart");
                Arc::new(MemoryDocumentStore::new())
            }
        };

        let blobs: Arc<dyn BlobStore> = Arc::new(
            FsBlobStore::new(&config.blob.root_dir)
                .map_err(|e| AppError::BlobStoreInit(e.to_string()))?,
        );

        let generator: Arc<dyn TextGeneration> = Arc::new(
            TextGenerationClient::new(&config.text_generation)
                .map_err(|e| AppError::ClientInit(e.to_string()))?,
        );

        let verifier: Arc<dyn TokenVerifier> = match config.auth.userinfo_url {
            Some(ref url) => {
                tracing::info!(userinfo_url = %url, "Bearer tokens verified against user-info endpoint");
                Arc::new(UserInfoVerifier::new(url.clone()).map_err(|e| AppError::ClientInit(e.to_string()))?)
            }
            None => {
                tracing::warn!("No user-info endpoint configured, accepting any bearer token");
                Arc::new(PermissiveVerifier)
            }
        };

        Ok(Self::from_parts(
            store,
            blobs,
            generator,
            verifier,
            &config.text_generation,
        ))
    }

    /// Build the service graph from already constructed backends
    pub fn from_parts(
        store: Arc<dyn DocumentStore>,
        blobs: Arc<dyn BlobStore>,
        generator: Arc<dyn TextGeneration>,
        verifier: Arc<dyn TokenVerifier>,
        text_generation: &TextGenerationConfig,
    ) -> Self {
        let claim_service = ClaimService::new(Arc::clone(&store), Arc::new(TemplateNoteGenerator));
        let categorizer = ClaimCategorizer::new(Arc::clone(&generator), text_generation);

        Self {
            policyholder_service: Arc::new(PolicyholderService::new(Arc::clone(&store))),
            analysis_service: Arc::new(ClaimsAnalysisService::new(
                Arc::new(categorizer),
                claim_service.clone(),
            )),
            elaborator: Arc::new(ClaimElaborator::new(
                generator,
                claim_service.clone(),
                text_generation,
            )),
            note_service: Arc::new(ClaimNoteService::new(blobs, claim_service.clone())),
            claim_service: Arc::new(claim_service),
            verifier,
            store,
        }
    }

    /// Register every shared service as app data
    pub fn register(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(web::Data::from(Arc::clone(&self.store)))
            .app_data(web::Data::from(Arc::clone(&self.verifier)))
            .app_data(web::Data::from(Arc::clone(&self.claim_service)))
            .app_data(web::Data::from(Arc::clone(&self.policyholder_service)))
            .app_data(web::Data::from(Arc::clone(&self.analysis_service)))
            .app_data(web::Data::from(Arc::clone(&self.elaborator)))
            .app_data(web::Data::from(Arc::clone(&self.note_service)));
    }
}

/// Application-level errors
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum AppError {
    /// Database initialization failed
    #[error("Database initialization failed: {0}")]
    DatabaseInit(String),

    /// Blob directory could not be prepared
    #[error("Blob store initialization failed: {0}")]
    BlobStoreInit(String),

    /// Outbound HTTP client could not be built
    #[error("HTTP client initialization failed: {0}")]
    ClientInit(String),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
