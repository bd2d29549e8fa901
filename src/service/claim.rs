//! Claim record service

use std::sync::Arc;

use crate::db::models::{from_document, to_document};
use crate::db::{DbError, DocumentFilter, DocumentStore};
use crate::model::{Claim, ClaimAnalysis};
use crate::service::synthetic::NoteGenerator;

/// Field every claim document carries; policyholder documents don't
const POLICYHOLDER_FIELD: &str = "policyholder_id";
const ANALYSIS_FIELD: &str = "analysis";

/// Reads and writes claim documents
#[derive(Clone)]
pub struct ClaimService {
    store: Arc<dyn DocumentStore>,
    note_generator: Arc<dyn NoteGenerator>,
}

impl ClaimService {
    pub fn new(store: Arc<dyn DocumentStore>, note_generator: Arc<dyn NoteGenerator>) -> Self {
        Self {
            store,
            note_generator,
        }
    }

    /// Create a claim from explicit details, or from a generated note
    pub async fn add_claim(
        &self,
        policyholder_id: &str,
        details: Option<String>,
        generate_random: bool,
    ) -> Result<Claim, DbError> {
        let textfile = if generate_random {
            Some(self.note_generator.generate_note(policyholder_id))
        } else {
            details
        };

        let claim = Claim {
            id: uuid::Uuid::new_v4().to_string(),
            policyholder_id: policyholder_id.to_string(),
            textfile,
            gptmsg: None,
            file_blob_name: None,
            analysis: None,
        };

        self.save(&claim).await?;
        tracing::info!(claim_id = %claim.id, policyholder_id = %policyholder_id, "Claim added");
        Ok(claim)
    }

    /// Generate and store `number_of_notes` claims for each policyholder
    pub async fn generate_claim_notes(
        &self,
        number_of_notes: u32,
        policyholder_ids: &[String],
    ) -> Result<Vec<Claim>, DbError> {
        let mut created = Vec::new();
        for policyholder_id in policyholder_ids {
            for _ in 0..number_of_notes {
                created.push(self.add_claim(policyholder_id, None, true).await?);
            }
        }

        tracing::info!(
            policyholders = policyholder_ids.len(),
            claims_created = created.len(),
            "Generated synthetic claim notes"
        );
        Ok(created)
    }

    pub async fn get(&self, id: &str) -> Result<Claim, DbError> {
        from_document(self.store.get(id).await?)
    }

    /// All claims, or only those belonging to the given policyholders
    pub async fn list(&self, policyholder_ids: Option<Vec<String>>) -> Result<Vec<Claim>, DbError> {
        let filter = match policyholder_ids {
            Some(ids) if !ids.is_empty() => DocumentFilter::field_in(POLICYHOLDER_FIELD, ids),
            _ => DocumentFilter::has_field(POLICYHOLDER_FIELD),
        };
        self.query_claims(&filter).await
    }

    /// Claims with an analysis attached
    pub async fn list_analyzed(&self) -> Result<Vec<Claim>, DbError> {
        self.query_claims(&DocumentFilter::has_field(ANALYSIS_FIELD)).await
    }

    /// Delete claims by id, returning how many existed
    pub async fn delete_many(&self, ids: &[String]) -> Result<usize, DbError> {
        let mut deleted = 0;
        for id in ids {
            if self.store.delete(id).await? {
                deleted += 1;
            } else {
                tracing::debug!(claim_id = %id, "Claim to delete did not exist");
            }
        }
        Ok(deleted)
    }

    /// Replace the claim's analysis
    pub async fn attach_analysis(&self, id: &str, analysis: ClaimAnalysis) -> Result<Claim, DbError> {
        self.update(id, |claim| claim.analysis = Some(analysis)).await
    }

    /// Store a model-elaborated note on the claim
    pub async fn attach_gptmsg(&self, id: &str, gptmsg: String) -> Result<Claim, DbError> {
        self.update(id, |claim| claim.gptmsg = Some(gptmsg)).await
    }

    /// Record the blob holding the claim's uploaded note
    pub async fn attach_file_blob_name(&self, id: &str, blob_name: String) -> Result<Claim, DbError> {
        self.update(id, |claim| claim.file_blob_name = Some(blob_name))
            .await
    }

    async fn update<F>(&self, id: &str, apply: F) -> Result<Claim, DbError>
    where
        F: FnOnce(&mut Claim),
    {
        let mut claim = self.get(id).await?;
        apply(&mut claim);
        self.save(&claim).await?;
        Ok(claim)
    }

    async fn save(&self, claim: &Claim) -> Result<(), DbError> {
        self.store.upsert(to_document(claim)?).await?;
        Ok(())
    }

    async fn query_claims(&self, filter: &DocumentFilter) -> Result<Vec<Claim>, DbError> {
        let documents = self.store.query(filter).await?;
        let mut claims = Vec::with_capacity(documents.len());
        for document in documents {
            match from_document::<Claim>(document) {
                Ok(claim) => claims.push(claim),
                Err(e) => tracing::warn!(error = %e, "Skipping malformed claim document"),
            }
        }
        Ok(claims)
    }
}
