//! Policyholder records

use std::sync::Arc;

use crate::db::models::{from_document, to_document};
use crate::db::{DbError, DocumentFilter, DocumentStore};
use crate::model::Policyholder;
use crate::service::synthetic::generate_policyholder;

/// Field only policyholder documents carry
const POLICY_AMOUNT_FIELD: &str = "policy_amount";

#[derive(Clone)]
pub struct PolicyholderService {
    store: Arc<dyn DocumentStore>,
}

impl PolicyholderService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Insert or replace a policyholder
    pub async fn create(&self, policyholder: &Policyholder) -> Result<Policyholder, DbError> {
        from_document(self.store.upsert(to_document(policyholder)?).await?)
    }

    pub async fn list(&self) -> Result<Vec<Policyholder>, DbError> {
        self.query(&DocumentFilter::has_field(POLICY_AMOUNT_FIELD)).await
    }

    pub async fn get(&self, id: &str) -> Result<Policyholder, DbError> {
        let document = self.store.get(id).await?;
        if document.get(POLICY_AMOUNT_FIELD).is_none() {
            return Err(DbError::NotFound(id.to_string()));
        }
        from_document(document)
    }

    /// Replace an existing policyholder; the id from the path wins over the body
    pub async fn update(&self, id: &str, policyholder: Policyholder) -> Result<Policyholder, DbError> {
        self.get(id).await?;
        let policyholder = Policyholder {
            id: id.to_string(),
            ..policyholder
        };
        self.create(&policyholder).await
    }

    pub async fn delete(&self, id: &str) -> Result<(), DbError> {
        self.get(id).await?;
        if self.store.delete(id).await? {
            Ok(())
        } else {
            Err(DbError::NotFound(id.to_string()))
        }
    }

    /// Policyholders whose name matches exactly
    pub async fn search_by_name(&self, name: &str) -> Result<Vec<Policyholder>, DbError> {
        self.query(&DocumentFilter::field_equals("name", name)).await
    }

    /// Mean policy amount, zero when there are no policyholders
    pub async fn average_policy_amount(&self) -> Result<f64, DbError> {
        let policyholders = self.list().await?;
        if policyholders.is_empty() {
            return Ok(0.0);
        }
        let total: f64 = policyholders.iter().map(|p| p.policy_amount).sum();
        Ok(total / policyholders.len() as f64)
    }

    /// Build `count` random policyholders, storing them when asked
    pub async fn generate_synthetic(
        &self,
        count: u32,
        add_to_database: bool,
    ) -> Result<Vec<Policyholder>, DbError> {
        let policyholders: Vec<Policyholder> = (0..count).map(|_| generate_policyholder()).collect();

        if add_to_database {
            for policyholder in &policyholders {
                self.create(policyholder).await?;
            }
        }

        tracing::info!(
            count = policyholders.len(),
            stored = add_to_database,
            "Generated synthetic policyholders"
        );
        Ok(policyholders)
    }

    async fn query(&self, filter: &DocumentFilter) -> Result<Vec<Policyholder>, DbError> {
        let documents = self.store.query(filter).await?;
        let mut policyholders = Vec::with_capacity(documents.len());
        for document in documents {
            if document.get(POLICY_AMOUNT_FIELD).is_none() {
                continue;
            }
            match from_document::<Policyholder>(document) {
                Ok(policyholder) => policyholders.push(policyholder),
                Err(e) => tracing::warn!(error = %e, "Skipping malformed policyholder document"),
            }
        }
        Ok(policyholders)
    }
}
