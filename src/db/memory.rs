//! In-process document store for local runs and tests

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use super::models::{DocumentFilter, document_id};
use super::{DbError, DocumentStore};

/// Documents kept in insertion order; an upsert of an existing id keeps its position
#[derive(Default)]
pub struct MemoryDocumentStore {
    documents: RwLock<Vec<Value>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }
}

fn has_id(document: &Value, id: &str) -> bool {
    document.get("id").and_then(Value::as_str) == Some(id)
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn get(&self, id: &str) -> Result<Value, DbError> {
        self.documents
            .read()
            .await
            .iter()
            .find(|doc| has_id(doc, id))
            .cloned()
            .ok_or_else(|| DbError::NotFound(id.to_string()))
    }

    async fn upsert(&self, document: Value) -> Result<Value, DbError> {
        let id = document_id(&document)?.to_string();
        let mut documents = self.documents.write().await;
        match documents.iter_mut().find(|doc| has_id(doc, &id)) {
            Some(existing) => *existing = document.clone(),
            None => documents.push(document.clone()),
        }
        Ok(document)
    }

    async fn delete(&self, id: &str) -> Result<bool, DbError> {
        let mut documents = self.documents.write().await;
        let before = documents.len();
        documents.retain(|doc| !has_id(doc, id));
        Ok(documents.len() < before)
    }

    async fn query(&self, filter: &DocumentFilter) -> Result<Vec<Value>, DbError> {
        Ok(self
            .documents
            .read()
            .await
            .iter()
            .filter(|doc| filter.matches(doc))
            .cloned()
            .collect())
    }

    async fn ping(&self) -> Result<(), DbError> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
