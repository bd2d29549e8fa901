//! Test doubles shared by the service and API tests

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::db::{DbError, DocumentFilter, DocumentStore};
use crate::service::llm::{ChatRequest, TextGeneration, TextGenerationError};
use crate::service::synthetic::NoteGenerator;

type Responder = Box<dyn Fn(&ChatRequest) -> Result<String, TextGenerationError> + Send + Sync>;

/// Text generator that replays a script, then falls back to a responder
pub struct ScriptedGenerator {
    script: Mutex<VecDeque<Result<String, TextGenerationError>>>,
    responder: Responder,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(&ChatRequest) -> Result<String, TextGenerationError> + Send + Sync + 'static,
    {
        Self {
            script: Mutex::new(VecDeque::new()),
            responder: Box::new(responder),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Always answer with the same text
    pub fn always(content: &str) -> Self {
        let content = content.to_string();
        Self::new(move |_| Ok(content.clone()))
    }

    /// Answer from `responses` in order, then with the responder
    pub fn with_script(self, responses: Vec<Result<String, TextGenerationError>>) -> Self {
        self.script.lock().unwrap().extend(responses);
        self
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGeneration for ScriptedGenerator {
    async fn complete(&self, request: &ChatRequest) -> Result<String, TextGenerationError> {
        self.prompts.lock().unwrap().push(request.prompt().to_string());
        let scripted = self.script.lock().unwrap().pop_front();
        match scripted {
            Some(response) => response,
            None => (self.responder)(request),
        }
    }
}

/// A non-success response from the service
pub fn status_error(status: u16, body: &str) -> TextGenerationError {
    TextGenerationError::Status {
        status,
        body: body.to_string(),
    }
}

/// Model output that extracts the given category and amount
pub fn extraction_json(category: &str, amount: serde_json::Value) -> String {
    serde_json::json!({
        "Claim Amount": amount,
        "Claims Category": category,
        "Date": "2024-05-01",
        "Policyholder ID": "ph-1"
    })
    .to_string()
}

/// Note generator that always returns the same note
pub struct FixedNoteGenerator(pub String);

impl NoteGenerator for FixedNoteGenerator {
    fn generate_note(&self, _policyholder_id: &str) -> String {
        self.0.clone()
    }
}

/// Document store whose backend is always down
pub struct UnavailableStore;

#[async_trait]
impl DocumentStore for UnavailableStore {
    async fn get(&self, _id: &str) -> Result<Value, DbError> {
        Err(DbError::Connection(sqlx::Error::PoolTimedOut))
    }

    async fn upsert(&self, _document: Value) -> Result<Value, DbError> {
        Err(DbError::Connection(sqlx::Error::PoolTimedOut))
    }

    async fn delete(&self, _id: &str) -> Result<bool, DbError> {
        Err(DbError::Connection(sqlx::Error::PoolTimedOut))
    }

    async fn query(&self, _filter: &DocumentFilter) -> Result<Vec<Value>, DbError> {
        Err(DbError::Connection(sqlx::Error::PoolTimedOut))
    }

    async fn ping(&self) -> Result<(), DbError> {
        Err(DbError::Connection(sqlx::Error::PoolTimedOut))
    }

    fn backend_name(&self) -> &'static str {
        "unavailable"
    }
}
