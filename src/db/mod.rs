//! Document store for claim and policyholder records

pub mod memory;
pub mod models;
pub mod repository;

use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::env;

pub use memory::MemoryDocumentStore;
pub use models::DocumentFilter;
pub use repository::PgDocumentStore;

// Environment variable names
const ENV_POSTGRES_HOST: &str = "CLAIMS_POSTGRES_HOST";
const ENV_POSTGRES_PORT: &str = "CLAIMS_POSTGRES_PORT";
const ENV_POSTGRES_USER: &str = "CLAIMS_POSTGRES_USER";
const ENV_POSTGRES_PASSWORD: &str = "CLAIMS_POSTGRES_PASSWORD";
const ENV_POSTGRES_DB: &str = "CLAIMS_POSTGRES_DB";

// Default values
const DEFAULT_POSTGRES_HOST: &str = "127.0.0.1";
const DEFAULT_POSTGRES_PORT: &str = "5432";
const DEFAULT_POSTGRES_USER: &str = "claims";
const DEFAULT_POSTGRES_PASSWORD: &str = "claims";
const DEFAULT_POSTGRES_DB: &str = "claims";

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("Database connection error: {0}")]
    Connection(#[from] sqlx::Error),

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Id-keyed JSON document store
///
/// Every document is a JSON object with a string `id` field. `upsert` fully
/// replaces any existing document with the same id.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch a document by id
    async fn get(&self, id: &str) -> Result<Value, DbError>;

    /// Insert or replace a document, returning the stored document
    async fn upsert(&self, document: Value) -> Result<Value, DbError>;

    /// Delete a document by id. Returns false if it didn't exist.
    async fn delete(&self, id: &str) -> Result<bool, DbError>;

    /// All documents matching the filter, oldest first
    async fn query(&self, filter: &DocumentFilter) -> Result<Vec<Value>, DbError>;

    /// Check the backend is reachable
    async fn ping(&self) -> Result<(), DbError>;

    fn backend_name(&self) -> &'static str;
}

/// Create a new database connection pool
pub async fn create_pool() -> Result<PgPool, DbError> {
    let host = env::var(ENV_POSTGRES_HOST).unwrap_or_else(|_| DEFAULT_POSTGRES_HOST.to_string());
    let port = env::var(ENV_POSTGRES_PORT).unwrap_or_else(|_| DEFAULT_POSTGRES_PORT.to_string());
    let user = env::var(ENV_POSTGRES_USER).unwrap_or_else(|_| DEFAULT_POSTGRES_USER.to_string());
    let password =
        env::var(ENV_POSTGRES_PASSWORD).unwrap_or_else(|_| DEFAULT_POSTGRES_PASSWORD.to_string());
    let database = env::var(ENV_POSTGRES_DB).unwrap_or_else(|_| DEFAULT_POSTGRES_DB.to_string());

    let database_url = format!(
        "postgres://{}:{}@{}:{}/{}",
        user, password, host, port, database
    );

    tracing::debug!(host = %host, port = %port, database = %database, "Connecting to PostgreSQL");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&database_url)
        .await?;

    tracing::info!(host = %host, port = %port, "PostgreSQL connection established");

    Ok(pool)
}

/// Initialize database schema
pub async fn init_schema(pool: &PgPool) -> Result<(), DbError> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS documents (
            id VARCHAR(128) PRIMARY KEY,
            body JSONB NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_documents_body ON documents USING GIN (body)")
        .execute(pool)
        .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_documents_policyholder_id ON documents ((body ->> 'policyholder_id'))",
    )
    .execute(pool)
    .await?;

    tracing::info!("Database schema initialized");

    Ok(())
}
