//! PostgreSQL-backed document store

use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;

use super::models::{DocumentFilter, DocumentRow, document_id};
use super::{DbError, DocumentStore};

/// Document store keeping each record as a JSONB row
#[derive(Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn get(&self, id: &str) -> Result<Value, DbError> {
        let row: DocumentRow = sqlx::query_as(
            r#"
            SELECT body FROM documents WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::NotFound(id.to_string()))?;

        Ok(row.body)
    }

    async fn upsert(&self, document: Value) -> Result<Value, DbError> {
        let id = document_id(&document)?.to_string();

        sqlx::query(
            r#"
            INSERT INTO documents (id, body) VALUES ($1, $2)
            ON CONFLICT (id) DO UPDATE SET
                body = EXCLUDED.body,
                updated_at = NOW()
            "#,
        )
        .bind(&id)
        .bind(&document)
        .execute(&self.pool)
        .await?;

        tracing::debug!(id = %id, "Upserted document");
        Ok(document)
    }

    async fn delete(&self, id: &str) -> Result<bool, DbError> {
        let result = sqlx::query(
            r#"
            DELETE FROM documents WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        let deleted = result.rows_affected() > 0;
        if deleted {
            tracing::debug!(id = %id, "Deleted document");
        }

        Ok(deleted)
    }

    async fn query(&self, filter: &DocumentFilter) -> Result<Vec<Value>, DbError> {
        const SELECT: &str = "SELECT body FROM documents";

        let rows: Vec<DocumentRow> = match filter {
            DocumentFilter::All => {
                sqlx::query_as(&format!("{} ORDER BY created_at", SELECT))
                    .fetch_all(&self.pool)
                    .await?
            }
            DocumentFilter::HasField(field) => {
                sqlx::query_as(&format!(
                    "{} WHERE body ? $1 AND jsonb_typeof(body -> $1) <> 'null' ORDER BY created_at",
                    SELECT
                ))
                .bind(field)
                .fetch_all(&self.pool)
                .await?
            }
            DocumentFilter::FieldEquals(field, value) => {
                sqlx::query_as(&format!(
                    "{} WHERE body ->> $1 = $2 ORDER BY created_at",
                    SELECT
                ))
                .bind(field)
                .bind(value)
                .fetch_all(&self.pool)
                .await?
            }
            DocumentFilter::FieldIn(field, values) => {
                if values.is_empty() {
                    return Ok(Vec::new());
                }
                sqlx::query_as(&format!(
                    "{} WHERE body ->> $1 = ANY($2) ORDER BY created_at",
                    SELECT
                ))
                .bind(field)
                .bind(values)
                .fetch_all(&self.pool)
                .await?
            }
        };

        tracing::debug!(filter = ?filter, count = rows.len(), "Queried documents");
        Ok(rows.into_iter().map(|row| row.body).collect())
    }

    async fn ping(&self) -> Result<(), DbError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}
