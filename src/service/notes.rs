//! Claim note files: blobs linked to claim records

use std::sync::Arc;

use thiserror::Error;

use crate::db::DbError;
use crate::service::blob::{BlobError, BlobInfo, BlobMetadata, BlobStore, claim_note_blob_name};
use crate::service::claim::ClaimService;

const CLAIM_ID_METADATA_KEY: &str = "claim_id";

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum NoteError {
    #[error(transparent)]
    Blob(#[from] BlobError),

    #[error(transparent)]
    Db(#[from] DbError),
}

#[derive(Clone)]
pub struct ClaimNoteService {
    blobs: Arc<dyn BlobStore>,
    claims: ClaimService,
}

impl ClaimNoteService {
    pub fn new(blobs: Arc<dyn BlobStore>, claims: ClaimService) -> Self {
        Self { blobs, claims }
    }

    /// Store a note file for an existing claim and link it on the claim
    pub async fn upload_claim_note(
        &self,
        claim_id: &str,
        filename: &str,
        content: &[u8],
    ) -> Result<String, NoteError> {
        self.claims.get(claim_id).await?;

        let blob_name = claim_note_blob_name(claim_id, filename);
        let metadata = BlobMetadata::from([(CLAIM_ID_METADATA_KEY.to_string(), claim_id.to_string())]);
        self.blobs.upload(&blob_name, content, metadata).await?;
        self.claims.attach_file_blob_name(claim_id, blob_name.clone()).await?;

        tracing::info!(claim_id = %claim_id, blob = %blob_name, size = content.len(), "Claim note uploaded");
        Ok(blob_name)
    }

    pub async fn list_notes(&self) -> Result<Vec<BlobInfo>, NoteError> {
        Ok(self.blobs.list().await?)
    }

    pub async fn blob_names(&self) -> Result<Vec<String>, NoteError> {
        Ok(self.list_notes().await?.into_iter().map(|blob| blob.name).collect())
    }

    /// A note's text; invalid UTF-8 is replaced
    pub async fn read_note(&self, blob_name: &str) -> Result<String, NoteError> {
        let bytes = self.blobs.download(blob_name).await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    pub async fn download(&self, blob_name: &str) -> Result<Vec<u8>, NoteError> {
        Ok(self.blobs.download(blob_name).await?)
    }
}
