//! Blob storage for uploaded claim note files
//!
//! The filesystem backend keeps blob contents under `<root>/blobs/` and each
//! blob's metadata as a JSON sidecar under `<root>/metadata/`.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

const BLOBS_DIR: &str = "blobs";
const METADATA_DIR: &str = "metadata";
const BLOB_NAME_PATTERN: &str = r"^[A-Za-z0-9._-]+$";

pub type BlobMetadata = BTreeMap<String, String>;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BlobError {
    #[error("Invalid blob name '{0}'")]
    InvalidName(String),

    #[error("Blob not found: {0}")]
    NotFound(String),

    #[error("Blob storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Blob metadata error: {0}")]
    Metadata(#[from] serde_json::Error),

    #[error("Blob name pattern error: {0}")]
    Pattern(#[from] regex::Error),
}

/// A stored blob's name and metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BlobInfo {
    pub name: String,
    pub metadata: BlobMetadata,
}

#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store a blob, overwriting any blob with the same name
    async fn upload(&self, name: &str, bytes: &[u8], metadata: BlobMetadata) -> Result<(), BlobError>;

    async fn download(&self, name: &str) -> Result<Vec<u8>, BlobError>;

    /// Every blob, sorted by name
    async fn list(&self) -> Result<Vec<BlobInfo>, BlobError>;
}

/// Blob name for a claim note upload
pub fn claim_note_blob_name(claim_id: &str, filename: &str) -> String {
    format!("claim_note_{claim_id}_{filename}")
}

pub struct FsBlobStore {
    blobs_dir: PathBuf,
    metadata_dir: PathBuf,
    name_pattern: Regex,
}

impl FsBlobStore {
    /// Open a store rooted at `root`, creating its directories
    pub fn new(root: impl AsRef<Path>) -> Result<Self, BlobError> {
        let root = root.as_ref();
        let blobs_dir = root.join(BLOBS_DIR);
        let metadata_dir = root.join(METADATA_DIR);
        std::fs::create_dir_all(&blobs_dir)?;
        std::fs::create_dir_all(&metadata_dir)?;

        tracing::info!(root = %root.display(), "Blob store ready");

        Ok(Self {
            blobs_dir,
            metadata_dir,
            name_pattern: Regex::new(BLOB_NAME_PATTERN)?,
        })
    }

    fn validate_name(&self, name: &str) -> Result<(), BlobError> {
        if self.name_pattern.is_match(name) && name != "." && name != ".." {
            Ok(())
        } else {
            Err(BlobError::InvalidName(name.to_string()))
        }
    }

    fn metadata_path(&self, name: &str) -> PathBuf {
        self.metadata_dir.join(format!("{name}.json"))
    }

    async fn read_metadata(&self, name: &str) -> Result<BlobMetadata, BlobError> {
        match tokio::fs::read(self.metadata_path(name)).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(BlobMetadata::new()),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn upload(&self, name: &str, bytes: &[u8], metadata: BlobMetadata) -> Result<(), BlobError> {
        self.validate_name(name)?;
        tokio::fs::write(self.blobs_dir.join(name), bytes).await?;
        tokio::fs::write(self.metadata_path(name), serde_json::to_vec(&metadata)?).await?;

        tracing::debug!(blob = %name, size = bytes.len(), "Blob uploaded");
        Ok(())
    }

    async fn download(&self, name: &str) -> Result<Vec<u8>, BlobError> {
        self.validate_name(name)?;
        match tokio::fs::read(self.blobs_dir.join(name)).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(BlobError::NotFound(name.to_string())),
            Err(e) => Err(e.into()),
        }
    }

    async fn list(&self) -> Result<Vec<BlobInfo>, BlobError> {
        let mut names = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.blobs_dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }
        names.sort();

        let mut blobs = Vec::with_capacity(names.len());
        for name in names {
            let metadata = self.read_metadata(&name).await?;
            blobs.push(BlobInfo { name, metadata });
        }
        Ok(blobs)
    }
}
