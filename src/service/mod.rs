pub mod analysis;
pub mod auth;
pub mod blob;
pub mod claim;
pub mod claims;
pub mod llm;
pub mod notes;
pub mod policyholder;
pub mod synthetic;

#[cfg(test)]
pub mod testing;

pub use analysis::{ClaimElaborator, ClaimsAnalysisService};
pub use auth::{PermissiveVerifier, TokenVerifier, UserInfoVerifier};
pub use blob::{BlobStore, FsBlobStore};
pub use claim::ClaimService;
pub use claims::ClaimCategorizer;
pub use llm::TextGenerationClient;
pub use notes::ClaimNoteService;
pub use policyholder::PolicyholderService;
pub use synthetic::TemplateNoteGenerator;
