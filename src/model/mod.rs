pub mod analysis;
pub mod claims;
pub mod config;
pub mod policyholder;
pub mod report;

pub use analysis::{
    ClaimAnalysisEntry, ClaimIdsRequest, ClaimToAnalyze, ClaimsAnalysisRequest, ClaimsAnalysisResponse,
    ElaboratedNotes,
};
pub use claims::{Claim, ClaimAnalysis, ExtractionFailure, ExtractionOutcome, StructuredClaimFields};
pub use config::{Config, RetryConfig, StorageBackend, TextGenerationConfig};
pub use policyholder::Policyholder;
pub use report::{AnalysisSummary, CategoryReport};
