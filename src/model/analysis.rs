//! Request and response bodies of the analysis endpoints

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::claims::ExtractionOutcome;

/// One claim to categorize, as sent by the client
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct ClaimToAnalyze {
    pub id: String,
    #[serde(default)]
    pub textfile: Option<String>,
    #[serde(default)]
    pub gptmsg: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct ClaimsAnalysisRequest {
    #[serde(default)]
    pub claims: Vec<ClaimToAnalyze>,
    /// Use the prompt with per-category keyword hints
    #[serde(rename = "betterPrompt", default)]
    pub better_prompt: bool,
}

/// Analysis of one claim in the order it was received
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ClaimAnalysisEntry {
    pub id: String,
    #[schema(value_type = Option<Object>)]
    pub textfile_analysis: Option<ExtractionOutcome>,
    #[schema(value_type = Option<Object>)]
    pub gptmsg_analysis: Option<ExtractionOutcome>,
    /// Whether the analysis was stored on the claim
    pub persisted: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ClaimsAnalysisResponse {
    pub analysis: Vec<ClaimAnalysisEntry>,
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct ClaimIdsRequest {
    #[serde(rename = "claimIds")]
    pub claim_ids: Vec<String>,
}

/// Elaborated note text keyed by claim id
pub type ElaboratedNotes = BTreeMap<String, String>;
