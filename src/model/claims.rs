//! Claim records and the structured fields extracted from claim notes

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

/// Value written into every field of a failed extraction
pub const ERROR_MARKER: &str = "error";

const CATEGORY_KEYS: &[&str] = &["Claims Category", "ClaimsCategory", "claims_category", "Category"];
const AMOUNT_KEYS: &[&str] = &["Claim Amount", "ClaimAmount", "claim_amount", "Amount"];
const DATE_KEYS: &[&str] = &["Date", "date", "Incident Date"];
const POLICYHOLDER_KEYS: &[&str] = &["Policyholder ID", "PolicyholderId", "policyholder_id"];

/// A policyholder-submitted claim as stored in the document store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Claim {
    pub id: String,
    pub policyholder_id: String,
    /// Original free-text claim note
    #[serde(default)]
    pub textfile: Option<String>,
    /// Model-elaborated version of the note
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gptmsg: Option<String>,
    /// Name of the uploaded note file in the blob store
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_blob_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<ClaimAnalysis>,
}

/// Categorization results for both text variants of a claim
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ClaimAnalysis {
    #[schema(value_type = Option<Object>)]
    pub textfile_analysis: Option<ExtractionOutcome>,
    #[schema(value_type = Option<Object>)]
    pub gptmsg_analysis: Option<ExtractionOutcome>,
}

/// Result of categorizing one piece of claim text
///
/// Serialized untagged: a success is the model's JSON as-is, a failure is the
/// sentinel error record.
///
/// A model reply that is literally `null` parses as an extraction but is
/// stored as a null analysis field, so it reads back as `None`. It carries
/// no category or amount, so aggregation is unaffected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExtractionOutcome {
    Failed(ExtractionFailure),
    Extracted(StructuredClaimFields),
}

impl ExtractionOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, ExtractionOutcome::Failed(_))
    }

    pub fn fields(&self) -> Option<&StructuredClaimFields> {
        match self {
            ExtractionOutcome::Extracted(fields) => Some(fields),
            ExtractionOutcome::Failed(_) => None,
        }
    }
}

/// Sentinel record returned once every categorization attempt has failed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionFailure {
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "PolicyholderId")]
    pub policyholder_id: String,
    #[serde(rename = "ClaimAmount")]
    pub claim_amount: String,
    #[serde(rename = "ClaimsCategory")]
    pub claims_category: String,
    /// Last raw response body, kept for diagnosis
    #[serde(rename = "BadReturn")]
    pub bad_return: String,
}

impl ExtractionFailure {
    pub fn new(bad_return: impl Into<String>) -> Self {
        Self {
            date: ERROR_MARKER.to_string(),
            policyholder_id: ERROR_MARKER.to_string(),
            claim_amount: ERROR_MARKER.to_string(),
            claims_category: ERROR_MARKER.to_string(),
            bad_return: bad_return.into(),
        }
    }
}

/// Fields extracted by the model, kept exactly as returned
///
/// Nothing is validated here. The accessors only locate values under the key
/// spellings models tend to produce; normalization happens during aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StructuredClaimFields(Value);

impl StructuredClaimFields {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Claims category, if present and not null
    pub fn category(&self) -> Option<&Value> {
        self.lookup(CATEGORY_KEYS)
    }

    /// Claim amount, if present and not null. May be a number or a currency string.
    pub fn amount(&self) -> Option<&Value> {
        self.lookup(AMOUNT_KEYS)
    }

    pub fn date(&self) -> Option<&Value> {
        self.lookup(DATE_KEYS)
    }

    pub fn policyholder_id(&self) -> Option<&Value> {
        self.lookup(POLICYHOLDER_KEYS)
    }

    fn lookup(&self, keys: &[&str]) -> Option<&Value> {
        let object = self.0.as_object()?;
        keys.iter()
            .filter_map(|key| object.get(*key))
            .find(|value| !value.is_null())
    }
}
