//! Claim categorization using the external text-generation service
//!
//! Sends one claim's text with an extraction prompt and parses the reply as
//! JSON. Transport failures and malformed output are retried by a single loop;
//! once attempts run out the caller gets the sentinel error record instead of
//! an error, so a batch keeps going.

use std::sync::Arc;

use serde_json::Value;

use crate::model::{ExtractionFailure, ExtractionOutcome, StructuredClaimFields, TextGenerationConfig};
use crate::service::llm::{ChatRequest, TextGeneration};

pub mod error;
pub mod prompts;
pub mod retry;

pub use error::CategorizationError;
pub use prompts::PromptVariant;
pub use retry::RetryPolicy;

use prompts::build_categorization_prompt;

/// End-of-sequence token some models leave in their output
const END_OF_SEQUENCE_MARKER: &str = "</s>";

/// Parse model output as JSON, ignoring everything after the end marker
pub fn parse_extraction(content: &str) -> Result<StructuredClaimFields, CategorizationError> {
    let candidate = content
        .split(END_OF_SEQUENCE_MARKER)
        .next()
        .unwrap_or_default();

    serde_json::from_str::<Value>(candidate)
        .map(StructuredClaimFields::new)
        .map_err(|source| CategorizationError::MalformedExtraction {
            source,
            raw: content.to_string(),
        })
}

/// Extracts structured fields from claim text
pub struct ClaimCategorizer {
    generator: Arc<dyn TextGeneration>,
    retry: RetryPolicy,
    mode: String,
    instruction_template: String,
}

impl ClaimCategorizer {
    pub fn new(generator: Arc<dyn TextGeneration>, config: &TextGenerationConfig) -> Self {
        Self {
            generator,
            retry: RetryPolicy::from(&config.retry),
            mode: config.mode.clone(),
            instruction_template: config.instruction_template.clone(),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Categorize one piece of claim text
    ///
    /// Never fails: after the last attempt the sentinel record is returned
    /// with the last raw response for diagnosis.
    pub async fn categorize(&self, claim_text: &str, variant: PromptVariant) -> ExtractionOutcome {
        let request = ChatRequest::user_prompt(
            build_categorization_prompt(claim_text, variant),
            &self.mode,
            &self.instruction_template,
        );

        let max_attempts = self.retry.max_attempts();
        let mut last_raw = String::new();

        for attempt in 1..=max_attempts {
            let start_time = std::time::Instant::now();

            match self.attempt(&request).await {
                Ok(fields) => {
                    tracing::debug!(
                        attempt = attempt,
                        date = ?fields.date(),
                        policyholder_id = ?fields.policyholder_id(),
                        elapsed_ms = start_time.elapsed().as_millis(),
                        variant = ?variant,
                        "Claim categorized"
                    );
                    return ExtractionOutcome::Extracted(fields);
                }
                Err(e) => {
                    tracing::warn!(
                        attempt = attempt,
                        max_attempts = max_attempts,
                        elapsed_ms = start_time.elapsed().as_millis(),
                        error = %e,
                        "Claim categorization attempt failed"
                    );
                    if let Some(raw) = e.raw_response() {
                        last_raw = raw.to_string();
                    }
                }
            }

            if attempt < max_attempts {
                let delay = self.retry.delay();
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
            }
        }

        tracing::error!(
            max_attempts = max_attempts,
            raw_length = last_raw.len(),
            "Claim categorization failed on every attempt, returning error record"
        );

        ExtractionOutcome::Failed(ExtractionFailure::new(last_raw))
    }

    async fn attempt(&self, request: &ChatRequest) -> Result<StructuredClaimFields, CategorizationError> {
        let content = self.generator.complete(request).await?;
        parse_extraction(&content)
    }
}
