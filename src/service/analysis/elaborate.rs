//! Turning brief claim notes into adjuster-style notes

use std::sync::Arc;

use crate::model::{ElaboratedNotes, TextGenerationConfig};
use crate::service::claim::ClaimService;
use crate::service::claims::prompts::build_elaboration_prompt;
use crate::service::llm::{ChatRequest, TextGeneration};

pub struct ClaimElaborator {
    generator: Arc<dyn TextGeneration>,
    claims: ClaimService,
    mode: String,
    instruction_template: String,
}

impl ClaimElaborator {
    pub fn new(
        generator: Arc<dyn TextGeneration>,
        claims: ClaimService,
        config: &TextGenerationConfig,
    ) -> Self {
        Self {
            generator,
            claims,
            mode: config.mode.clone(),
            instruction_template: config.instruction_template.clone(),
        }
    }

    /// Elaborate each claim's note and store it as the claim's `gptmsg`
    ///
    /// One request per claim, no retry. Claims that are missing, have no note,
    /// or fail are left out of the result.
    pub async fn process_claims(&self, claim_ids: &[String]) -> ElaboratedNotes {
        let mut elaborated = ElaboratedNotes::new();

        for claim_id in claim_ids {
            if let Some(text) = self.process_claim(claim_id).await {
                elaborated.insert(claim_id.clone(), text);
            }
        }

        tracing::info!(
            requested = claim_ids.len(),
            elaborated = elaborated.len(),
            "Claim notes elaborated"
        );
        elaborated
    }

    async fn process_claim(&self, claim_id: &str) -> Option<String> {
        let claim = match self.claims.get(claim_id).await {
            Ok(claim) => claim,
            Err(e) => {
                tracing::warn!(claim_id = %claim_id, error = %e, "Claim to elaborate not loaded");
                return None;
            }
        };

        let note = claim.textfile.filter(|text| !text.trim().is_empty())?;

        let request = ChatRequest::user_prompt(
            build_elaboration_prompt(&note),
            &self.mode,
            &self.instruction_template,
        );
        let start_time = std::time::Instant::now();
        let text = match self.generator.complete(&request).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(
                    claim_id = %claim_id,
                    elapsed_ms = start_time.elapsed().as_millis(),
                    error = %e,
                    "Claim note elaboration failed"
                );
                return None;
            }
        };

        if let Err(e) = self.claims.attach_gptmsg(claim_id, text.clone()).await {
            tracing::warn!(claim_id = %claim_id, error = %e, "Failed to store elaborated note");
            return None;
        }

        tracing::debug!(
            claim_id = %claim_id,
            elapsed_ms = start_time.elapsed().as_millis(),
            "Claim note elaborated"
        );
        Some(text)
    }
}
