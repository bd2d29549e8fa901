//! Batch claims analysis
//!
//! Each claim in a batch is categorized once per available text variant, the
//! result is stored on the claim and reported back in request order. The
//! summary re-reads every analyzed claim and aggregates each variant
//! separately.

use std::sync::Arc;

use crate::db::DbError;
use crate::model::{
    AnalysisSummary, ClaimAnalysis, ClaimAnalysisEntry, ClaimToAnalyze, ExtractionOutcome,
};
use crate::service::claim::ClaimService;
use crate::service::claims::{ClaimCategorizer, PromptVariant};

pub mod aggregate;
pub mod elaborate;
pub mod normalize;

pub use aggregate::{AggregationRecordError, aggregate_categories};
pub use elaborate::ClaimElaborator;
pub use normalize::{AmountError, normalize_claim_amount};

pub struct ClaimsAnalysisService {
    categorizer: Arc<ClaimCategorizer>,
    claims: ClaimService,
}

impl ClaimsAnalysisService {
    pub fn new(categorizer: Arc<ClaimCategorizer>, claims: ClaimService) -> Self {
        Self { categorizer, claims }
    }

    /// Categorize a batch of claims one at a time and store each analysis
    ///
    /// A claim whose analysis can't be stored is still reported, with
    /// `persisted: false`. Nothing here aborts the batch.
    pub async fn analyze_batch(
        &self,
        batch: &[ClaimToAnalyze],
        variant: PromptVariant,
    ) -> Vec<ClaimAnalysisEntry> {
        let start_time = std::time::Instant::now();
        let mut entries = Vec::with_capacity(batch.len());

        for claim in batch {
            let analysis = ClaimAnalysis {
                textfile_analysis: self.categorize_text(claim.textfile.as_deref(), variant).await,
                gptmsg_analysis: self.categorize_text(claim.gptmsg.as_deref(), variant).await,
            };

            let persisted = match self.claims.attach_analysis(&claim.id, analysis.clone()).await {
                Ok(_) => true,
                Err(e) => {
                    tracing::warn!(
                        claim_id = %claim.id,
                        error = %e,
                        "Failed to store claim analysis"
                    );
                    false
                }
            };

            entries.push(ClaimAnalysisEntry {
                id: claim.id.clone(),
                textfile_analysis: analysis.textfile_analysis,
                gptmsg_analysis: analysis.gptmsg_analysis,
                persisted,
            });
        }

        tracing::info!(
            claims = batch.len(),
            persisted = entries.iter().filter(|entry| entry.persisted).count(),
            elapsed_ms = start_time.elapsed().as_millis(),
            "Claims batch analyzed"
        );

        entries
    }

    /// Aggregate the stored analyses of every analyzed claim
    pub async fn summarize(&self) -> Result<AnalysisSummary, DbError> {
        let analyzed = self.claims.list_analyzed().await?;

        let mut textfile_outcomes: Vec<&ExtractionOutcome> = Vec::new();
        let mut gptmsg_outcomes: Vec<&ExtractionOutcome> = Vec::new();
        for analysis in analyzed.iter().filter_map(|claim| claim.analysis.as_ref()) {
            textfile_outcomes.extend(analysis.textfile_analysis.as_ref());
            gptmsg_outcomes.extend(analysis.gptmsg_analysis.as_ref());
        }

        tracing::debug!(
            analyzed_claims = analyzed.len(),
            textfile_outcomes = textfile_outcomes.len(),
            gptmsg_outcomes = gptmsg_outcomes.len(),
            "Summarizing claim analyses"
        );

        Ok(AnalysisSummary::from_reports(
            aggregate_categories(textfile_outcomes),
            aggregate_categories(gptmsg_outcomes),
        ))
    }

    /// Empty or missing text is not sent to the model
    async fn categorize_text(
        &self,
        text: Option<&str>,
        variant: PromptVariant,
    ) -> Option<ExtractionOutcome> {
        match text {
            Some(text) if !text.trim().is_empty() => {
                Some(self.categorizer.categorize(text, variant).await)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{DocumentStore, MemoryDocumentStore};
    use crate::model::TextGenerationConfig;
    use crate::service::testing::{
        FixedNoteGenerator, ScriptedGenerator, UnavailableStore, extraction_json, status_error,
    };
    use serde_json::json;

    fn analysis_service(
        generator: Arc<ScriptedGenerator>,
        store: Arc<dyn DocumentStore>,
    ) -> ClaimsAnalysisService {
        let categorizer = ClaimCategorizer::new(generator, &TextGenerationConfig::default());
        let claims = ClaimService::new(store, Arc::new(FixedNoteGenerator(String::new())));
        ClaimsAnalysisService::new(Arc::new(categorizer), claims)
    }

    fn to_analyze(id: &str, textfile: Option<&str>, gptmsg: Option<&str>) -> ClaimToAnalyze {
        ClaimToAnalyze {
            id: id.to_string(),
            textfile: textfile.map(str::to_string),
            gptmsg: gptmsg.map(str::to_string),
        }
    }

    async fn seeded_claim(store: &Arc<MemoryDocumentStore>, text: &str) -> String {
        let claims = ClaimService::new(store.clone(), Arc::new(FixedNoteGenerator(String::new())));
        claims.add_claim("ph-1", Some(text.to_string()), false).await.unwrap().id
    }

    #[tokio::test]
    async fn test_batch_is_stored_and_reported_in_order() {
        let store = Arc::new(MemoryDocumentStore::new());
        let first = seeded_claim(&store, "Kitchen fire").await;
        let second = seeded_claim(&store, "Burst pipe").await;
        let generator = Arc::new(ScriptedGenerator::always(&extraction_json("Fire", json!("$100"))));
        let service = analysis_service(generator.clone(), store.clone());

        let entries = service
            .analyze_batch(
                &[
                    to_analyze(&first, Some("Kitchen fire"), Some("A detailed kitchen fire")),
                    to_analyze(&second, Some("Burst pipe"), None),
                ],
                PromptVariant::Terse,
            )
            .await;

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].id, first);
        assert_eq!(entries[1].id, second);
        assert!(entries.iter().all(|entry| entry.persisted));
        assert!(entries[0].gptmsg_analysis.is_some());
        assert!(entries[1].gptmsg_analysis.is_none());
        assert_eq!(generator.calls(), 3);

        let stored = ClaimService::new(store.clone(), Arc::new(FixedNoteGenerator(String::new())))
            .get(&first)
            .await
            .unwrap();
        let analysis = stored.analysis.unwrap();
        assert_eq!(analysis.textfile_analysis, entries[0].textfile_analysis);
        assert_eq!(stored.textfile.as_deref(), Some("Kitchen fire"));
    }

    #[tokio::test]
    async fn test_rerun_is_idempotent() {
        let store = Arc::new(MemoryDocumentStore::new());
        let id = seeded_claim(&store, "Stolen bicycle").await;
        let generator = Arc::new(ScriptedGenerator::always(&extraction_json("Theft", json!(300))));
        let service = analysis_service(generator, store.clone());
        let batch = [to_analyze(&id, Some("Stolen bicycle"), None)];

        let first_run = service.analyze_batch(&batch, PromptVariant::Guided).await;
        let after_first = store.get(&id).await.unwrap();
        let second_run = service.analyze_batch(&batch, PromptVariant::Guided).await;
        let after_second = store.get(&id).await.unwrap();

        assert_eq!(first_run, second_run);
        assert_eq!(after_first, after_second);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_rerun_is_idempotent_across_retries() {
        let store = Arc::new(MemoryDocumentStore::new());
        let id = seeded_claim(&store, "Burst pipe flooded the cellar").await;
        let generator = Arc::new(
            ScriptedGenerator::always(&extraction_json("Water Damage", json!("$4,200.00"))).with_script(vec![
                Ok("Sure! Here is the JSON:".to_string()),
                Err(status_error(503, "model loading")),
                Ok("{\"Claims Category\": ".to_string()),
            ]),
        );
        let service = analysis_service(generator.clone(), store.clone());
        let batch = [to_analyze(&id, Some("Burst pipe flooded the cellar"), None)];

        let first_run = service.analyze_batch(&batch, PromptVariant::Terse).await;
        assert_eq!(generator.calls(), 4);
        let after_first = store.get(&id).await.unwrap();

        let second_run = service.analyze_batch(&batch, PromptVariant::Terse).await;
        assert_eq!(generator.calls(), 5);
        let after_second = store.get(&id).await.unwrap();

        assert!(first_run[0].textfile_analysis.as_ref().is_some_and(|o| !o.is_failed()));
        assert_eq!(first_run, second_run);
        assert_eq!(after_first, after_second);
    }

    #[tokio::test]
    async fn test_missing_claim_does_not_abort_batch() {
        let store = Arc::new(MemoryDocumentStore::new());
        let known = seeded_claim(&store, "Hail on the roof").await;
        let generator = Arc::new(ScriptedGenerator::always(&extraction_json("Storm", json!(900))));
        let service = analysis_service(generator, store.clone());

        let entries = service
            .analyze_batch(
                &[
                    to_analyze("unknown-claim", Some("Water in basement"), None),
                    to_analyze(&known, Some("Hail on the roof"), None),
                ],
                PromptVariant::Terse,
            )
            .await;

        assert!(!entries[0].persisted);
        assert!(entries[0].textfile_analysis.is_some());
        assert!(entries[1].persisted);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_store_outage_reported_per_claim() {
        let generator = Arc::new(ScriptedGenerator::always(&extraction_json("Fire", json!(1))));
        let service = analysis_service(generator, Arc::new(UnavailableStore));

        let entries = service
            .analyze_batch(
                &[to_analyze("a", Some("fire"), None), to_analyze("b", Some("fire"), None)],
                PromptVariant::Terse,
            )
            .await;

        assert_eq!(entries.len(), 2);
        assert!(entries.iter().all(|entry| !entry.persisted));
        assert!(service.summarize().await.is_err());
    }

    #[tokio::test]
    async fn test_empty_text_is_not_categorized() {
        let store = Arc::new(MemoryDocumentStore::new());
        let id = seeded_claim(&store, "").await;
        let generator = Arc::new(ScriptedGenerator::always("{}"));
        let service = analysis_service(generator.clone(), store);

        let entries = service
            .analyze_batch(&[to_analyze(&id, Some("  "), None)], PromptVariant::Terse)
            .await;

        assert_eq!(generator.calls(), 0);
        assert!(entries[0].textfile_analysis.is_none());
        assert!(entries[0].persisted);
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let generator = Arc::new(ScriptedGenerator::always("{}"));
        let service = analysis_service(generator, Arc::new(MemoryDocumentStore::new()));

        assert!(service.analyze_batch(&[], PromptVariant::Terse).await.is_empty());
        assert_eq!(service.summarize().await.unwrap(), AnalysisSummary::default());
    }

    #[tokio::test]
    async fn test_summary_keeps_variants_separate() {
        let store = Arc::new(MemoryDocumentStore::new());
        let first = seeded_claim(&store, "fire one").await;
        let second = seeded_claim(&store, "fire two").await;
        seeded_claim(&store, "never analyzed").await;

        let generator = Arc::new(
            ScriptedGenerator::always("model gave up").with_script(vec![
                Ok(extraction_json("Fire", json!("$100"))),
                Ok(extraction_json("Fire Damage", json!(1000))),
                Ok(extraction_json("Fire", json!(300))),
            ]),
        );
        let service = analysis_service(generator, store);

        service
            .analyze_batch(
                &[
                    to_analyze(&first, Some("fire one"), Some("elaborated fire one")),
                    to_analyze(&second, Some("fire two"), None),
                ],
                PromptVariant::Terse,
            )
            .await;

        let summary = service.summarize().await.unwrap();
        assert_eq!(summary.textfile_category_counts.get("Fire"), Some(&2));
        assert_eq!(summary.textfile_category_averages.get("Fire"), Some(&200.0));
        assert_eq!(summary.gptmsg_category_counts.get("Fire Damage"), Some(&1));
        assert_eq!(summary.gptmsg_category_averages.get("Fire Damage"), Some(&1000.0));
        assert_eq!(summary.gptmsg_category_counts.get("Fire"), None);
    }

    #[tokio::test]
    async fn test_failed_categorization_is_stored_but_not_aggregated() {
        let store = Arc::new(MemoryDocumentStore::new());
        let id = seeded_claim(&store, "illegible").await;
        let generator = Arc::new(ScriptedGenerator::always("no json here"));
        let service = analysis_service(generator, store);

        let entries = service
            .analyze_batch(&[to_analyze(&id, Some("illegible"), None)], PromptVariant::Terse)
            .await;
        assert!(entries[0].textfile_analysis.as_ref().unwrap().is_failed());
        assert!(entries[0].persisted);

        let summary = service.summarize().await.unwrap();
        assert!(summary.textfile_category_counts.is_empty());
    }
}
