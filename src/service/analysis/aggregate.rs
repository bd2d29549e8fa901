//! Per-category counts and average amounts over extraction outcomes

use std::collections::BTreeMap;

use serde_json::Value;
use thiserror::Error;

use super::normalize::{AmountError, normalize_claim_amount};
use crate::model::{CategoryReport, ExtractionOutcome, StructuredClaimFields};

/// Why one record was left out of the aggregation
#[derive(Debug, Error, PartialEq)]
#[non_exhaustive]
pub enum AggregationRecordError {
    #[error("Claims category {0} is not a string")]
    NonStringCategory(Value),

    #[error(transparent)]
    Amount(#[from] AmountError),
}

/// Count claims per category and average their normalized amounts
///
/// Failed outcomes and records missing either a category or an amount are
/// left out entirely. A record that can't be read is logged and skipped.
pub fn aggregate_categories<'a, I>(outcomes: I) -> CategoryReport
where
    I: IntoIterator<Item = &'a ExtractionOutcome>,
{
    let mut counts: BTreeMap<String, u64> = BTreeMap::new();
    let mut totals: BTreeMap<String, f64> = BTreeMap::new();
    let mut skipped = 0usize;

    for fields in outcomes.into_iter().filter_map(ExtractionOutcome::fields) {
        match categorized_amount(fields) {
            Ok(Some((category, amount))) => {
                *counts.entry(category.clone()).or_default() += 1;
                *totals.entry(category).or_default() += amount;
            }
            Ok(None) => {}
            Err(e) => {
                skipped += 1;
                tracing::warn!(error = %e, "Skipping claim record during aggregation");
            }
        }
    }

    let averages = totals
        .into_iter()
        .filter_map(|(category, total)| {
            let count = *counts.get(&category)?;
            (count > 0).then(|| (category, total / count as f64))
        })
        .collect();

    if skipped > 0 {
        tracing::debug!(skipped = skipped, categories = counts.len(), "Aggregation finished");
    }

    CategoryReport { counts, averages }
}

/// The record's category and normalized amount, or None if either is absent
fn categorized_amount(
    fields: &StructuredClaimFields,
) -> Result<Option<(String, f64)>, AggregationRecordError> {
    let (Some(category), Some(amount)) = (fields.category(), fields.amount()) else {
        return Ok(None);
    };

    let category = match category {
        Value::String(name) if name.trim().is_empty() => return Ok(None),
        Value::String(name) => name.clone(),
        other => return Err(AggregationRecordError::NonStringCategory(other.clone())),
    };

    Ok(Some((category, normalize_claim_amount(amount)?)))
}
