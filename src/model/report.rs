//! Aggregated category statistics

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Per-category occurrence counts and mean normalized amounts
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CategoryReport {
    pub counts: BTreeMap<String, u64>,
    pub averages: BTreeMap<String, f64>,
}

impl CategoryReport {
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

/// Summary over every analyzed claim, one report per text variant
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AnalysisSummary {
    pub textfile_category_counts: BTreeMap<String, u64>,
    pub textfile_category_averages: BTreeMap<String, f64>,
    pub gptmsg_category_counts: BTreeMap<String, u64>,
    pub gptmsg_category_averages: BTreeMap<String, f64>,
}

impl AnalysisSummary {
    pub fn from_reports(textfile: CategoryReport, gptmsg: CategoryReport) -> Self {
        Self {
            textfile_category_counts: textfile.counts,
            textfile_category_averages: textfile.averages,
            gptmsg_category_counts: gptmsg.counts,
            gptmsg_category_averages: gptmsg.averages,
        }
    }
}
