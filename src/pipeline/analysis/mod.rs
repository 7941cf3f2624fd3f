// Analytical reports derived from the cleaned dataset

pub mod monthly;
pub mod ranking;
pub mod rolling;
pub mod summary;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::Config;
use crate::domain::{LayoffRecord, MonthlyTotal, RollingTotal, YearlyRank};
use crate::observability::metrics;

pub use monthly::MonthlyAggregator;
pub use ranking::PartitionRanker;
pub use rolling::RollingTotalComputer;
pub use summary::{summarize, totals_by, DatasetSummary, Dimension, DimensionTotal};

/// Every report produced from one cleaned dataset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSet {
    pub monthly: Vec<MonthlyTotal>,
    pub rolling: Vec<RollingTotal>,
    pub top_by_year: Vec<YearlyRank>,
    pub summary: DatasetSummary,
}

impl ReportSet {
    pub fn build(cleaned: &[LayoffRecord], config: &Config) -> Self {
        let monthly = MonthlyAggregator::new().aggregate(cleaned);
        metrics::reports::report_built("monthly");

        let rolling = RollingTotalComputer::new().compute(&monthly);
        metrics::reports::report_built("rolling");

        let top_by_year = PartitionRanker::new(config.ranking.top_band).rank(cleaned);
        metrics::reports::report_built("top_by_year");

        let summary = summarize(cleaned);
        metrics::reports::report_built("summary");

        info!(
            "Built reports: {} months, {} ranked rows",
            monthly.len(),
            top_by_year.len()
        );
        Self {
            monthly,
            rolling,
            top_by_year,
            summary,
        }
    }
}
