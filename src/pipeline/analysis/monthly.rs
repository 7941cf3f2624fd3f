use std::collections::BTreeMap;
use tracing::{debug, instrument};

use crate::domain::{LayoffRecord, MonthlyTotal, YearMonth};

/// Sums `total_laid_off` per calendar month
#[derive(Debug, Clone, Default)]
pub struct MonthlyAggregator;

impl MonthlyAggregator {
    pub fn new() -> Self {
        Self
    }

    /// Totals ordered ascending by month; undated records are skipped and an
    /// absent count contributes zero. Sums saturate at `u64::MAX`.
    #[instrument(skip(self, records), fields(input = records.len()))]
    pub fn aggregate(&self, records: &[LayoffRecord]) -> Vec<MonthlyTotal> {
        let mut buckets: BTreeMap<YearMonth, u64> = BTreeMap::new();
        let mut undated = 0usize;

        for record in records {
            match record.date {
                Some(date) => {
                    let total = buckets.entry(YearMonth::of(date)).or_insert(0);
                    *total = total.saturating_add(record.laid_off_or_zero());
                }
                None => undated += 1,
            }
        }

        debug!(
            "Aggregated {} months, skipped {} undated records",
            buckets.len(),
            undated
        );
        buckets
            .into_iter()
            .map(|(month, total)| MonthlyTotal { month, total })
            .collect()
    }
}
