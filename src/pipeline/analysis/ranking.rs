use chrono::Datelike;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, instrument};

use crate::domain::{LayoffRecord, YearlyRank};

/// Dense-ranks companies by yearly layoffs and keeps the top band per year
#[derive(Debug, Clone)]
pub struct PartitionRanker {
    top_band: u32,
}

impl Default for PartitionRanker {
    fn default() -> Self {
        Self::new(crate::constants::DEFAULT_TOP_BAND)
    }
}

impl PartitionRanker {
    pub fn new(top_band: u32) -> Self {
        Self { top_band }
    }

    pub fn top_band(&self) -> u32 {
        self.top_band
    }

    /// Sum layoffs per (year, company); undated records are excluded
    pub fn yearly_totals(records: &[LayoffRecord]) -> BTreeMap<i32, HashMap<Option<String>, u64>> {
        let mut by_year: BTreeMap<i32, HashMap<Option<String>, u64>> = BTreeMap::new();
        for record in records {
            let Some(date) = record.date else { continue };
            let total = by_year
                .entry(date.year())
                .or_default()
                .entry(record.company.clone())
                .or_insert(0);
            *total = total.saturating_add(record.laid_off_or_zero());
        }
        by_year
    }

    /// Ranked rows grouped by ascending year, each year ordered by rank.
    ///
    /// Ties share a rank and the next distinct total takes the following
    /// rank with no gap. Equal totals are listed by company name.
    #[instrument(skip(self, records), fields(input = records.len(), band = self.top_band))]
    pub fn rank(&self, records: &[LayoffRecord]) -> Vec<YearlyRank> {
        let mut ranked = Vec::new();

        for (year, companies) in Self::yearly_totals(records) {
            let mut rows: Vec<(Option<String>, u64)> = companies.into_iter().collect();
            rows.sort_by(|(a_company, a_total), (b_company, b_total)| {
                b_total.cmp(a_total).then_with(|| a_company.cmp(b_company))
            });

            let mut rank = 0u32;
            let mut previous_total: Option<u64> = None;
            for (company, yearly_total) in rows {
                if previous_total != Some(yearly_total) {
                    rank += 1;
                    previous_total = Some(yearly_total);
                }
                if rank > self.top_band {
                    break;
                }
                ranked.push(YearlyRank {
                    year,
                    company,
                    yearly_total,
                    rank,
                });
            }
            debug!("Ranked year {} up to rank {}", year, rank.min(self.top_band));
        }

        ranked
    }
}
