use std::collections::HashMap;
use tracing::{debug, info, instrument};

use crate::domain::LayoffRecord;

#[derive(Debug, Clone)]
pub struct FillOutcome {
    pub records: Vec<LayoffRecord>,
    pub filled: usize,
}

/// Fills a missing `industry` from another record of the same company.
///
/// The source index is built once from the unfilled dataset, so a value is
/// only ever copied from a record that had it originally.
#[derive(Debug, Clone, Default)]
pub struct NullFiller;

impl NullFiller {
    pub fn new() -> Self {
        Self
    }

    /// Map each company to the industry of its earliest record that has one
    pub fn industry_index(records: &[LayoffRecord]) -> HashMap<String, String> {
        let mut index = HashMap::new();
        for record in records {
            if let (Some(company), Some(industry)) = (&record.company, &record.industry) {
                index
                    .entry(company.clone())
                    .or_insert_with(|| industry.clone());
            }
        }
        index
    }

    /// `records` must be in ingestion order for the earliest-source rule to hold
    #[instrument(skip(self, records), fields(input = records.len()))]
    pub fn fill(&self, records: Vec<LayoffRecord>) -> FillOutcome {
        let index = Self::industry_index(&records);
        let mut filled = 0;

        let records = records
            .into_iter()
            .map(|mut record| {
                if record.industry.is_none() {
                    if let Some(industry) = record.company.as_ref().and_then(|c| index.get(c)) {
                        debug!(
                            "Record {}: industry filled with '{}'",
                            record.id, industry
                        );
                        record.industry = Some(industry.clone());
                        filled += 1;
                    }
                }
                record
            })
            .collect::<Vec<_>>();

        info!("Filled industry on {} of {} records", filled, records.len());
        FillOutcome { records, filled }
    }
}
