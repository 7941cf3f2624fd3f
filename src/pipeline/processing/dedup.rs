use chrono::NaiveDate;
use std::collections::HashMap;
use tracing::{debug, info, instrument};

use crate::config::AbsentKeyPolicy;
use crate::domain::{LayoffRecord, RawLayoffRecord, RecordId};
use crate::pipeline::processing::Normalizer;

/// Composite business key: company, location, industry, total, percentage, date.
///
/// Always built from normalized values, so two raw rows that only differ by
/// whitespace, blank-vs-missing text or date spelling share a key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DuplicateKey {
    company: Option<String>,
    location: Option<String>,
    industry: Option<String>,
    total_laid_off: Option<u64>,
    percentage_bits: Option<u64>,
    date: Option<NaiveDate>,
}

impl DuplicateKey {
    pub fn has_absent(&self) -> bool {
        self.company.is_none()
            || self.location.is_none()
            || self.industry.is_none()
            || self.total_laid_off.is_none()
            || self.percentage_bits.is_none()
            || self.date.is_none()
    }
}

/// Records that can be grouped under the composite duplicate key
pub trait Deduplicable {
    fn record_id(&self) -> RecordId;
    fn duplicate_key(&self) -> DuplicateKey;
}

impl Deduplicable for LayoffRecord {
    fn record_id(&self) -> RecordId {
        self.id
    }

    fn duplicate_key(&self) -> DuplicateKey {
        DuplicateKey {
            company: self.company.clone(),
            location: self.location.clone(),
            industry: self.industry.clone(),
            total_laid_off: self.total_laid_off,
            // -0.0 and 0.0 must land in the same group
            percentage_bits: self.percentage_laid_off.map(|p| (p + 0.0).to_bits()),
            date: self.date,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DedupOutcome<T> {
    /// Surviving records in their original relative order
    pub survivors: Vec<T>,
    /// Ids of the records marked for deletion
    pub removed: Vec<RecordId>,
}

#[derive(Debug, Clone, Default)]
pub struct Deduplicator {
    policy: AbsentKeyPolicy,
}

impl Deduplicator {
    pub fn new(policy: AbsentKeyPolicy) -> Self {
        Self { policy }
    }

    /// Keep the first record of every duplicate group.
    ///
    /// `records` must be in ingestion order; the earliest member of a group
    /// survives and every later member is marked for removal.
    #[instrument(skip(self, records), fields(input = records.len()))]
    pub fn deduplicate<T: Deduplicable>(&self, records: Vec<T>) -> DedupOutcome<T> {
        self.deduplicate_with(records, |r| (r.record_id(), r.duplicate_key()))
    }

    /// Deduplicate raw rows in place, keyed on their normalized projection.
    ///
    /// Survivors keep their raw values; only the grouping looks through
    /// `normalizer`.
    #[instrument(skip_all, fields(input = records.len()))]
    pub fn deduplicate_raw(
        &self,
        records: Vec<RawLayoffRecord>,
        normalizer: &Normalizer,
    ) -> DedupOutcome<RawLayoffRecord> {
        self.deduplicate_with(records, |r| {
            (r.id, normalizer.normalize_record(r).duplicate_key())
        })
    }

    fn deduplicate_with<T>(
        &self,
        records: Vec<T>,
        entry: impl Fn(&T) -> (RecordId, DuplicateKey),
    ) -> DedupOutcome<T> {
        let mut first_seen: HashMap<DuplicateKey, RecordId> = HashMap::new();
        let mut survivors = Vec::with_capacity(records.len());
        let mut removed = Vec::new();

        for record in records {
            let (id, key) = entry(&record);

            if self.policy == AbsentKeyPolicy::DistinctAbsent && key.has_absent() {
                survivors.push(record);
                continue;
            }

            match first_seen.get(&key) {
                Some(kept_id) => {
                    debug!("Record {} duplicates record {}", id, kept_id);
                    removed.push(id);
                }
                None => {
                    first_seen.insert(key, id);
                    survivors.push(record);
                }
            }
        }

        info!(
            "Deduplication kept {} records, marked {} duplicates",
            survivors.len(),
            removed.len()
        );
        DedupOutcome { survivors, removed }
    }
}
