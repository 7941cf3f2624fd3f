use tracing::{debug, info, instrument};

use crate::domain::{LayoffRecord, RecordId};

#[derive(Debug, Clone)]
pub struct PruneOutcome {
    pub records: Vec<LayoffRecord>,
    pub removed: Vec<RecordId>,
}

/// Drops records with neither a layoff count nor a layoff percentage
#[derive(Debug, Clone, Default)]
pub struct RowPruner;

impl RowPruner {
    pub fn new() -> Self {
        Self
    }

    #[instrument(skip(self, records), fields(input = records.len()))]
    pub fn prune(&self, records: Vec<LayoffRecord>) -> PruneOutcome {
        let (records, dropped): (Vec<_>, Vec<_>) =
            records.into_iter().partition(LayoffRecord::has_magnitude);

        let removed: Vec<RecordId> = dropped.iter().map(|r| r.id).collect();
        if !removed.is_empty() {
            debug!("Pruned records without magnitude: {:?}", removed);
        }
        info!("Pruned {} records, {} remain", removed.len(), records.len());

        PruneOutcome { records, removed }
    }
}
