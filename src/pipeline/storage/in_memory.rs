use super::Storage;
use crate::domain::{CleaningRun, LayoffRecord, RawLayoffRecord, RecordId};
use crate::error::{PipelineError, Result};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;
use uuid::Uuid;

/// In-memory storage implementation for development/testing
pub struct InMemoryStorage {
    raw: Arc<Mutex<BTreeMap<RecordId, RawLayoffRecord>>>,
    cleaned: Arc<Mutex<Vec<LayoffRecord>>>,
    cleaning_runs: Arc<Mutex<HashMap<Uuid, CleaningRun>>>,
}

impl Default for InMemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self {
            raw: Arc::new(Mutex::new(BTreeMap::new())),
            cleaned: Arc::new(Mutex::new(Vec::new())),
            cleaning_runs: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

fn lock<'a, T>(mutex: &'a Mutex<T>, table: &str) -> Result<MutexGuard<'a, T>> {
    mutex.lock().map_err(|_| PipelineError::Storage {
        message: format!("{} table lock poisoned", table),
    })
}

#[async_trait]
impl Storage for InMemoryStorage {
    async fn insert_raw(&self, records: Vec<RawLayoffRecord>) -> Result<()> {
        let mut raw = lock(&self.raw, "raw")?;

        let mut batch_ids = HashSet::with_capacity(records.len());
        if let Some(dup) = records
            .iter()
            .find(|r| raw.contains_key(&r.id) || !batch_ids.insert(r.id))
        {
            return Err(PipelineError::Storage {
                message: format!("Raw record id {} already exists", dup.id),
            });
        }

        let count = records.len();
        raw.extend(records.into_iter().map(|r| (r.id, r)));
        debug!("Inserted {} raw records", count);
        Ok(())
    }

    async fn raw_records(&self) -> Result<Vec<RawLayoffRecord>> {
        let raw = lock(&self.raw, "raw")?;
        Ok(raw.values().cloned().collect())
    }

    async fn delete_raw(&self, ids: &[RecordId]) -> Result<usize> {
        let mut raw = lock(&self.raw, "raw")?;

        if let Some(missing) = ids.iter().find(|id| !raw.contains_key(*id)) {
            return Err(PipelineError::Storage {
                message: format!("Cannot delete unknown raw record {}", missing),
            });
        }

        let deleted = ids.iter().filter(|id| raw.remove(*id).is_some()).count();
        debug!("Deleted {} raw records", deleted);
        Ok(deleted)
    }

    async fn replace_cleaned(&self, records: Vec<LayoffRecord>) -> Result<()> {
        let mut cleaned = lock(&self.cleaned, "cleaned")?;
        debug!(
            "Replacing cleaned table ({} -> {} rows)",
            cleaned.len(),
            records.len()
        );
        *cleaned = records;
        Ok(())
    }

    async fn cleaned_records(&self) -> Result<Vec<LayoffRecord>> {
        let cleaned = lock(&self.cleaned, "cleaned")?;
        Ok(cleaned.clone())
    }

    async fn create_cleaning_run(&self, run: &mut CleaningRun) -> Result<()> {
        let id = Uuid::new_v4();
        run.id = Some(id);

        let mut runs = lock(&self.cleaning_runs, "cleaning_runs")?;
        runs.insert(id, run.clone());

        debug!("Created cleaning run {} with id {}", run.name, id);
        Ok(())
    }

    async fn update_cleaning_run(&self, run: &CleaningRun) -> Result<()> {
        let run_id = run.id.ok_or_else(|| PipelineError::Storage {
            message: "Cannot update cleaning run without ID".to_string(),
        })?;

        let mut runs = lock(&self.cleaning_runs, "cleaning_runs")?;
        runs.insert(run_id, run.clone());

        debug!("Updated cleaning run with id {}", run_id);
        Ok(())
    }

    async fn get_cleaning_run(&self, run_id: Uuid) -> Result<Option<CleaningRun>> {
        let runs = lock(&self.cleaning_runs, "cleaning_runs")?;
        Ok(runs.get(&run_id).cloned())
    }
}
