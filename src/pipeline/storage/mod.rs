// Dataset storage: the raw table the loader fills and the cleaned table the
// stages publish to

pub mod in_memory;

use async_trait::async_trait;

use crate::domain::{CleaningRun, LayoffRecord, RawLayoffRecord, RecordId};
use crate::error::Result;

pub use in_memory::InMemoryStorage;

/// Every mutating call applies completely or not at all, so a reader never
/// sees a stage half applied.
#[async_trait]
pub trait Storage: Send + Sync {
    // Raw table
    async fn insert_raw(&self, records: Vec<RawLayoffRecord>) -> Result<()>;
    /// Raw records in ingestion (id) order
    async fn raw_records(&self) -> Result<Vec<RawLayoffRecord>>;
    /// Delete the given ids; fails without deleting anything if one is unknown
    async fn delete_raw(&self, ids: &[RecordId]) -> Result<usize>;

    // Cleaned table
    /// Replace the whole cleaned table with `records`
    async fn replace_cleaned(&self, records: Vec<LayoffRecord>) -> Result<()>;
    async fn cleaned_records(&self) -> Result<Vec<LayoffRecord>>;

    // Run bookkeeping
    async fn create_cleaning_run(&self, run: &mut CleaningRun) -> Result<()>;
    async fn update_cleaning_run(&self, run: &CleaningRun) -> Result<()>;
    async fn get_cleaning_run(&self, run_id: uuid::Uuid) -> Result<Option<CleaningRun>>;
}
