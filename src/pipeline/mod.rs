// Data processing pipeline: ingestion, cleaning, analysis, and storage

pub mod analysis;
pub mod ingestion;
pub mod output;
pub mod processing;
pub mod runner;
pub mod storage;

// Re-export key types and functions from each stage
pub use analysis::ReportSet;
pub use runner::{clean_records, CleanedDataset, CleaningPipeline, CleaningStep};
