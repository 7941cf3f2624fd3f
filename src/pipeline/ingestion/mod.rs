// Pipeline ingestion: reading the raw layoffs export and writing cleaned rows

pub mod csv_loader;

pub use csv_loader::{load_csv, read_csv, write_cleaned_csv};
