use serde::Serialize;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::constants;
use crate::domain::LayoffRecord;
use crate::error::Result;
use crate::pipeline::analysis::ReportSet;
use crate::pipeline::ingestion::write_cleaned_csv;

fn persist_json<T: Serialize + ?Sized>(value: &T, path: &Path) -> Result<()> {
    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(writer, value)?;
    Ok(())
}

/// Write the cleaned dataset as CSV into `output_dir`
pub fn write_cleaned(records: &[LayoffRecord], output_dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(output_dir)?;
    let path = output_dir.join(constants::CLEANED_CSV_FILE);

    write_cleaned_csv(BufWriter::new(File::create(&path)?), records)?;
    info!("💾 Saved {} cleaned records to {}", records.len(), path.display());
    Ok(path)
}

/// Write each report as a pretty-printed JSON file into `output_dir`
pub fn write_reports(reports: &ReportSet, output_dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(output_dir)?;

    let monthly = output_dir.join(constants::MONTHLY_REPORT_FILE);
    persist_json(&reports.monthly, &monthly)?;

    let rolling = output_dir.join(constants::ROLLING_REPORT_FILE);
    persist_json(&reports.rolling, &rolling)?;

    let top_by_year = output_dir.join(constants::TOP_BY_YEAR_REPORT_FILE);
    persist_json(&reports.top_by_year, &top_by_year)?;

    let summary = output_dir.join(constants::SUMMARY_REPORT_FILE);
    persist_json(&reports.summary, &summary)?;

    let written = vec![monthly, rolling, top_by_year, summary];
    info!("💾 Saved {} reports to {}", written.len(), output_dir.display());
    Ok(written)
}
