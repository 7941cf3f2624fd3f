use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tracing::{info, warn};

use crate::constants::ABSENT_MARKERS;
use crate::domain::{LayoffRecord, RawLayoffRecord, RecordId};
use crate::error::{PipelineError, Result};

/// Column header names of the layoffs export
const COLUMNS: [&str; 9] = [
    "company",
    "location",
    "industry",
    "total_laid_off",
    "percentage_laid_off",
    "date",
    "stage",
    "country",
    "funds_raised_millions",
];

/// Column positions resolved from a header row
#[derive(Debug)]
struct ColumnMap {
    positions: [usize; 9],
}

impl ColumnMap {
    fn from_headers(headers: &StringRecord) -> Result<Self> {
        let normalized: Vec<String> = headers
            .iter()
            .map(|h| h.trim().trim_start_matches('\u{feff}').to_ascii_lowercase())
            .collect();

        let mut positions = [0usize; 9];
        for (slot, column) in COLUMNS.iter().enumerate() {
            positions[slot] = normalized
                .iter()
                .position(|h| h == column || (*column == "funds_raised_millions" && h == "funds_raised"))
                .ok_or_else(|| {
                    PipelineError::InvalidInput(format!("missing required column '{}'", column))
                })?;
        }
        Ok(Self { positions })
    }

    fn cell<'r>(&self, row: &'r StringRecord, slot: usize) -> Option<&'r str> {
        row.get(self.positions[slot])
    }
}

fn is_absent(cell: &str) -> bool {
    let cell = cell.trim();
    ABSENT_MARKERS.iter().any(|m| cell.eq_ignore_ascii_case(m))
}

fn text(cell: Option<&str>) -> Option<String> {
    cell.filter(|c| !is_absent(c)).map(str::to_string)
}

fn number<T: std::str::FromStr>(cell: Option<&str>, id: RecordId, column: &str) -> Option<T> {
    let cell = cell.filter(|c| !is_absent(c))?;
    match cell.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Row {}: non-numeric {} '{}', treating as absent", id, column, cell);
            None
        }
    }
}

/// Read a layoffs CSV; ids are assigned 1..=n in row order
pub fn read_csv<R: Read>(reader: R) -> Result<Vec<RawLayoffRecord>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let columns = ColumnMap::from_headers(rdr.headers()?)?;
    let mut records = Vec::new();

    for (index, row) in rdr.records().enumerate() {
        let row = row?;
        let id = index as RecordId + 1;

        let total_laid_off = number::<u64>(columns.cell(&row, 3), id, COLUMNS[3]);
        let percentage_laid_off = number::<f64>(columns.cell(&row, 4), id, COLUMNS[4])
            .filter(|p| {
                let valid = (0.0..=1.0).contains(p);
                if !valid {
                    warn!("Row {}: percentage {} outside [0,1], treating as absent", id, p);
                }
                valid
            });
        let funds_raised = number::<f64>(columns.cell(&row, 8), id, COLUMNS[8])
            .filter(|f| f.is_finite() && *f >= 0.0);

        records.push(RawLayoffRecord {
            id,
            company: text(columns.cell(&row, 0)),
            location: text(columns.cell(&row, 1)),
            industry: text(columns.cell(&row, 2)),
            total_laid_off,
            percentage_laid_off,
            date: text(columns.cell(&row, 5)),
            stage: text(columns.cell(&row, 6)),
            country: text(columns.cell(&row, 7)),
            funds_raised,
        });
    }

    Ok(records)
}

pub fn load_csv(path: &Path) -> Result<Vec<RawLayoffRecord>> {
    let file = File::open(path).map_err(|e| {
        PipelineError::InvalidInput(format!("cannot open '{}': {}", path.display(), e))
    })?;
    let records = read_csv(file)?;
    info!("Loaded {} raw records from {}", records.len(), path.display());
    Ok(records)
}

/// Write cleaned records with dates rendered as `YYYY-MM-DD`
pub fn write_cleaned_csv<W: Write>(writer: W, records: &[LayoffRecord]) -> Result<()> {
    let mut wtr = WriterBuilder::new().from_writer(writer);
    wtr.write_record(COLUMNS)?;

    for record in records {
        wtr.write_record([
            record.company.clone().unwrap_or_default(),
            record.location.clone().unwrap_or_default(),
            record.industry.clone().unwrap_or_default(),
            record.total_laid_off.map(|v| v.to_string()).unwrap_or_default(),
            record.percentage_laid_off.map(|v| v.to_string()).unwrap_or_default(),
            record.date.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default(),
            record.stage.clone().unwrap_or_default(),
            record.country.clone().unwrap_or_default(),
            record.funds_raised.map(|v| v.to_string()).unwrap_or_default(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
