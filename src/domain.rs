use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Surrogate row identifier assigned by the loader in ingestion order
pub type RecordId = u64;

/// A layoff event exactly as the loader supplied it; `date` is still text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawLayoffRecord {
    pub id: RecordId,
    pub company: Option<String>,
    pub location: Option<String>,
    pub industry: Option<String>,
    pub total_laid_off: Option<u64>,
    pub percentage_laid_off: Option<f64>,
    pub date: Option<String>,
    pub stage: Option<String>,
    pub country: Option<String>,
    pub funds_raised: Option<f64>,
}

/// A layoff event after normalization, with a typed date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoffRecord {
    pub id: RecordId,
    pub company: Option<String>,
    pub location: Option<String>,
    pub industry: Option<String>,
    pub total_laid_off: Option<u64>,
    pub percentage_laid_off: Option<f64>,
    pub date: Option<NaiveDate>,
    pub stage: Option<String>,
    pub country: Option<String>,
    pub funds_raised: Option<f64>,
}

impl LayoffRecord {
    /// Layoff count with absence contributing nothing to sums
    pub fn laid_off_or_zero(&self) -> u64 {
        self.total_laid_off.unwrap_or(0)
    }

    pub fn has_magnitude(&self) -> bool {
        self.total_laid_off.is_some() || self.percentage_laid_off.is_some()
    }
}

/// Calendar month bucket, ordered by year then month
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }

    pub fn of(date: NaiveDate) -> Self {
        Self::new(date.year(), date.month())
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyTotal {
    pub month: YearMonth,
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollingTotal {
    pub month: YearMonth,
    pub total: u64,
    pub running_total: u64,
}

/// One company's position within a single year's ranking
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearlyRank {
    pub year: i32,
    pub company: Option<String>,
    pub yearly_total: u64,
    pub rank: u32,
}

/// Row counts for one cleaning stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageReport {
    pub stage: String,
    pub input_rows: usize,
    pub output_rows: usize,
    /// Rows whose values the stage rewrote (removed rows are not counted here)
    pub changed_rows: usize,
}

impl StageReport {
    pub fn removed_rows(&self) -> usize {
        self.input_rows.saturating_sub(self.output_rows)
    }
}

/// Bookkeeping for a single execution of the cleaning pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleaningRun {
    pub id: Option<Uuid>,
    pub name: String,
    pub stages: Vec<StageReport>,
    pub created_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl CleaningRun {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            stages: Vec::new(),
            created_at: Utc::now(),
            finished_at: None,
        }
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_year_month_display_and_order() {
        let jan = YearMonth::of(NaiveDate::from_ymd_opt(2023, 1, 31).unwrap());
        let dec = YearMonth::new(2022, 12);

        assert_eq!(jan.to_string(), "2023-01");
        assert!(dec < jan);
    }

    #[test]
    fn test_stage_report_removed_rows() {
        let report = StageReport {
            stage: "dedup".to_string(),
            input_rows: 5,
            output_rows: 3,
            changed_rows: 0,
        };
        assert_eq!(report.removed_rows(), 2);
    }
}
