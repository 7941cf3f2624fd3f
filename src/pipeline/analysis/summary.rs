use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use crate::domain::LayoffRecord;

/// A categorical axis for grouped layoff totals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Company,
    Industry,
    Country,
    Stage,
    Year,
}

impl Dimension {
    pub const ALL: [Dimension; 5] = [
        Dimension::Company,
        Dimension::Industry,
        Dimension::Country,
        Dimension::Stage,
        Dimension::Year,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Dimension::Company => "company",
            Dimension::Industry => "industry",
            Dimension::Country => "country",
            Dimension::Stage => "stage",
            Dimension::Year => "year",
        }
    }

    /// Grouping key for a record; `None` means "absent" except for `Year`,
    /// where an undated record has no bucket at all
    fn key_of(&self, record: &LayoffRecord) -> Option<Option<String>> {
        match self {
            Dimension::Company => Some(record.company.clone()),
            Dimension::Industry => Some(record.industry.clone()),
            Dimension::Country => Some(record.country.clone()),
            Dimension::Stage => Some(record.stage.clone()),
            Dimension::Year => record.date.map(|d| Some(d.year().to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionTotal {
    pub key: Option<String>,
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FullShutdown {
    pub company: Option<String>,
    pub funds_raised: Option<f64>,
    pub total_laid_off: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub rows: usize,
    pub max_total_laid_off: Option<u64>,
    pub max_percentage_laid_off: Option<f64>,
    pub earliest_date: Option<NaiveDate>,
    pub latest_date: Option<NaiveDate>,
    /// Companies that laid off their whole workforce, best funded first
    pub full_shutdowns: Vec<FullShutdown>,
    pub totals: BTreeMap<String, Vec<DimensionTotal>>,
}

/// Sum layoffs per dimension key, largest first, ties by key
pub fn totals_by(records: &[LayoffRecord], dimension: Dimension) -> Vec<DimensionTotal> {
    let mut sums: HashMap<Option<String>, u64> = HashMap::new();
    for record in records {
        if let Some(key) = dimension.key_of(record) {
            let total = sums.entry(key).or_insert(0);
            *total = total.saturating_add(record.laid_off_or_zero());
        }
    }

    let mut totals: Vec<DimensionTotal> = sums
        .into_iter()
        .map(|(key, total)| DimensionTotal { key, total })
        .collect();
    totals.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.key.cmp(&b.key)));
    totals
}

pub fn summarize(records: &[LayoffRecord]) -> DatasetSummary {
    let max_percentage_laid_off = records
        .iter()
        .filter_map(|r| r.percentage_laid_off)
        .max_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

    let mut full_shutdowns: Vec<FullShutdown> = records
        .iter()
        .filter(|r| r.percentage_laid_off == Some(1.0))
        .map(|r| FullShutdown {
            company: r.company.clone(),
            funds_raised: r.funds_raised,
            total_laid_off: r.total_laid_off,
        })
        .collect();
    // Absent funding sorts last
    full_shutdowns.sort_by(|a, b| match (a.funds_raised, b.funds_raised) {
        (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });

    let totals = Dimension::ALL
        .iter()
        .map(|d| (d.as_str().to_string(), totals_by(records, *d)))
        .collect();

    DatasetSummary {
        rows: records.len(),
        max_total_laid_off: records.iter().filter_map(|r| r.total_laid_off).max(),
        max_percentage_laid_off,
        earliest_date: records.iter().filter_map(|r| r.date).min(),
        latest_date: records.iter().filter_map(|r| r.date).max(),
        full_shutdowns,
        totals,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(
        company: &str,
        industry: Option<&str>,
        total: Option<u64>,
        pct: Option<f64>,
        date: Option<(i32, u32, u32)>,
        funds: Option<f64>,
    ) -> LayoffRecord {
        LayoffRecord {
            id: 1,
            company: Some(company.to_string()),
            location: None,
            industry: industry.map(str::to_string),
            total_laid_off: total,
            percentage_laid_off: pct,
            date: date.and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d)),
            stage: None,
            country: Some("United States".to_string()),
            funds_raised: funds,
        }
    }

    fn sample() -> Vec<LayoffRecord> {
        vec![
            record("Acme", Some("Retail"), Some(100), Some(0.1), Some((2022, 5, 1)), Some(10.0)),
            record("Beta", Some("Crypto"), Some(300), Some(1.0), Some((2023, 1, 9)), Some(50.0)),
            record("Gamma", None, None, Some(1.0), None, None),
            record("Delta", Some("Retail"), Some(20), Some(1.0), Some((2023, 2, 2)), Some(900.0)),
        ]
    }

    #[test]
    fn test_totals_by_industry_groups_absent() {
        let totals = totals_by(&sample(), Dimension::Industry);

        assert_eq!(
            totals,
            vec![
                DimensionTotal { key: Some("Crypto".to_string()), total: 300 },
                DimensionTotal { key: Some("Retail".to_string()), total: 120 },
                DimensionTotal { key: None, total: 0 },
            ]
        );
    }

    #[test]
    fn test_totals_by_year_skips_undated() {
        let totals = totals_by(&sample(), Dimension::Year);

        assert_eq!(totals.len(), 2);
        assert_eq!(totals[0].key.as_deref(), Some("2023"));
        assert_eq!(totals[0].total, 320);
    }

    #[test]
    fn test_summary_extremes_and_shutdowns() {
        let summary = summarize(&sample());

        assert_eq!(summary.rows, 4);
        assert_eq!(summary.max_total_laid_off, Some(300));
        assert_eq!(summary.max_percentage_laid_off, Some(1.0));
        assert_eq!(summary.earliest_date, NaiveDate::from_ymd_opt(2022, 5, 1));
        assert_eq!(summary.latest_date, NaiveDate::from_ymd_opt(2023, 2, 2));

        let order: Vec<_> = summary
            .full_shutdowns
            .iter()
            .map(|s| s.company.as_deref().unwrap())
            .collect();
        assert_eq!(order, vec!["Delta", "Beta", "Gamma"]);
        assert_eq!(summary.totals.len(), Dimension::ALL.len());
    }

    #[test]
    fn test_dimension_totals_saturate() {
        let records = vec![
            record("Acme", Some("Retail"), Some(u64::MAX), None, Some((2023, 1, 1)), None),
            record("Beta", Some("Retail"), Some(5), None, Some((2023, 1, 2)), None),
        ];

        let totals = totals_by(&records, Dimension::Industry);
        assert_eq!(totals, vec![DimensionTotal { key: Some("Retail".to_string()), total: u64::MAX }]);
    }

    #[test]
    fn test_summary_dimensions_serialize_in_stable_order() {
        let summary = summarize(&sample());

        let keys: Vec<_> = summary.totals.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["company", "country", "industry", "stage", "year"]);

        let json = serde_json::to_string(&summary).unwrap();
        assert_eq!(json, serde_json::to_string(&summarize(&sample())).unwrap());
        let company = json.find("\"company\":[").unwrap();
        let year = json.find("\"year\":[").unwrap();
        assert!(company < year);
    }

    #[test]
    fn test_summary_of_empty_dataset() {
        let summary = summarize(&[]);
        assert_eq!(summary.rows, 0);
        assert_eq!(summary.max_total_laid_off, None);
        assert!(summary.full_shutdowns.is_empty());
    }
}
