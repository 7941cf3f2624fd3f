use chrono::NaiveDate;
use regex::Regex;
use tracing::{debug, info, instrument, warn};

use crate::config::{IndustryRule, NormalizeConfig};
use crate::domain::{LayoffRecord, RawLayoffRecord};
use crate::error::Result;

/// Output of a normalization pass, with counters for logging and metrics
#[derive(Debug, Clone)]
pub struct NormalizeOutcome {
    pub records: Vec<LayoffRecord>,
    /// Records whose value set differs from the raw input
    pub changed_rows: usize,
    /// Dates that were present but did not match the pattern
    pub unparsed_dates: usize,
    pub canonicalized_industries: usize,
}

/// Trims text fields, canonicalizes industries and countries, and types dates.
///
/// Normalization is total: a value that cannot be interpreted becomes absent
/// and no record is dropped or reordered.
#[derive(Debug, Clone)]
pub struct Normalizer {
    industry_rules: Vec<IndustryRule>,
    date_pattern: Regex,
    strip_country_trailing_period: bool,
}

impl Normalizer {
    pub fn new(config: &NormalizeConfig) -> Result<Self> {
        Ok(Self {
            industry_rules: config.industry_rules.clone(),
            date_pattern: Regex::new(&config.date_pattern)?,
            strip_country_trailing_period: config.strip_country_trailing_period,
        })
    }

    #[instrument(skip(self, records), fields(input = records.len()))]
    pub fn normalize(&self, records: Vec<RawLayoffRecord>) -> NormalizeOutcome {
        let mut outcome = NormalizeOutcome {
            records: Vec::with_capacity(records.len()),
            changed_rows: 0,
            unparsed_dates: 0,
            canonicalized_industries: 0,
        };

        for raw in &records {
            let normalized = self.normalize_record(raw);

            if raw.date.as_deref().is_some_and(|d| !d.trim().is_empty()) && normalized.date.is_none() {
                warn!(
                    "Record {}: unparseable date '{}', leaving it absent",
                    raw.id,
                    raw.date.as_deref().unwrap_or_default()
                );
                outcome.unparsed_dates += 1;
            }

            let trimmed_industry = raw.industry.as_deref().map(str::trim);
            if let (Some(before), Some(after)) = (trimmed_industry, normalized.industry.as_deref()) {
                if before != after {
                    debug!("Record {}: industry '{}' -> '{}'", raw.id, before, after);
                    crate::observability::metrics::normalize::industry_canonicalized(after);
                    outcome.canonicalized_industries += 1;
                }
            }

            if differs_from_raw(raw, &normalized) {
                outcome.changed_rows += 1;
            }
            outcome.records.push(normalized);
        }

        info!(
            "Normalized {} records ({} changed, {} unparsed dates, {} industries canonicalized)",
            outcome.records.len(),
            outcome.changed_rows,
            outcome.unparsed_dates,
            outcome.canonicalized_industries
        );
        outcome
    }

    /// Project one raw record into its normalized form
    pub fn normalize_record(&self, raw: &RawLayoffRecord) -> LayoffRecord {
        LayoffRecord {
            id: raw.id,
            company: clean_text(raw.company.as_deref()),
            location: clean_text(raw.location.as_deref()),
            industry: clean_text(raw.industry.as_deref()).map(|i| self.canonical_industry(i)),
            total_laid_off: raw.total_laid_off,
            percentage_laid_off: raw.percentage_laid_off,
            date: raw.date.as_deref().and_then(|d| self.parse_date(d)),
            stage: clean_text(raw.stage.as_deref()),
            country: clean_text(raw.country.as_deref()).and_then(|c| self.clean_country(c)),
            funds_raised: raw.funds_raised,
        }
    }

    /// Rewrite an industry to the label of the first rule whose prefix it starts with
    pub fn canonical_industry(&self, industry: String) -> String {
        self.industry_rules
            .iter()
            .find(|rule| starts_with_ignore_ascii_case(&industry, &rule.prefix))
            .map(|rule| rule.canonical.clone())
            .unwrap_or(industry)
    }

    /// Parse `text` with the configured pattern; `None` when it does not match
    /// or names an impossible calendar day
    pub fn parse_date(&self, text: &str) -> Option<NaiveDate> {
        let caps = self.date_pattern.captures(text.trim())?;
        let year = caps.name("year")?.as_str().parse::<i32>().ok()?;
        let month = caps.name("month")?.as_str().parse::<u32>().ok()?;
        let day = caps.name("day")?.as_str().parse::<u32>().ok()?;
        NaiveDate::from_ymd_opt(year, month, day)
    }

    fn clean_country(&self, country: String) -> Option<String> {
        if !self.strip_country_trailing_period {
            return Some(country);
        }
        clean_text(Some(country.trim_end_matches('.')))
    }
}

/// Trim surrounding whitespace; blank text is treated as missing
fn clean_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn starts_with_ignore_ascii_case(value: &str, prefix: &str) -> bool {
    let (value, prefix) = (value.as_bytes(), prefix.as_bytes());
    value.len() >= prefix.len() && value[..prefix.len()].eq_ignore_ascii_case(prefix)
}

fn differs_from_raw(raw: &RawLayoffRecord, normalized: &LayoffRecord) -> bool {
    raw.company != normalized.company
        || raw.location != normalized.location
        || raw.industry != normalized.industry
        || raw.stage != normalized.stage
        || raw.country != normalized.country
        // a typed date always differs from its text; only a dropped one counts
        || raw.date.is_some() != normalized.date.is_some()
}
