use anyhow::Result;
use chrono::NaiveDate;
use std::fs;
use std::sync::Arc;
use tempfile::tempdir;

use layoffs_cleaner::config::Config;
use layoffs_cleaner::domain::{RawLayoffRecord, RollingTotal, YearMonth, YearlyRank};
use layoffs_cleaner::pipeline::ingestion::load_csv;
use layoffs_cleaner::pipeline::output::{write_cleaned, write_reports};
use layoffs_cleaner::pipeline::storage::{InMemoryStorage, Storage};
use layoffs_cleaner::pipeline::{clean_records, CleaningPipeline, ReportSet};

const RAW_CSV: &str = "\
company,location,industry,total_laid_off,percentage_laid_off,date,stage,country,funds_raised_millions
Acme,Seattle,Retail,100,0.1,1/15/2023,Post-IPO,United States,500
Acme,Seattle,Retail,100,0.1,1/15/2023,Post-IPO,United States,500
 Acme ,Seattle,,40,NULL,2/3/2023,Post-IPO,United States.,500
Bitly,New York City,Crypto Exchange,60,0.2,2/20/2023,Series C,United States,90
Ghost,Lagos,Travel,NULL,NULL,3/1/2023,Seed,Nigeria,2
Zeta,Berlin,Food,80,1,someday,Series A,Germany,30
Bitly,New York City,Crypto,25,NULL,12/01/2022,Series C,United States,90
";

fn raw(id: u64, company: &str, industry: Option<&str>) -> RawLayoffRecord {
    RawLayoffRecord {
        id,
        company: Some(company.to_string()),
        location: Some("Toronto".to_string()),
        industry: industry.map(str::to_string),
        total_laid_off: Some(30),
        percentage_laid_off: Some(0.3),
        date: Some("5/5/2022".to_string()),
        stage: Some("Series B".to_string()),
        country: Some("Canada".to_string()),
        funds_raised: Some(75.0),
    }
}

#[tokio::test]
async fn test_duplicates_removed_then_industry_filled() -> Result<()> {
    // Records 2 and 4 duplicate record 1; record 3 shares the company without an industry
    let mut third = raw(3, "Acme", None);
    third.total_laid_off = Some(12);
    let mut fifth = raw(5, "Other", Some("Media"));
    fifth.total_laid_off = Some(1);

    let records = vec![
        raw(1, "Acme", Some("Retail")),
        raw(2, "Acme", Some("Retail")),
        third,
        raw(4, "Acme", Some("Retail")),
        fifth,
    ];

    let storage = Arc::new(InMemoryStorage::new());
    storage.insert_raw(records).await?;
    let run = CleaningPipeline::new(storage.clone(), Config::default()).run().await?;

    assert_eq!(run.stages[0].output_rows, 3);
    let cleaned = storage.cleaned_records().await?;
    let ids: Vec<_> = cleaned.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![1, 3, 5]);
    assert_eq!(cleaned[1].industry.as_deref(), Some("Retail"));

    Ok(())
}

#[tokio::test]
async fn test_csv_to_cleaned_dataset_and_reports() -> Result<()> {
    let temp_dir = tempdir()?;
    let input = temp_dir.path().join("layoffs.csv");
    fs::write(&input, RAW_CSV)?;

    let raw = load_csv(&input)?;
    assert_eq!(raw.len(), 7);

    let storage = Arc::new(InMemoryStorage::new());
    storage.insert_raw(raw).await?;
    CleaningPipeline::new(storage.clone(), Config::default()).run().await?;
    let cleaned = storage.cleaned_records().await?;

    // duplicate row 2 and magnitude-less row 5 are gone
    let ids: Vec<_> = cleaned.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![1, 3, 4, 6, 7]);

    for record in &cleaned {
        for text in [&record.company, &record.location, &record.industry, &record.country]
            .into_iter()
            .flatten()
        {
            assert_eq!(text.trim(), text);
        }
        assert!(record.total_laid_off.is_some() || record.percentage_laid_off.is_some());
    }

    let acme_feb = &cleaned[1];
    assert_eq!(acme_feb.company.as_deref(), Some("Acme"));
    assert_eq!(acme_feb.industry.as_deref(), Some("Retail"));
    assert_eq!(acme_feb.country.as_deref(), Some("United States"));
    assert_eq!(cleaned[2].industry.as_deref(), Some("Crypto"));
    assert_eq!(cleaned[3].date, None);
    assert_eq!(cleaned[4].date, NaiveDate::from_ymd_opt(2022, 12, 1));

    let reports = ReportSet::build(&cleaned, &Config::default());
    let months: Vec<_> = reports.monthly.iter().map(|m| (m.month.to_string(), m.total)).collect();
    assert_eq!(
        months,
        vec![
            ("2022-12".to_string(), 25),
            ("2023-01".to_string(), 100),
            ("2023-02".to_string(), 100),
        ]
    );
    let running: Vec<_> = reports.rolling.iter().map(|r| r.running_total).collect();
    assert_eq!(running, vec![25, 125, 225]);

    let ranks_2023: Vec<_> = reports
        .top_by_year
        .iter()
        .filter(|r| r.year == 2023)
        .map(|r| (r.company.clone().unwrap_or_default(), r.yearly_total, r.rank))
        .collect();
    assert_eq!(
        ranks_2023,
        vec![("Acme".to_string(), 140, 1), ("Bitly".to_string(), 60, 2)]
    );

    let out_dir = temp_dir.path().join("out");
    write_cleaned(&cleaned, &out_dir)?;
    write_reports(&reports, &out_dir)?;

    let rolling: Vec<RollingTotal> =
        serde_json::from_str(&fs::read_to_string(out_dir.join("rolling.json"))?)?;
    assert_eq!(rolling.last().map(|r| r.month), Some(YearMonth::new(2023, 2)));

    let top: Vec<YearlyRank> =
        serde_json::from_str(&fs::read_to_string(out_dir.join("top_by_year.json"))?)?;
    assert_eq!(top.len(), reports.top_by_year.len());

    let reloaded = load_csv(&out_dir.join("cleaned_layoffs.csv"))?;
    assert_eq!(reloaded.len(), cleaned.len());

    Ok(())
}

#[test]
fn test_cleaning_is_idempotent_on_its_output() -> Result<()> {
    let temp_dir = tempdir()?;
    let input = temp_dir.path().join("layoffs.csv");
    fs::write(&input, RAW_CSV)?;

    let config = Config::default();
    let once = clean_records(load_csv(&input)?, &config)?;

    let out_dir = temp_dir.path().join("out");
    let cleaned_path = write_cleaned(&once.records, &out_dir)?;

    // Cleaned dates are ISO formatted, so re-read them with a matching pattern
    let reread_config = Config::from_toml_str(
        r#"
        [normalize]
        date_pattern = '^(?P<year>\d{4})-(?P<month>\d{2})-(?P<day>\d{2})$'
        "#,
    )?;
    let twice = clean_records(load_csv(&cleaned_path)?, &reread_config)?;

    assert_eq!(twice.stages[0].removed_rows(), 0);
    assert_eq!(twice.records.len(), once.records.len());
    let dates_once: Vec<_> = once.records.iter().map(|r| r.date).collect();
    let dates_twice: Vec<_> = twice.records.iter().map(|r| r.date).collect();
    assert_eq!(dates_once, dates_twice);

    Ok(())
}
