use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, info_span, instrument};

use crate::config::Config;
use crate::domain::{CleaningRun, LayoffRecord, RawLayoffRecord, StageReport};
use crate::error::Result;
use crate::observability::metrics;
use crate::pipeline::processing::{Deduplicator, Normalizer, NullFiller, RowPruner};
use crate::pipeline::storage::Storage;

/// Cleaning stages in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleaningStep {
    Dedup,
    Normalize,
    Fill,
    Prune,
}

impl CleaningStep {
    pub const ALL: [CleaningStep; 4] = [
        CleaningStep::Dedup,
        CleaningStep::Normalize,
        CleaningStep::Fill,
        CleaningStep::Prune,
    ];

    pub fn step_name(&self) -> &'static str {
        match self {
            CleaningStep::Dedup => "dedup",
            CleaningStep::Normalize => "normalize",
            CleaningStep::Fill => "fill",
            CleaningStep::Prune => "prune",
        }
    }
}

/// Result of running the cleaning stages
#[derive(Debug, Clone, Serialize)]
pub struct CleanedDataset {
    pub records: Vec<LayoffRecord>,
    pub stages: Vec<StageReport>,
}

/// The four cleaning stages built from one configuration
struct Stages {
    dedup: Deduplicator,
    normalizer: Normalizer,
    filler: NullFiller,
    pruner: RowPruner,
}

impl Stages {
    fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            dedup: Deduplicator::new(config.dedup.absent_policy),
            normalizer: Normalizer::new(&config.normalize)?,
            filler: NullFiller::new(),
            pruner: RowPruner::new(),
        })
    }
}

fn stage_report(step: CleaningStep, input_rows: usize, output_rows: usize, changed_rows: usize) -> StageReport {
    StageReport {
        stage: step.step_name().to_string(),
        input_rows,
        output_rows,
        changed_rows,
    }
}

/// Run a stage, timing it into the stage histograms
fn timed<T>(step: CleaningStep, input_rows: usize, f: impl FnOnce() -> T) -> T {
    let span = info_span!("stage", name = step.step_name());
    let _enter = span.enter();
    let started = Instant::now();
    let out = f();
    metrics::pipeline::stage_completed(step.step_name(), input_rows, started.elapsed().as_secs_f64());
    out
}

/// Run dedup, normalize, fill and prune over an in-memory dataset
pub fn clean_records(raw: Vec<RawLayoffRecord>, config: &Config) -> Result<CleanedDataset> {
    let stages = Stages::new(config)?;
    let mut reports = Vec::with_capacity(CleaningStep::ALL.len());

    let input = raw.len();
    let deduped = timed(CleaningStep::Dedup, input, || {
        stages.dedup.deduplicate_raw(raw, &stages.normalizer)
    });
    metrics::dedup::duplicates_removed(deduped.removed.len());
    reports.push(stage_report(CleaningStep::Dedup, input, deduped.survivors.len(), 0));

    let input = deduped.survivors.len();
    let normalized = timed(CleaningStep::Normalize, input, || stages.normalizer.normalize(deduped.survivors));
    metrics::normalize::dates_unparsed(normalized.unparsed_dates);
    reports.push(stage_report(CleaningStep::Normalize, input, normalized.records.len(), normalized.changed_rows));

    let input = normalized.records.len();
    let filled = timed(CleaningStep::Fill, input, || stages.filler.fill(normalized.records));
    metrics::fill::industry_filled(filled.filled);
    reports.push(stage_report(CleaningStep::Fill, input, filled.records.len(), filled.filled));

    let input = filled.records.len();
    let pruned = timed(CleaningStep::Prune, input, || stages.pruner.prune(filled.records));
    metrics::prune::rows_removed(pruned.removed.len());
    reports.push(stage_report(CleaningStep::Prune, input, pruned.records.len(), 0));

    Ok(CleanedDataset {
        records: pruned.records,
        stages: reports,
    })
}

/// Runs the cleaning stages against a [`Storage`] backend, publishing each
/// stage's complete output in a single storage call
pub struct CleaningPipeline {
    storage: Arc<dyn Storage>,
    config: Config,
}

impl std::fmt::Debug for CleaningPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CleaningPipeline")
            .field("storage", &"<Arc<dyn Storage>>")
            .field("config", &self.config)
            .finish()
    }
}

impl CleaningPipeline {
    pub fn new(storage: Arc<dyn Storage>, config: Config) -> Self {
        Self { storage, config }
    }

    #[instrument(skip(self))]
    pub async fn run(&self) -> Result<CleaningRun> {
        metrics::pipeline::run_started();
        let stages = Stages::new(&self.config)?;

        let mut run = CleaningRun::new("layoffs_cleaning");
        self.storage.create_cleaning_run(&mut run).await?;
        info!("🚀 Starting cleaning run {:?}", run.id);

        // Step 1: deduplicate the raw table in place
        let raw = self.storage.raw_records().await?;
        let input = raw.len();
        let deduped = timed(CleaningStep::Dedup, input, || {
        stages.dedup.deduplicate_raw(raw, &stages.normalizer)
    });
        self.storage.delete_raw(&deduped.removed).await?;
        metrics::dedup::duplicates_removed(deduped.removed.len());
        run.stages.push(stage_report(CleaningStep::Dedup, input, deduped.survivors.len(), 0));
        info!("🧹 Removed {} duplicate rows", deduped.removed.len());

        // Step 2: project raw rows into the cleaned table
        let input = deduped.survivors.len();
        let normalized = timed(CleaningStep::Normalize, input, || {
            stages.normalizer.normalize(deduped.survivors)
        });
        metrics::normalize::dates_unparsed(normalized.unparsed_dates);
        run.stages.push(stage_report(
            CleaningStep::Normalize,
            input,
            normalized.records.len(),
            normalized.changed_rows,
        ));
        self.storage.replace_cleaned(normalized.records).await?;

        // Step 3: fill industries from the published normalized table
        let current = self.storage.cleaned_records().await?;
        let input = current.len();
        let filled = timed(CleaningStep::Fill, input, || stages.filler.fill(current));
        metrics::fill::industry_filled(filled.filled);
        run.stages.push(stage_report(CleaningStep::Fill, input, filled.records.len(), filled.filled));
        self.storage.replace_cleaned(filled.records).await?;

        // Step 4: prune rows without any magnitude
        let current = self.storage.cleaned_records().await?;
        let input = current.len();
        let pruned = timed(CleaningStep::Prune, input, || stages.pruner.prune(current));
        metrics::prune::rows_removed(pruned.removed.len());
        run.stages.push(stage_report(CleaningStep::Prune, input, pruned.records.len(), 0));
        let remaining = pruned.records.len();
        self.storage.replace_cleaned(pruned.records).await?;

        run.finish();
        self.storage.update_cleaning_run(&run).await?;
        info!("✅ Cleaning run finished with {} records", remaining);
        Ok(run)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::processing::Deduplicable;
    use crate::pipeline::storage::InMemoryStorage;
    use std::collections::HashSet;

    fn raw(id: u64, company: &str, industry: Option<&str>, total: Option<u64>, pct: Option<f64>) -> RawLayoffRecord {
        RawLayoffRecord {
            id,
            company: Some(company.to_string()),
            location: Some("Berlin".to_string()),
            industry: industry.map(str::to_string),
            total_laid_off: total,
            percentage_laid_off: pct,
            date: Some("1/10/2023".to_string()),
            stage: None,
            country: Some("Germany".to_string()),
            funds_raised: None,
        }
    }

    fn sample() -> Vec<RawLayoffRecord> {
        vec![
            raw(1, "Acme", Some("Retail"), Some(10), None),
            raw(2, "Acme", Some("Retail"), Some(10), None),
            raw(3, " Acme", None, Some(4), None),
            raw(4, "Beta", Some("Crypto Exchange"), None, None),
            raw(5, "Gamma", None, None, Some(0.2)),
        ]
    }

    #[test]
    fn test_clean_records_runs_all_stages() {
        let cleaned = clean_records(sample(), &Config::default()).unwrap();

        let ids: Vec<_> = cleaned.records.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 3, 5]);
        assert_eq!(cleaned.records[1].industry.as_deref(), Some("Retail"));
        assert_eq!(cleaned.records[1].company.as_deref(), Some("Acme"));

        let names: Vec<_> = cleaned.stages.iter().map(|s| s.stage.as_str()).collect();
        assert_eq!(names, vec!["dedup", "normalize", "fill", "prune"]);
        assert_eq!(cleaned.stages[0].removed_rows(), 1);
        assert_eq!(cleaned.stages[2].changed_rows, 1);
        assert_eq!(cleaned.stages[3].removed_rows(), 1);
    }

    #[test]
    fn test_cleaned_records_have_unique_keys() {
        let mut spaced = raw(2, "Acme ", Some("Retail"), Some(10), None);
        spaced.location = Some(" Berlin".to_string());
        let mut respelled = raw(3, "Acme", Some("Retail"), Some(10), None);
        respelled.date = Some("01/10/2023".to_string());
        let mut blank = raw(5, "Gamma", Some(""), Some(3), None);
        blank.country = Some("Germany.".to_string());

        let records = vec![
            raw(1, "Acme", Some("Retail"), Some(10), None),
            spaced,
            respelled,
            raw(4, "Gamma", None, Some(3), None),
            blank,
            raw(6, "Beta", Some("Crypto Exchange"), Some(8), None),
            raw(7, "Beta", Some("crypto"), Some(8), None),
        ];

        let cleaned = clean_records(records, &Config::default()).unwrap();

        let ids: Vec<_> = cleaned.records.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 4, 6]);
        let keys: HashSet<_> = cleaned.records.iter().map(|r| r.duplicate_key()).collect();
        assert_eq!(keys.len(), cleaned.records.len());
    }

    #[tokio::test]
    async fn test_pipeline_matches_in_memory_cleaning() {
        let storage = Arc::new(InMemoryStorage::new());
        storage.insert_raw(sample()).await.unwrap();

        let pipeline = CleaningPipeline::new(storage.clone(), Config::default());
        let run = pipeline.run().await.unwrap();

        let expected = clean_records(sample(), &Config::default()).unwrap();
        assert_eq!(storage.cleaned_records().await.unwrap(), expected.records);
        assert_eq!(run.stages, expected.stages);
        assert!(run.finished_at.is_some());

        // the duplicate was deleted from the raw table
        let raw_ids: Vec<_> = storage.raw_records().await.unwrap().iter().map(|r| r.id).collect();
        assert_eq!(raw_ids, vec![1, 3, 4, 5]);

        let stored_run = storage.get_cleaning_run(run.id.unwrap()).await.unwrap().unwrap();
        assert_eq!(stored_run.stages.len(), 4);
    }

    #[tokio::test]
    async fn test_second_run_removes_nothing() {
        let storage = Arc::new(InMemoryStorage::new());
        storage.insert_raw(sample()).await.unwrap();
        let pipeline = CleaningPipeline::new(storage.clone(), Config::default());

        let first = pipeline.run().await.unwrap();
        let second = pipeline.run().await.unwrap();

        assert_eq!(first.stages[0].removed_rows(), 1);
        assert_eq!(second.stages[0].removed_rows(), 0);
        assert_eq!(storage.cleaned_records().await.unwrap().len(), 3);
    }
}
