//! Metrics for the cleaning pipeline and report builders
//!
//! Recording goes through the `metrics` facade; whether anything is kept
//! depends on the recorder installed by [`install_recorder`].

use once_cell::sync::OnceCell;
use std::fmt;
use tracing::info;

/// All metric names emitted by the crate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricName {
    PipelineRuns,
    StageDuration,
    StageInputRows,
    DedupRemoved,
    NormalizeDatesUnparsed,
    NormalizeIndustryCanonicalized,
    FillIndustryFilled,
    PruneRemoved,
    ReportsBuilt,
}

impl MetricName {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::PipelineRuns => "layoffs_pipeline_runs_total",
            MetricName::StageDuration => "layoffs_stage_duration_seconds",
            MetricName::StageInputRows => "layoffs_stage_input_rows",
            MetricName::DedupRemoved => "layoffs_dedup_removed_total",
            MetricName::NormalizeDatesUnparsed => "layoffs_normalize_dates_unparsed_total",
            MetricName::NormalizeIndustryCanonicalized => {
                "layoffs_normalize_industry_canonicalized_total"
            }
            MetricName::FillIndustryFilled => "layoffs_fill_industry_filled_total",
            MetricName::PruneRemoved => "layoffs_prune_removed_total",
            MetricName::ReportsBuilt => "layoffs_reports_built_total",
        }
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

static PROMETHEUS_HANDLE: OnceCell<metrics_exporter_prometheus::PrometheusHandle> =
    OnceCell::new();

/// Install the Prometheus recorder once per process
pub fn install_recorder() -> Result<(), Box<dyn std::error::Error>> {
    if PROMETHEUS_HANDLE.get().is_some() {
        return Ok(());
    }

    let handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| format!("Failed to install Prometheus recorder: {}", e))?;
    let _ = PROMETHEUS_HANDLE.set(handle);

    info!("Metrics recorder installed");
    Ok(())
}

/// Render the current metrics in Prometheus exposition format
pub fn render() -> Option<String> {
    PROMETHEUS_HANDLE.get().map(|handle| handle.render())
}

pub mod pipeline {
    use super::MetricName;

    pub fn run_started() {
        ::metrics::counter!(MetricName::PipelineRuns.as_str()).increment(1);
    }

    /// Record timing and input size for one stage
    pub fn stage_completed(stage: &'static str, input_rows: usize, duration_secs: f64) {
        ::metrics::histogram!(MetricName::StageDuration.as_str(), "stage" => stage)
            .record(duration_secs);
        ::metrics::histogram!(MetricName::StageInputRows.as_str(), "stage" => stage)
            .record(input_rows as f64);
    }
}

pub mod dedup {
    use super::MetricName;

    pub fn duplicates_removed(count: usize) {
        ::metrics::counter!(MetricName::DedupRemoved.as_str()).increment(count as u64);
    }
}

pub mod normalize {
    use super::MetricName;

    pub fn dates_unparsed(count: usize) {
        ::metrics::counter!(MetricName::NormalizeDatesUnparsed.as_str()).increment(count as u64);
    }

    pub fn industry_canonicalized(canonical: &str) {
        ::metrics::counter!(
            MetricName::NormalizeIndustryCanonicalized.as_str(),
            "canonical" => canonical.to_string()
        )
        .increment(1);
    }
}

pub mod fill {
    use super::MetricName;

    pub fn industry_filled(count: usize) {
        ::metrics::counter!(MetricName::FillIndustryFilled.as_str()).increment(count as u64);
    }
}

pub mod prune {
    use super::MetricName;

    pub fn rows_removed(count: usize) {
        ::metrics::counter!(MetricName::PruneRemoved.as_str()).increment(count as u64);
    }
}

pub mod reports {
    use super::MetricName;

    pub fn report_built(report: &'static str) {
        ::metrics::counter!(MetricName::ReportsBuilt.as_str(), "report" => report).increment(1);
    }
}
