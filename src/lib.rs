pub mod config;
pub mod constants;
pub mod domain;
pub mod error;
pub mod logging;
pub mod observability;
pub mod pipeline;

pub use config::Config;
pub use domain::{LayoffRecord, MonthlyTotal, RawLayoffRecord, RollingTotal, YearMonth, YearlyRank};
pub use error::{PipelineError, Result};
