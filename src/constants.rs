//! Defaults shared by the configuration layer and the pipeline stages

/// Number of ranks kept per year by the partition ranker
pub const DEFAULT_TOP_BAND: u32 = 5;

/// `month/day/4-digit-year`, the date layout of the raw layoffs export
pub const DEFAULT_DATE_PATTERN: &str = r"^(?P<month>\d{1,2})/(?P<day>\d{1,2})/(?P<year>\d{4})$";

/// Named capture groups every date pattern must define
pub const DATE_PATTERN_GROUPS: [&str; 3] = ["month", "day", "year"];

/// Default industry canonicalization rules as (prefix, canonical label)
pub const DEFAULT_INDUSTRY_RULES: &[(&str, &str)] = &[("Crypto", "Crypto")];

/// Cell values the loader treats as missing, compared case-insensitively
pub const ABSENT_MARKERS: &[&str] = &["", "null", "n/a"];

pub const DEFAULT_LOG_DIR: &str = "logs";
pub const DEFAULT_LOG_DIRECTIVE: &str = "layoffs_cleaner=info";

/// Environment variable naming the config file when no flag is given
pub const CONFIG_ENV_VAR: &str = "LAYOFFS_CONFIG";

// Output file names
pub const CLEANED_CSV_FILE: &str = "cleaned_layoffs.csv";
pub const MONTHLY_REPORT_FILE: &str = "monthly.json";
pub const ROLLING_REPORT_FILE: &str = "rolling.json";
pub const TOP_BY_YEAR_REPORT_FILE: &str = "top_by_year.json";
pub const SUMMARY_REPORT_FILE: &str = "summary.json";
