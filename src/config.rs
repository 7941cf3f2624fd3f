use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants;
use crate::error::{PipelineError, Result};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub normalize: NormalizeConfig,
    pub dedup: DedupConfig,
    pub ranking: RankingConfig,
    pub logging: LoggingConfig,
}

/// A (prefix -> canonical label) industry rewrite
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndustryRule {
    pub prefix: String,
    pub canonical: String,
}

impl IndustryRule {
    pub fn new(prefix: impl Into<String>, canonical: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            canonical: canonical.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizeConfig {
    /// Applied in order; the first matching prefix wins
    pub industry_rules: Vec<IndustryRule>,
    /// Regex with `month`, `day` and `year` named groups
    pub date_pattern: String,
    pub strip_country_trailing_period: bool,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            industry_rules: constants::DEFAULT_INDUSTRY_RULES
                .iter()
                .map(|(prefix, canonical)| IndustryRule::new(*prefix, *canonical))
                .collect(),
            date_pattern: constants::DEFAULT_DATE_PATTERN.to_string(),
            strip_country_trailing_period: true,
        }
    }
}

/// How absent values compare when forming duplicate groups
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbsentKeyPolicy {
    /// Two absent values in the same key field are equal
    #[default]
    MatchAbsent,
    /// A record with any absent key field is never a duplicate
    DistinctAbsent,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DedupConfig {
    pub absent_policy: AbsentKeyPolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    pub top_band: u32,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            top_band: constants::DEFAULT_TOP_BAND,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub dir: PathBuf,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(constants::DEFAULT_LOG_DIR),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let config_content = fs::read_to_string(path).map_err(|e| {
            PipelineError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        let config = Self::from_toml_str(&config_content)?;
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Resolve the config from an explicit path, then `LAYOFFS_CONFIG`, then defaults
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load(path);
        }
        match std::env::var(constants::CONFIG_ENV_VAR) {
            Ok(env_path) if !env_path.trim().is_empty() => Self::load(Path::new(env_path.trim())),
            _ => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.ranking.top_band == 0 {
            return Err(PipelineError::Config(
                "ranking.top_band must be at least 1".to_string(),
            ));
        }

        if let Some(rule) = self
            .normalize
            .industry_rules
            .iter()
            .find(|r| r.prefix.trim().is_empty())
        {
            return Err(PipelineError::Config(format!(
                "industry rule for '{}' has an empty prefix",
                rule.canonical
            )));
        }

        let pattern = regex::Regex::new(&self.normalize.date_pattern)?;
        let names: Vec<&str> = pattern.capture_names().flatten().collect();
        for group in constants::DATE_PATTERN_GROUPS {
            if !names.contains(&group) {
                return Err(PipelineError::Config(format!(
                    "date_pattern is missing the named group '{}'",
                    group
                )));
            }
        }

        Ok(())
    }
}
