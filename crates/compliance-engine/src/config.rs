//! Engine configuration
//!
//! Regulatory constants (entity-of-concern countries, threshold years, the
//! domestic-content schedule, eligibility cutoffs) and resolver tuning are
//! loaded from TOML. Every field has a default, so an empty document is a
//! valid configuration.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::country::normalize_country;
use crate::error::{EngineError, Result};

/// Main configuration structure loaded from TOML files
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Two-letter code treated as domestic origin
    #[serde(default = "default_domestic_country")]
    pub domestic_country: String,
    #[serde(default)]
    pub feoc: FeocConfig,
    #[serde(default)]
    pub domestic_content: DomesticContentConfig,
    #[serde(default)]
    pub eligibility: EligibilityConfig,
    #[serde(default)]
    pub resolver: ResolverConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            domestic_country: default_domestic_country(),
            feoc: FeocConfig::default(),
            domestic_content: DomesticContentConfig::default(),
            eligibility: EligibilityConfig::default(),
            resolver: ResolverConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Load and validate configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            EngineError::InvalidConfig(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from a TOML string
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: EngineConfig = toml::from_str(s)
            .map_err(|e| EngineError::InvalidConfig(format!("malformed TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let domestic = normalize_country(&self.domestic_country).ok_or_else(|| {
            EngineError::InvalidConfig("domestic_country must not be empty".into())
        })?;

        if self.feoc.countries.is_empty() {
            return Err(EngineError::InvalidConfig(
                "feoc.countries must name at least one country".into(),
            ));
        }
        if self.feoc.is_concern_country(&domestic) {
            return Err(EngineError::InvalidConfig(format!(
                "domestic country {} is also listed as an entity of concern",
                domestic
            )));
        }

        self.domestic_content.validate()?;

        if self.resolver.concurrency == 0 {
            return Err(EngineError::InvalidConfig(
                "resolver.concurrency must be at least 1".into(),
            ));
        }

        Ok(())
    }

    /// Normalised domestic country code
    pub fn domestic_code(&self) -> String {
        normalize_country(&self.domestic_country).unwrap_or_else(default_domestic_country)
    }
}

fn default_domestic_country() -> String {
    "US".to_string()
}

/// Prohibited-origin (entity of concern) regime
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FeocConfig {
    #[serde(default = "default_feoc_countries")]
    pub countries: Vec<String>,
    /// First installation year in which concern-origin content is capped
    #[serde(default = "default_feoc_effective_year")]
    pub effective_year: i32,
}

impl Default for FeocConfig {
    fn default() -> Self {
        Self {
            countries: default_feoc_countries(),
            effective_year: default_feoc_effective_year(),
        }
    }
}

impl FeocConfig {
    /// `code` must already be normalised
    pub fn is_concern_country(&self, code: &str) -> bool {
        self.countries
            .iter()
            .filter_map(|c| normalize_country(c))
            .any(|c| c == code)
    }

    /// Whether the concern-origin cap applies in this year
    pub fn is_restricted(&self, installation_year: i32) -> bool {
        installation_year >= self.effective_year
    }

    /// 0% from the effective year on, unrestricted before it
    pub fn max_allowed_concern_percent(&self, installation_year: i32) -> f64 {
        if self.is_restricted(installation_year) {
            0.0
        } else {
            100.0
        }
    }
}

fn default_feoc_countries() -> Vec<String> {
    ["CN", "RU", "KP", "IR"].iter().map(|c| c.to_string()).collect()
}

fn default_feoc_effective_year() -> i32 {
    2026
}

/// One step of the escalating manufactured-products requirement
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ThresholdStep {
    pub from_year: i32,
    pub percent: f64,
}

/// Domestic-content bonus regime
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DomesticContentConfig {
    #[serde(default = "default_steel_required_percent")]
    pub steel_iron_required_percent: f64,
    /// Ascending by `from_year`
    #[serde(default = "default_schedule")]
    pub schedule: Vec<ThresholdStep>,
}

impl Default for DomesticContentConfig {
    fn default() -> Self {
        Self {
            steel_iron_required_percent: default_steel_required_percent(),
            schedule: default_schedule(),
        }
    }
}

impl DomesticContentConfig {
    /// Required manufactured-products domestic percent for a year.
    /// Years before the first step use the baseline (first) step.
    pub fn required_domestic_percent(&self, installation_year: i32) -> f64 {
        let baseline = self.schedule.first().map(|s| s.percent).unwrap_or(0.0);
        self.schedule
            .iter()
            .rev()
            .find(|step| installation_year >= step.from_year)
            .map(|step| step.percent)
            .unwrap_or(baseline)
    }

    fn validate(&self) -> Result<()> {
        if self.schedule.is_empty() {
            return Err(EngineError::InvalidConfig(
                "domestic_content.schedule must have at least one step".into(),
            ));
        }
        if self
            .schedule
            .windows(2)
            .any(|pair| pair[0].from_year >= pair[1].from_year)
        {
            return Err(EngineError::InvalidConfig(
                "domestic_content.schedule years must be strictly ascending".into(),
            ));
        }
        let out_of_range = |p: f64| !(0.0..=100.0).contains(&p);
        if out_of_range(self.steel_iron_required_percent)
            || self.schedule.iter().any(|s| out_of_range(s.percent))
        {
            return Err(EngineError::InvalidConfig(
                "domestic_content percentages must be within 0..=100".into(),
            ));
        }
        Ok(())
    }
}

fn default_steel_required_percent() -> f64 {
    100.0
}

fn default_schedule() -> Vec<ThresholdStep> {
    vec![
        ThresholdStep {
            from_year: 2024,
            percent: 40.0,
        },
        ThresholdStep {
            from_year: 2025,
            percent: 45.0,
        },
        ThresholdStep {
            from_year: 2026,
            percent: 50.0,
        },
        ThresholdStep {
            from_year: 2027,
            percent: 55.0,
        },
    ]
}

/// Thresholds for the three eligibility paths
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EligibilityConfig {
    /// Projects strictly below this net output qualify
    #[serde(default = "default_small_project_max_mw")]
    pub small_project_max_mw: f64,
    /// Projects that began construction strictly before this date qualify
    #[serde(default = "default_construction_cutoff")]
    pub construction_cutoff: NaiveDate,
}

impl Default for EligibilityConfig {
    fn default() -> Self {
        Self {
            small_project_max_mw: default_small_project_max_mw(),
            construction_cutoff: default_construction_cutoff(),
        }
    }
}

fn default_small_project_max_mw() -> f64 {
    1.0
}

fn default_construction_cutoff() -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 1, 29).unwrap_or_default()
}

/// Resolver tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResolverConfig {
    /// Maximum concurrent item resolutions (default: 16)
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Read-through cache lifetime in seconds (default: 300)
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            cache_ttl_secs: default_cache_ttl_secs(),
        }
    }
}

impl ResolverConfig {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

fn default_concurrency() -> usize {
    16
}

fn default_cache_ttl_secs() -> u64 {
    300
}
