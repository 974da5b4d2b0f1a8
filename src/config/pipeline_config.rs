//! Pipeline Configuration - reference tables and tuning values as TOML
//!
//! Every table the classifiers, cost calculator and scorers consult lives
//! here. Each section implements `Default` with the built-in tables from
//! `defaults`, so a batch runs unchanged when no config file is present.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::defaults;
use crate::types::{Department, FacilityType, ProjectType, VesselType};

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration for a reconciliation run.
///
/// Load with `PipelineConfig::load()` which searches:
/// 1. `$OSV_LOGISTICS_CONFIG` env var
/// 2. `./logistics_config.toml`
/// 3. Built-in defaults
///
/// Array sections (`[[locations]]`, `[[vessels]]`, `[[vessel_token_rules]]`)
/// replace the built-in table wholesale when present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Batch identification
    #[serde(default)]
    pub batch: BatchInfo,

    /// Keyword vocabularies for activity and department inference
    #[serde(default)]
    pub classification: ClassificationConfig,

    /// Bulk-fluid keyword tables
    #[serde(default)]
    pub fluids: FluidConfig,

    /// Master location table
    #[serde(default = "defaults::locations")]
    pub locations: Vec<LocationConfig>,

    /// Reference fleet
    #[serde(default = "defaults::vessels")]
    pub vessels: Vec<VesselConfig>,

    /// Name-token rules for vessels missing from the reference fleet
    #[serde(default = "defaults::vessel_token_rules")]
    pub vessel_token_rules: Vec<VesselTokenRule>,

    /// Contract rate table and cost adjustments
    #[serde(default)]
    pub cost: CostConfig,

    /// Data-quality rule weights
    #[serde(default)]
    pub quality: QualityConfig,

    /// Variance-analysis thresholds
    #[serde(default)]
    pub statistics: StatisticsConfig,

    /// Allocation-ledger reconciliation behaviour
    #[serde(default)]
    pub reconciliation: ReconciliationConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            batch: BatchInfo::default(),
            classification: ClassificationConfig::default(),
            fluids: FluidConfig::default(),
            locations: defaults::locations(),
            vessels: defaults::vessels(),
            vessel_token_rules: defaults::vessel_token_rules(),
            cost: CostConfig::default(),
            quality: QualityConfig::default(),
            statistics: StatisticsConfig::default(),
            reconciliation: ReconciliationConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Load configuration using the standard search order:
    /// 1. `$OSV_LOGISTICS_CONFIG` environment variable
    /// 2. `./logistics_config.toml` in the current working directory
    /// 3. Built-in defaults
    pub fn load() -> Self {
        if let Ok(path) = std::env::var(defaults::CONFIG_ENV_VAR) {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), batch = %config.batch.name, "Loaded logistics config from {}", defaults::CONFIG_ENV_VAR);
                        return config;
                    }
                    Err(e) => {
                        warn!(path = %p.display(), error = %e, "Failed to load config from {}, falling back", defaults::CONFIG_ENV_VAR);
                    }
                }
            } else {
                warn!(path = %path, "{} points to non-existent file, falling back", defaults::CONFIG_ENV_VAR);
            }
        }

        let local = PathBuf::from(defaults::LOCAL_CONFIG_FILE);
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!(batch = %config.batch.name, "Loaded logistics config from ./{}", defaults::LOCAL_CONFIG_FILE);
                    return config;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./{}, using defaults", defaults::LOCAL_CONFIG_FILE);
                }
            }
        }

        info!("No logistics config found, using built-in reference tables");
        Self::default()
    }

    /// Load from a specific TOML file path.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        Self::from_toml_str(&contents).map_err(|e| match e {
            ConfigError::Parse(_, inner) => ConfigError::Parse(path.to_path_buf(), inner),
            other => other,
        })
    }

    /// Parse and validate a TOML document.
    ///
    /// Unknown keys are logged as warnings before deserialisation; they never
    /// fail the load.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let typo_warnings = super::validation::validate_unknown_keys(contents);
        for w in &typo_warnings {
            warn!("{}", w);
        }

        let config: Self = toml::from_str(contents)
            .map_err(|e| ConfigError::Parse(PathBuf::from("<inline>"), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the effective config to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    /// Validate the reference tables and thresholds for internal consistency.
    ///
    /// Rules:
    /// - Rate periods are sorted, day-contiguous, and each has at least one tier
    /// - Multipliers, lengths and thresholds are positive and finite
    /// - The sane hourly band is well-ordered
    /// - Location and vessel tables have no blank or duplicate names
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors: Vec<String> = Vec::new();

        // Rate table
        let c = &self.cost;
        if c.rate_periods.is_empty() {
            errors.push("cost.rate_periods must contain at least one period".to_string());
        }
        for (i, period) in c.rate_periods.iter().enumerate() {
            if period.effective_to < period.effective_from {
                errors.push(format!(
                    "cost.rate_periods[{i}]: effective_to ({}) is before effective_from ({})",
                    period.effective_to, period.effective_from
                ));
            }
            if period.tiers.is_empty() {
                errors.push(format!("cost.rate_periods[{i}]: must have at least one tier"));
            }
            for (j, tier) in period.tiers.iter().enumerate() {
                Self::check_positive(
                    tier.hourly_rate,
                    &format!("cost.rate_periods[{i}].tiers[{j}].hourly_rate"),
                    &mut errors,
                );
                if !tier.min_length_ft.is_finite() || tier.min_length_ft < 0.0 {
                    errors.push(format!(
                        "cost.rate_periods[{i}].tiers[{j}].min_length_ft must be >= 0 (got {})",
                        tier.min_length_ft
                    ));
                }
            }
        }
        for (i, pair) in c.rate_periods.windows(2).enumerate() {
            let (prev, next) = (&pair[0], &pair[1]);
            match prev.effective_to.succ_opt() {
                Some(expected) if expected == next.effective_from => {}
                _ if next.effective_from <= prev.effective_to => errors.push(format!(
                    "cost.rate_periods[{}] starting {} overlaps the previous period ending {}",
                    i + 1,
                    next.effective_from,
                    prev.effective_to
                )),
                _ => errors.push(format!(
                    "cost.rate_periods[{}] starting {} leaves a gap after the previous period ending {}",
                    i + 1,
                    next.effective_from,
                    prev.effective_to
                )),
            }
        }

        Self::check_positive(
            c.speed_support_multiplier,
            "cost.speed_support_multiplier",
            &mut errors,
        );
        Self::check_positive(c.default_length_ft, "cost.default_length_ft", &mut errors);
        if !c.min_sane_hourly_rate.is_finite()
            || !c.max_sane_hourly_rate.is_finite()
            || c.min_sane_hourly_rate < 0.0
            || c.max_sane_hourly_rate <= c.min_sane_hourly_rate
        {
            errors.push(format!(
                "cost: sane hourly band must satisfy 0 <= min < max (got {} - {})",
                c.min_sane_hourly_rate, c.max_sane_hourly_rate
            ));
        }

        // Quality
        let q = &self.quality;
        Self::check_positive(q.max_event_hours, "quality.max_event_hours", &mut errors);
        // Undated records are never costed, so the cost rules cannot fire on them
        let cost_weights = u16::from(q.negative_cost_weight) + u16::from(q.rate_out_of_band_weight);
        if u16::from(q.missing_date_weight) < cost_weights {
            errors.push(format!(
                "quality.missing_date_weight ({}) must be at least negative_cost_weight + \
                 rate_out_of_band_weight ({cost_weights})",
                q.missing_date_weight
            ));
        }

        // Statistics
        let s = &self.statistics;
        Self::check_positive(s.z_score_threshold, "statistics.z_score_threshold", &mut errors);
        Self::check_positive(s.iqr_multiplier, "statistics.iqr_multiplier", &mut errors);
        Self::check_positive(
            s.control_limit_sigma,
            "statistics.control_limit_sigma",
            &mut errors,
        );
        if s.min_group_size == 0 {
            errors.push("statistics.min_group_size must be > 0".to_string());
        }

        // Reference tables
        let (table_errors, table_warnings) = super::validation::validate_reference_tables(self);
        errors.extend(table_errors);
        for w in &table_warnings {
            warn!("{}", w);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    fn check_positive(value: f64, name: &str, errors: &mut Vec<String>) {
        // NaN comparisons silently pass, so test finiteness first
        if !value.is_finite() || value <= 0.0 {
            errors.push(format!("{name} must be a finite number > 0 (got {value})"));
        }
    }
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config I/O error ({}): {1}", .0.display())]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Config parse error ({}): {1}", .0.display())]
    Parse(PathBuf, #[source] toml::de::Error),

    #[error("Config serialization error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Config validation failed:\n  - {}", .0.join("\n  - "))]
    Validation(Vec<String>),
}

// ============================================================================
// Batch Info
// ============================================================================

/// Identification metadata; appears in logs and the output file only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchInfo {
    #[serde(default = "default_batch_name")]
    pub name: String,

    /// Operating region, e.g. "Gulf of Mexico"
    #[serde(default)]
    pub region: String,
}

fn default_batch_name() -> String {
    "DEFAULT".to_string()
}

impl Default for BatchInfo {
    fn default() -> Self {
        Self {
            name: default_batch_name(),
            region: String::new(),
        }
    }
}

// ============================================================================
// Classification Vocabularies
// ============================================================================

/// Maps an LC-number prefix to a department when the code itself is not in
/// the allocation ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LcPrefixRule {
    pub prefix: String,
    pub department: Department,
}

/// Keywords that mark event text as supporting one project type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectKeywordRule {
    pub project_type: ProjectType,
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationConfig {
    /// Any of these in the event text marks the time Non-Productive
    #[serde(default = "defaults::non_productive_keywords")]
    pub non_productive_keywords: Vec<String>,

    #[serde(default = "defaults::drilling_keywords")]
    pub drilling_keywords: Vec<String>,

    #[serde(default = "defaults::production_keywords")]
    pub production_keywords: Vec<String>,

    #[serde(default = "defaults::logistics_keywords")]
    pub logistics_keywords: Vec<String>,

    #[serde(default)]
    pub lc_prefix_departments: Vec<LcPrefixRule>,

    /// Checked in order; the first project type with a matching keyword wins
    #[serde(default = "defaults::project_keywords")]
    pub project_keywords: Vec<ProjectKeywordRule>,
}

impl Default for ClassificationConfig {
    fn default() -> Self {
        Self {
            non_productive_keywords: defaults::non_productive_keywords(),
            drilling_keywords: defaults::drilling_keywords(),
            production_keywords: defaults::production_keywords(),
            logistics_keywords: defaults::logistics_keywords(),
            lc_prefix_departments: Vec::new(),
            project_keywords: defaults::project_keywords(),
        }
    }
}

/// Fluid-name keyword tables. Fuel is checked first and never counts as
/// production fluid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FluidConfig {
    #[serde(default = "defaults::fuel_keywords")]
    pub fuel_keywords: Vec<String>,

    #[serde(default = "defaults::completion_fluid_keywords")]
    pub completion_keywords: Vec<String>,

    #[serde(default = "defaults::drilling_fluid_keywords")]
    pub drilling_keywords: Vec<String>,

    #[serde(default = "defaults::production_fluid_keywords")]
    pub production_keywords: Vec<String>,
}

impl Default for FluidConfig {
    fn default() -> Self {
        Self {
            fuel_keywords: defaults::fuel_keywords(),
            completion_keywords: defaults::completion_fluid_keywords(),
            drilling_keywords: defaults::drilling_fluid_keywords(),
            production_keywords: defaults::production_fluid_keywords(),
        }
    }
}

// ============================================================================
// Reference Tables
// ============================================================================

/// One row of the master location table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationConfig {
    pub name: String,
    pub facility_type: FacilityType,
    #[serde(default)]
    pub aliases: Vec<String>,
    /// All keywords must appear for a containment match
    #[serde(default)]
    pub keywords: Vec<String>,
}

/// One vessel of the reference fleet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VesselConfig {
    pub name: String,
    pub company: String,
    pub vessel_type: VesselType,
    /// Length overall (ft), used for the rate tier
    #[serde(default)]
    pub length_ft: Option<f64>,
}

/// A whole-word token in a vessel name that implies a company and/or class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VesselTokenRule {
    pub token: String,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub vessel_type: Option<VesselType>,
}

// ============================================================================
// Cost
// ============================================================================

/// Hourly rate for vessels at or above a length
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateTierConfig {
    pub min_length_ft: f64,
    pub hourly_rate: f64,
}

/// A contract period; both boundary dates are inclusive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatePeriodConfig {
    pub effective_from: NaiveDate,
    pub effective_to: NaiveDate,
    pub tiers: Vec<RateTierConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostConfig {
    #[serde(default = "defaults::rate_periods")]
    pub rate_periods: Vec<RatePeriodConfig>,

    /// Applied to the tier rate for `discounted_vessel_types`
    #[serde(default = "default_speed_support_multiplier")]
    pub speed_support_multiplier: f64,

    #[serde(default = "default_discounted_vessel_types")]
    pub discounted_vessel_types: Vec<VesselType>,

    #[serde(default = "default_length_ft")]
    pub default_length_ft: f64,

    #[serde(default = "default_min_sane_hourly_rate")]
    pub min_sane_hourly_rate: f64,

    #[serde(default = "default_max_sane_hourly_rate")]
    pub max_sane_hourly_rate: f64,
}

fn default_speed_support_multiplier() -> f64 { defaults::SPEED_SUPPORT_MULTIPLIER }
fn default_discounted_vessel_types() -> Vec<VesselType> { vec![VesselType::Fsv] }
fn default_length_ft() -> f64 { defaults::DEFAULT_VESSEL_LENGTH_FT }
fn default_min_sane_hourly_rate() -> f64 { defaults::MIN_SANE_HOURLY_RATE }
fn default_max_sane_hourly_rate() -> f64 { defaults::MAX_SANE_HOURLY_RATE }

impl Default for CostConfig {
    fn default() -> Self {
        Self {
            rate_periods: defaults::rate_periods(),
            speed_support_multiplier: default_speed_support_multiplier(),
            discounted_vessel_types: default_discounted_vessel_types(),
            default_length_ft: default_length_ft(),
            min_sane_hourly_rate: default_min_sane_hourly_rate(),
            max_sane_hourly_rate: default_max_sane_hourly_rate(),
        }
    }
}

// ============================================================================
// Data Quality
// ============================================================================

/// Points deducted from 100 per violated rule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityConfig {
    /// Must cover both cost weights, which an undated record cannot incur
    #[serde(default = "default_missing_date_weight")]
    pub missing_date_weight: u8,

    #[serde(default = "default_missing_vessel_weight")]
    pub missing_vessel_weight: u8,

    #[serde(default = "default_implausible_duration_weight")]
    pub implausible_duration_weight: u8,

    #[serde(default = "default_negative_cost_weight")]
    pub negative_cost_weight: u8,

    #[serde(default = "default_rate_out_of_band_weight")]
    pub rate_out_of_band_weight: u8,

    /// Event durations above this are implausible (hours)
    #[serde(default = "default_max_event_hours")]
    pub max_event_hours: f64,
}

fn default_missing_date_weight() -> u8 { defaults::MISSING_DATE_WEIGHT }
fn default_missing_vessel_weight() -> u8 { defaults::MISSING_VESSEL_WEIGHT }
fn default_implausible_duration_weight() -> u8 { defaults::IMPLAUSIBLE_DURATION_WEIGHT }
fn default_negative_cost_weight() -> u8 { defaults::NEGATIVE_COST_WEIGHT }
fn default_rate_out_of_band_weight() -> u8 { defaults::RATE_OUT_OF_BAND_WEIGHT }
fn default_max_event_hours() -> f64 { defaults::MAX_EVENT_HOURS }

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            missing_date_weight: default_missing_date_weight(),
            missing_vessel_weight: default_missing_vessel_weight(),
            implausible_duration_weight: default_implausible_duration_weight(),
            negative_cost_weight: default_negative_cost_weight(),
            rate_out_of_band_weight: default_rate_out_of_band_weight(),
            max_event_hours: default_max_event_hours(),
        }
    }
}

// ============================================================================
// Statistics
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatisticsConfig {
    /// |z| at or above this is an outlier
    #[serde(default = "default_z_score_threshold")]
    pub z_score_threshold: f64,

    /// Fence distance in IQRs beyond Q1/Q3
    #[serde(default = "default_iqr_multiplier")]
    pub iqr_multiplier: f64,

    /// Control limits at mean ± this many σ
    #[serde(default = "default_control_limit_sigma")]
    pub control_limit_sigma: f64,

    /// Groups smaller than this get no grouped summary
    #[serde(default = "default_min_group_size")]
    pub min_group_size: usize,
}

fn default_z_score_threshold() -> f64 { defaults::Z_SCORE_THRESHOLD }
fn default_iqr_multiplier() -> f64 { defaults::IQR_MULTIPLIER }
fn default_control_limit_sigma() -> f64 { defaults::CONTROL_LIMIT_SIGMA }
fn default_min_group_size() -> usize { defaults::MIN_GROUP_SIZE }

impl Default for StatisticsConfig {
    fn default() -> Self {
        Self {
            z_score_threshold: default_z_score_threshold(),
            iqr_multiplier: default_iqr_multiplier(),
            control_limit_sigma: default_control_limit_sigma(),
            min_group_size: default_min_group_size(),
        }
    }
}

// ============================================================================
// Reconciliation
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReconciliationConfig {
    /// Treat any conflicting allocation code as a batch failure
    #[serde(default)]
    pub strict_conflicts: bool,
}
