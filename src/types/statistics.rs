//! Statistical summary types for KPI variance analysis

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A single KPI observation with the labels it can be grouped by
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledValue {
    pub value: f64,
    pub vessel: Option<String>,
    pub location: Option<String>,
    pub timestamp: Option<NaiveDateTime>,
}

impl LabeledValue {
    pub fn new(value: f64) -> Self {
        Self {
            value,
            vessel: None,
            location: None,
            timestamp: None,
        }
    }
}

/// A named numeric series, e.g. "lifts_per_hour"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledSeries {
    pub name: String,
    pub points: Vec<LabeledValue>,
}

impl LabeledSeries {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            points: Vec::new(),
        }
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Dimension a series is summarised over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GroupBy {
    All,
    Vessel,
    Location,
}

/// Quartiles computed with linear interpolation between order statistics
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quartiles {
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub iqr: f64,
}

/// Which detector flagged an outlier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutlierMethod {
    Iqr,
    ZScore,
}

/// A flagged observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outlier {
    /// Index of the observation within the summarised series
    pub index: usize,
    pub value: f64,
    pub z_score: Option<f64>,
    pub method: OutlierMethod,
    pub vessel: Option<String>,
    pub location: Option<String>,
}

/// Control-chart limits (center line ± kσ)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControlLimits {
    pub center: f64,
    pub upper: f64,
    pub lower: f64,
    pub sigma: f64,
}

/// Distributional summary of one (optionally grouped) numeric series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarianceSummary {
    pub series: String,
    pub group_by: GroupBy,
    /// Group label; `None` for the whole-series summary
    pub group: Option<String>,
    pub count: usize,
    pub mean: f64,
    pub variance: f64,
    pub std_dev: f64,
    /// `None` when the mean is zero
    pub coefficient_of_variation: Option<f64>,
    pub min: f64,
    pub max: f64,
    pub quartiles: Quartiles,
    pub iqr_outliers: Vec<Outlier>,
    pub z_score_outliers: Vec<Outlier>,
    pub control_limits: ControlLimits,
}
