//! Statistical Aggregator
//!
//! Distributional summaries over labelled KPI series:
//!
//! - mean, population variance / σ (statrs), coefficient of variation
//! - quartiles by linear interpolation between order statistics
//!   (`h = (n - 1)·p`)
//! - IQR outliers: strictly outside `Q1 - k·IQR` / `Q3 + k·IQR`
//! - Z-score outliers: `|z| >= threshold`; none when σ = 0
//! - control limits: mean ± sσ
//!
//! Series with fewer than two finite values produce no summary rather than
//! NaN.

use std::collections::BTreeMap;

use statrs::statistics::Statistics;

use crate::config::StatisticsConfig;
use crate::types::{
    ControlLimits, GroupBy, LabeledSeries, LabeledValue, Outlier, OutlierMethod, Quartiles,
    VarianceSummary,
};

/// Absolute slack on the z threshold so a value sitting exactly on it is
/// not lost to rounding.
const Z_EPSILON: f64 = 1e-9;

/// Linear-interpolated percentile of an ascending slice, `p` in [0, 1].
pub fn percentile_sorted(sorted: &[f64], p: f64) -> Option<f64> {
    let n = sorted.len();
    if n == 0 {
        return None;
    }
    let h = (n - 1) as f64 * p.clamp(0.0, 1.0);
    let lo = h.floor() as usize;
    let hi = h.ceil() as usize;
    let frac = h - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

pub fn quartiles(sorted: &[f64]) -> Option<Quartiles> {
    let q1 = percentile_sorted(sorted, 0.25)?;
    let median = percentile_sorted(sorted, 0.5)?;
    let q3 = percentile_sorted(sorted, 0.75)?;
    Some(Quartiles {
        q1,
        median,
        q3,
        iqr: q3 - q1,
    })
}

#[derive(Debug, Clone)]
pub struct StatisticalAggregator {
    config: StatisticsConfig,
}

impl StatisticalAggregator {
    pub fn new(config: &StatisticsConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Summary of a whole series
    pub fn summarize(&self, series: &LabeledSeries) -> Option<VarianceSummary> {
        let points: Vec<&LabeledValue> = series.points.iter().collect();
        self.summarize_points(&series.name, &points, GroupBy::All, None)
    }

    /// One summary per vessel or location label, ordered by label. Points
    /// without the label are skipped; groups below the minimum size are
    /// dropped.
    pub fn summarize_by(&self, series: &LabeledSeries, group_by: GroupBy) -> Vec<VarianceSummary> {
        if group_by == GroupBy::All {
            return self.summarize(series).into_iter().collect();
        }

        let mut groups: BTreeMap<&str, Vec<&LabeledValue>> = BTreeMap::new();
        for point in &series.points {
            let label = match group_by {
                GroupBy::Vessel => point.vessel.as_deref(),
                GroupBy::Location => point.location.as_deref(),
                GroupBy::All => None,
            };
            if let Some(label) = label {
                groups.entry(label).or_default().push(point);
            }
        }

        let min_size = self.config.min_group_size.max(2);
        groups
            .into_iter()
            .filter(|(_, pts)| pts.len() >= min_size)
            .filter_map(|(label, pts)| {
                self.summarize_points(&series.name, &pts, group_by, Some(label.to_string()))
            })
            .collect()
    }

    /// Overall, per-vessel and per-location summaries
    pub fn analyze(&self, series: &LabeledSeries) -> Vec<VarianceSummary> {
        let mut out = self.summarize_by(series, GroupBy::All);
        out.extend(self.summarize_by(series, GroupBy::Vessel));
        out.extend(self.summarize_by(series, GroupBy::Location));
        out
    }

    fn summarize_points(
        &self,
        name: &str,
        points: &[&LabeledValue],
        group_by: GroupBy,
        group: Option<String>,
    ) -> Option<VarianceSummary> {
        let finite: Vec<(usize, &LabeledValue)> = points
            .iter()
            .enumerate()
            .filter(|(_, p)| p.value.is_finite())
            .map(|(i, p)| (i, *p))
            .collect();
        if finite.len() < 2 {
            return None;
        }

        let values: Vec<f64> = finite.iter().map(|(_, p)| p.value).collect();
        let mean = values.iter().mean();
        let variance = values.iter().population_variance();
        let std_dev = variance.sqrt();

        let mut sorted = values.clone();
        sorted.sort_by(f64::total_cmp);
        let quartiles = quartiles(&sorted)?;
        let min = sorted[0];
        let max = sorted[sorted.len() - 1];

        let k = self.config.iqr_multiplier;
        let lower_fence = quartiles.q1 - k * quartiles.iqr;
        let upper_fence = quartiles.q3 + k * quartiles.iqr;

        let z_of = |v: f64| (std_dev > 0.0).then(|| (v - mean) / std_dev);

        let iqr_outliers = finite
            .iter()
            .filter(|(_, p)| p.value < lower_fence || p.value > upper_fence)
            .map(|(i, p)| outlier(*i, p, z_of(p.value), OutlierMethod::Iqr))
            .collect();

        let threshold = self.config.z_score_threshold;
        let z_score_outliers = finite
            .iter()
            .filter_map(|(i, p)| {
                let z = z_of(p.value)?;
                (z.abs() >= threshold - Z_EPSILON).then(|| outlier(*i, p, Some(z), OutlierMethod::ZScore))
            })
            .collect();

        let sigma = self.config.control_limit_sigma;
        Some(VarianceSummary {
            series: name.to_string(),
            group_by,
            group,
            count: values.len(),
            mean,
            variance,
            std_dev,
            coefficient_of_variation: (mean != 0.0).then(|| std_dev / mean.abs()),
            min,
            max,
            quartiles,
            iqr_outliers,
            z_score_outliers,
            control_limits: ControlLimits {
                center: mean,
                upper: mean + sigma * std_dev,
                lower: mean - sigma * std_dev,
                sigma: std_dev,
            },
        })
    }
}

fn outlier(index: usize, point: &LabeledValue, z_score: Option<f64>, method: OutlierMethod) -> Outlier {
    Outlier {
        index,
        value: point.value,
        z_score,
        method,
        vessel: point.vessel.clone(),
        location: point.location.clone(),
    }
}
