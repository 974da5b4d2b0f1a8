//! Vessel Cost Calculator
//!
//! Hourly rate is a step function of vessel length (tiers at 200/250/300 ft
//! in the default contract), scaled by the speed-support multiplier for
//! discounted classes (FSV by default). Rates come from a table of contract
//! periods indexed by inclusive date range.
//!
//! ```text
//! total  = hours × hourly
//! daily  = hourly × 24
//! ```

use chrono::NaiveDate;
use thiserror::Error;

use crate::classify::VesselProfile;
use crate::config::{CostConfig, RatePeriodConfig};
use crate::types::{VesselCost, VesselType};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CostError {
    #[error("no contract rate period covers {0}")]
    NoRatePeriod(NaiveDate),
}

// ============================================================================
// Rate Table
// ============================================================================

#[derive(Debug, Clone)]
struct RatePeriod {
    from: NaiveDate,
    to: NaiveDate,
    /// (min_length_ft, hourly_rate), ascending by length
    tiers: Vec<(f64, f64)>,
}

impl RatePeriod {
    fn covers(&self, date: NaiveDate) -> bool {
        self.from <= date && date <= self.to
    }

    /// Rate of the highest tier whose minimum length the vessel reaches;
    /// vessels shorter than every tier get the lowest tier.
    fn hourly_rate(&self, length_ft: f64) -> Option<f64> {
        self.tiers
            .iter()
            .rev()
            .find(|(min, _)| length_ft >= *min)
            .or_else(|| self.tiers.first())
            .map(|(_, rate)| *rate)
    }
}

/// Contract periods sorted by start date
#[derive(Debug, Clone)]
pub struct RateTable {
    periods: Vec<RatePeriod>,
}

impl RateTable {
    pub fn new(periods: &[RatePeriodConfig]) -> Self {
        let mut periods: Vec<RatePeriod> = periods
            .iter()
            .map(|p| {
                let mut tiers: Vec<(f64, f64)> = p
                    .tiers
                    .iter()
                    .map(|t| (t.min_length_ft, t.hourly_rate))
                    .collect();
                tiers.sort_by(|a, b| a.0.total_cmp(&b.0));
                RatePeriod {
                    from: p.effective_from,
                    to: p.effective_to,
                    tiers,
                }
            })
            .collect();
        periods.sort_by_key(|p| p.from);
        Self { periods }
    }

    pub fn len(&self) -> usize {
        self.periods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }

    /// Earliest and latest covered dates
    pub fn coverage(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.periods.first()?;
        let last = self.periods.iter().map(|p| p.to).max()?;
        Some((first.from, last))
    }

    /// Base hourly rate in force on a date for a vessel length.
    pub fn hourly_rate(&self, date: NaiveDate, length_ft: f64) -> Result<f64, CostError> {
        self.periods
            .iter()
            .find(|p| p.covers(date))
            .and_then(|p| p.hourly_rate(length_ft))
            .ok_or(CostError::NoRatePeriod(date))
    }
}

// ============================================================================
// Calculator
// ============================================================================

#[derive(Debug, Clone)]
pub struct CostCalculator {
    rates: RateTable,
    speed_support_multiplier: f64,
    discounted: Vec<VesselType>,
    default_length_ft: f64,
    sane_band: (f64, f64),
}

impl CostCalculator {
    pub fn new(config: &CostConfig) -> Self {
        Self {
            rates: RateTable::new(&config.rate_periods),
            speed_support_multiplier: config.speed_support_multiplier,
            discounted: config.discounted_vessel_types.clone(),
            default_length_ft: config.default_length_ft,
            sane_band: (config.min_sane_hourly_rate, config.max_sane_hourly_rate),
        }
    }

    pub fn rate_table(&self) -> &RateTable {
        &self.rates
    }

    /// Effective hourly rate for a vessel on a date.
    pub fn hourly_rate(&self, vessel: &VesselProfile, date: NaiveDate) -> Result<f64, CostError> {
        let length = vessel.length_ft.unwrap_or(self.default_length_ft);
        let base = self.rates.hourly_rate(date, length)?;
        if self.discounted.contains(&vessel.vessel_type) {
            Ok(base * self.speed_support_multiplier)
        } else {
            Ok(base)
        }
    }

    pub fn cost(&self, vessel: &VesselProfile, date: NaiveDate, hours: f64) -> Result<VesselCost, CostError> {
        let hourly_rate = self.hourly_rate(vessel, date)?;
        Ok(VesselCost {
            hourly_rate,
            daily_rate: hourly_rate * 24.0,
            total: hours * hourly_rate,
        })
    }

    /// Whether an hourly rate falls inside the configured sane band
    pub fn is_rate_sane(&self, hourly_rate: f64) -> bool {
        let (lo, hi) = self.sane_band;
        (lo..=hi).contains(&hourly_rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RateTierConfig;

    fn vessel(vessel_type: VesselType, length_ft: Option<f64>) -> VesselProfile {
        VesselProfile {
            vessel_type,
            company: "Example Marine".into(),
            length_ft,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn calculator() -> CostCalculator {
        CostCalculator::new(&CostConfig::default())
    }

    #[test]
    fn test_rate_change_boundary_is_inclusive() {
        let c = calculator();
        let psv = vessel(VesselType::Psv, Some(280.0));
        let before = c.cost(&psv, date(2024, 6, 30), 1.0).unwrap();
        let after = c.cost(&psv, date(2024, 7, 1), 1.0).unwrap();
        assert_eq!(before.hourly_rate, 650.0);
        assert_eq!(after.hourly_rate, 720.0);
    }

    #[test]
    fn test_tiers_step_at_boundaries() {
        let c = calculator();
        let d = date(2024, 8, 1);
        let rate = |len: f64| c.hourly_rate(&vessel(VesselType::Osv, Some(len)), d).unwrap();
        assert_eq!(rate(150.0), 500.0);
        assert_eq!(rate(199.9), 500.0);
        assert_eq!(rate(200.0), 600.0);
        assert_eq!(rate(250.0), 720.0);
        assert_eq!(rate(300.0), 880.0);
        assert_eq!(rate(350.0), 880.0);
    }

    #[test]
    fn test_speed_support_multiplier_and_totals() {
        let c = calculator();
        let fsv = vessel(VesselType::Fsv, Some(190.0));
        let cost = c.cost(&fsv, date(2024, 8, 1), 6.0).unwrap();
        assert!((cost.hourly_rate - 400.0).abs() < 1e-9);
        assert!((cost.daily_rate - 9_600.0).abs() < 1e-9);
        assert!((cost.total - 2_400.0).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_length_uses_default() {
        let c = calculator();
        let rate = c.hourly_rate(&vessel(VesselType::Unknown, None), date(2024, 8, 1)).unwrap();
        assert_eq!(rate, 600.0);
    }

    #[test]
    fn test_uncovered_date_is_an_error() {
        let c = calculator();
        let err = c.cost(&vessel(VesselType::Psv, None), date(2019, 12, 31), 1.0).unwrap_err();
        assert_eq!(err, CostError::NoRatePeriod(date(2019, 12, 31)));
        assert_eq!(c.rate_table().coverage(), Some((date(2020, 1, 1), date(2035, 12, 31))));
    }

    #[test]
    fn test_tiers_sorted_on_load() {
        let table = RateTable::new(&[RatePeriodConfig {
            effective_from: date(2024, 1, 1),
            effective_to: date(2024, 12, 31),
            tiers: vec![
                RateTierConfig { min_length_ft: 250.0, hourly_rate: 3.0 },
                RateTierConfig { min_length_ft: 0.0, hourly_rate: 1.0 },
            ],
        }]);
        assert_eq!(table.hourly_rate(date(2024, 5, 5), 260.0).unwrap(), 3.0);
        assert_eq!(table.hourly_rate(date(2024, 5, 5), 100.0).unwrap(), 1.0);
    }

    #[test]
    fn test_sane_band() {
        let c = calculator();
        assert!(c.is_rate_sane(600.0));
        assert!(!c.is_rate_sane(50.0));
        assert!(!c.is_rate_sane(10_000.0));
    }
}
