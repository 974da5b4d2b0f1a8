//! Voyage entities resolved from location-visit records

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::{VoyagePattern, VoyagePurpose, YearMonth};

/// Grouping key: one vessel, one voyage number, one reporting month.
///
/// Voyage numbers are reused across months in the source exports, so the
/// month is part of identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VoyageKey {
    pub period: YearMonth,
    pub vessel: String,
    pub voyage_number: String,
}

impl VoyageKey {
    /// `{year}_{month}_{vessel}_{voyageNumber}`
    pub fn unique_voyage_id(&self) -> String {
        format!(
            "{}_{}_{}_{}",
            self.period.year, self.period.month, self.vessel, self.voyage_number
        )
    }

    /// Zero-padded, upper-case form safe for joins and file names,
    /// e.g. `2024-01-EXAMPLE_I-0100`.
    pub fn standardized_voyage_id(&self) -> String {
        let vessel: String = self
            .vessel
            .trim()
            .to_uppercase()
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect();
        let number = self.voyage_number.trim();
        let padded = if number.chars().all(|c| c.is_ascii_digit()) {
            format!("{:0>4}", number)
        } else {
            number.to_uppercase()
        };
        format!(
            "{}-{:02}-{}-{}",
            self.period.year, self.period.month, vessel, padded
        )
    }
}

/// Which sources contributed visits to a voyage
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoyageSources {
    pub events: usize,
    pub manifests: usize,
    pub summaries: usize,
}

/// One vessel's ordered sequence of location visits under a single voyage
/// number within one reporting month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Voyage {
    pub unique_voyage_id: String,
    pub standardized_voyage_id: String,
    pub vessel: String,
    pub voyage_number: String,
    pub period: YearMonth,
    pub origin_port: String,
    pub main_destination: Option<String>,
    pub location_list: Vec<String>,
    pub stop_count: usize,
    pub is_round_trip: bool,
    pub start_time: Option<NaiveDateTime>,
    pub end_time: Option<NaiveDateTime>,
    pub duration_hours: f64,
    pub voyage_purpose: VoyagePurpose,
    pub voyage_pattern: VoyagePattern,
    /// Human-readable route, e.g. "Fourchon -> Thunder Horse PDQ -> Fourchon"
    pub route: String,
    pub includes_production: bool,
    pub includes_drilling: bool,
    pub sources: VoyageSources,
}

/// How often an identical route was sailed in the batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteFrequency {
    pub route: String,
    pub voyage_count: usize,
    pub vessels: Vec<String>,
    pub mean_duration_hours: f64,
    pub voyage_purpose: VoyagePurpose,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(month: u32) -> VoyageKey {
        VoyageKey {
            period: YearMonth { year: 2024, month },
            vessel: "Example I".to_string(),
            voyage_number: "100".to_string(),
        }
    }

    #[test]
    fn test_unique_voyage_id_format() {
        assert_eq!(key(1).unique_voyage_id(), "2024_1_Example I_100");
    }

    #[test]
    fn test_standardized_voyage_id_is_padded() {
        assert_eq!(key(1).standardized_voyage_id(), "2024-01-EXAMPLE_I-0100");
    }

    #[test]
    fn test_month_changes_identity() {
        assert_ne!(key(1).unique_voyage_id(), key(2).unique_voyage_id());
        assert_ne!(key(1).standardized_voyage_id(), key(2).standardized_voyage_id());
    }
}
