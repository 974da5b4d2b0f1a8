//! Batch output handed to the presentation layer

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{
    AllocationConflict, AllocationEntry, EnrichedBulkTransfer, EnrichedEvent, FluidCategory,
    ManifestLine, RouteFrequency, SourceKind, VarianceSummary, Voyage, VoyageEvent,
};

/// Quality-score distribution across every scored record in a batch
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QualityDistribution {
    /// Score >= 90
    pub excellent: usize,
    /// 70-89
    pub good: usize,
    /// 50-69
    pub fair: usize,
    /// < 50
    pub poor: usize,
    pub mean_score: Option<f64>,
}

impl QualityDistribution {
    pub fn from_scores(scores: impl IntoIterator<Item = u8>) -> Self {
        let mut dist = Self::default();
        let mut total = 0u64;
        let mut n = 0usize;
        for s in scores {
            match s {
                90..=100 => dist.excellent += 1,
                70..=89 => dist.good += 1,
                50..=69 => dist.fair += 1,
                _ => dist.poor += 1,
            }
            total += u64::from(s);
            n += 1;
        }
        dist.mean_score = if n > 0 {
            Some(total as f64 / n as f64)
        } else {
            None
        };
        dist
    }

    pub fn total(&self) -> usize {
        self.excellent + self.good + self.fair + self.poor
    }
}

/// Bulk-fluid volumes by category, in barrels
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FluidVolumeTotals {
    pub by_category: BTreeMap<FluidCategory, f64>,
    /// Production-fluid volume with fuel transfers excluded
    pub production_fluid_bbls: f64,
    pub fuel_bbls: f64,
    pub transfer_count: usize,
}

/// Per-source ingestion counts
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceCounts {
    pub ingested: usize,
    /// Records with every classification resolved (department assigned)
    pub classified: usize,
    /// Records with at least one quality issue or parse flag
    pub flagged: usize,
    pub columns_missing: Vec<String>,
}

/// Per-batch processing summary
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub sources: BTreeMap<SourceKind, SourceCounts>,
    pub quality: QualityDistribution,
    pub allocation_codes: usize,
    pub allocation_conflicts: usize,
    pub unresolved_locations: usize,
    pub voyages: usize,
    /// Events/manifests that could not be grouped (no voyage number or date)
    pub ungrouped_records: usize,
    pub total_vessel_cost: f64,
    pub productive_hours: f64,
    pub non_productive_hours: f64,
}

/// Complete enriched dataset for one batch.
///
/// Only ever returned whole; a failed batch yields an error instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedDataset {
    pub voyage_events: Vec<EnrichedEvent<VoyageEvent>>,
    pub manifests: Vec<EnrichedEvent<ManifestLine>>,
    pub bulk_transfers: Vec<EnrichedBulkTransfer>,
    pub allocations: Vec<AllocationEntry>,
    pub allocation_conflicts: Vec<AllocationConflict>,
    pub voyages: Vec<Voyage>,
    pub routes: Vec<RouteFrequency>,
    pub fluid_volumes: FluidVolumeTotals,
    pub variance_analysis: Vec<VarianceSummary>,
    pub summary: BatchSummary,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quality_distribution_buckets() {
        let dist = QualityDistribution::from_scores([100, 95, 80, 60, 10, 0]);
        assert_eq!(dist.excellent, 2);
        assert_eq!(dist.good, 1);
        assert_eq!(dist.fair, 1);
        assert_eq!(dist.poor, 2);
        assert_eq!(dist.total(), 6);
        let mean = dist.mean_score.unwrap();
        assert!((mean - 57.5).abs() < 1e-9);
    }

    #[test]
    fn test_quality_distribution_empty_has_no_mean() {
        let dist = QualityDistribution::from_scores(Vec::<u8>::new());
        assert_eq!(dist.total(), 0);
        assert!(dist.mean_score.is_none());
    }
}
