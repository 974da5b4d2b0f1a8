//! Per-record enrichment over the read-only lookup tables
//!
//! Built once per batch after the allocation ledger is reconciled. Every
//! classifier behind it is immutable, so records are enriched from rayon
//! worker threads without locking.

use std::sync::Arc;

use crate::allocation::AllocationReconciler;
use crate::classify::{
    ActivityClassifier, DepartmentClassifier, FluidClassifier, ProjectClassifier, VesselClassifier,
    VesselProfile,
};
use crate::config::{defaults, PipelineConfig};
use crate::cost::{CostCalculator, CostError};
use crate::locations::LocationResolver;
use crate::quality::QualityScorer;
use crate::types::{
    BulkTransfer, EnrichedBulkTransfer, EnrichedEvent, Enrichment, EventRecord, FluidCategory,
    ManifestLine, VesselCost, VoyageEvent,
};

pub struct Enricher {
    locations: Arc<LocationResolver>,
    allocations: Arc<AllocationReconciler>,
    activity: ActivityClassifier,
    department: DepartmentClassifier,
    project: ProjectClassifier,
    fluid: FluidClassifier,
    vessel: VesselClassifier,
    cost: CostCalculator,
    quality: QualityScorer,
}

impl Enricher {
    pub fn new(
        config: &PipelineConfig,
        locations: Arc<LocationResolver>,
        allocations: Arc<AllocationReconciler>,
    ) -> Self {
        Self {
            activity: ActivityClassifier::new(&config.classification),
            department: DepartmentClassifier::new(Arc::clone(&allocations), Arc::clone(&locations)),
            project: ProjectClassifier::new(Arc::clone(&allocations), &config.classification),
            fluid: FluidClassifier::new(&config.fluids),
            vessel: VesselClassifier::new(&config.vessels, &config.vessel_token_rules),
            cost: CostCalculator::new(&config.cost),
            quality: QualityScorer::new(&config.quality, &config.cost),
            locations,
            allocations,
        }
    }

    /// Shared enrichment for events and manifest lines.
    fn enrichment(
        &self,
        record: &(dyn EventRecord + 'static),
        vessel: VesselProfile,
        fluid_category: Option<FluidCategory>,
        vessel_cost: Option<VesselCost>,
    ) -> Enrichment {
        let activity_category = self.activity.classify(record.parent_event(), record.event());
        let department = self.department.classify(record);
        let project = self.project.classify(record, department.value);
        let location = self.locations.resolve_opt(record.location_text());
        let rig_location = record
            .cost_code()
            .and_then(|code| self.allocations.lookup_cell(code))
            .and_then(|entry| entry.rig_location.clone());
        let quality = self.quality.assess(record, vessel_cost.as_ref());

        Enrichment {
            activity_category,
            department: department.value,
            department_source: department.source,
            project_type: project.value,
            project_type_source: project.source,
            fluid_category,
            canonical_location: location.canonical_name.clone(),
            facility_type: location.facility_type,
            rig_location,
            vessel_type: vessel.vessel_type,
            company: vessel.company,
            vessel_cost,
            data_quality_score: quality.score,
            data_quality_issues: quality.issues,
        }
    }

    /// Events without a date get no cost; a dated event outside every
    /// contract period is an error.
    pub fn enrich_event(&self, event: &VoyageEvent) -> Result<EnrichedEvent<VoyageEvent>, CostError> {
        let vessel = self.vessel.classify(event.vessel.as_deref());
        let vessel_cost = match event.from {
            Some(start) => Some(self.cost.cost(&vessel, start.date(), event.hours)?),
            None => None,
        };
        Ok(EnrichedEvent {
            enrichment: self.enrichment(event, vessel, None, vessel_cost),
            record: event.clone(),
        })
    }

    /// Manifest lines carry no duration, so they get no vessel cost.
    pub fn enrich_manifest(&self, line: &ManifestLine) -> EnrichedEvent<ManifestLine> {
        let vessel = self.vessel.classify(line.vessel.as_deref());
        let fluid = self.fluid.classify_manifest(line);
        EnrichedEvent {
            enrichment: self.enrichment(line, vessel, fluid, None),
            record: line.clone(),
        }
    }

    pub fn enrich_transfer(&self, transfer: &BulkTransfer) -> EnrichedBulkTransfer {
        let fluid = self.fluid.classify_transfer(transfer);
        let destination = self.locations.resolve_opt(transfer.destination.as_deref());
        let vessel = self.vessel.classify(transfer.vessel.as_deref());
        let quality = self.quality.assess_transfer(transfer);
        EnrichedBulkTransfer {
            record: transfer.clone(),
            fluid_category: fluid.category,
            is_fuel: fluid.is_fuel,
            volume_bbls: volume_in_barrels(transfer.quantity, transfer.unit.as_deref()),
            canonical_destination: destination.canonical_name.clone(),
            destination_facility_type: destination.facility_type,
            vessel_type: vessel.vessel_type,
            company: vessel.company,
            data_quality_score: quality.score,
            data_quality_issues: quality.issues,
        }
    }
}

/// Quantity in barrels; gallons are divided by 42, anything else is taken
/// as barrels already.
pub fn volume_in_barrels(quantity: f64, unit: Option<&str>) -> f64 {
    let is_gallons = unit
        .map(|u| u.trim().to_lowercase().starts_with("gal"))
        .unwrap_or(false);
    if is_gallons {
        quantity / defaults::GALLONS_PER_BARREL
    } else {
        quantity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_volume_normalisation() {
        assert_eq!(volume_in_barrels(420.0, Some("Gals")), 10.0);
        assert_eq!(volume_in_barrels(420.0, Some("gallons")), 10.0);
        assert_eq!(volume_in_barrels(50.0, Some("bbls")), 50.0);
        assert_eq!(volume_in_barrels(50.0, None), 50.0);
    }
}
