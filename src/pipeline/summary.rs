//! Per-batch processing summary and fluid volume totals

use std::collections::{BTreeMap, HashSet};

use crate::allocation::{normalize_code, AllocationReconciler};
use crate::ingest::ParsedBatch;
use crate::types::{
    BatchSummary, CanonicalLocation, Department, EnrichedBulkTransfer, EnrichedEvent, EventRecord,
    FluidCategory, FluidVolumeTotals, ManifestLine, QualityDistribution, SourceCounts, SourceKind,
    VoyageEvent,
};
use crate::voyage::VoyageResolution;

/// Volume per fluid category; fuel counts under `Other` and is kept out of
/// the production-fluid total.
pub fn fluid_totals(transfers: &[EnrichedBulkTransfer]) -> FluidVolumeTotals {
    let mut totals = FluidVolumeTotals {
        transfer_count: transfers.len(),
        ..Default::default()
    };
    for t in transfers {
        *totals.by_category.entry(t.fluid_category).or_insert(0.0) += t.volume_bbls;
        if t.is_fuel {
            totals.fuel_bbls += t.volume_bbls;
        } else if t.fluid_category == FluidCategory::Production {
            totals.production_fluid_bbls += t.volume_bbls;
        }
    }
    totals
}

fn event_counts<R: EventRecord>(events: &[EnrichedEvent<R>]) -> SourceCounts {
    SourceCounts {
        ingested: events.len(),
        classified: events
            .iter()
            .filter(|e| e.enrichment.department != Department::Unassigned)
            .count(),
        flagged: events
            .iter()
            .filter(|e| !e.enrichment.data_quality_issues.is_empty() || !e.record.parse_flags().is_empty())
            .count(),
        columns_missing: Vec::new(),
    }
}

fn unresolved<R: EventRecord>(events: &[EnrichedEvent<R>]) -> usize {
    events
        .iter()
        .filter(|e| {
            e.enrichment.canonical_location == CanonicalLocation::UNKNOWN_NAME
                && e.record.location_text().map(|l| !l.trim().is_empty()).unwrap_or(false)
        })
        .count()
}

pub struct SummaryInputs<'a> {
    pub parsed: &'a ParsedBatch,
    pub events: &'a [EnrichedEvent<VoyageEvent>],
    pub manifests: &'a [EnrichedEvent<ManifestLine>],
    pub transfers: &'a [EnrichedBulkTransfer],
    pub allocations: &'a AllocationReconciler,
    pub voyages: &'a VoyageResolution,
}

pub fn build_summary(inputs: SummaryInputs<'_>) -> BatchSummary {
    let SummaryInputs {
        parsed,
        events,
        manifests,
        transfers,
        allocations,
        voyages,
    } = inputs;

    let mut sources = BTreeMap::new();
    sources.insert(SourceKind::VoyageEvents, event_counts(events));
    sources.insert(SourceKind::Manifests, event_counts(manifests));

    let conflict_rows: HashSet<usize> = allocations.conflicts().iter().map(|c| c.row).collect();
    sources.insert(
        SourceKind::CostAllocation,
        SourceCounts {
            ingested: parsed.allocations.len(),
            classified: parsed
                .allocations
                .iter()
                .filter(|a| {
                    a.code
                        .as_deref()
                        .and_then(|c| allocations.lookup(&normalize_code(c)))
                        .map(|e| e.department.is_some())
                        .unwrap_or(false)
                })
                .count(),
            flagged: parsed
                .allocations
                .iter()
                .filter(|a| !a.parse_flags.is_empty() || conflict_rows.contains(&a.row))
                .count(),
            columns_missing: Vec::new(),
        },
    );

    sources.insert(
        SourceKind::VoyageSummaries,
        SourceCounts {
            ingested: parsed.summaries.len(),
            classified: parsed
                .summaries
                .iter()
                .filter(|s| s.vessel.is_some() && s.voyage_number.is_some() && s.start_date.is_some())
                .count(),
            flagged: parsed.summaries.iter().filter(|s| !s.parse_flags.is_empty()).count(),
            columns_missing: Vec::new(),
        },
    );

    sources.insert(
        SourceKind::BulkTransfers,
        SourceCounts {
            ingested: transfers.len(),
            classified: transfers
                .iter()
                .filter(|t| t.is_fuel || t.fluid_category != FluidCategory::Other)
                .count(),
            flagged: transfers
                .iter()
                .filter(|t| !t.data_quality_issues.is_empty() || !t.record.parse_flags.is_empty())
                .count(),
            columns_missing: Vec::new(),
        },
    );

    for (kind, counts) in sources.iter_mut() {
        if let Some(map) = parsed.column_map(*kind) {
            counts.columns_missing = map.missing().into_iter().map(str::to_string).collect();
        }
    }

    let scores = events
        .iter()
        .map(|e| e.enrichment.data_quality_score)
        .chain(manifests.iter().map(|m| m.enrichment.data_quality_score))
        .chain(transfers.iter().map(|t| t.data_quality_score));

    let (productive_hours, non_productive_hours) =
        events.iter().fold((0.0, 0.0), |(p, n), e| {
            let h = e.record.hours.max(0.0);
            if e.enrichment.activity_category.is_productive() {
                (p + h, n)
            } else {
                (p, n + h)
            }
        });

    BatchSummary {
        sources,
        quality: QualityDistribution::from_scores(scores),
        allocation_codes: allocations.len(),
        allocation_conflicts: allocations.conflicts().len(),
        unresolved_locations: unresolved(events) + unresolved(manifests),
        voyages: voyages.voyages.len(),
        ungrouped_records: voyages.ungrouped_records,
        total_vessel_cost: events.iter().map(|e| e.enrichment.vessel_cost_total()).sum(),
        productive_hours,
        non_productive_hours,
    }
}
