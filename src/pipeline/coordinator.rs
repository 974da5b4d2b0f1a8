//! Pipeline - batch processing sequence for vessel logistics exports
//!
//! ```text
//! STAGE 1: Parse every source (column maps, typed records, parse flags)
//! STAGE 2: Reconcile the cost-allocation ledger
//! STAGE 3: Build read-only lookups (locations, ledger)
//! STAGE 4: Enrich events, manifests and bulk transfers (parallel)
//! STAGE 5: Resolve voyages and route frequencies
//! STAGE 6: KPI series and variance analysis
//! STAGE 7: Batch summary
//! ```
//!
//! A batch either produces a whole `EnrichedDataset` or a `PipelineError`;
//! nothing is returned half-built.

use std::sync::Arc;
use std::time::Instant;

use rayon::prelude::*;
use tracing::{debug, info, warn};

use super::enrich::Enricher;
use super::error::PipelineError;
use super::summary::{build_summary, fluid_totals, SummaryInputs};
use crate::allocation::AllocationReconciler;
use crate::config::PipelineConfig;
use crate::cost::CostError;
use crate::ingest::{parse_batch, Field, ParsedBatch};
use crate::locations::LocationResolver;
use crate::metrics::{kpi_series, variance_analysis};
use crate::stats::StatisticalAggregator;
use crate::types::{EnrichedDataset, EnrichedEvent, SourceBatch, SourceKind, VoyageEvent};
use crate::voyage::{route_frequencies, VoyageResolver};

/// Runs one batch at a time against a fixed configuration.
///
/// Holds no per-batch state, so one `Pipeline` can run any number of
/// batches and repeated runs over the same input give identical output.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
    locations: Arc<LocationResolver>,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Result<Self, PipelineError> {
        config.validate()?;
        let locations = Arc::new(LocationResolver::new(&config.locations));
        info!(
            batch = %config.batch.name,
            locations = locations.len(),
            vessels = config.vessels.len(),
            rate_periods = config.cost.rate_periods.len(),
            "Pipeline initialized"
        );
        Ok(Self { config, locations })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn run(&self, batch: &SourceBatch) -> Result<EnrichedDataset, PipelineError> {
        let started = Instant::now();

        if batch.is_empty() {
            return Err(PipelineError::ParseFailure(
                "every source in the batch is empty".to_string(),
            ));
        }

        // STAGE 1
        let parsed = parse_batch(batch);
        check_columns(&parsed, batch)?;
        info!(
            events = parsed.voyage_events.len(),
            manifests = parsed.manifests.len(),
            allocations = parsed.allocations.len(),
            summaries = parsed.summaries.len(),
            transfers = parsed.bulk_transfers.len(),
            "Stage 1: sources parsed"
        );

        // STAGE 2
        let ledger = AllocationReconciler::build(&parsed.allocations, &self.config.classification);
        if self.config.reconciliation.strict_conflicts && !ledger.conflicts().is_empty() {
            let codes: Vec<&str> = ledger.conflicts().iter().map(|c| c.code.as_str()).collect();
            return Err(PipelineError::ReconciliationConflict(format!(
                "{} conflicting allocation row(s) for code(s) {}",
                codes.len(),
                codes.join(", ")
            )));
        }
        info!(
            codes = ledger.len(),
            conflicts = ledger.conflicts().len(),
            "Stage 2: allocation ledger reconciled"
        );

        // STAGE 3
        let allocations = Arc::new(ledger);
        let enricher = Enricher::new(
            &self.config,
            Arc::clone(&self.locations),
            Arc::clone(&allocations),
        );

        // STAGE 4
        let voyage_events = parsed
            .voyage_events
            .par_iter()
            .map(|event| {
                enricher
                    .enrich_event(event)
                    .map_err(|e| missing_rate(e, event))
            })
            .collect::<Result<Vec<EnrichedEvent<VoyageEvent>>, PipelineError>>()?;
        let manifests: Vec<_> = parsed
            .manifests
            .par_iter()
            .map(|line| enricher.enrich_manifest(line))
            .collect();
        let bulk_transfers: Vec<_> = parsed
            .bulk_transfers
            .par_iter()
            .map(|t| enricher.enrich_transfer(t))
            .collect();
        let fluid_volumes = fluid_totals(&bulk_transfers);
        info!(
            events = voyage_events.len(),
            manifests = manifests.len(),
            transfers = bulk_transfers.len(),
            production_fluid_bbls = fluid_volumes.production_fluid_bbls,
            "Stage 4: records enriched"
        );

        // STAGE 5
        let resolution = VoyageResolver::new(Arc::clone(&self.locations)).resolve(
            &voyage_events,
            &manifests,
            &parsed.summaries,
        );
        let routes = route_frequencies(&resolution.voyages);
        info!(
            voyages = resolution.voyages.len(),
            routes = routes.len(),
            ungrouped = resolution.ungrouped_records,
            "Stage 5: voyages resolved"
        );

        // STAGE 6
        let aggregator = StatisticalAggregator::new(&self.config.statistics);
        let series = kpi_series(&voyage_events, &manifests, &resolution);
        let variance = variance_analysis(&aggregator, &series);
        debug!(
            series = series.len(),
            summaries = variance.len(),
            "Stage 6: variance analysis complete"
        );

        // STAGE 7
        let summary = build_summary(SummaryInputs {
            parsed: &parsed,
            events: &voyage_events,
            manifests: &manifests,
            transfers: &bulk_transfers,
            allocations: &allocations,
            voyages: &resolution,
        });
        if summary.unresolved_locations > 0 {
            warn!(
                unresolved = summary.unresolved_locations,
                "Records reference locations missing from the reference table"
            );
        }
        info!(
            voyages = summary.voyages,
            total_cost = summary.total_vessel_cost,
            mean_quality = ?summary.quality.mean_score,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Batch complete"
        );

        Ok(EnrichedDataset {
            voyage_events,
            manifests,
            bulk_transfers,
            allocations: allocations.entries().cloned().collect(),
            allocation_conflicts: allocations.conflicts().to_vec(),
            voyages: resolution.voyages,
            routes,
            fluid_volumes,
            variance_analysis: variance,
            summary,
        })
    }
}

/// Ledger schema first, then identifying columns for every other source.
fn check_columns(parsed: &ParsedBatch, batch: &SourceBatch) -> Result<(), PipelineError> {
    let ledger_has_code = parsed
        .column_map(SourceKind::CostAllocation)
        .map(|m| m.has(Field::Code))
        .unwrap_or(false);
    if !batch.cost_allocation.is_empty() && !ledger_has_code {
        return Err(PipelineError::ReconciliationConflict(
            "cost allocation rows have no recognisable code column".to_string(),
        ));
    }

    let missing: Vec<String> = parsed
        .missing_required(batch)
        .into_iter()
        .filter(|(kind, _)| *kind != SourceKind::CostAllocation)
        .map(|(kind, fields)| format!("{}: {}", kind, fields.join(", ")))
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(PipelineError::ParseFailure(format!(
            "missing identifying columns ({})",
            missing.join("; ")
        )))
    }
}

fn missing_rate(err: CostError, event: &VoyageEvent) -> PipelineError {
    match err {
        CostError::NoRatePeriod(date) => PipelineError::MissingRateTable {
            date,
            source_kind: SourceKind::VoyageEvents,
            row: event.row,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::ErrorKind;
    use crate::types::{CellValue, RawRow};

    fn row(cells: &[(&str, &str)]) -> RawRow {
        cells
            .iter()
            .map(|(k, v)| (k.to_string(), CellValue::Text(v.to_string())))
            .collect()
    }

    fn pipeline() -> Pipeline {
        Pipeline::new(PipelineConfig::default()).unwrap()
    }

    #[test]
    fn test_empty_batch_is_parse_failure() {
        let err = pipeline().run(&SourceBatch::default()).unwrap_err();
        assert!(matches!(err, PipelineError::ParseFailure(_)));
        assert_eq!(err.kind(), ErrorKind::Input);
    }

    #[test]
    fn test_ledger_without_code_column_is_conflict() {
        let batch = SourceBatch {
            cost_allocation: vec![row(&[("Description", "Drilling support"), ("Days", "3")])],
            ..Default::default()
        };
        let err = pipeline().run(&batch).unwrap_err();
        assert!(matches!(err, PipelineError::ReconciliationConflict(_)));
    }

    #[test]
    fn test_events_without_vessel_column_is_parse_failure() {
        let batch = SourceBatch {
            voyage_events: vec![row(&[("Event", "Loading"), ("Hours", "2")])],
            ..Default::default()
        };
        let err = pipeline().run(&batch).unwrap_err();
        assert!(matches!(err, PipelineError::ParseFailure(_)));
    }

    #[test]
    fn test_strict_conflicts_fail_the_batch() {
        let mut config = PipelineConfig::default();
        config.reconciliation.strict_conflicts = true;
        let batch = SourceBatch {
            cost_allocation: vec![
                row(&[("LC Number", "10137"), ("Department", "Drilling")]),
                row(&[("LC Number", "10137"), ("Department", "Production")]),
            ],
            ..Default::default()
        };
        let err = Pipeline::new(config).unwrap().run(&batch).unwrap_err();
        assert!(matches!(err, PipelineError::ReconciliationConflict(_)));

        let dataset = pipeline().run(&batch).unwrap();
        assert_eq!(dataset.allocation_conflicts.len(), 1);
        assert_eq!(dataset.allocations.len(), 1);
    }
}
