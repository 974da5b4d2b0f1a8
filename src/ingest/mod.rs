//! Record parsing: raw export rows → typed records
//!
//! - `columns`: alias tables and per-source `ColumnMap`
//! - `dates`: serial and text date decoding, month-year periods
//! - `parser`: one typed record per row, problems carried as `ParseFlag`s
//! - `csv`: file adapter used by the command-line runner

pub mod columns;
pub mod csv;
pub mod dates;
pub mod parser;

use std::collections::BTreeMap;

use tracing::{info, warn};

pub use columns::{ColumnMap, Field};

use crate::types::{
    BulkTransfer, CostAllocationEntry, ManifestLine, SourceBatch, SourceKind, VoyageEvent,
    VoyageSummary,
};

/// Every source of one batch, parsed
#[derive(Debug, Clone)]
pub struct ParsedBatch {
    pub voyage_events: Vec<VoyageEvent>,
    pub manifests: Vec<ManifestLine>,
    pub allocations: Vec<CostAllocationEntry>,
    pub summaries: Vec<VoyageSummary>,
    pub bulk_transfers: Vec<BulkTransfer>,
    pub columns: BTreeMap<SourceKind, ColumnMap>,
}

impl ParsedBatch {
    pub fn column_map(&self, kind: SourceKind) -> Option<&ColumnMap> {
        self.columns.get(&kind)
    }

    /// Non-empty sources that lack a required identifying column, with the
    /// missing field names.
    pub fn missing_required(&self, batch: &SourceBatch) -> Vec<(SourceKind, Vec<String>)> {
        self.columns
            .iter()
            .filter(|(kind, _)| !batch.rows(**kind).is_empty())
            .filter_map(|(kind, map)| {
                let missing = map.missing_required();
                (!missing.is_empty()).then_some((*kind, missing))
            })
            .collect()
    }
}

/// Parse every source in a batch. Never fails; row-level problems become
/// flags on the records.
pub fn parse_batch(batch: &SourceBatch) -> ParsedBatch {
    let mut columns = BTreeMap::new();
    for kind in SourceKind::ALL {
        let rows = batch.rows(kind);
        let map = ColumnMap::from_rows(kind, rows);
        if !rows.is_empty() {
            info!(source = %kind, rows = rows.len(), "{}", map.summary());
            if !map.missing_required().is_empty() {
                warn!(source = %kind, missing = ?map.missing_required(), "Source lacks identifying columns");
            }
        }
        columns.insert(kind, map);
    }

    let voyage_events =
        parser::parse_voyage_events(&batch.voyage_events, &columns[&SourceKind::VoyageEvents]);
    let manifests = parser::parse_manifests(&batch.manifests, &columns[&SourceKind::Manifests]);
    let allocations = parser::parse_cost_allocations(
        &batch.cost_allocation,
        &columns[&SourceKind::CostAllocation],
    );
    let summaries = parser::parse_voyage_summaries(
        &batch.voyage_summaries,
        &columns[&SourceKind::VoyageSummaries],
    );
    let bulk_transfers = parser::parse_bulk_transfers(
        &batch.bulk_transfers,
        &columns[&SourceKind::BulkTransfers],
    );

    ParsedBatch {
        voyage_events,
        manifests,
        allocations,
        summaries,
        bulk_transfers,
        columns,
    }
}
