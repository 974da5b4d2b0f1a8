//! Shared data structures for the vessel-logistics reconciliation pipeline
//!
//! - Raw input: `RawRow`, `SourceBatch` (rows per source export)
//! - Parsed records: `VoyageEvent`, `ManifestLine`, `CostAllocationEntry`,
//!   `VoyageSummary`, `BulkTransfer`
//! - Reference: `CanonicalLocation`, `AllocationEntry`
//! - Outputs: `EnrichedEvent`, `Voyage`, `VarianceSummary`, `EnrichedDataset`

mod categories;
mod records;
mod reference;
mod enriched;
mod voyage;
mod statistics;
mod dataset;

pub use categories::*;
pub use records::*;
pub use reference::*;
pub use enriched::*;
pub use voyage::*;
pub use statistics::*;
pub use dataset::*;
