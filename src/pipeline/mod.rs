//! Batch processing pipeline
//!
//! ```text
//! SourceBatch ─▶ parse ─▶ reconcile ledger ─▶ enrich (rayon) ─▶ voyages ─▶ KPIs ─▶ summary
//! ```
//!
//! - `coordinator`: `Pipeline`, owns the config and runs the stages in order
//! - `enrich`: per-record classification, costing and quality scoring
//! - `summary`: batch counts, quality distribution and fluid totals
//! - `error`: batch-level failures and who has to act on them

mod coordinator;
pub mod enrich;
mod error;
pub mod summary;

pub use coordinator::Pipeline;
pub use enrich::{volume_in_barrels, Enricher};
pub use error::{ErrorKind, PipelineError};
