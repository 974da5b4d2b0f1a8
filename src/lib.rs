//! OSV Logistics: offshore vessel logistics reconciliation
//!
//! Turns raw exports from a vessel-logistics operation (voyage events,
//! manifests, cost-allocation ledger, voyage summaries, bulk transfers) into
//! one enriched, classified dataset.
//!
//! ## Architecture
//!
//! - **Ingest**: column aliasing, date decoding, typed records with parse flags
//! - **Reference**: location resolver, reconciled allocation ledger
//! - **Classification**: fallback chains for department and project type,
//!   keyword classifiers for activity, fluid and vessel
//! - **Cost & Quality**: contract rate table, data-quality scoring
//! - **Voyages**: identity resolution, route patterns
//! - **Statistics**: KPI series and variance analysis
//! - **Pipeline**: orchestrates one batch end to end

pub mod config;
pub mod types;
pub mod text;
pub mod ingest;
pub mod locations;
pub mod allocation;
pub mod classify;
pub mod cost;
pub mod quality;
pub mod voyage;
pub mod stats;
pub mod metrics;
pub mod pipeline;

// Re-export configuration
pub use config::{ConfigError, PipelineConfig};

// Re-export the pipeline entry points
pub use pipeline::{ErrorKind, Pipeline, PipelineError};

// Re-export commonly used types
pub use types::{
    ActivityCategory, Department, EnrichedDataset, EnrichedEvent, FluidCategory, ProjectType,
    SourceBatch, SourceKind, VesselType, Voyage,
};
