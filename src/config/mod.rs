//! Pipeline Configuration Module
//!
//! Reference tables (locations, fleet, rate periods, keyword vocabularies)
//! and tuning values loaded from TOML, so operators can update tariffs and
//! aliases without code changes.
//!
//! ## Loading Order
//!
//! 1. `OSV_LOGISTICS_CONFIG` environment variable (path to TOML file)
//! 2. `logistics_config.toml` in the current working directory
//! 3. Built-in defaults
//!
//! ## Usage
//!
//! There is no process-global config. Load once and hand it to the pipeline,
//! which passes the relevant section to each component it builds:
//!
//! ```ignore
//! let config = PipelineConfig::load();
//! let dataset = Pipeline::new(config)?.run(&batch)?;
//! ```

mod pipeline_config;
pub mod defaults;
pub mod validation;

pub use pipeline_config::*;
