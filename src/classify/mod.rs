//! Classification Engine
//!
//! Pure mappings from a record's free-text fields plus the shared lookups
//! to categorical attributes:
//!
//! - `activity`: Productive / Non-Productive
//! - `department`: ordered fallback chain ending in `Unassigned`
//! - `project`: allocation metadata, event text, department
//! - `fluid`: Drilling / Completion / Production / Other, fuel flagged
//! - `vessel`: vessel class and operating company
//!
//! Fallbacks are `chain::FallbackChain`s of independent rules.

pub mod activity;
pub mod chain;
pub mod department;
pub mod fluid;
pub mod project;
pub mod vessel;

pub use activity::ActivityClassifier;
pub use chain::{Classified, ClassificationRule, FallbackChain, FnRule};
pub use department::DepartmentClassifier;
pub use fluid::{FluidClass, FluidClassifier};
pub use project::ProjectClassifier;
pub use vessel::{VesselClassifier, VesselProfile};
