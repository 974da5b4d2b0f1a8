//! Voyage identity resolution and route analysis
//!
//! - `resolver`: groups visits by (month, vessel, voyage number) into `Voyage`s
//! - `routes`: frequency of identical routes across the batch

pub mod resolver;
pub mod routes;

pub use resolver::{normalize_voyage_number, voyage_key_for, VoyageResolution, VoyageResolver};
pub use routes::route_frequencies;
