//! Bulk fluid classification
//!
//! Fuel (diesel, gas oil, MGO) is recognised first and reported as `Other`
//! with `is_fuel` set, so fuel transfers never count toward production-fluid
//! volume even when a product name also carries a production keyword.

use crate::config::FluidConfig;
use crate::text;
use crate::types::{BulkTransfer, FluidCategory, ManifestLine};

/// Category plus the fuel flag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FluidClass {
    pub category: FluidCategory,
    pub is_fuel: bool,
}

#[derive(Debug, Clone)]
pub struct FluidClassifier {
    fuel: Vec<String>,
    completion: Vec<String>,
    drilling: Vec<String>,
    production: Vec<String>,
}

impl FluidClassifier {
    pub fn new(config: &FluidConfig) -> Self {
        Self {
            fuel: config.fuel_keywords.clone(),
            completion: config.completion_keywords.clone(),
            drilling: config.drilling_keywords.clone(),
            production: config.production_keywords.clone(),
        }
    }

    /// Classify from any number of fluid-name fields.
    pub fn classify_text<'a>(&self, fields: impl IntoIterator<Item = Option<&'a str>>) -> FluidClass {
        let hay = text::join_fields(fields);
        if text::contains_any(&hay, &self.fuel) {
            return FluidClass {
                category: FluidCategory::Other,
                is_fuel: true,
            };
        }
        let category = if text::contains_any(&hay, &self.completion) {
            FluidCategory::Completion
        } else if text::contains_any(&hay, &self.drilling) {
            FluidCategory::Drilling
        } else if text::contains_any(&hay, &self.production) {
            FluidCategory::Production
        } else {
            FluidCategory::Other
        };
        FluidClass {
            category,
            is_fuel: false,
        }
    }

    pub fn classify_transfer(&self, transfer: &BulkTransfer) -> FluidClass {
        self.classify_text([
            transfer.bulk_type.as_deref(),
            transfer.description.as_deref(),
        ])
    }

    /// Fluid category for a manifest line carrying wet bulk; `None` when the
    /// line has no liquid volume.
    pub fn classify_manifest(&self, line: &ManifestLine) -> Option<FluidCategory> {
        if line.wet_bulk_bbls <= 0.0 && line.wet_bulk_gals <= 0.0 {
            return None;
        }
        Some(
            self.classify_text([line.remarks.as_deref(), line.manifest_type.as_deref()])
                .category,
        )
    }
}
