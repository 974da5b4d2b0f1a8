//! Enriched records: raw records plus every inferred business attribute

use serde::{Deserialize, Serialize};

use super::{
    ActivityCategory, BulkTransfer, Department, FacilityType, FluidCategory, ProjectType,
    VesselType,
};

// ============================================================================
// Cost
// ============================================================================

/// Vessel cost for one event, from the contract rate in force on its date
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VesselCost {
    pub hourly_rate: f64,
    pub daily_rate: f64,
    pub total: f64,
}

// ============================================================================
// Data Quality
// ============================================================================

/// Validation rules applied by the quality scorer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum QualityRule {
    MissingDate,
    MissingVessel,
    ImplausibleDuration,
    NegativeCost,
    RateOutOfBand,
}

impl QualityRule {
    pub const ALL: [QualityRule; 5] = [
        QualityRule::MissingDate,
        QualityRule::MissingVessel,
        QualityRule::ImplausibleDuration,
        QualityRule::NegativeCost,
        QualityRule::RateOutOfBand,
    ];
}

/// One violated rule and its human-readable explanation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityIssue {
    pub rule: QualityRule,
    pub deduction: u8,
    pub message: String,
}

impl std::fmt::Display for QualityIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (-{})", self.message, self.deduction)
    }
}

/// Score (0-100) plus the issues that produced the deductions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityAssessment {
    pub score: u8,
    pub issues: Vec<QualityIssue>,
}

impl QualityAssessment {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

// ============================================================================
// Enrichment
// ============================================================================

/// Which link of a fallback chain produced a classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClassificationSource {
    AllocationCode,
    LcPattern,
    Description,
    Location,
    Remarks,
    EventText,
    /// Project type derived from the already-inferred department
    Department,
    Default,
}

/// Attributes inferred for a voyage event or manifest line.
///
/// Derived deterministically from the raw record plus the reference tables;
/// never the source of truth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enrichment {
    pub activity_category: ActivityCategory,
    pub department: Department,
    pub department_source: ClassificationSource,
    pub project_type: ProjectType,
    pub project_type_source: ClassificationSource,
    pub fluid_category: Option<FluidCategory>,
    pub canonical_location: String,
    pub facility_type: FacilityType,
    pub rig_location: Option<String>,
    pub vessel_type: VesselType,
    pub company: String,
    pub vessel_cost: Option<VesselCost>,
    pub data_quality_score: u8,
    pub data_quality_issues: Vec<QualityIssue>,
}

impl Enrichment {
    pub fn vessel_cost_total(&self) -> f64 {
        self.vessel_cost.map(|c| c.total).unwrap_or(0.0)
    }
}

/// A raw record together with its enrichment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedEvent<R> {
    pub record: R,
    #[serde(flatten)]
    pub enrichment: Enrichment,
}

/// A bulk-fluid transfer with fluid classification and volume normalisation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedBulkTransfer {
    pub record: BulkTransfer,
    pub fluid_category: FluidCategory,
    pub is_fuel: bool,
    /// Quantity normalised to barrels (gallons / 42)
    pub volume_bbls: f64,
    pub canonical_destination: String,
    pub destination_facility_type: FacilityType,
    pub vessel_type: VesselType,
    pub company: String,
    pub data_quality_score: u8,
    pub data_quality_issues: Vec<QualityIssue>,
}
