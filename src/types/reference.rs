//! Reference entities: canonical facilities and allocation-code metadata

use serde::{Deserialize, Serialize};

use super::{Department, FacilityType, ProjectType};

/// Canonical identity of a facility or shore base
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalLocation {
    pub canonical_name: String,
    pub facility_type: FacilityType,
    pub aliases: Vec<String>,
}

impl CanonicalLocation {
    pub const UNKNOWN_NAME: &'static str = "Unknown";

    /// Fallback for names that match nothing in the master table
    pub fn unknown() -> Self {
        Self {
            canonical_name: Self::UNKNOWN_NAME.to_string(),
            facility_type: FacilityType::Unclassified,
            aliases: Vec::new(),
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.facility_type == FacilityType::Unclassified
            && self.canonical_name == Self::UNKNOWN_NAME
    }
}

/// Reconciled metadata for one allocation (LC) code
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationEntry {
    pub code: String,
    pub department: Option<Department>,
    pub project_type: Option<ProjectType>,
    pub rig_location: Option<String>,
    pub description: Option<String>,
    pub allocated_days: f64,
    pub daily_rate: f64,
    pub total_cost: f64,
    /// Number of ledger rows folded into this entry
    pub source_rows: usize,
}

/// A code seen with a department/project-type pair that differs from the
/// first-seen one. The first-seen value is kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationConflict {
    pub code: String,
    pub row: usize,
    pub kept_department: Option<Department>,
    pub kept_project_type: Option<ProjectType>,
    pub conflicting_department: Option<Department>,
    pub conflicting_project_type: Option<ProjectType>,
}

impl std::fmt::Display for AllocationConflict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let show = |d: Option<Department>, p: Option<ProjectType>| {
            format!(
                "{}/{}",
                d.map(|d| d.to_string()).unwrap_or_else(|| "-".into()),
                p.map(|p| p.to_string()).unwrap_or_else(|| "-".into())
            )
        };
        write!(
            f,
            "code {} row {}: kept {} but found {}",
            self.code,
            self.row,
            show(self.kept_department, self.kept_project_type),
            show(self.conflicting_department, self.conflicting_project_type)
        )
    }
}

/// Classification output of the reconciler for one record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationClassification {
    pub department: Option<Department>,
    pub project_type: Option<ProjectType>,
    pub rig_location: Option<String>,
}
