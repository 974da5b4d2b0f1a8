//! Categorical attributes inferred by the classification engine

use serde::{Deserialize, Serialize};

// ============================================================================
// Activity (Productive vs NPT)
// ============================================================================

/// Productive vs non-productive vessel time
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ActivityCategory {
    #[serde(rename = "Productive")]
    Productive,
    #[serde(rename = "Non-Productive")]
    NonProductive,
}

impl ActivityCategory {
    pub fn display_name(&self) -> &'static str {
        match self {
            ActivityCategory::Productive => "Productive",
            ActivityCategory::NonProductive => "Non-Productive",
        }
    }

    pub fn is_productive(&self) -> bool {
        matches!(self, ActivityCategory::Productive)
    }
}

impl std::fmt::Display for ActivityCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

// ============================================================================
// Department
// ============================================================================

/// Business department a vessel activity is charged to
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Department {
    Drilling,
    Production,
    Logistics,
    #[default]
    Unassigned,
}

impl Department {
    /// Parse a department from a free-text label ("Drilling Ops", "PROD", ...).
    ///
    /// Returns `None` for anything that isn't clearly one of the three
    /// chargeable departments.
    pub fn from_label(label: &str) -> Option<Self> {
        let l = label.trim().to_lowercase();
        if l.is_empty() {
            return None;
        }
        if l.contains("drill") {
            Some(Department::Drilling)
        } else if l.contains("prod") {
            Some(Department::Production)
        } else if l.contains("logist") {
            Some(Department::Logistics)
        } else {
            None
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Department::Drilling => "Drilling",
            Department::Production => "Production",
            Department::Logistics => "Logistics",
            Department::Unassigned => "Unassigned",
        }
    }
}

impl std::fmt::Display for Department {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

// ============================================================================
// Project Type
// ============================================================================

/// Project type a vessel activity supports
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum ProjectType {
    Drilling,
    Completions,
    Production,
    #[serde(rename = "P&A")]
    PlugAndAbandonment,
    Personnel,
    Cargo,
    #[default]
    Unclassified,
}

impl ProjectType {
    /// Parse a project type from an allocation-ledger label.
    pub fn from_label(label: &str) -> Option<Self> {
        let l = label.trim().to_lowercase();
        if l.is_empty() {
            return None;
        }
        if l == "p&a" || l.contains("abandon") || l.contains("plug") {
            Some(ProjectType::PlugAndAbandonment)
        } else if l.contains("complet") {
            Some(ProjectType::Completions)
        } else if l.contains("drill") {
            Some(ProjectType::Drilling)
        } else if l.contains("prod") {
            Some(ProjectType::Production)
        } else if l.contains("personnel") || l.contains("crew") {
            Some(ProjectType::Personnel)
        } else if l.contains("cargo") {
            Some(ProjectType::Cargo)
        } else {
            None
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ProjectType::Drilling => "Drilling",
            ProjectType::Completions => "Completions",
            ProjectType::Production => "Production",
            ProjectType::PlugAndAbandonment => "P&A",
            ProjectType::Personnel => "Personnel",
            ProjectType::Cargo => "Cargo",
            ProjectType::Unclassified => "Unclassified",
        }
    }
}

impl std::fmt::Display for ProjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

// ============================================================================
// Fluid Category
// ============================================================================

/// Bulk fluid classification
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FluidCategory {
    Drilling,
    Completion,
    Production,
    Other,
}

impl std::fmt::Display for FluidCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FluidCategory::Drilling => write!(f, "Drilling"),
            FluidCategory::Completion => write!(f, "Completion"),
            FluidCategory::Production => write!(f, "Production"),
            FluidCategory::Other => write!(f, "Other"),
        }
    }
}

// ============================================================================
// Vessel Class
// ============================================================================

/// Offshore support vessel class
///
/// - **OSV**: general offshore supply vessel
/// - **FSV**: fast supply vessel (crew/fuel/speed support)
/// - **AHTS**: anchor handling tug supply
/// - **PSV**: platform supply vessel
/// - **MSV**: multi-purpose support vessel
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum VesselType {
    #[serde(rename = "OSV")]
    Osv,
    #[serde(rename = "FSV")]
    Fsv,
    #[serde(rename = "AHTS")]
    Ahts,
    #[serde(rename = "PSV")]
    Psv,
    #[serde(rename = "MSV")]
    Msv,
    #[default]
    Unknown,
}

impl VesselType {
    /// Parse a vessel class from a token such as "psv" or "AHTS".
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_uppercase().as_str() {
            "OSV" => Some(VesselType::Osv),
            "FSV" => Some(VesselType::Fsv),
            "AHTS" => Some(VesselType::Ahts),
            "PSV" => Some(VesselType::Psv),
            "MSV" => Some(VesselType::Msv),
            _ => None,
        }
    }

    pub fn short_code(&self) -> &'static str {
        match self {
            VesselType::Osv => "OSV",
            VesselType::Fsv => "FSV",
            VesselType::Ahts => "AHTS",
            VesselType::Psv => "PSV",
            VesselType::Msv => "MSV",
            VesselType::Unknown => "Unknown",
        }
    }
}

impl std::fmt::Display for VesselType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.short_code())
    }
}

// ============================================================================
// Facility Type
// ============================================================================

/// Operational role of an offshore facility or shore base
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[serde(rename_all = "lowercase")]
pub enum FacilityType {
    Drilling,
    Production,
    /// Combined drilling + production installation
    Integrated,
    /// Shore base / supply port
    Port,
    #[default]
    Unclassified,
}

impl FacilityType {
    /// Whether a visit here counts toward a drilling voyage purpose
    pub fn supports_drilling(&self) -> bool {
        matches!(self, FacilityType::Drilling | FacilityType::Integrated)
    }

    /// Whether a visit here counts toward a production voyage purpose
    pub fn supports_production(&self) -> bool {
        matches!(self, FacilityType::Production | FacilityType::Integrated)
    }

    pub fn is_offshore(&self) -> bool {
        !matches!(self, FacilityType::Port | FacilityType::Unclassified)
    }
}

impl std::fmt::Display for FacilityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FacilityType::Drilling => write!(f, "Drilling"),
            FacilityType::Production => write!(f, "Production"),
            FacilityType::Integrated => write!(f, "Integrated"),
            FacilityType::Port => write!(f, "Port"),
            FacilityType::Unclassified => write!(f, "Unclassified"),
        }
    }
}

// ============================================================================
// Voyage Purpose / Pattern
// ============================================================================

/// Why a voyage went offshore
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum VoyagePurpose {
    Production,
    Drilling,
    Mixed,
    Other,
}

impl VoyagePurpose {
    pub fn from_flags(includes_production: bool, includes_drilling: bool) -> Self {
        match (includes_production, includes_drilling) {
            (true, true) => VoyagePurpose::Mixed,
            (true, false) => VoyagePurpose::Production,
            (false, true) => VoyagePurpose::Drilling,
            (false, false) => VoyagePurpose::Other,
        }
    }
}

impl std::fmt::Display for VoyagePurpose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VoyagePurpose::Production => write!(f, "Production"),
            VoyagePurpose::Drilling => write!(f, "Drilling"),
            VoyagePurpose::Mixed => write!(f, "Mixed"),
            VoyagePurpose::Other => write!(f, "Other"),
        }
    }
}

/// Route shape of a voyage
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum VoyagePattern {
    /// Only one location was ever recorded
    SingleLocation,
    /// Origin plus exactly one offshore stop
    PointToPoint,
    /// Origin plus two or more offshore stops
    MultiStop,
}

impl std::fmt::Display for VoyagePattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VoyagePattern::SingleLocation => write!(f, "Single Location"),
            VoyagePattern::PointToPoint => write!(f, "Point-to-Point"),
            VoyagePattern::MultiStop => write!(f, "Multi-Stop"),
        }
    }
}
