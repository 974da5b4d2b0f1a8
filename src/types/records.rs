//! Raw tabular rows and the typed records parsed from them
//!
//! The ingestion layer hands the core one ordered list of rows per source
//! export. Each row is a flat column-name → cell mapping; column names are
//! matched by normalised alias, never by position.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ============================================================================
// Raw Input
// ============================================================================

/// A single spreadsheet cell as delivered by the ingestion layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum CellValue {
    Number(f64),
    Text(String),
    #[default]
    Empty,
}

impl CellValue {
    /// Trimmed text content, `None` for empty cells and blank strings.
    pub fn as_text(&self) -> Option<String> {
        match self {
            CellValue::Text(s) => {
                let t = s.trim();
                if t.is_empty() {
                    None
                } else {
                    Some(t.to_string())
                }
            }
            CellValue::Number(n) if n.is_finite() => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    Some(format!("{}", *n as i64))
                } else {
                    Some(n.to_string())
                }
            }
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.as_text().is_none()
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

/// One row of a source export: column name → cell
pub type RawRow = BTreeMap<String, CellValue>;

/// The five operational exports that make up one batch
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SourceKind {
    VoyageEvents,
    Manifests,
    CostAllocation,
    VoyageSummaries,
    BulkTransfers,
}

impl SourceKind {
    pub const ALL: [SourceKind; 5] = [
        SourceKind::VoyageEvents,
        SourceKind::Manifests,
        SourceKind::CostAllocation,
        SourceKind::VoyageSummaries,
        SourceKind::BulkTransfers,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            SourceKind::VoyageEvents => "voyage events",
            SourceKind::Manifests => "vessel manifests",
            SourceKind::CostAllocation => "cost allocation",
            SourceKind::VoyageSummaries => "voyage summaries",
            SourceKind::BulkTransfers => "bulk transfers",
        }
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// All raw rows for one batch run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceBatch {
    #[serde(default)]
    pub voyage_events: Vec<RawRow>,
    #[serde(default)]
    pub manifests: Vec<RawRow>,
    #[serde(default)]
    pub cost_allocation: Vec<RawRow>,
    #[serde(default)]
    pub voyage_summaries: Vec<RawRow>,
    #[serde(default)]
    pub bulk_transfers: Vec<RawRow>,
}

impl SourceBatch {
    pub fn rows(&self, kind: SourceKind) -> &[RawRow] {
        match kind {
            SourceKind::VoyageEvents => &self.voyage_events,
            SourceKind::Manifests => &self.manifests,
            SourceKind::CostAllocation => &self.cost_allocation,
            SourceKind::VoyageSummaries => &self.voyage_summaries,
            SourceKind::BulkTransfers => &self.bulk_transfers,
        }
    }

    pub fn is_empty(&self) -> bool {
        SourceKind::ALL.iter().all(|k| self.rows(*k).is_empty())
    }

    pub fn total_rows(&self) -> usize {
        SourceKind::ALL.iter().map(|k| self.rows(*k).len()).sum()
    }
}

// ============================================================================
// Parse Flags
// ============================================================================

/// Per-record parse problem. Carried as data, never raised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParseFlag {
    /// A date cell was present but matched no known encoding
    UnparseableDate { field: String, raw: String },
    /// A numeric cell held text; the value was coerced to 0
    NonNumeric { field: String, raw: String },
}

impl std::fmt::Display for ParseFlag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseFlag::UnparseableDate { field, raw } => {
                write!(f, "unparseable date in '{}': '{}'", field, raw)
            }
            ParseFlag::NonNumeric { field, raw } => {
                write!(f, "non-numeric value in '{}': '{}' (treated as 0)", field, raw)
            }
        }
    }
}

/// Calendar month, used for allocation periods and voyage identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn of(dt: &NaiveDateTime) -> Self {
        use chrono::Datelike;
        Self {
            year: dt.year(),
            month: dt.month(),
        }
    }
}

impl std::fmt::Display for YearMonth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{:02}", self.year, self.month)
    }
}

// ============================================================================
// Typed Records
// ============================================================================

/// One row of the voyage-event export (port calls, offshore activity, transit)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoyageEvent {
    pub row: usize,
    pub vessel: Option<String>,
    pub voyage_number: Option<String>,
    pub mission: Option<String>,
    pub parent_event: Option<String>,
    pub event: Option<String>,
    pub location: Option<String>,
    pub quay: Option<String>,
    pub port_type: Option<String>,
    pub remarks: Option<String>,
    /// "Cost Dedicated To" / LC number cell, may hold several codes
    pub cost_code: Option<String>,
    pub department: Option<String>,
    pub from: Option<NaiveDateTime>,
    pub to: Option<NaiveDateTime>,
    pub hours: f64,
    pub parse_flags: Vec<ParseFlag>,
}

/// One row of the vessel-manifest export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestLine {
    pub row: usize,
    pub vessel: Option<String>,
    pub voyage_number: Option<String>,
    pub manifest_number: Option<String>,
    pub manifest_type: Option<String>,
    pub manifest_date: Option<NaiveDateTime>,
    pub origin: Option<String>,
    pub destination: Option<String>,
    pub cost_code: Option<String>,
    pub remarks: Option<String>,
    pub deck_tons: f64,
    pub rt_tons: f64,
    pub lifts: f64,
    pub wet_bulk_bbls: f64,
    pub wet_bulk_gals: f64,
    pub deck_sqft: f64,
    pub parse_flags: Vec<ParseFlag>,
}

/// One row of the cost-allocation ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostAllocationEntry {
    pub row: usize,
    pub code: Option<String>,
    pub description: Option<String>,
    pub department: Option<String>,
    pub project_type: Option<String>,
    pub rig_location: Option<String>,
    pub location_reference: Option<String>,
    pub mission: Option<String>,
    pub period: Option<YearMonth>,
    pub allocated_days: f64,
    pub daily_rate: f64,
    pub total_cost: f64,
    pub parse_flags: Vec<ParseFlag>,
}

/// One row of the voyage-list summary export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoyageSummary {
    pub row: usize,
    pub vessel: Option<String>,
    pub voyage_number: Option<String>,
    pub mission: Option<String>,
    pub route_type: Option<String>,
    pub voyage_type: Option<String>,
    /// Raw route text, e.g. "Fourchon -> Thunder Horse -> Fourchon"
    pub locations: Option<String>,
    pub start_date: Option<NaiveDateTime>,
    pub end_date: Option<NaiveDateTime>,
    pub parse_flags: Vec<ParseFlag>,
}

/// One row of the bulk-fluid transfer export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkTransfer {
    pub row: usize,
    pub vessel: Option<String>,
    pub voyage_number: Option<String>,
    pub manifest_number: Option<String>,
    pub date: Option<NaiveDateTime>,
    pub action: Option<String>,
    pub quantity: f64,
    pub unit: Option<String>,
    pub bulk_type: Option<String>,
    pub description: Option<String>,
    pub origin: Option<String>,
    pub destination: Option<String>,
    pub is_return: bool,
    pub remarks: Option<String>,
    pub parse_flags: Vec<ParseFlag>,
}

// ============================================================================
// Event Record Trait
// ============================================================================

/// Read-only view shared by the records that become `EnrichedEvent`s.
///
/// Classifiers, the cost calculator and the quality scorer only ever see a
/// record through this trait, so voyage events and manifest lines go through
/// identical logic.
pub trait EventRecord: Send + Sync {
    fn row(&self) -> usize;
    fn vessel(&self) -> Option<&str>;
    fn voyage_number(&self) -> Option<&str>;
    fn location_text(&self) -> Option<&str>;
    fn cost_code(&self) -> Option<&str>;
    fn parent_event(&self) -> Option<&str>;
    fn event(&self) -> Option<&str>;
    fn description(&self) -> Option<&str>;
    fn remarks(&self) -> Option<&str>;
    fn department_label(&self) -> Option<&str> {
        None
    }
    fn start(&self) -> Option<NaiveDateTime>;
    fn end(&self) -> Option<NaiveDateTime> {
        self.start()
    }
    fn hours(&self) -> f64;
    fn parse_flags(&self) -> &[ParseFlag];
}

impl EventRecord for VoyageEvent {
    fn row(&self) -> usize {
        self.row
    }
    fn vessel(&self) -> Option<&str> {
        self.vessel.as_deref()
    }
    fn voyage_number(&self) -> Option<&str> {
        self.voyage_number.as_deref()
    }
    fn location_text(&self) -> Option<&str> {
        self.location.as_deref()
    }
    fn cost_code(&self) -> Option<&str> {
        self.cost_code.as_deref()
    }
    fn parent_event(&self) -> Option<&str> {
        self.parent_event.as_deref()
    }
    fn event(&self) -> Option<&str> {
        self.event.as_deref()
    }
    fn description(&self) -> Option<&str> {
        self.mission.as_deref()
    }
    fn remarks(&self) -> Option<&str> {
        self.remarks.as_deref()
    }
    fn department_label(&self) -> Option<&str> {
        self.department.as_deref()
    }
    fn start(&self) -> Option<NaiveDateTime> {
        self.from
    }
    fn end(&self) -> Option<NaiveDateTime> {
        self.to.or(self.from)
    }
    fn hours(&self) -> f64 {
        self.hours
    }
    fn parse_flags(&self) -> &[ParseFlag] {
        &self.parse_flags
    }
}

impl EventRecord for ManifestLine {
    fn row(&self) -> usize {
        self.row
    }
    fn vessel(&self) -> Option<&str> {
        self.vessel.as_deref()
    }
    fn voyage_number(&self) -> Option<&str> {
        self.voyage_number.as_deref()
    }
    fn location_text(&self) -> Option<&str> {
        self.destination.as_deref()
    }
    fn cost_code(&self) -> Option<&str> {
        self.cost_code.as_deref()
    }
    fn parent_event(&self) -> Option<&str> {
        None
    }
    fn event(&self) -> Option<&str> {
        self.manifest_type.as_deref()
    }
    fn description(&self) -> Option<&str> {
        None
    }
    fn remarks(&self) -> Option<&str> {
        self.remarks.as_deref()
    }
    fn start(&self) -> Option<NaiveDateTime> {
        self.manifest_date
    }
    fn hours(&self) -> f64 {
        0.0
    }
    fn parse_flags(&self) -> &[ParseFlag] {
        &self.parse_flags
    }
}
