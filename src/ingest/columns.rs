//! Column-name alias tables and per-source column maps
//!
//! Exports from different systems (and different months of the same system)
//! spell headers differently: "Voyage Number", "VoyageNo", "voyage_number".
//! Headers are compacted to lower-case alphanumerics and matched against an
//! ordered alias list per field; the first alias that matches a header wins.

use std::collections::BTreeMap;

use crate::types::{CellValue, RawRow, SourceKind};

/// A canonical field the parser knows how to read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    Vessel,
    VoyageNumber,
    Mission,
    ParentEvent,
    Event,
    Location,
    Quay,
    PortType,
    Remarks,
    CostCode,
    Department,
    From,
    To,
    Hours,
    ManifestNumber,
    ManifestType,
    ManifestDate,
    Origin,
    Destination,
    DeckTons,
    RtTons,
    Lifts,
    WetBulkBbls,
    WetBulkGals,
    DeckSqft,
    Code,
    Description,
    ProjectType,
    RigLocation,
    LocationReference,
    Period,
    AllocatedDays,
    DailyRate,
    TotalCost,
    RouteType,
    VoyageType,
    Locations,
    StartDate,
    EndDate,
    Date,
    Action,
    Quantity,
    Unit,
    BulkType,
    IsReturn,
}

impl Field {
    pub fn name(&self) -> &'static str {
        match self {
            Field::Vessel => "VESSEL",
            Field::VoyageNumber => "VOYAGE_NUMBER",
            Field::Mission => "MISSION",
            Field::ParentEvent => "PARENT_EVENT",
            Field::Event => "EVENT",
            Field::Location => "LOCATION",
            Field::Quay => "QUAY",
            Field::PortType => "PORT_TYPE",
            Field::Remarks => "REMARKS",
            Field::CostCode => "COST_CODE",
            Field::Department => "DEPARTMENT",
            Field::From => "FROM",
            Field::To => "TO",
            Field::Hours => "HOURS",
            Field::ManifestNumber => "MANIFEST_NUMBER",
            Field::ManifestType => "MANIFEST_TYPE",
            Field::ManifestDate => "MANIFEST_DATE",
            Field::Origin => "ORIGIN",
            Field::Destination => "DESTINATION",
            Field::DeckTons => "DECK_TONS",
            Field::RtTons => "RT_TONS",
            Field::Lifts => "LIFTS",
            Field::WetBulkBbls => "WET_BULK_BBLS",
            Field::WetBulkGals => "WET_BULK_GALS",
            Field::DeckSqft => "DECK_SQFT",
            Field::Code => "CODE",
            Field::Description => "DESCRIPTION",
            Field::ProjectType => "PROJECT_TYPE",
            Field::RigLocation => "RIG_LOCATION",
            Field::LocationReference => "LOCATION_REFERENCE",
            Field::Period => "PERIOD",
            Field::AllocatedDays => "ALLOCATED_DAYS",
            Field::DailyRate => "DAILY_RATE",
            Field::TotalCost => "TOTAL_COST",
            Field::RouteType => "ROUTE_TYPE",
            Field::VoyageType => "VOYAGE_TYPE",
            Field::Locations => "LOCATIONS",
            Field::StartDate => "START_DATE",
            Field::EndDate => "END_DATE",
            Field::Date => "DATE",
            Field::Action => "ACTION",
            Field::Quantity => "QUANTITY",
            Field::Unit => "UNIT",
            Field::BulkType => "BULK_TYPE",
            Field::IsReturn => "IS_RETURN",
        }
    }
}

// ============================================================================
// Alias Tables
// ============================================================================

type AliasTable = &'static [(Field, &'static [&'static str])];

const VESSEL: &[&str] = &["vessel", "vesselname", "ship", "shipname"];
const VOYAGE_NUMBER: &[&str] = &["voyagenumber", "voyageno", "voyagenum", "voyage", "voyageid"];
const REMARKS: &[&str] = &["remarks", "remark", "comments", "comment", "notes"];
const DEPARTMENT: &[&str] = &["department", "dept"];
const MANIFEST_NUMBER: &[&str] = &["manifestnumber", "manifestno", "manifest"];

const VOYAGE_EVENT_ALIASES: AliasTable = &[
    (Field::Vessel, VESSEL),
    (Field::VoyageNumber, VOYAGE_NUMBER),
    (Field::Mission, &["mission", "missiontype"]),
    (Field::ParentEvent, &["parentevent", "parenteventname", "eventcategory"]),
    (Field::Event, &["event", "eventname", "activity"]),
    (Field::Location, &["location", "locationname", "site", "facility"]),
    (Field::Quay, &["quay", "berth"]),
    (Field::PortType, &["porttype", "locationtype"]),
    (Field::Remarks, REMARKS),
    (
        Field::CostCode,
        &["costdedicatedto", "lcnumber", "lc", "costcode", "allocationcode"],
    ),
    (Field::Department, DEPARTMENT),
    (Field::From, &["from", "eventdate", "startdate", "start", "fromdate", "date"]),
    (Field::To, &["to", "enddate", "end", "todate"]),
    (Field::Hours, &["hours", "finalhours", "durationhours", "duration"]),
];

const MANIFEST_ALIASES: AliasTable = &[
    (Field::Vessel, VESSEL),
    (Field::VoyageNumber, VOYAGE_NUMBER),
    (Field::ManifestNumber, MANIFEST_NUMBER),
    (Field::ManifestType, &["manifesttype", "type", "direction"]),
    (Field::ManifestDate, &["manifestdate", "date", "shipdate", "sailingdate"]),
    (Field::Origin, &["origin", "from", "fromlocation", "fromfacility"]),
    (
        Field::Destination,
        &["destination", "offshorelocation", "to", "tolocation", "location"],
    ),
    (
        Field::CostCode,
        &["costcode", "lcnumber", "lc", "costdedicatedto", "allocationcode"],
    ),
    (Field::Remarks, REMARKS),
    (Field::DeckTons, &["decktons", "deckweight", "weighttons", "tons"]),
    (Field::RtTons, &["rttons", "returntons", "backloadtons"]),
    (Field::Lifts, &["lifts", "liftcount", "numberoflifts", "lift"]),
    (Field::WetBulkBbls, &["wetbulkbbls", "bbls", "barrels"]),
    (Field::WetBulkGals, &["wetbulkgals", "gallons", "gals"]),
    (Field::DeckSqft, &["decksqft", "deckspace", "sqft"]),
];

const COST_ALLOCATION_ALIASES: AliasTable = &[
    (
        Field::Code,
        &["lcnumber", "lc", "code", "allocationcode", "costcode", "costdedicatedto"],
    ),
    (Field::Description, &["description", "lcdescription", "desc"]),
    (Field::Department, DEPARTMENT),
    (Field::ProjectType, &["projecttype", "project", "type"]),
    (Field::RigLocation, &["riglocation", "rig", "rigname"]),
    (Field::LocationReference, &["locationreference", "locationref", "location"]),
    (Field::Mission, &["mission"]),
    (Field::Period, &["monthyear", "month", "period", "allocationmonth"]),
    (Field::AllocatedDays, &["allocateddays", "totalallocateddays", "days"]),
    (
        Field::DailyRate,
        &["dailyrate", "dayrate", "averagevesselcostperday", "costperday"],
    ),
    (Field::TotalCost, &["totalcost", "totalvesselcost", "cost", "amount"]),
];

const VOYAGE_SUMMARY_ALIASES: AliasTable = &[
    (Field::Vessel, VESSEL),
    (Field::VoyageNumber, VOYAGE_NUMBER),
    (Field::Mission, &["mission"]),
    (Field::RouteType, &["routetype"]),
    (Field::VoyageType, &["voyagetype", "type"]),
    (Field::Locations, &["locations", "route", "locationlist"]),
    (Field::StartDate, &["startdate", "start", "departuredate"]),
    (Field::EndDate, &["enddate", "end", "returndate"]),
];

const BULK_TRANSFER_ALIASES: AliasTable = &[
    (Field::Vessel, VESSEL),
    (Field::VoyageNumber, VOYAGE_NUMBER),
    (Field::ManifestNumber, MANIFEST_NUMBER),
    (Field::Date, &["startdate", "date", "actiondate", "transferdate"]),
    (Field::Action, &["action", "activity"]),
    (Field::Quantity, &["qty", "quantity", "volume"]),
    (Field::Unit, &["unit", "units", "uom"]),
    (Field::BulkType, &["bulktype", "fluidtype", "product"]),
    (
        Field::Description,
        &["bulkdescription", "description", "fluid", "fluidname"],
    ),
    (Field::Origin, &["atport", "origin", "from", "fromlocation"]),
    (
        Field::Destination,
        &["destinationport", "destination", "to", "tolocation"],
    ),
    (Field::IsReturn, &["isreturn", "return", "returned"]),
    (Field::Remarks, REMARKS),
];

fn alias_table(kind: SourceKind) -> AliasTable {
    match kind {
        SourceKind::VoyageEvents => VOYAGE_EVENT_ALIASES,
        SourceKind::Manifests => MANIFEST_ALIASES,
        SourceKind::CostAllocation => COST_ALLOCATION_ALIASES,
        SourceKind::VoyageSummaries => VOYAGE_SUMMARY_ALIASES,
        SourceKind::BulkTransfers => BULK_TRANSFER_ALIASES,
    }
}

/// Identifying columns a non-empty source must carry. Each inner slice is an
/// any-of group; every group must be satisfied.
pub fn required_fields(kind: SourceKind) -> &'static [&'static [Field]] {
    match kind {
        SourceKind::VoyageEvents => &[&[Field::Vessel]],
        SourceKind::Manifests => &[&[Field::Vessel]],
        SourceKind::CostAllocation => &[&[Field::Code]],
        SourceKind::VoyageSummaries => &[&[Field::Vessel], &[Field::VoyageNumber]],
        SourceKind::BulkTransfers => &[&[Field::Vessel, Field::BulkType]],
    }
}

/// Compact a header for alias matching: lower-case alphanumerics only.
pub fn compact_header(header: &str) -> String {
    header
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(|c| c.to_lowercase())
        .collect()
}

// ============================================================================
// Column Map
// ============================================================================

/// Maps canonical fields to the actual header names of one source export
#[derive(Debug, Clone)]
pub struct ColumnMap {
    kind: SourceKind,
    columns: BTreeMap<Field, String>,
}

impl ColumnMap {
    /// Build a column map from every header seen across the rows.
    pub fn from_rows(kind: SourceKind, rows: &[RawRow]) -> Self {
        let mut headers: Vec<&str> = rows
            .iter()
            .flat_map(|r| r.keys().map(String::as_str))
            .collect();
        headers.sort_unstable();
        headers.dedup();
        Self::from_headers(kind, &headers)
    }

    /// Build a column map from a header list.
    pub fn from_headers(kind: SourceKind, headers: &[&str]) -> Self {
        let compacted: Vec<(String, &str)> = headers
            .iter()
            .map(|h| (compact_header(h), *h))
            .collect();

        // A header that satisfies several fields' aliases (e.g. "Date") is
        // claimed by the earliest field in the table.
        let mut claimed: Vec<&str> = Vec::new();
        let mut columns = BTreeMap::new();
        for (field, aliases) in alias_table(kind) {
            let hit = aliases.iter().find_map(|alias| {
                compacted
                    .iter()
                    .find(|(c, original)| c == alias && !claimed.contains(original))
                    .map(|(_, original)| *original)
            });
            if let Some(header) = hit {
                claimed.push(header);
                columns.insert(*field, header.to_string());
            }
        }

        Self { kind, columns }
    }

    pub fn kind(&self) -> SourceKind {
        self.kind
    }

    pub fn has(&self, field: Field) -> bool {
        self.columns.contains_key(&field)
    }

    pub fn header(&self, field: Field) -> Option<&str> {
        self.columns.get(&field).map(String::as_str)
    }

    /// Raw cell for a field, `None` when the column is absent.
    pub fn cell<'r>(&self, row: &'r RawRow, field: Field) -> Option<&'r CellValue> {
        self.columns.get(&field).and_then(|h| row.get(h))
    }

    /// Trimmed text for a field; `None` for absent columns and blank cells.
    pub fn text(&self, row: &RawRow, field: Field) -> Option<String> {
        self.cell(row, field).and_then(CellValue::as_text)
    }

    /// Known fields for this source with no matching header
    pub fn missing(&self) -> Vec<&'static str> {
        alias_table(self.kind)
            .iter()
            .filter(|(f, _)| !self.has(*f))
            .map(|(f, _)| f.name())
            .collect()
    }

    /// Required identifying fields that are missing, formatted for errors.
    pub fn missing_required(&self) -> Vec<String> {
        required_fields(self.kind)
            .iter()
            .filter(|group| !group.iter().any(|f| self.has(*f)))
            .map(|group| {
                group
                    .iter()
                    .map(|f| f.name())
                    .collect::<Vec<_>>()
                    .join(" or ")
            })
            .collect()
    }

    /// Report which columns were found
    pub fn summary(&self) -> String {
        let table = alias_table(self.kind);
        let found: Vec<&str> = table
            .iter()
            .filter(|(f, _)| self.has(*f))
            .map(|(f, _)| f.name())
            .collect();
        let missing = self.missing();

        format!(
            "[{}] Found {}/{} columns. Present: [{}]. Missing: [{}]",
            self.kind,
            found.len(),
            table.len(),
            found.join(", "),
            missing.join(", "),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compact_header() {
        assert_eq!(compact_header(" Voyage Number "), "voyagenumber");
        assert_eq!(compact_header("Cost_Dedicated-To"), "costdedicatedto");
        assert_eq!(compact_header("LC #"), "lc");
    }

    #[test]
    fn test_case_and_spacing_insensitive() {
        let map = ColumnMap::from_headers(
            SourceKind::VoyageEvents,
            &["VESSEL", "voyage_number", "Parent Event", "Event", "From", "Hours"],
        );
        assert_eq!(map.header(Field::Vessel), Some("VESSEL"));
        assert_eq!(map.header(Field::VoyageNumber), Some("voyage_number"));
        assert_eq!(map.header(Field::ParentEvent), Some("Parent Event"));
        assert!(map.has(Field::Hours));
        assert!(!map.has(Field::Location));
        assert!(map.missing_required().is_empty());
    }

    #[test]
    fn test_alias_priority_prefers_earlier_alias() {
        let map = ColumnMap::from_headers(
            SourceKind::CostAllocation,
            &["Cost", "Total Cost", "LC Number"],
        );
        assert_eq!(map.header(Field::TotalCost), Some("Total Cost"));
        assert_eq!(map.header(Field::Code), Some("LC Number"));
    }

    #[test]
    fn test_shared_header_claimed_once() {
        // "Date" is an alias of From; it must not also become another field
        let map = ColumnMap::from_headers(SourceKind::VoyageEvents, &["Vessel", "Date"]);
        assert_eq!(map.header(Field::From), Some("Date"));
        assert!(!map.has(Field::To));
    }

    #[test]
    fn test_missing_required_any_of_group() {
        let bulk = ColumnMap::from_headers(SourceKind::BulkTransfers, &["Fluid Type", "Qty"]);
        assert!(bulk.missing_required().is_empty());

        let summary = ColumnMap::from_headers(SourceKind::VoyageSummaries, &["Vessel"]);
        assert_eq!(summary.missing_required(), vec!["VOYAGE_NUMBER".to_string()]);
    }

    #[test]
    fn test_summary_lists_present_and_missing() {
        let map = ColumnMap::from_headers(SourceKind::Manifests, &["Vessel", "Lifts"]);
        let s = map.summary();
        assert!(s.contains("Found 2/"));
        assert!(s.contains("LIFTS"));
        assert!(s.contains("DECK_TONS"));
    }
}
