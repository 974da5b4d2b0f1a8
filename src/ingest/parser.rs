//! Raw rows → typed records
//!
//! One output record per input row, always. Missing columns yield `None` or
//! zero; non-numeric numbers are coerced to 0 and unparseable dates to
//! `None`, each with a `ParseFlag` on the record.

use chrono::NaiveDateTime;

use super::columns::{ColumnMap, Field};
use super::dates;
use crate::types::{
    BulkTransfer, CellValue, CostAllocationEntry, ManifestLine, ParseFlag, RawRow, VoyageEvent,
    VoyageSummary, YearMonth,
};

// ============================================================================
// Row Reader
// ============================================================================

/// Reads typed values out of one row and accumulates parse flags.
struct RowReader<'a> {
    row: &'a RawRow,
    map: &'a ColumnMap,
    flags: Vec<ParseFlag>,
}

impl<'a> RowReader<'a> {
    fn new(row: &'a RawRow, map: &'a ColumnMap) -> Self {
        Self {
            row,
            map,
            flags: Vec::new(),
        }
    }

    fn field_name(&self, field: Field) -> String {
        self.map
            .header(field)
            .map(str::to_string)
            .unwrap_or_else(|| field.name().to_string())
    }

    fn text(&self, field: Field) -> Option<String> {
        self.map.text(self.row, field)
    }

    fn number(&mut self, field: Field) -> f64 {
        match coerce_number(self.map.cell(self.row, field)) {
            Ok(v) => v,
            Err(raw) => {
                self.flags.push(ParseFlag::NonNumeric {
                    field: self.field_name(field),
                    raw,
                });
                0.0
            }
        }
    }

    /// Like `number`, but distinguishes an absent/blank cell from a zero.
    fn optional_number(&mut self, field: Field) -> Option<f64> {
        match self.map.cell(self.row, field) {
            None => None,
            Some(c) if c.is_empty() => None,
            Some(_) => Some(self.number(field)),
        }
    }

    fn date(&mut self, field: Field) -> Option<NaiveDateTime> {
        match dates::parse_date_cell(self.map.cell(self.row, field)) {
            Ok(d) => d,
            Err(raw) => {
                self.flags.push(ParseFlag::UnparseableDate {
                    field: self.field_name(field),
                    raw,
                });
                None
            }
        }
    }

    fn month(&mut self, field: Field) -> Option<YearMonth> {
        match dates::parse_month_cell(self.map.cell(self.row, field)) {
            Ok(m) => m,
            Err(raw) => {
                self.flags.push(ParseFlag::UnparseableDate {
                    field: self.field_name(field),
                    raw,
                });
                None
            }
        }
    }

    fn flag(&self, field: Field) -> bool {
        match self.map.cell(self.row, field) {
            Some(CellValue::Number(n)) => *n != 0.0,
            Some(c) => c.as_text().is_some_and(|t| {
                matches!(
                    t.to_lowercase().as_str(),
                    "y" | "yes" | "true" | "1" | "x" | "return" | "returned"
                )
            }),
            None => false,
        }
    }

    fn finish(self) -> Vec<ParseFlag> {
        self.flags
    }
}

/// Coerce a cell to a number.
///
/// Blank → 0. Text is stripped of currency symbols, thousands separators and
/// accounting parentheses before parsing. `Err(raw)` when nothing numeric
/// remains.
pub fn coerce_number(cell: Option<&CellValue>) -> Result<f64, String> {
    match cell {
        None | Some(CellValue::Empty) => Ok(0.0),
        Some(CellValue::Number(n)) if n.is_finite() => Ok(*n),
        Some(CellValue::Number(n)) => Err(n.to_string()),
        Some(CellValue::Text(s)) => {
            let t = s.trim();
            if t.is_empty() || t == "-" {
                return Ok(0.0);
            }
            let (negative, body) = match t.strip_prefix('(').and_then(|r| r.strip_suffix(')')) {
                Some(inner) => (true, inner),
                None => (false, t),
            };
            let cleaned: String = body
                .chars()
                .filter(|c| !matches!(c, '$' | ',' | ' ' | '\u{a0}'))
                .collect();
            match cleaned.parse::<f64>() {
                Ok(v) if v.is_finite() => Ok(if negative { -v } else { v }),
                _ => Err(t.to_string()),
            }
        }
    }
}

// ============================================================================
// Per-Source Parsers
// ============================================================================

pub fn parse_voyage_events(rows: &[RawRow], map: &ColumnMap) -> Vec<VoyageEvent> {
    rows.iter()
        .enumerate()
        .map(|(i, row)| {
            let mut r = RowReader::new(row, map);
            let from = r.date(Field::From);
            let to = r.date(Field::To);
            let hours = match r.optional_number(Field::Hours) {
                Some(h) => h,
                None => derived_hours(from, to),
            };
            VoyageEvent {
                row: i,
                vessel: r.text(Field::Vessel),
                voyage_number: r.text(Field::VoyageNumber),
                mission: r.text(Field::Mission),
                parent_event: r.text(Field::ParentEvent),
                event: r.text(Field::Event),
                location: r.text(Field::Location),
                quay: r.text(Field::Quay),
                port_type: r.text(Field::PortType),
                remarks: r.text(Field::Remarks),
                cost_code: r.text(Field::CostCode),
                department: r.text(Field::Department),
                from,
                to,
                hours,
                parse_flags: r.finish(),
            }
        })
        .collect()
}

/// Hours between two timestamps; 0 when either is missing.
fn derived_hours(from: Option<NaiveDateTime>, to: Option<NaiveDateTime>) -> f64 {
    match (from, to) {
        (Some(f), Some(t)) => (t - f).num_seconds() as f64 / 3600.0,
        _ => 0.0,
    }
}

pub fn parse_manifests(rows: &[RawRow], map: &ColumnMap) -> Vec<ManifestLine> {
    rows.iter()
        .enumerate()
        .map(|(i, row)| {
            let mut r = RowReader::new(row, map);
            ManifestLine {
                row: i,
                vessel: r.text(Field::Vessel),
                voyage_number: r.text(Field::VoyageNumber),
                manifest_number: r.text(Field::ManifestNumber),
                manifest_type: r.text(Field::ManifestType),
                manifest_date: r.date(Field::ManifestDate),
                origin: r.text(Field::Origin),
                destination: r.text(Field::Destination),
                cost_code: r.text(Field::CostCode),
                remarks: r.text(Field::Remarks),
                deck_tons: r.number(Field::DeckTons),
                rt_tons: r.number(Field::RtTons),
                lifts: r.number(Field::Lifts),
                wet_bulk_bbls: r.number(Field::WetBulkBbls),
                wet_bulk_gals: r.number(Field::WetBulkGals),
                deck_sqft: r.number(Field::DeckSqft),
                parse_flags: r.finish(),
            }
        })
        .collect()
}

pub fn parse_cost_allocations(rows: &[RawRow], map: &ColumnMap) -> Vec<CostAllocationEntry> {
    rows.iter()
        .enumerate()
        .map(|(i, row)| {
            let mut r = RowReader::new(row, map);
            CostAllocationEntry {
                row: i,
                code: r.text(Field::Code),
                description: r.text(Field::Description),
                department: r.text(Field::Department),
                project_type: r.text(Field::ProjectType),
                rig_location: r.text(Field::RigLocation),
                location_reference: r.text(Field::LocationReference),
                mission: r.text(Field::Mission),
                period: r.month(Field::Period),
                allocated_days: r.number(Field::AllocatedDays),
                daily_rate: r.number(Field::DailyRate),
                total_cost: r.number(Field::TotalCost),
                parse_flags: r.finish(),
            }
        })
        .collect()
}

pub fn parse_voyage_summaries(rows: &[RawRow], map: &ColumnMap) -> Vec<VoyageSummary> {
    rows.iter()
        .enumerate()
        .map(|(i, row)| {
            let mut r = RowReader::new(row, map);
            VoyageSummary {
                row: i,
                vessel: r.text(Field::Vessel),
                voyage_number: r.text(Field::VoyageNumber),
                mission: r.text(Field::Mission),
                route_type: r.text(Field::RouteType),
                voyage_type: r.text(Field::VoyageType),
                locations: r.text(Field::Locations),
                start_date: r.date(Field::StartDate),
                end_date: r.date(Field::EndDate),
                parse_flags: r.finish(),
            }
        })
        .collect()
}

pub fn parse_bulk_transfers(rows: &[RawRow], map: &ColumnMap) -> Vec<BulkTransfer> {
    rows.iter()
        .enumerate()
        .map(|(i, row)| {
            let mut r = RowReader::new(row, map);
            BulkTransfer {
                row: i,
                vessel: r.text(Field::Vessel),
                voyage_number: r.text(Field::VoyageNumber),
                manifest_number: r.text(Field::ManifestNumber),
                date: r.date(Field::Date),
                action: r.text(Field::Action),
                quantity: r.number(Field::Quantity),
                unit: r.text(Field::Unit),
                bulk_type: r.text(Field::BulkType),
                description: r.text(Field::Description),
                origin: r.text(Field::Origin),
                destination: r.text(Field::Destination),
                is_return: r.flag(Field::IsReturn),
                remarks: r.text(Field::Remarks),
                parse_flags: r.finish(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SourceKind;

    fn row(cells: &[(&str, CellValue)]) -> RawRow {
        cells
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_coerce_number_variants() {
        assert_eq!(coerce_number(None), Ok(0.0));
        assert_eq!(coerce_number(Some(&CellValue::Text("$1,250.50".into()))), Ok(1250.5));
        assert_eq!(coerce_number(Some(&CellValue::Text("(300)".into()))), Ok(-300.0));
        assert_eq!(coerce_number(Some(&CellValue::Text(" - ".into()))), Ok(0.0));
        assert_eq!(
            coerce_number(Some(&CellValue::Text("n/a".into()))),
            Err("n/a".to_string())
        );
    }

    #[test]
    fn test_voyage_event_same_cardinality_and_flags() {
        let rows = vec![
            row(&[
                ("Vessel", "Example I".into()),
                ("Event", "Waiting on Weather".into()),
                ("From", "2024-01-05 06:00".into()),
                ("Hours", 6.0.into()),
            ]),
            row(&[
                ("Vessel", "Example I".into()),
                ("From", "sometime".into()),
                ("Hours", "six".into()),
            ]),
        ];
        let map = ColumnMap::from_rows(SourceKind::VoyageEvents, &rows);
        let events = parse_voyage_events(&rows, &map);
        assert_eq!(events.len(), 2);

        assert_eq!(events[0].hours, 6.0);
        assert!(events[0].parse_flags.is_empty());
        assert_eq!(events[0].event.as_deref(), Some("Waiting on Weather"));

        assert!(events[1].from.is_none());
        assert_eq!(events[1].hours, 0.0);
        assert_eq!(events[1].parse_flags.len(), 2);
    }

    #[test]
    fn test_hours_derived_from_range_when_column_absent() {
        let rows = vec![row(&[
            ("Vessel", "Example I".into()),
            ("From", "2024-01-05 06:00".into()),
            ("To", "2024-01-05 09:30".into()),
        ])];
        let map = ColumnMap::from_rows(SourceKind::VoyageEvents, &rows);
        let events = parse_voyage_events(&rows, &map);
        assert!((events[0].hours - 3.5).abs() < 1e-9);
    }

    #[test]
    fn test_manifest_numeric_fields() {
        let rows = vec![row(&[
            ("Vessel", "Example I".into()),
            ("Voyage No", 100.0.into()),
            ("Manifest Date", "2024-01-10".into()),
            ("Deck Tons", "120.5".into()),
            ("Lifts", 14.0.into()),
        ])];
        let map = ColumnMap::from_rows(SourceKind::Manifests, &rows);
        let lines = parse_manifests(&rows, &map);
        assert_eq!(lines[0].voyage_number.as_deref(), Some("100"));
        assert_eq!(lines[0].deck_tons, 120.5);
        assert_eq!(lines[0].lifts, 14.0);
        assert_eq!(lines[0].rt_tons, 0.0);
        assert!(lines[0].manifest_date.is_some());
    }

    #[test]
    fn test_cost_allocation_month_period() {
        let rows = vec![row(&[
            ("LC Number", "10137".into()),
            ("Month-Year", "Feb-24".into()),
            ("Allocated Days", 3.5.into()),
        ])];
        let map = ColumnMap::from_rows(SourceKind::CostAllocation, &rows);
        let entries = parse_cost_allocations(&rows, &map);
        assert_eq!(entries[0].code.as_deref(), Some("10137"));
        assert_eq!(entries[0].period, Some(YearMonth { year: 2024, month: 2 }));
        assert_eq!(entries[0].allocated_days, 3.5);
    }

    #[test]
    fn test_bulk_return_flag() {
        let rows = vec![row(&[
            ("Bulk Type", "Diesel".into()),
            ("Qty", 500.0.into()),
            ("Is Return", "Yes".into()),
        ])];
        let map = ColumnMap::from_rows(SourceKind::BulkTransfers, &rows);
        let t = parse_bulk_transfers(&rows, &map);
        assert!(t[0].is_return);
        assert_eq!(t[0].quantity, 500.0);
    }
}
