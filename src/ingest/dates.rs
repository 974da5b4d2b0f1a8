//! Date and month-year decoding for spreadsheet cells
//!
//! Cells arrive either as spreadsheet serial numbers (days since
//! 1899-12-30, fractional part = time of day) or as text in one of several
//! common layouts. Anything else is reported back as unparseable so the
//! parser can flag the record instead of dropping it.

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime};

use crate::types::{CellValue, YearMonth};

/// Largest serial that still lands in year 9999
const MAX_SERIAL: f64 = 2_958_465.0;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %I:%M %p",
    "%d-%b-%Y %H:%M:%S",
    "%d-%b-%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%m/%d/%y",
    "%d-%b-%Y",
    "%d-%b-%y",
    "%d %b %Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%b %d %Y",
    "%B %d %Y",
];

const MONTH_NAMES: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

/// Convert a spreadsheet serial date to a timestamp.
///
/// Uses the 1899-12-30 epoch, which absorbs the phantom 1900-02-29 of the
/// Lotus/Excel calendar for every date after February 1900. The time of day
/// is rounded to the nearest second.
pub fn excel_serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 1.0 || serial > MAX_SERIAL {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_time(NaiveTime::MIN);
    let days = serial.trunc() as i64;
    let seconds = ((serial - serial.trunc()) * 86_400.0).round() as i64;
    epoch
        .checked_add_signed(chrono::Duration::days(days))?
        .checked_add_signed(chrono::Duration::seconds(seconds))
}

/// Parse a text timestamp in any supported layout; date-only values land at
/// midnight.
pub fn parse_datetime_text(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d.and_time(NaiveTime::MIN));
        }
    }

    // Serial numbers that arrived as text ("45292.25")
    s.parse::<f64>().ok().and_then(excel_serial_to_datetime)
}

/// Decode a date cell.
///
/// `Ok(None)` for absent or blank cells, `Err(raw)` for content that matches
/// no known encoding.
pub fn parse_date_cell(cell: Option<&CellValue>) -> Result<Option<NaiveDateTime>, String> {
    match cell {
        None | Some(CellValue::Empty) => Ok(None),
        Some(CellValue::Number(n)) => excel_serial_to_datetime(*n)
            .map(Some)
            .ok_or_else(|| n.to_string()),
        Some(CellValue::Text(s)) => {
            let t = s.trim();
            if t.is_empty() {
                return Ok(None);
            }
            parse_datetime_text(t).map(Some).ok_or_else(|| t.to_string())
        }
    }
}

/// Decode a reporting-month cell: "Jan-24", "January 2024", "2024-01",
/// "01/2024", a full date, or a serial.
pub fn parse_month_cell(cell: Option<&CellValue>) -> Result<Option<YearMonth>, String> {
    match cell {
        None | Some(CellValue::Empty) => Ok(None),
        Some(CellValue::Number(n)) => excel_serial_to_datetime(*n)
            .map(|dt| Some(YearMonth::of(&dt)))
            .ok_or_else(|| n.to_string()),
        Some(CellValue::Text(s)) => {
            let t = s.trim();
            if t.is_empty() {
                return Ok(None);
            }
            parse_month_year(t).map(Some).ok_or_else(|| t.to_string())
        }
    }
}

/// Parse month-year text.
pub fn parse_month_year(s: &str) -> Option<YearMonth> {
    let tokens: Vec<&str> = s
        .split(|c: char| matches!(c, '-' | '/' | ' ' | ',' | '.' | '_'))
        .filter(|t| !t.is_empty())
        .collect();

    if let [a, b] = tokens.as_slice() {
        let ym = if let Some(month) = month_from_name(a) {
            b.parse::<i32>().ok().map(|y| (expand_year(y, b.len()), month))
        } else if let Some(month) = month_from_name(b) {
            a.parse::<i32>().ok().map(|y| (expand_year(y, a.len()), month))
        } else {
            match (a.parse::<u32>(), b.parse::<u32>()) {
                (Ok(x), Ok(m)) if a.len() == 4 => Some((x as i32, m)),
                (Ok(m), Ok(y)) if b.len() == 4 || b.len() == 2 => {
                    Some((expand_year(y as i32, b.len()), m))
                }
                _ => None,
            }
        };
        if let Some((year, month)) = ym {
            if (1..=12).contains(&month) {
                return Some(YearMonth { year, month });
            }
        }
        return None;
    }

    parse_datetime_text(s).map(|dt| YearMonth {
        year: dt.year(),
        month: dt.month(),
    })
}

fn month_from_name(token: &str) -> Option<u32> {
    let lower = token.to_lowercase();
    if lower.len() < 3 || !lower.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    MONTH_NAMES
        .iter()
        .position(|m| lower.starts_with(m))
        .map(|i| i as u32 + 1)
}

/// Two-digit years pivot at 70, matching `%y`.
fn expand_year(year: i32, digits: usize) -> i32 {
    if digits <= 2 {
        if year < 70 {
            2000 + year
        } else {
            1900 + year
        }
    } else {
        year
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_excel_serial_epoch() {
        // 45292 = 2024-01-01 in the 1900 date system
        let dt = excel_serial_to_datetime(45292.0).unwrap();
        assert_eq!(dt.date(), ymd(2024, 1, 1));
        assert_eq!(dt.hour(), 0);
    }

    #[test]
    fn test_excel_serial_fraction_is_time_of_day() {
        let dt = excel_serial_to_datetime(45292.25).unwrap();
        assert_eq!(dt.hour(), 6);
        assert_eq!(dt.minute(), 0);
    }

    #[test]
    fn test_excel_serial_rejects_out_of_range() {
        assert!(excel_serial_to_datetime(0.0).is_none());
        assert!(excel_serial_to_datetime(-4.0).is_none());
        assert!(excel_serial_to_datetime(f64::NAN).is_none());
        assert!(excel_serial_to_datetime(9.0e7).is_none());
    }

    #[test]
    fn test_text_formats() {
        let expect = ymd(2024, 7, 1);
        for s in [
            "2024-07-01",
            "2024-07-01 08:30:00",
            "2024-07-01T08:30",
            "07/01/2024",
            "7/1/2024 8:30 AM",
            "01-Jul-2024",
            "Jul 1, 2024",
            "2024-07-01T08:30:00Z",
        ] {
            let dt = parse_datetime_text(s).unwrap_or_else(|| panic!("failed on {s}"));
            assert_eq!(dt.date(), expect, "{s}");
        }
    }

    #[test]
    fn test_date_cell_outcomes() {
        assert_eq!(parse_date_cell(None), Ok(None));
        assert_eq!(parse_date_cell(Some(&CellValue::Text("  ".into()))), Ok(None));
        assert_eq!(
            parse_date_cell(Some(&CellValue::Text("not a date".into()))),
            Err("not a date".to_string())
        );
        let ok = parse_date_cell(Some(&CellValue::Number(45292.0))).unwrap().unwrap();
        assert_eq!(ok.date(), ymd(2024, 1, 1));
    }

    #[test]
    fn test_month_year_variants() {
        let jan24 = YearMonth { year: 2024, month: 1 };
        for s in ["Jan-24", "January 2024", "2024-01", "01/2024", "1/2024", "Jan 2024", "2024-01-15"] {
            assert_eq!(parse_month_year(s), Some(jan24), "{s}");
        }
        assert_eq!(parse_month_year("2024-13"), None);
        assert_eq!(parse_month_year("garbage"), None);
    }

    #[test]
    fn test_month_cell_from_serial() {
        let ym = parse_month_cell(Some(&CellValue::Number(45323.0))).unwrap();
        assert_eq!(ym, Some(YearMonth { year: 2024, month: 2 }));
    }
}
