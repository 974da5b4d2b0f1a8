//! CSV export loading for the command-line runner
//!
//! The core consumes in-memory rows; this is the thin file adapter that
//! produces them from the standard export file names.

use std::path::Path;

use tracing::{debug, info};

use crate::types::{CellValue, RawRow, SourceBatch, SourceKind};

/// File name each export is expected under in an input directory
pub fn file_name(kind: SourceKind) -> &'static str {
    match kind {
        SourceKind::VoyageEvents => "voyage_events.csv",
        SourceKind::Manifests => "vessel_manifests.csv",
        SourceKind::CostAllocation => "cost_allocation.csv",
        SourceKind::VoyageSummaries => "voyage_list.csv",
        SourceKind::BulkTransfers => "bulk_actions.csv",
    }
}

/// Split a CSV line respecting quoted fields (handles commas inside quotes).
/// Quoted fields come back unquoted.
pub fn csv_split(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            _ => current.push(ch),
        }
    }
    fields.push(current);
    fields
}

/// Parse CSV text into rows keyed by header.
///
/// Every cell is delivered as text (blank → `Empty`); numeric coercion is the
/// parser's job so leading zeros in codes survive. Records with an embedded
/// newline inside quotes are joined before splitting.
pub fn parse_csv_text(text: &str) -> Vec<RawRow> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut records = logical_lines(text).into_iter();

    let header = match records.next() {
        Some(h) => csv_split(&h),
        None => return Vec::new(),
    };
    let header: Vec<String> = header.iter().map(|h| h.trim().to_string()).collect();

    records
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            let fields = csv_split(&line);
            header
                .iter()
                .enumerate()
                .filter(|(_, h)| !h.is_empty())
                .map(|(i, h)| {
                    let cell = match fields.get(i).map(|f| f.trim()) {
                        Some(v) if !v.is_empty() => CellValue::Text(v.to_string()),
                        _ => CellValue::Empty,
                    };
                    (h.clone(), cell)
                })
                .collect()
        })
        .collect()
}

/// Physical lines regrouped so a quoted field may span line breaks.
fn logical_lines(text: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut pending = String::new();
    let mut quotes = 0usize;
    for line in text.lines() {
        if !pending.is_empty() {
            pending.push('\n');
        }
        pending.push_str(line);
        quotes += line.matches('"').count();
        if quotes % 2 == 0 {
            out.push(std::mem::take(&mut pending));
            quotes = 0;
        }
    }
    if !pending.is_empty() {
        out.push(pending);
    }
    out
}

/// Read one CSV file into rows.
pub fn read_csv_file(path: &Path) -> std::io::Result<Vec<RawRow>> {
    let text = std::fs::read_to_string(path)?;
    let rows = parse_csv_text(&text);
    debug!(path = %path.display(), rows = rows.len(), "Read CSV export");
    Ok(rows)
}

/// Load every standard export present in a directory. Missing files leave
/// that source empty.
pub fn load_batch_dir(dir: &Path) -> std::io::Result<SourceBatch> {
    let mut batch = SourceBatch::default();
    for kind in SourceKind::ALL {
        let path = dir.join(file_name(kind));
        if !path.exists() {
            debug!(source = %kind, path = %path.display(), "Export not present, skipping");
            continue;
        }
        let rows = read_csv_file(&path)?;
        info!(source = %kind, rows = rows.len(), "Loaded export");
        match kind {
            SourceKind::VoyageEvents => batch.voyage_events = rows,
            SourceKind::Manifests => batch.manifests = rows,
            SourceKind::CostAllocation => batch.cost_allocation = rows,
            SourceKind::VoyageSummaries => batch.voyage_summaries = rows,
            SourceKind::BulkTransfers => batch.bulk_transfers = rows,
        }
    }
    Ok(batch)
}
