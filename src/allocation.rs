//! Cost-Allocation Reconciler
//!
//! Builds the per-batch lookup from allocation (LC) code to department,
//! project type, rig location and aggregated days/cost. A code seen again
//! with a different department/project-type pair is recorded as a conflict
//! and the first-seen pair is kept.
//!
//! `classify` falls back from the code to keyword inference over the
//! description, then the location, then the remarks.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;
use tracing::{debug, warn};

use crate::config::{ClassificationConfig, LcPrefixRule};
use crate::text;
use crate::types::{
    AllocationClassification, AllocationConflict, AllocationEntry, CostAllocationEntry,
    Department, EventRecord, ProjectType,
};

// ============================================================================
// LC Numbers
// ============================================================================

const LC_PATTERN: &str = r"(?i)\b(LC[\s#:\-]*)?(\d{4,6})\b";

fn lc_regex() -> Option<&'static Regex> {
    static LC_REGEX: OnceLock<Option<Regex>> = OnceLock::new();
    LC_REGEX.get_or_init(|| Regex::new(LC_PATTERN).ok()).as_ref()
}

/// An LC number found in free text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LcMatch {
    pub code: String,
    /// Written with an explicit "LC" prefix
    pub prefixed: bool,
}

/// Extract every 4-6 digit LC number from text such as "LC 10137",
/// "10137, 10138" or "9360 50%". Order of appearance, duplicates removed.
pub fn extract_lc_numbers(s: &str) -> Vec<LcMatch> {
    let Some(re) = lc_regex() else {
        return Vec::new();
    };
    let mut out: Vec<LcMatch> = Vec::new();
    for caps in re.captures_iter(s) {
        let Some(digits) = caps.get(2) else { continue };
        let code = digits.as_str().to_string();
        let prefixed = caps.get(1).is_some();
        match out.iter_mut().find(|m| m.code == code) {
            Some(existing) => existing.prefixed |= prefixed,
            None => out.push(LcMatch { code, prefixed }),
        }
    }
    out
}

/// Canonical key for an allocation code: upper-case, no whitespace, "LC"
/// prefix and spreadsheet ".0" suffix dropped.
pub fn normalize_code(raw: &str) -> String {
    let mut s: String = raw
        .trim()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase();
    if let Some(rest) = s.strip_suffix(".0") {
        if rest.chars().all(|c| c.is_ascii_digit()) {
            s = rest.to_string();
        }
    }
    if let Some(rest) = s.strip_prefix("LC") {
        let rest = rest.trim_start_matches(['#', ':', '-']);
        if !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit()) {
            return rest.to_string();
        }
    }
    s
}

// ============================================================================
// Department Vocabulary
// ============================================================================

/// Keyword vocabularies used for department inference from free text
#[derive(Debug, Clone)]
pub struct DepartmentVocabulary {
    drilling: Vec<String>,
    production: Vec<String>,
    logistics: Vec<String>,
    lc_prefixes: Vec<LcPrefixRule>,
}

impl DepartmentVocabulary {
    pub fn from_config(config: &ClassificationConfig) -> Self {
        let mut lc_prefixes = config.lc_prefix_departments.clone();
        // Longest prefix first so "101" beats "10"
        lc_prefixes.sort_by(|a, b| b.prefix.len().cmp(&a.prefix.len()));
        Self {
            drilling: config.drilling_keywords.clone(),
            production: config.production_keywords.clone(),
            logistics: config.logistics_keywords.clone(),
            lc_prefixes,
        }
    }

    /// Department whose vocabulary matches the most keywords in the text.
    /// Ties resolve Drilling, then Production, then Logistics.
    pub fn infer(&self, raw: &str) -> Option<Department> {
        let hay = text::normalize(raw);
        if hay.is_empty() {
            return None;
        }
        let scores = [
            (Department::Drilling, text::count_matches(&hay, &self.drilling)),
            (Department::Production, text::count_matches(&hay, &self.production)),
            (Department::Logistics, text::count_matches(&hay, &self.logistics)),
        ];
        let mut best: Option<(Department, usize)> = None;
        for (dept, score) in scores {
            if score == 0 {
                continue;
            }
            match best {
                Some((_, s)) if score <= s => {}
                _ => best = Some((dept, score)),
            }
        }
        best.map(|(d, _)| d)
    }

    pub fn infer_opt(&self, raw: Option<&str>) -> Option<Department> {
        raw.and_then(|r| self.infer(r))
    }

    /// Department implied by a code's prefix, if any rule matches.
    pub fn department_for_prefix(&self, code: &str) -> Option<Department> {
        self.lc_prefixes
            .iter()
            .find(|rule| !rule.prefix.is_empty() && code.starts_with(rule.prefix.as_str()))
            .map(|rule| rule.department)
    }
}

// ============================================================================
// Reconciler
// ============================================================================

#[derive(Debug, Clone)]
pub struct AllocationReconciler {
    entries: BTreeMap<String, AllocationEntry>,
    conflicts: Vec<AllocationConflict>,
    vocabulary: DepartmentVocabulary,
}

impl AllocationReconciler {
    /// Fold the ledger rows into one entry per code.
    ///
    /// Consistent repeats sum their days and cost; the daily rate becomes
    /// cost ÷ days when days > 0. Conflicting repeats are recorded and left
    /// out of the totals.
    pub fn build(rows: &[CostAllocationEntry], config: &ClassificationConfig) -> Self {
        let vocabulary = DepartmentVocabulary::from_config(config);
        let mut entries: BTreeMap<String, AllocationEntry> = BTreeMap::new();
        let mut conflicts = Vec::new();

        for row in rows {
            let Some(code) = row.code.as_deref().map(normalize_code).filter(|c| !c.is_empty())
            else {
                continue;
            };

            let department = row
                .department
                .as_deref()
                .and_then(Department::from_label)
                .or_else(|| {
                    vocabulary
                        .infer_opt(row.description.as_deref())
                        .or_else(|| vocabulary.infer_opt(row.rig_location.as_deref()))
                        .or_else(|| vocabulary.infer_opt(row.location_reference.as_deref()))
                });
            let project_type = row
                .project_type
                .as_deref()
                .and_then(ProjectType::from_label)
                .or_else(|| row.description.as_deref().and_then(ProjectType::from_label));

            let total_cost = if row.total_cost == 0.0 && row.allocated_days > 0.0 {
                row.allocated_days * row.daily_rate
            } else {
                row.total_cost
            };

            match entries.get_mut(&code) {
                None => {
                    entries.insert(
                        code.clone(),
                        AllocationEntry {
                            code,
                            department,
                            project_type,
                            rig_location: row.rig_location.clone(),
                            description: row.description.clone(),
                            allocated_days: row.allocated_days,
                            daily_rate: row.daily_rate,
                            total_cost,
                            source_rows: 1,
                        },
                    );
                }
                Some(entry) => {
                    let dept_clash = matches!((entry.department, department), (Some(a), Some(b)) if a != b);
                    let proj_clash = matches!((entry.project_type, project_type), (Some(a), Some(b)) if a != b);
                    if dept_clash || proj_clash {
                        let conflict = AllocationConflict {
                            code: code.clone(),
                            row: row.row,
                            kept_department: entry.department,
                            kept_project_type: entry.project_type,
                            conflicting_department: department,
                            conflicting_project_type: project_type,
                        };
                        warn!(%conflict, "Conflicting allocation code, keeping first-seen classification");
                        conflicts.push(conflict);
                        continue;
                    }

                    entry.department = entry.department.or(department);
                    entry.project_type = entry.project_type.or(project_type);
                    if entry.rig_location.is_none() {
                        entry.rig_location = row.rig_location.clone();
                    }
                    if entry.description.is_none() {
                        entry.description = row.description.clone();
                    }
                    entry.allocated_days += row.allocated_days;
                    entry.total_cost += total_cost;
                    entry.source_rows += 1;
                    if entry.daily_rate == 0.0 {
                        entry.daily_rate = row.daily_rate;
                    }
                }
            }
        }

        for entry in entries.values_mut() {
            if entry.allocated_days > 0.0 && entry.total_cost != 0.0 {
                entry.daily_rate = entry.total_cost / entry.allocated_days;
            }
        }

        debug!(codes = entries.len(), conflicts = conflicts.len(), "Allocation ledger reconciled");
        Self {
            entries,
            conflicts,
            vocabulary,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries ordered by code
    pub fn entries(&self) -> impl Iterator<Item = &AllocationEntry> {
        self.entries.values()
    }

    pub fn conflicts(&self) -> &[AllocationConflict] {
        &self.conflicts
    }

    pub fn vocabulary(&self) -> &DepartmentVocabulary {
        &self.vocabulary
    }

    /// Entry for one code, in any of its written forms.
    pub fn lookup(&self, code: &str) -> Option<&AllocationEntry> {
        self.entries.get(&normalize_code(code))
    }

    /// First known entry referenced by a cost-code cell, which may list
    /// several codes ("10137, 10138" or "LC 9360 50%").
    pub fn lookup_cell(&self, cell: &str) -> Option<&AllocationEntry> {
        self.lookup(cell).or_else(|| {
            extract_lc_numbers(cell)
                .iter()
                .find_map(|m| self.entries.get(&m.code))
        })
    }

    /// Department, project type and rig location for a record.
    ///
    /// Order: allocation code → description keywords → location keywords →
    /// remarks keywords. Project type and rig location only come from the
    /// code.
    pub fn classify(&self, record: &dyn EventRecord) -> AllocationClassification {
        if let Some(entry) = record.cost_code().and_then(|c| self.lookup_cell(c)) {
            if entry.department.is_some() || entry.project_type.is_some() {
                return AllocationClassification {
                    department: entry.department,
                    project_type: entry.project_type,
                    rig_location: entry.rig_location.clone(),
                };
            }
        }

        let v = &self.vocabulary;
        let department = v
            .infer_opt(record.description())
            .or_else(|| v.infer_opt(record.location_text()))
            .or_else(|| v.infer_opt(record.remarks()));
        AllocationClassification {
            department,
            project_type: None,
            rig_location: None,
        }
    }
}
