//! Voyage Resolver
//!
//! Partition-by-key then stable sort: every event and manifest line with a
//! vessel, voyage number and date becomes one or more location visits keyed
//! by (month, vessel, voyage number). Each group is ordered by timestamp
//! and walked once:
//!
//! ```text
//! Start (first location) → Transit (interior stops, duplicates collapsed) → End
//! ```
//!
//! Groups are independent after the sort and are built in parallel. Voyage
//! numbers are reused across months in the exports, so the month is part of
//! the key and never merges.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::NaiveDateTime;
use rayon::prelude::*;
use tracing::debug;

use crate::locations::LocationResolver;
use crate::types::{
    CanonicalLocation, EnrichedEvent, EventRecord, FacilityType, ManifestLine, Voyage, VoyageEvent,
    VoyageKey, VoyagePattern, VoyagePurpose, VoyageSources, VoyageSummary, YearMonth,
};

// ============================================================================
// Visits
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VisitSource {
    Event,
    Manifest,
    Summary,
}

#[derive(Debug, Clone)]
struct Visit {
    start: NaiveDateTime,
    end: NaiveDateTime,
    location: Option<String>,
    facility: FacilityType,
    source: VisitSource,
    /// False for the origin visit a manifest line adds before its destination
    primary: bool,
}

/// Voyages plus the arena links from each input record to its voyage
#[derive(Debug, Clone, Default)]
pub struct VoyageResolution {
    pub voyages: Vec<Voyage>,
    /// Voyage index per voyage event, `None` when it could not be grouped
    pub event_voyage: Vec<Option<usize>>,
    /// Voyage index per manifest line
    pub manifest_voyage: Vec<Option<usize>>,
    /// Events and manifest lines without vessel, voyage number or date
    pub ungrouped_records: usize,
}

/// Strip spreadsheet artefacts from a voyage number: "0100" and "100.0"
/// are both "100".
pub fn normalize_voyage_number(raw: &str) -> String {
    let t = raw.trim();
    let t = t.strip_suffix(".0").unwrap_or(t);
    if !t.is_empty() && t.chars().all(|c| c.is_ascii_digit()) {
        let stripped = t.trim_start_matches('0');
        if stripped.is_empty() {
            "0".to_string()
        } else {
            stripped.to_string()
        }
    } else {
        t.to_string()
    }
}

/// Grouping key for a record, before vessel-name unification.
pub fn voyage_key_for(record: &dyn EventRecord) -> Option<VoyageKey> {
    let vessel = record.vessel().map(str::trim).filter(|v| !v.is_empty())?;
    let number = record
        .voyage_number()
        .map(normalize_voyage_number)
        .filter(|n| !n.is_empty())?;
    let start = record.start()?;
    Some(VoyageKey {
        period: YearMonth::of(&start),
        vessel: vessel.to_string(),
        voyage_number: number,
    })
}

/// Split a summary route string on `->`, `>`, `,` and ` - `.
pub fn split_route(route: &str) -> Vec<String> {
    const SEP: char = '\u{1f}';
    route
        .replace("->", &SEP.to_string())
        .replace(" - ", &SEP.to_string())
        .replace(['>', ','], &SEP.to_string())
        .split(SEP)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

// ============================================================================
// Resolver
// ============================================================================

#[derive(Debug, Clone)]
pub struct VoyageResolver {
    locations: Arc<LocationResolver>,
}

#[derive(Default)]
struct Grouping {
    visits: Vec<Visit>,
    groups: BTreeMap<VoyageKey, Vec<usize>>,
    /// Case-insensitive vessel name → first spelling seen
    vessel_names: HashMap<String, String>,
    summary_only: BTreeMap<VoyageKey, usize>,
    summary_hits: BTreeMap<VoyageKey, usize>,
}

impl Grouping {
    fn unify(&mut self, mut key: VoyageKey) -> VoyageKey {
        let display = self
            .vessel_names
            .entry(key.vessel.to_lowercase())
            .or_insert_with(|| key.vessel.clone());
        key.vessel = display.clone();
        key
    }

    fn push(&mut self, key: VoyageKey, visit: Visit) {
        let idx = self.visits.len();
        self.visits.push(visit);
        self.groups.entry(key).or_default().push(idx);
    }
}

impl VoyageResolver {
    pub fn new(locations: Arc<LocationResolver>) -> Self {
        Self { locations }
    }

    pub fn resolve(
        &self,
        events: &[EnrichedEvent<VoyageEvent>],
        manifests: &[EnrichedEvent<ManifestLine>],
        summaries: &[VoyageSummary],
    ) -> VoyageResolution {
        let mut g = Grouping::default();
        let mut event_keys = Vec::with_capacity(events.len());
        let mut manifest_keys = Vec::with_capacity(manifests.len());
        let mut ungrouped = 0usize;

        for e in events {
            let Some(key) = voyage_key_for(&e.record).map(|k| g.unify(k)) else {
                ungrouped += 1;
                event_keys.push(None);
                continue;
            };
            let start = e.record.from.unwrap_or_default();
            let location = visit_location(
                &e.enrichment.canonical_location,
                e.record.location.as_deref(),
            );
            g.push(
                key.clone(),
                Visit {
                    start,
                    end: e.record.to.unwrap_or(start).max(start),
                    location,
                    facility: e.enrichment.facility_type,
                    source: VisitSource::Event,
                    primary: true,
                },
            );
            event_keys.push(Some(key));
        }

        for m in manifests {
            let Some(key) = voyage_key_for(&m.record).map(|k| g.unify(k)) else {
                ungrouped += 1;
                manifest_keys.push(None);
                continue;
            };
            let at = m.record.manifest_date.unwrap_or_default();
            if let Some(origin) = m.record.origin.as_deref().filter(|o| !o.trim().is_empty()) {
                let resolved = self.locations.resolve(origin);
                g.push(
                    key.clone(),
                    Visit {
                        start: at,
                        end: at,
                        location: visit_location(&resolved.canonical_name, Some(origin)),
                        facility: resolved.facility_type,
                        source: VisitSource::Manifest,
                        primary: false,
                    },
                );
            }
            g.push(
                key.clone(),
                Visit {
                    start: at,
                    end: at,
                    location: visit_location(
                        &m.enrichment.canonical_location,
                        m.record.destination.as_deref(),
                    ),
                    facility: m.enrichment.facility_type,
                    source: VisitSource::Manifest,
                    primary: true,
                },
            );
            manifest_keys.push(Some(key));
        }

        // Summaries fill in voyages nothing else recorded
        for s in summaries {
            let Some(key) = summary_key(s).map(|k| g.unify(k)) else {
                continue;
            };
            if g.groups.contains_key(&key) && !g.summary_only.contains_key(&key) {
                *g.summary_hits.entry(key).or_default() += 1;
                continue;
            }
            if let Some(n) = g.summary_only.get_mut(&key) {
                *n += 1;
                continue;
            }
            self.push_summary_visits(&mut g, key.clone(), s);
            g.summary_only.insert(key, 1);
        }

        let mut groups: Vec<(VoyageKey, Vec<usize>)> = std::mem::take(&mut g.groups).into_iter().collect();
        for (_, idxs) in &mut groups {
            idxs.sort_by_key(|&i| g.visits[i].start);
        }

        let visits = &g.visits;
        let summary_only = &g.summary_only;
        let summary_hits = &g.summary_hits;
        let voyages: Vec<Voyage> = groups
            .par_iter()
            .map(|(key, idxs)| {
                let ordered: Vec<&Visit> = idxs.iter().map(|&i| &visits[i]).collect();
                let summaries = summary_only
                    .get(key)
                    .or_else(|| summary_hits.get(key))
                    .copied()
                    .unwrap_or(0);
                build_voyage(key, &ordered, summaries)
            })
            .collect();

        let index: HashMap<&VoyageKey, usize> =
            groups.iter().enumerate().map(|(i, (k, _))| (k, i)).collect();
        let link = |keys: Vec<Option<VoyageKey>>| -> Vec<Option<usize>> {
            keys.into_iter()
                .map(|k| k.and_then(|k| index.get(&k).copied()))
                .collect()
        };

        debug!(
            voyages = voyages.len(),
            ungrouped,
            summary_only = summary_only.len(),
            "Voyages resolved"
        );

        VoyageResolution {
            voyages,
            event_voyage: link(event_keys),
            manifest_voyage: link(manifest_keys),
            ungrouped_records: ungrouped,
        }
    }

    /// Every summary location stamped with the start date except the last,
    /// which takes the end date.
    fn push_summary_visits(&self, g: &mut Grouping, key: VoyageKey, s: &VoyageSummary) {
        let Some(start) = s.start_date else { return };
        let end = s.end_date.unwrap_or(start).max(start);
        let stops = s.locations.as_deref().map(split_route).unwrap_or_default();
        if stops.is_empty() {
            g.push(
                key,
                Visit {
                    start,
                    end,
                    location: None,
                    facility: FacilityType::Unclassified,
                    source: VisitSource::Summary,
                    primary: true,
                },
            );
            return;
        }
        let last = stops.len() - 1;
        for (i, stop) in stops.iter().enumerate() {
            let resolved = self.locations.resolve(stop);
            let at = if i == last { end } else { start };
            g.push(
                key.clone(),
                Visit {
                    start: at,
                    end: at,
                    location: visit_location(&resolved.canonical_name, Some(stop)),
                    facility: resolved.facility_type,
                    source: VisitSource::Summary,
                    primary: true,
                },
            );
        }
    }
}

fn summary_key(s: &VoyageSummary) -> Option<VoyageKey> {
    let vessel = s.vessel.as_deref().map(str::trim).filter(|v| !v.is_empty())?;
    let number = s
        .voyage_number
        .as_deref()
        .map(normalize_voyage_number)
        .filter(|n| !n.is_empty())?;
    let start = s.start_date?;
    Some(VoyageKey {
        period: YearMonth::of(&start),
        vessel: vessel.to_string(),
        voyage_number: number,
    })
}

/// Canonical name when resolved, otherwise the raw text.
fn visit_location(canonical: &str, raw: Option<&str>) -> Option<String> {
    if canonical != CanonicalLocation::UNKNOWN_NAME {
        return Some(canonical.to_string());
    }
    raw.map(str::trim)
        .filter(|r| !r.is_empty())
        .map(str::to_string)
}

// ============================================================================
// Route Building
// ============================================================================

fn build_voyage(key: &VoyageKey, visits: &[&Visit], summaries: usize) -> Voyage {
    let mut sources = VoyageSources {
        summaries,
        ..Default::default()
    };
    for v in visits.iter().filter(|v| v.primary) {
        match v.source {
            VisitSource::Event => sources.events += 1,
            VisitSource::Manifest => sources.manifests += 1,
            VisitSource::Summary => {}
        }
    }

    // Consecutive duplicates collapse into one stop
    let mut sequence: Vec<(&str, FacilityType)> = Vec::new();
    for v in visits {
        let Some(loc) = v.location.as_deref() else { continue };
        if sequence.last().map(|(l, _)| *l) != Some(loc) {
            sequence.push((loc, v.facility));
        }
    }

    let origin = sequence.first().map(|(l, _)| *l);
    let mut location_list: Vec<String> = Vec::new();
    if let Some(origin) = origin {
        location_list.push(origin.to_string());
    }
    if sequence.len() > 1 {
        let interior = &sequence[1..sequence.len() - 1];
        for (loc, _) in interior {
            if !location_list[1..].iter().any(|l| l == loc) {
                location_list.push(loc.to_string());
            }
        }
        if let Some((last, _)) = sequence.last() {
            location_list.push(last.to_string());
        }
    }

    let mut distinct_stops: Vec<&str> = Vec::new();
    for (loc, _) in &sequence {
        if Some(*loc) != origin && !distinct_stops.contains(loc) {
            distinct_stops.push(loc);
        }
    }
    let stop_count = distinct_stops.len();

    let voyage_pattern = match stop_count {
        0 => VoyagePattern::SingleLocation,
        1 => VoyagePattern::PointToPoint,
        _ => VoyagePattern::MultiStop,
    };

    let main_destination = main_destination(&sequence, origin);

    let includes_drilling = visits.iter().any(|v| v.facility.supports_drilling());
    let includes_production = visits.iter().any(|v| v.facility.supports_production());

    let start_time = visits.iter().map(|v| v.start).min();
    let end_time = visits.iter().map(|v| v.end).max();
    let duration_hours = match (start_time, end_time) {
        (Some(s), Some(e)) if e > s => (e - s).num_seconds() as f64 / 3600.0,
        _ => 0.0,
    };

    let route = if location_list.is_empty() {
        CanonicalLocation::UNKNOWN_NAME.to_string()
    } else {
        location_list.join(" -> ")
    };

    Voyage {
        unique_voyage_id: key.unique_voyage_id(),
        standardized_voyage_id: key.standardized_voyage_id(),
        vessel: key.vessel.clone(),
        voyage_number: key.voyage_number.clone(),
        period: key.period,
        origin_port: origin
            .map(str::to_string)
            .unwrap_or_else(|| CanonicalLocation::UNKNOWN_NAME.to_string()),
        main_destination,
        is_round_trip: sequence.len() > 1 && sequence.first().map(|f| f.0) == sequence.last().map(|l| l.0),
        location_list,
        stop_count,
        start_time,
        end_time,
        duration_hours,
        voyage_purpose: VoyagePurpose::from_flags(includes_production, includes_drilling),
        voyage_pattern,
        route,
        includes_production,
        includes_drilling,
        sources,
    }
}

/// Most-visited offshore stop (first visited wins ties), else the first
/// stop after the origin.
fn main_destination(sequence: &[(&str, FacilityType)], origin: Option<&str>) -> Option<String> {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for (loc, facility) in sequence {
        if Some(*loc) == origin || !facility.is_offshore() {
            continue;
        }
        match counts.iter_mut().find(|(l, _)| l == loc) {
            Some((_, n)) => *n += 1,
            None => counts.push((*loc, 1)),
        }
    }
    let mut best: Option<(&str, usize)> = None;
    for (loc, n) in counts {
        if best.map(|(_, b)| n > b).unwrap_or(true) {
            best = Some((loc, n));
        }
    }
    best.map(|(l, _)| l.to_string()).or_else(|| {
        sequence
            .iter()
            .map(|(l, _)| *l)
            .find(|l| Some(*l) != origin)
            .map(str::to_string)
    })
}
