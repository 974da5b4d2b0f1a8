//! Route pattern analysis: how often each identical route was sailed

use std::collections::BTreeMap;

use crate::types::{RouteFrequency, Voyage};

/// Frequency of each distinct route, most frequent first, ties by route.
pub fn route_frequencies(voyages: &[Voyage]) -> Vec<RouteFrequency> {
    let mut by_route: BTreeMap<&str, Vec<&Voyage>> = BTreeMap::new();
    for v in voyages {
        by_route.entry(v.route.as_str()).or_default().push(v);
    }

    let mut out: Vec<RouteFrequency> = by_route
        .into_iter()
        .filter_map(|(route, vs)| {
            let first = vs.first()?;
            let mut vessels: Vec<String> = vs.iter().map(|v| v.vessel.clone()).collect();
            vessels.sort();
            vessels.dedup();
            let mean_duration_hours =
                vs.iter().map(|v| v.duration_hours).sum::<f64>() / vs.len() as f64;
            Some(RouteFrequency {
                route: route.to_string(),
                voyage_count: vs.len(),
                vessels,
                mean_duration_hours,
                voyage_purpose: first.voyage_purpose,
            })
        })
        .collect();

    out.sort_by(|a, b| {
        b.voyage_count
            .cmp(&a.voyage_count)
            .then_with(|| a.route.cmp(&b.route))
    });
    out
}
