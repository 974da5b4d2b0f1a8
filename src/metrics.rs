//! KPI series feeding the variance analysis
//!
//! One point per voyage, labelled with the vessel and main destination:
//!
//! | Series | Value |
//! |---|---|
//! | `voyage_duration_hours` | voyage end − start |
//! | `cost_per_ton` | Σ event vessel cost ÷ Σ manifest deck tons |
//! | `lifts_per_hour` | Σ manifest lifts ÷ Σ productive event hours |
//! | `productive_hours_ratio` | productive ÷ total event hours |
//!
//! Points whose denominator is zero are left out.

use crate::stats::StatisticalAggregator;
use crate::types::{
    EnrichedEvent, LabeledSeries, LabeledValue, ManifestLine, VarianceSummary, Voyage, VoyageEvent,
};
use crate::voyage::VoyageResolution;

pub const VOYAGE_DURATION_HOURS: &str = "voyage_duration_hours";
pub const COST_PER_TON: &str = "cost_per_ton";
pub const LIFTS_PER_HOUR: &str = "lifts_per_hour";
pub const PRODUCTIVE_HOURS_RATIO: &str = "productive_hours_ratio";

#[derive(Debug, Clone, Copy, Default)]
struct VoyageTotals {
    vessel_cost: f64,
    productive_hours: f64,
    total_hours: f64,
    deck_tons: f64,
    lifts: f64,
}

fn point(voyage: &Voyage, value: f64) -> LabeledValue {
    LabeledValue {
        value,
        vessel: Some(voyage.vessel.clone()),
        location: voyage.main_destination.clone(),
        timestamp: voyage.start_time,
    }
}

/// Build every KPI series for a batch.
pub fn kpi_series(
    events: &[EnrichedEvent<VoyageEvent>],
    manifests: &[EnrichedEvent<ManifestLine>],
    resolution: &VoyageResolution,
) -> Vec<LabeledSeries> {
    let mut totals = vec![VoyageTotals::default(); resolution.voyages.len()];

    for (e, idx) in events.iter().zip(&resolution.event_voyage) {
        let Some(t) = idx.and_then(|i| totals.get_mut(i)) else { continue };
        let hours = e.record.hours.max(0.0);
        t.vessel_cost += e.enrichment.vessel_cost_total();
        t.total_hours += hours;
        if e.enrichment.activity_category.is_productive() {
            t.productive_hours += hours;
        }
    }
    for (m, idx) in manifests.iter().zip(&resolution.manifest_voyage) {
        let Some(t) = idx.and_then(|i| totals.get_mut(i)) else { continue };
        t.deck_tons += m.record.deck_tons.max(0.0);
        t.lifts += m.record.lifts.max(0.0);
    }

    let mut duration = LabeledSeries::new(VOYAGE_DURATION_HOURS);
    let mut cost_per_ton = LabeledSeries::new(COST_PER_TON);
    let mut lifts_per_hour = LabeledSeries::new(LIFTS_PER_HOUR);
    let mut productive_ratio = LabeledSeries::new(PRODUCTIVE_HOURS_RATIO);

    for (voyage, t) in resolution.voyages.iter().zip(&totals) {
        if voyage.duration_hours > 0.0 {
            duration.points.push(point(voyage, voyage.duration_hours));
        }
        if t.deck_tons > 0.0 && t.vessel_cost > 0.0 {
            cost_per_ton.points.push(point(voyage, t.vessel_cost / t.deck_tons));
        }
        if t.productive_hours > 0.0 && t.lifts > 0.0 {
            lifts_per_hour.points.push(point(voyage, t.lifts / t.productive_hours));
        }
        if t.total_hours > 0.0 {
            productive_ratio
                .points
                .push(point(voyage, t.productive_hours / t.total_hours));
        }
    }

    vec![duration, cost_per_ton, lifts_per_hour, productive_ratio]
}

/// Overall, per-vessel and per-location summaries for every series.
pub fn variance_analysis(
    aggregator: &StatisticalAggregator,
    series: &[LabeledSeries],
) -> Vec<VarianceSummary> {
    series.iter().flat_map(|s| aggregator.analyze(s)).collect()
}
