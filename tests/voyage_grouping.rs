//! Voyage Grouping Tests
//!
//! Voyage identity, route construction and route frequencies, driven
//! through the full pipeline with the built-in location table.

use osv_logistics::types::{CellValue, RawRow, VoyagePattern, VoyagePurpose};
use osv_logistics::{EnrichedDataset, Pipeline, PipelineConfig, SourceBatch};

fn row(cells: &[(&str, &str)]) -> RawRow {
    cells
        .iter()
        .map(|(k, v)| (k.to_string(), CellValue::from(*v)))
        .collect()
}

fn stop(vessel: &str, voyage: &str, location: &str, from: &str, to: &str) -> RawRow {
    row(&[
        ("Vessel", vessel),
        ("Voyage Number", voyage),
        ("Event", "Loading"),
        ("Location", location),
        ("From", from),
        ("To", to),
    ])
}

fn run(batch: &SourceBatch) -> EnrichedDataset {
    Pipeline::new(PipelineConfig::default())
        .unwrap()
        .run(batch)
        .unwrap()
}

#[test]
fn test_multi_stop_round_trip() {
    let batch = SourceBatch {
        voyage_events: vec![
            stop("Pelican Island", "21", "Port Fourchon", "2024-05-06 06:00", "2024-05-06 10:00"),
            stop("Pelican Island", "21", "Thunder Horse", "2024-05-06 14:00", "2024-05-06 18:00"),
            stop("Pelican Island", "21", "Mad Dog Drill", "2024-05-06 20:00", "2024-05-06 23:00"),
            stop("Pelican Island", "21", "Fourchon", "2024-05-07 08:00", "2024-05-07 10:00"),
        ],
        ..Default::default()
    };
    let dataset = run(&batch);
    assert_eq!(dataset.voyages.len(), 1);
    let v = &dataset.voyages[0];

    assert_eq!(v.route, "Fourchon -> Thunder Horse PDQ -> Mad Dog Drilling -> Fourchon");
    assert_eq!(v.origin_port, "Fourchon");
    assert_eq!(v.stop_count, 2);
    assert!(v.is_round_trip);
    assert_eq!(v.voyage_pattern, VoyagePattern::MultiStop);
    assert_eq!(v.voyage_purpose, VoyagePurpose::Mixed);
    assert_eq!(v.main_destination.as_deref(), Some("Thunder Horse PDQ"));
    assert_eq!(v.duration_hours, 28.0);
    assert_eq!(v.sources.events, 4);
    assert_eq!(v.standardized_voyage_id, "2024-05-PELICAN_ISLAND-0021");
}

#[test]
fn test_vessel_case_and_voyage_number_formats_unify() {
    let batch = SourceBatch {
        voyage_events: vec![
            stop("Pelican Island", "0042", "Fourchon", "2024-05-06 06:00", "2024-05-06 08:00"),
            stop("PELICAN ISLAND", "42.0", "Na Kika", "2024-05-06 16:00", "2024-05-06 20:00"),
        ],
        ..Default::default()
    };
    let dataset = run(&batch);
    assert_eq!(dataset.voyages.len(), 1);
    let v = &dataset.voyages[0];
    assert_eq!(v.vessel, "Pelican Island");
    assert_eq!(v.voyage_number, "42");
    assert_eq!(v.unique_voyage_id, "2024_5_Pelican Island_42");
    assert_eq!(v.voyage_pattern, VoyagePattern::PointToPoint);
    assert_eq!(v.voyage_purpose, VoyagePurpose::Production);
    assert!(!v.is_round_trip);
}

#[test]
fn test_summary_only_voyage_built_from_location_string() {
    let batch = SourceBatch {
        voyage_summaries: vec![row(&[
            ("Vessel", "Gulf Titan"),
            ("Voyage Number", "9"),
            ("Locations", "Fourchon -> Argos -> Fourchon"),
            ("Start Date", "2024-05-01"),
            ("End Date", "2024-05-03"),
        ])],
        ..Default::default()
    };
    let dataset = run(&batch);
    assert_eq!(dataset.voyages.len(), 1);
    let v = &dataset.voyages[0];
    assert_eq!(v.route, "Fourchon -> Argos -> Fourchon");
    assert_eq!(v.voyage_purpose, VoyagePurpose::Mixed);
    assert_eq!(v.sources.summaries, 1);
    assert_eq!(v.sources.events, 0);
    assert_eq!(v.duration_hours, 48.0);
}

#[test]
fn test_summary_for_recorded_voyage_only_counts_as_source() {
    let batch = SourceBatch {
        voyage_events: vec![
            stop("Gulf Titan", "9", "Fourchon", "2024-05-01 06:00", "2024-05-01 08:00"),
            stop("Gulf Titan", "9", "Na Kika", "2024-05-01 16:00", "2024-05-01 20:00"),
        ],
        voyage_summaries: vec![row(&[
            ("Vessel", "Gulf Titan"),
            ("Voyage Number", "9"),
            ("Locations", "Fourchon -> Argos -> Fourchon"),
            ("Start Date", "2024-05-01"),
        ])],
        ..Default::default()
    };
    let dataset = run(&batch);
    assert_eq!(dataset.voyages.len(), 1);
    let v = &dataset.voyages[0];
    assert_eq!(v.route, "Fourchon -> Na Kika");
    assert_eq!(v.sources.events, 2);
    assert_eq!(v.sources.summaries, 1);
}

#[test]
fn test_records_without_voyage_number_stay_ungrouped() {
    let batch = SourceBatch {
        voyage_events: vec![
            stop("Pelican Island", "", "Fourchon", "2024-05-06 06:00", "2024-05-06 08:00"),
            stop("Pelican Island", "3", "Fourchon", "2024-05-06 06:00", "2024-05-06 08:00"),
        ],
        ..Default::default()
    };
    let dataset = run(&batch);
    assert_eq!(dataset.voyages.len(), 1);
    assert_eq!(dataset.summary.ungrouped_records, 1);
    assert_eq!(dataset.voyages[0].voyage_pattern, VoyagePattern::SingleLocation);
}

#[test]
fn test_route_frequencies_rank_shared_routes_first() {
    let batch = SourceBatch {
        voyage_events: vec![
            stop("Pelican Island", "1", "Fourchon", "2024-05-01 06:00", "2024-05-01 08:00"),
            stop("Pelican Island", "1", "Na Kika", "2024-05-01 16:00", "2024-05-01 18:00"),
            stop("HOS Bayou", "7", "Fourchon", "2024-05-02 06:00", "2024-05-02 08:00"),
            stop("HOS Bayou", "7", "Na Kika", "2024-05-02 12:00", "2024-05-02 14:00"),
            stop("HOS Bayou", "8", "Fourchon", "2024-05-09 06:00", "2024-05-09 08:00"),
            stop("HOS Bayou", "8", "Argos", "2024-05-09 12:00", "2024-05-09 14:00"),
        ],
        ..Default::default()
    };
    let dataset = run(&batch);
    assert_eq!(dataset.routes.len(), 2);
    let top = &dataset.routes[0];
    assert_eq!(top.route, "Fourchon -> Na Kika");
    assert_eq!(top.voyage_count, 2);
    assert_eq!(top.vessels, vec!["HOS Bayou".to_string(), "Pelican Island".to_string()]);
    assert!((top.mean_duration_hours - 10.0).abs() < 1e-9);
    assert_eq!(dataset.routes[1].route, "Fourchon -> Argos");
}
