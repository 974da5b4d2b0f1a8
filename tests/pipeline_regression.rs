//! Pipeline Regression Tests
//!
//! Runs small in-memory batches through `Pipeline::run` with the built-in
//! reference tables and asserts on classification, costing, quality
//! scoring, voyage identity and batch-level error kinds.

use osv_logistics::metrics::VOYAGE_DURATION_HOURS;
use osv_logistics::types::{CellValue, GroupBy, QualityRule, RawRow};
use osv_logistics::{
    ActivityCategory, Department, EnrichedDataset, ErrorKind, FluidCategory, Pipeline,
    PipelineConfig, PipelineError, SourceBatch,
};

// ============================================================================
// Helpers
// ============================================================================

fn row(cells: &[(&str, &str)]) -> RawRow {
    cells
        .iter()
        .map(|(k, v)| (k.to_string(), CellValue::from(*v)))
        .collect()
}

fn event(vessel: &str, voyage: &str, parent: &str, location: &str, from: &str, to: &str, hours: &str) -> RawRow {
    row(&[
        ("Vessel", vessel),
        ("Voyage Number", voyage),
        ("Parent Event", parent),
        ("Event", parent),
        ("Location", location),
        ("From", from),
        ("To", to),
        ("Hours", hours),
    ])
}

fn run(batch: &SourceBatch) -> EnrichedDataset {
    Pipeline::new(PipelineConfig::default())
        .unwrap()
        .run(batch)
        .unwrap()
}

fn run_err(batch: &SourceBatch) -> PipelineError {
    Pipeline::new(PipelineConfig::default())
        .unwrap()
        .run(batch)
        .unwrap_err()
}

// ============================================================================
// Classification, Cost, Quality
// ============================================================================

#[test]
fn test_waiting_on_weather_is_non_productive_and_clean() {
    let batch = SourceBatch {
        voyage_events: vec![event(
            "Example I",
            "100",
            "Waiting on Weather",
            "Port Fourchon",
            "2024-06-10 08:00",
            "2024-06-10 14:00",
            "6",
        )],
        ..Default::default()
    };
    let dataset = run(&batch);
    let e = &dataset.voyage_events[0];

    assert_eq!(e.enrichment.activity_category, ActivityCategory::NonProductive);
    assert_eq!(e.enrichment.canonical_location, "Fourchon");
    assert_eq!(e.enrichment.department, Department::Logistics);
    assert_eq!(e.enrichment.data_quality_score, 100);
    assert!(e.enrichment.data_quality_issues.is_empty());

    // Unknown vessel: 220 ft default length, 200 ft tier before the July 2024 change
    let cost = e.enrichment.vessel_cost.as_ref().unwrap();
    assert_eq!(cost.hourly_rate, 550.0);
    assert_eq!(cost.total, 3_300.0);
    assert_eq!(dataset.summary.non_productive_hours, 6.0);
    assert_eq!(dataset.summary.productive_hours, 0.0);
}

#[test]
fn test_rate_changes_on_contract_boundary() {
    let batch = SourceBatch {
        voyage_events: vec![
            event("Pelican Island", "7", "Loading", "Fourchon", "2024-06-30 10:00", "2024-06-30 11:00", "1"),
            event("Pelican Island", "8", "Loading", "Fourchon", "2024-07-01 10:00", "2024-07-01 11:00", "1"),
        ],
        ..Default::default()
    };
    let dataset = run(&batch);
    let rates: Vec<f64> = dataset
        .voyage_events
        .iter()
        .map(|e| e.enrichment.vessel_cost.as_ref().unwrap().hourly_rate)
        .collect();
    assert_eq!(rates, vec![650.0, 720.0]);
}

#[test]
fn test_quality_issues_only_lower_the_score() {
    let clean = event("Pelican Island", "1", "Loading", "Fourchon", "2024-03-01 08:00", "2024-03-01 10:00", "2");
    let no_vessel = event("", "1", "Loading", "Fourchon", "2024-03-01 08:00", "2024-03-01 10:00", "2");
    let no_vessel_bad_date = event("", "1", "Loading", "Fourchon", "sometime in March", "", "2");
    let batch = SourceBatch {
        voyage_events: vec![clean, no_vessel, no_vessel_bad_date],
        ..Default::default()
    };
    let dataset = run(&batch);
    let scores: Vec<u8> = dataset
        .voyage_events
        .iter()
        .map(|e| e.enrichment.data_quality_score)
        .collect();
    assert_eq!(scores, vec![100, 85, 65]);

    let last = &dataset.voyage_events[2].enrichment;
    assert!(last.data_quality_issues.iter().any(|i| i.rule == QualityRule::MissingDate));
    assert!(last.vessel_cost.is_none());
}

#[test]
fn test_bulk_fuel_kept_out_of_production_fluids() {
    let batch = SourceBatch {
        bulk_transfers: vec![
            row(&[
                ("Vessel", "Pelican Island"),
                ("Date", "2024-05-02"),
                ("Bulk Type", "Methanol"),
                ("Qty", "120"),
                ("Unit", "bbls"),
                ("Destination Port", "Na Kika"),
            ]),
            row(&[
                ("Vessel", "Pelican Island"),
                ("Date", "2024-05-02"),
                ("Bulk Type", "Diesel"),
                ("Qty", "4200"),
                ("Unit", "gals"),
                ("Destination Port", "Na Kika"),
            ]),
        ],
        ..Default::default()
    };
    let dataset = run(&batch);
    assert_eq!(dataset.bulk_transfers[0].fluid_category, FluidCategory::Production);
    assert!(dataset.bulk_transfers[1].is_fuel);
    assert_eq!(dataset.bulk_transfers[1].volume_bbls, 100.0);
    assert_eq!(dataset.fluid_volumes.production_fluid_bbls, 120.0);
    assert_eq!(dataset.fluid_volumes.fuel_bbls, 100.0);
}

#[test]
fn test_rig_location_comes_from_allocation_cell() {
    let mut coded = event("Pelican Island", "4", "Loading", "Fourchon", "2024-03-04 08:00", "2024-03-04 10:00", "2");
    coded.insert("Cost Dedicated To".to_string(), CellValue::from("LC 10150 (100%)"));
    let mut uncoded = coded.clone();
    uncoded.remove("Cost Dedicated To");

    let batch = SourceBatch {
        voyage_events: vec![coded, uncoded],
        cost_allocation: vec![row(&[("LC Number", "10150"), ("Rig Location", "Stena IceMAX")])],
        ..Default::default()
    };
    let dataset = run(&batch);
    assert_eq!(
        dataset.voyage_events[0].enrichment.rig_location.as_deref(),
        Some("Stena IceMAX")
    );
    assert_eq!(dataset.voyage_events[1].enrichment.rig_location, None);
}

// ============================================================================
// Voyages and Statistics
// ============================================================================

#[test]
fn test_same_voyage_number_in_two_months_gives_two_voyages() {
    let manifest = |date: &str| {
        row(&[
            ("Vessel", "Example I"),
            ("Voyage Number", "100"),
            ("Manifest Date", date),
            ("Origin", "Fourchon"),
            ("Destination", "Na Kika"),
            ("Deck Tons", "40"),
        ])
    };
    let batch = SourceBatch {
        manifests: vec![manifest("2024-01-15"), manifest("2024-02-15")],
        ..Default::default()
    };
    let dataset = run(&batch);
    let mut ids: Vec<&str> = dataset
        .voyages
        .iter()
        .map(|v| v.unique_voyage_id.as_str())
        .collect();
    ids.sort_unstable();
    assert_eq!(ids, vec!["2024_1_Example I_100", "2024_2_Example I_100"]);
    assert!(dataset
        .voyages
        .iter()
        .all(|v| v.main_destination.as_deref() == Some("Na Kika")));
}

#[test]
fn test_long_voyage_flagged_as_duration_outlier() {
    let mut events = Vec::new();
    for (n, to) in [
        ("1", "2024-04-01 05:00"),
        ("2", "2024-04-01 05:00"),
        ("3", "2024-04-01 05:00"),
        ("4", "2024-04-01 05:00"),
        ("5", "2024-04-03 02:00"),
    ] {
        events.push(event("HOS Bayou", n, "Loading", "Fourchon", "2024-04-01 00:00", to, ""));
    }
    let batch = SourceBatch {
        voyage_events: events,
        ..Default::default()
    };
    let dataset = run(&batch);

    let overall = dataset
        .variance_analysis
        .iter()
        .find(|s| s.series == VOYAGE_DURATION_HOURS && s.group_by == GroupBy::All)
        .unwrap();
    assert_eq!(overall.count, 5);
    assert!((overall.mean - 14.0).abs() < 1e-9);
    assert!((overall.std_dev - 18.0).abs() < 1e-9);
    assert_eq!(overall.z_score_outliers.len(), 1);
    assert_eq!(overall.iqr_outliers.len(), 1);
    assert_eq!(overall.iqr_outliers[0].value, 50.0);
    assert_eq!(overall.z_score_outliers[0].value, 50.0);
}

#[test]
fn test_repeated_runs_are_identical() {
    let batch = SourceBatch {
        voyage_events: vec![
            event("Fast Cajun", "12", "Loading", "Thunder Horse", "2024-08-01 06:00", "2024-08-01 09:00", "3"),
            event("Fast Cajun", "12", "Standby", "Mad Dog", "2024-08-01 10:00", "2024-08-01 12:00", "2"),
            event("Fast Cajun", "12", "Transit", "Fourchon", "2024-08-01 18:00", "2024-08-01 20:00", "2"),
        ],
        cost_allocation: vec![row(&[("LC Number", "10137"), ("Department", "Production")])],
        ..Default::default()
    };
    let first = serde_json::to_string(&run(&batch)).unwrap();
    let second = serde_json::to_string(&run(&batch)).unwrap();
    assert_eq!(first, second);
}

// ============================================================================
// Batch-level Errors
// ============================================================================

#[test]
fn test_error_kinds_separate_input_from_configuration() {
    let empty = run_err(&SourceBatch::default());
    assert!(matches!(empty, PipelineError::ParseFailure(_)));
    assert_eq!(empty.kind(), ErrorKind::Input);

    let no_code = run_err(&SourceBatch {
        cost_allocation: vec![row(&[("Description", "Thunder Horse drilling")])],
        ..Default::default()
    });
    assert!(matches!(no_code, PipelineError::ReconciliationConflict(_)));
    assert_eq!(no_code.kind(), ErrorKind::Input);

    let uncovered = run_err(&SourceBatch {
        voyage_events: vec![event("Pelican Island", "1", "Loading", "Fourchon", "2019-01-01 08:00", "", "2")],
        ..Default::default()
    });
    match &uncovered {
        PipelineError::MissingRateTable { date, row, .. } => {
            assert_eq!(date.to_string(), "2019-01-01");
            assert_eq!(*row, 0);
        }
        other => panic!("expected MissingRateTable, got {other:?}"),
    }
    assert_eq!(uncovered.kind(), ErrorKind::Configuration);
}
