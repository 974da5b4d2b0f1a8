//! Config Validation Tests
//!
//! Exercises the two-pass config load (unknown-key warnings, then serde and
//! `validate()`) from files on disk, plus the shipped example config.

use std::io::Write;
use std::path::PathBuf;

use osv_logistics::config::validation::{known_config_keys, suggest_correction, validate_unknown_keys};
use osv_logistics::config::PipelineConfig;
use osv_logistics::{ConfigError, Pipeline, PipelineError, ProjectType, VesselType};

fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

fn validation_errors(result: Result<PipelineConfig, ConfigError>) -> Vec<String> {
    match result {
        Err(ConfigError::Validation(errors)) => errors,
        other => panic!("expected validation error, got {other:?}"),
    }
}

// ============================================================================
// Unknown Keys
// ============================================================================

#[test]
fn test_example_config_has_no_unknown_keys() {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("logistics_config.example.toml");
    let contents = std::fs::read_to_string(&path).unwrap();
    assert!(validate_unknown_keys(&contents).is_empty());

    let config = PipelineConfig::load_from_file(&path).unwrap();
    assert_eq!(config.batch.name, "GOM-2024-Q3");
    assert_eq!(config.cost.rate_periods.len(), 2);
    assert_eq!(config.cost.discounted_vessel_types, vec![VesselType::Fsv]);
    assert_eq!(config.classification.lc_prefix_departments.len(), 2);
    assert_eq!(config.classification.project_keywords.len(), 6);
}

#[test]
fn test_typo_suggests_nearest_key() {
    let known = known_config_keys();
    assert_eq!(
        suggest_correction("statistics.z_score_treshold", &known).as_deref(),
        Some("statistics.z_score_threshold")
    );
    assert_eq!(suggest_correction("completely.unrelated.key", &known), None);
}

#[test]
fn test_unknown_keys_warn_but_still_load() {
    let file = write_config(
        r#"
[quality]
max_event_hour = 12.0

[reconcilation]
strict_conflicts = true
"#,
    );
    let contents = std::fs::read_to_string(file.path()).unwrap();
    let warnings = validate_unknown_keys(&contents);
    let fields: Vec<&str> = warnings.iter().map(|w| w.field.as_str()).collect();
    assert!(fields.contains(&"quality.max_event_hour"));
    assert!(fields.contains(&"reconcilation"));

    let config = PipelineConfig::load_from_file(file.path()).unwrap();
    assert_eq!(config.quality.max_event_hours, 24.0);
    assert!(!config.reconciliation.strict_conflicts);
}

// ============================================================================
// Range and Table Validation
// ============================================================================

#[test]
fn test_rate_period_gap_is_rejected() {
    let file = write_config(
        r#"
[[cost.rate_periods]]
effective_from = "2024-01-01"
effective_to = "2024-06-29"
tiers = [{ min_length_ft = 0.0, hourly_rate = 500.0 }]

[[cost.rate_periods]]
effective_from = "2024-07-01"
effective_to = "2024-12-31"
tiers = [{ min_length_ft = 0.0, hourly_rate = 550.0 }]
"#,
    );
    let errors = validation_errors(PipelineConfig::load_from_file(file.path()));
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("gap"));
}

#[test]
fn test_rate_period_overlap_and_empty_tiers_are_rejected() {
    let file = write_config(
        r#"
[[cost.rate_periods]]
effective_from = "2024-01-01"
effective_to = "2024-07-15"
tiers = []

[[cost.rate_periods]]
effective_from = "2024-07-01"
effective_to = "2024-12-31"
tiers = [{ min_length_ft = 0.0, hourly_rate = 550.0 }]
"#,
    );
    let errors = validation_errors(PipelineConfig::load_from_file(file.path()));
    assert!(errors.iter().any(|e| e.contains("at least one tier")));
    assert!(errors.iter().any(|e| e.contains("overlaps")));
}

#[test]
fn test_non_positive_thresholds_are_rejected() {
    let errors = validation_errors(PipelineConfig::from_toml_str(
        r#"
[cost]
speed_support_multiplier = 0.0

[statistics]
z_score_threshold = -1.0
min_group_size = 0
"#,
    ));
    assert!(errors.iter().any(|e| e.contains("cost.speed_support_multiplier")));
    assert!(errors.iter().any(|e| e.contains("statistics.z_score_threshold")));
    assert!(errors.iter().any(|e| e.contains("statistics.min_group_size")));
}

#[test]
fn test_duplicate_location_names_are_rejected() {
    let errors = validation_errors(PipelineConfig::from_toml_str(
        r#"
[[locations]]
name = "Fourchon"
facility_type = "port"

[[locations]]
name = "FOURCHON"
facility_type = "port"
"#,
    ));
    assert!(errors.iter().any(|e| e.contains("duplicates")));
}

#[test]
fn test_missing_date_weight_must_cover_cost_rules() {
    let errors = validation_errors(PipelineConfig::from_toml_str(
        r#"
[quality]
missing_date_weight = 5
negative_cost_weight = 10
rate_out_of_band_weight = 5
"#,
    ));
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("quality.missing_date_weight"));

    let config = PipelineConfig::from_toml_str(
        r#"
[quality]
missing_date_weight = 15
negative_cost_weight = 10
rate_out_of_band_weight = 5
"#,
    )
    .unwrap();
    assert_eq!(config.quality.missing_date_weight, 15);
}

#[test]
fn test_project_keywords_load_from_config() {
    let config = PipelineConfig::from_toml_str(
        r#"
[[classification.project_keywords]]
project_type = "P&A"
keywords = ["abandon"]

[[classification.project_keywords]]
project_type = "Cargo"
keywords = ["groceries", "deck"]
"#,
    )
    .unwrap();
    let table = &config.classification.project_keywords;
    assert_eq!(table.len(), 2);
    assert_eq!(table[0].project_type, ProjectType::PlugAndAbandonment);
    assert_eq!(table[1].keywords, vec!["groceries".to_string(), "deck".to_string()]);
}

#[test]
fn test_empty_project_keyword_rules_are_rejected() {
    let errors = validation_errors(PipelineConfig::from_toml_str(
        r#"
[classification]
project_keywords = []
"#,
    ));
    assert!(errors.iter().any(|e| e.contains("project_keywords must not be empty")));

    let errors = validation_errors(PipelineConfig::from_toml_str(
        r#"
[[classification.project_keywords]]
project_type = "Drilling"
keywords = ["  "]
"#,
    ));
    assert!(errors.iter().any(|e| e.contains("has no keywords")));
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = PipelineConfig::load_from_file(&dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Io(..)));
}

#[test]
fn test_invalid_config_refused_by_pipeline() {
    let mut config = PipelineConfig::default();
    config.statistics.iqr_multiplier = 0.0;
    let err = Pipeline::new(config).unwrap_err();
    assert!(matches!(err, PipelineError::Config(ConfigError::Validation(_))));
}

#[test]
fn test_effective_config_round_trips_through_toml() {
    let config = PipelineConfig::default();
    let rendered = config.to_toml().unwrap();
    assert!(validate_unknown_keys(&rendered).is_empty());
    let reloaded = PipelineConfig::from_toml_str(&rendered).unwrap();
    assert_eq!(reloaded.cost.rate_periods.len(), config.cost.rate_periods.len());
    assert_eq!(reloaded.locations.len(), config.locations.len());
}
