//! Config validation: unknown-key detection with Levenshtein suggestions
//! and reference-table consistency checks.
//!
//! Two-pass parse approach: first deserialize raw TOML into `toml::Value`,
//! walk the key tree (including arrays of tables), compare against known
//! field names, and emit warnings with "did you mean?" suggestions. Then
//! proceed with normal serde deserialization. Warnings never break a config.

use std::collections::{HashMap, HashSet};

use crate::text;
use crate::types::ProjectType;

/// A non-fatal config warning (typo, suspicious value).
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(ref s) = self.suggestion {
            write!(f, " (did you mean '{s}'?)")?;
        }
        Ok(())
    }
}

// ============================================================================
// Known Config Keys
// ============================================================================

/// Returns the complete set of valid dotted key paths for `PipelineConfig`.
///
/// Array-of-table entries are addressed without an index
/// (`cost.rate_periods.tiers.hourly_rate`). Maintained by hand to match
/// pipeline_config.rs.
pub fn known_config_keys() -> HashSet<&'static str> {
    let keys: &[&str] = &[
        // [batch]
        "batch",
        "batch.name",
        "batch.region",
        // [classification]
        "classification",
        "classification.non_productive_keywords",
        "classification.drilling_keywords",
        "classification.production_keywords",
        "classification.logistics_keywords",
        "classification.lc_prefix_departments",
        "classification.lc_prefix_departments.prefix",
        "classification.lc_prefix_departments.department",
        "classification.project_keywords",
        "classification.project_keywords.project_type",
        "classification.project_keywords.keywords",
        // [fluids]
        "fluids",
        "fluids.fuel_keywords",
        "fluids.completion_keywords",
        "fluids.drilling_keywords",
        "fluids.production_keywords",
        // [[locations]]
        "locations",
        "locations.name",
        "locations.facility_type",
        "locations.aliases",
        "locations.keywords",
        // [[vessels]]
        "vessels",
        "vessels.name",
        "vessels.company",
        "vessels.vessel_type",
        "vessels.length_ft",
        // [[vessel_token_rules]]
        "vessel_token_rules",
        "vessel_token_rules.token",
        "vessel_token_rules.company",
        "vessel_token_rules.vessel_type",
        // [cost]
        "cost",
        "cost.rate_periods",
        "cost.rate_periods.effective_from",
        "cost.rate_periods.effective_to",
        "cost.rate_periods.tiers",
        "cost.rate_periods.tiers.min_length_ft",
        "cost.rate_periods.tiers.hourly_rate",
        "cost.speed_support_multiplier",
        "cost.discounted_vessel_types",
        "cost.default_length_ft",
        "cost.min_sane_hourly_rate",
        "cost.max_sane_hourly_rate",
        // [quality]
        "quality",
        "quality.missing_date_weight",
        "quality.missing_vessel_weight",
        "quality.implausible_duration_weight",
        "quality.negative_cost_weight",
        "quality.rate_out_of_band_weight",
        "quality.max_event_hours",
        // [statistics]
        "statistics",
        "statistics.z_score_threshold",
        "statistics.iqr_multiplier",
        "statistics.control_limit_sigma",
        "statistics.min_group_size",
        // [reconciliation]
        "reconciliation",
        "reconciliation.strict_conflicts",
    ];
    keys.iter().copied().collect()
}

// ============================================================================
// TOML Key Walking
// ============================================================================

/// Recursively walks a `toml::Value` tree and collects all dotted key paths.
///
/// Tables inside arrays contribute their keys under the array's path, so
/// `[[cost.rate_periods]]` with `effective_from = ...` yields
/// `cost.rate_periods.effective_from`. Results are de-duplicated and sorted.
pub fn walk_toml_keys(value: &toml::Value, prefix: &str) -> Vec<String> {
    let mut keys = Vec::new();
    collect_keys(value, prefix, &mut keys);
    keys.sort();
    keys.dedup();
    keys
}

fn collect_keys(value: &toml::Value, prefix: &str, keys: &mut Vec<String>) {
    match value {
        toml::Value::Table(table) => {
            for (k, v) in table {
                let path = if prefix.is_empty() {
                    k.clone()
                } else {
                    format!("{prefix}.{k}")
                };
                keys.push(path.clone());
                collect_keys(v, &path, keys);
            }
        }
        toml::Value::Array(items) => {
            for item in items.iter().filter(|i| i.is_table()) {
                collect_keys(item, prefix, keys);
            }
        }
        _ => {}
    }
}

// ============================================================================
// Levenshtein Distance
// ============================================================================

/// Compute the Levenshtein edit distance between two strings.
fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Suggest the closest known key for an unknown key, if within edit distance 3.
///
/// Ties resolve to the lexicographically smallest key so the suggestion is
/// stable across runs.
pub fn suggest_correction(unknown: &str, known: &HashSet<&str>) -> Option<String> {
    known
        .iter()
        .map(|&k| (levenshtein(unknown, k), k))
        .filter(|(dist, _)| *dist <= 3)
        .min()
        .map(|(_, k)| k.to_string())
}

// ============================================================================
// Unknown Key Validation (entry point)
// ============================================================================

/// Parse a raw TOML string and return warnings for any unknown config keys.
///
/// This does NOT fail on unknown keys; it only warns.
pub fn validate_unknown_keys(raw_toml: &str) -> Vec<ValidationWarning> {
    let value: toml::Value = match raw_toml.parse() {
        Ok(v) => v,
        Err(_) => return Vec::new(), // parse errors are handled by serde later
    };

    let known = known_config_keys();
    walk_toml_keys(&value, "")
        .into_iter()
        .filter(|key| !known.contains(key.as_str()))
        .map(|key| ValidationWarning {
            suggestion: suggest_correction(&key, &known),
            message: format!("Unknown config key '{key}'"),
            field: key,
        })
        .collect()
}

// ============================================================================
// Reference Table Validation
// ============================================================================

/// Validate the location, vessel, token and project keyword tables of a
/// parsed config.
///
/// Returns (errors, warnings). Errors make a table unusable (blank or
/// duplicate canonical names); warnings flag entries that resolve
/// ambiguously but still work.
pub fn validate_reference_tables(
    config: &super::PipelineConfig,
) -> (Vec<String>, Vec<ValidationWarning>) {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    // Locations: canonical names unique, aliases owned by one location
    let mut names: HashMap<String, usize> = HashMap::new();
    let mut alias_owner: HashMap<String, &str> = HashMap::new();
    for (i, loc) in config.locations.iter().enumerate() {
        let key = text::normalize(&loc.name);
        if key.is_empty() {
            errors.push(format!("locations[{i}].name must not be blank"));
            continue;
        }
        if let Some(first) = names.insert(key.clone(), i) {
            errors.push(format!(
                "locations[{i}].name '{}' duplicates locations[{first}]",
                loc.name
            ));
        }
        for alias in &loc.aliases {
            let a = text::normalize(alias);
            if a.is_empty() {
                continue;
            }
            match alias_owner.get(&a) {
                Some(owner) if *owner != loc.name.as_str() => {
                    warnings.push(ValidationWarning {
                        field: format!("locations[{i}].aliases"),
                        message: format!(
                            "alias '{alias}' is listed for both '{owner}' and '{}'; the first wins",
                            loc.name
                        ),
                        suggestion: None,
                    });
                }
                Some(_) => {}
                None => {
                    alias_owner.insert(a, loc.name.as_str());
                }
            }
        }
    }
    for (alias, owner) in &alias_owner {
        if let Some(&idx) = names.get(alias) {
            let target = &config.locations[idx].name;
            if target != owner {
                warnings.push(ValidationWarning {
                    field: "locations.aliases".to_string(),
                    message: format!(
                        "alias '{alias}' of '{owner}' is also the canonical name '{target}'; the canonical name wins"
                    ),
                    suggestion: None,
                });
            }
        }
    }

    // Vessels
    let mut vessel_names: HashSet<String> = HashSet::new();
    for (i, v) in config.vessels.iter().enumerate() {
        let key = text::normalize(&v.name);
        if key.is_empty() {
            errors.push(format!("vessels[{i}].name must not be blank"));
        } else if !vessel_names.insert(key) {
            errors.push(format!("vessels[{i}].name '{}' is listed twice", v.name));
        }
        if let Some(len) = v.length_ft {
            if !len.is_finite() || len <= 0.0 {
                errors.push(format!("vessels[{i}].length_ft must be > 0 (got {len})"));
            }
        }
    }

    for (i, rule) in config.vessel_token_rules.iter().enumerate() {
        if text::normalize(&rule.token).is_empty() {
            errors.push(format!("vessel_token_rules[{i}].token must not be blank"));
        }
        if rule.company.is_none() && rule.vessel_type.is_none() {
            warnings.push(ValidationWarning {
                field: format!("vessel_token_rules[{i}]"),
                message: format!(
                    "token rule '{}' sets neither company nor vessel_type and has no effect",
                    rule.token
                ),
                suggestion: None,
            });
        }
    }

    if config.classification.project_keywords.is_empty() {
        errors.push("classification.project_keywords must not be empty".to_string());
    }
    for (i, rule) in config.classification.project_keywords.iter().enumerate() {
        if rule.project_type == ProjectType::Unclassified {
            errors.push(format!(
                "classification.project_keywords[{i}].project_type must not be Unclassified"
            ));
        }
        if rule.keywords.iter().all(|k| text::normalize(k).is_empty()) {
            errors.push(format!(
                "classification.project_keywords[{i}] ({:?}) has no keywords",
                rule.project_type
            ));
        }
    }

    if config.classification.non_productive_keywords.is_empty() {
        warnings.push(ValidationWarning {
            field: "classification.non_productive_keywords".to_string(),
            message: "non_productive_keywords is empty; every event will be Productive"
                .to_string(),
            suggestion: None,
        });
    }

    (errors, warnings)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PipelineConfig, VesselTokenRule};

    #[test]
    fn test_levenshtein_identical() {
        assert_eq!(levenshtein("vessels", "vessels"), 0);
    }

    #[test]
    fn test_levenshtein_one_edit() {
        assert_eq!(levenshtein("multipler", "multiplier"), 1);
    }

    #[test]
    fn test_levenshtein_empty() {
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("abc", ""), 3);
    }

    #[test]
    fn test_walk_toml_keys_nested() {
        let toml: toml::Value = r#"
            [statistics]
            z_score_threshold = 2.5
        "#
        .parse()
        .unwrap();
        let keys = walk_toml_keys(&toml, "");
        assert!(keys.contains(&"statistics".to_string()));
        assert!(keys.contains(&"statistics.z_score_threshold".to_string()));
    }

    #[test]
    fn test_walk_toml_keys_descends_into_arrays_of_tables() {
        let toml: toml::Value = r#"
            [[cost.rate_periods]]
            effective_from = "2024-01-01"
            effective_to = "2024-12-31"
            [[cost.rate_periods.tiers]]
            min_length_ft = 0.0
            hourly_rate = 500.0
        "#
        .parse()
        .unwrap();
        let keys = walk_toml_keys(&toml, "");
        assert!(keys.contains(&"cost.rate_periods".to_string()));
        assert!(keys.contains(&"cost.rate_periods.effective_from".to_string()));
        assert!(keys.contains(&"cost.rate_periods.tiers.hourly_rate".to_string()));
    }

    #[test]
    fn test_typo_key_produces_warning_with_suggestion() {
        let toml_str = r#"
[cost]
speed_suport_multiplier = 0.8
"#;
        let warnings = validate_unknown_keys(toml_str);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].field.contains("speed_suport_multiplier"));
        assert_eq!(
            warnings[0].suggestion.as_deref(),
            Some("cost.speed_support_multiplier")
        );
    }

    #[test]
    fn test_typo_inside_array_table_is_caught() {
        let toml_str = r#"
[[locations]]
name = "Fourchon"
facility_type = "port"
alises = ["Port Fourchon"]
"#;
        let warnings = validate_unknown_keys(toml_str);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].suggestion.as_deref(), Some("locations.aliases"));
    }

    #[test]
    fn test_all_valid_keys_produce_zero_warnings() {
        let toml_str = r#"
[batch]
name = "GoM Q1"

[statistics]
z_score_threshold = 2.0

[reconciliation]
strict_conflicts = true
"#;
        let warnings = validate_unknown_keys(toml_str);
        assert!(warnings.is_empty(), "Expected 0 warnings, got: {:?}", warnings);
    }

    #[test]
    fn test_suggest_correction_no_match_for_garbage() {
        let known = known_config_keys();
        assert!(suggest_correction("completely_unrelated_garbage_key_xyz", &known).is_none());
    }

    #[test]
    fn test_reference_tables_defaults_clean() {
        let config = PipelineConfig::default();
        let (errors, warnings) = validate_reference_tables(&config);
        assert!(errors.is_empty(), "{:?}", errors);
        assert!(warnings.is_empty(), "{:?}", warnings);
    }

    #[test]
    fn test_duplicate_location_name_is_error() {
        let mut config = PipelineConfig::default();
        let dup = config.locations[0].clone();
        config.locations.push(dup);
        let (errors, _) = validate_reference_tables(&config);
        assert!(errors.iter().any(|e| e.contains("duplicates")));
    }

    #[test]
    fn test_shared_alias_is_warning() {
        let mut config = PipelineConfig::default();
        config.locations[1].aliases.push("Port Fourchon".to_string());
        let (errors, warnings) = validate_reference_tables(&config);
        assert!(errors.is_empty());
        assert!(warnings.iter().any(|w| w.message.contains("Port Fourchon")));
    }

    #[test]
    fn test_inert_token_rule_is_warning() {
        let mut config = PipelineConfig::default();
        config.vessel_token_rules.push(VesselTokenRule {
            token: "gulf".to_string(),
            company: None,
            vessel_type: None,
        });
        let (_, warnings) = validate_reference_tables(&config);
        assert!(warnings.iter().any(|w| w.message.contains("no effect")));
    }
}
