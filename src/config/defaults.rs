//! Built-in reference tables and default constants.
//!
//! Every value here can be overridden from `logistics_config.toml`; these are
//! what a batch runs with when no file is present.

use chrono::NaiveDate;

use super::{
    LocationConfig, ProjectKeywordRule, RatePeriodConfig, RateTierConfig, VesselConfig,
    VesselTokenRule,
};
use crate::types::{FacilityType, ProjectType, VesselType};

// ============================================================================
// Config Discovery
// ============================================================================

/// Environment variable naming a config file
pub const CONFIG_ENV_VAR: &str = "OSV_LOGISTICS_CONFIG";

/// Config file looked up in the working directory
pub const LOCAL_CONFIG_FILE: &str = "logistics_config.toml";

// ============================================================================
// Data Quality
// ============================================================================

pub const MISSING_DATE_WEIGHT: u8 = 20;
pub const MISSING_VESSEL_WEIGHT: u8 = 15;
pub const IMPLAUSIBLE_DURATION_WEIGHT: u8 = 5;
pub const NEGATIVE_COST_WEIGHT: u8 = 10;
pub const RATE_OUT_OF_BAND_WEIGHT: u8 = 5;

/// A single event longer than this is implausible (hours)
pub const MAX_EVENT_HOURS: f64 = 24.0;

// ============================================================================
// Statistics
// ============================================================================

pub const Z_SCORE_THRESHOLD: f64 = 2.0;
pub const IQR_MULTIPLIER: f64 = 1.5;
pub const CONTROL_LIMIT_SIGMA: f64 = 2.0;

/// Smallest group that gets its own grouped summary
pub const MIN_GROUP_SIZE: usize = 2;

// ============================================================================
// Cost
// ============================================================================

/// Rate multiplier for classes that run fuel/speed support rather than
/// full heavy-lift capacity
pub const SPEED_SUPPORT_MULTIPLIER: f64 = 0.8;

/// Length assumed for vessels missing from the reference fleet (ft)
pub const DEFAULT_VESSEL_LENGTH_FT: f64 = 220.0;

pub const MIN_SANE_HOURLY_RATE: f64 = 150.0;
pub const MAX_SANE_HOURLY_RATE: f64 = 2_500.0;

/// Gallons per oilfield barrel
pub const GALLONS_PER_BARREL: f64 = 42.0;

// ============================================================================
// Keyword Tables
// ============================================================================

pub fn non_productive_keywords() -> Vec<String> {
    to_strings(&[
        "waiting",
        "wait on",
        "delay",
        "breakdown",
        "weather",
        "standby",
        "stand by",
        "equipment failure",
        "repair",
        "downtime",
        "down time",
        "shutdown",
        "no work",
        "idle",
    ])
}

pub fn drilling_keywords() -> Vec<String> {
    to_strings(&[
        "drill", "rig", "spud", "casing", "bop", "riser", "mud", "cement", "completion",
        "abandon", "p&a",
    ])
}

pub fn production_keywords() -> Vec<String> {
    to_strings(&[
        "production",
        "platform",
        "pdq",
        "spar",
        "fpu",
        "topsides",
        "chemical injection",
        "produced",
    ])
}

pub fn logistics_keywords() -> Vec<String> {
    to_strings(&[
        "logistics", "port", "dock", "quay", "base", "transit", "steaming", "backload",
    ])
}

/// Project keyword table, checked in order. P&A sits ahead of Drilling so
/// "plug and abandon - drilling rig" stays P&A.
pub fn project_keywords() -> Vec<ProjectKeywordRule> {
    let table: [(ProjectType, &[&str]); 6] = [
        (
            ProjectType::PlugAndAbandonment,
            &["p&a", "plug and abandon", "abandon", "decommission"],
        ),
        (
            ProjectType::Completions,
            &[
                "completion", "frac", "fracture", "fracturing", "stimulation", "gravel pack",
                "perforate", "perforating", "perforation",
            ],
        ),
        (
            ProjectType::Drilling,
            &["drilling", "spud", "spudded", "casing", "bop", "riser", "mud"],
        ),
        (
            ProjectType::Production,
            &["production", "produced", "topsides", "chemical injection"],
        ),
        (
            ProjectType::Personnel,
            &["crew change", "personnel", "passenger", "pob", "crew"],
        ),
        (
            ProjectType::Cargo,
            &["cargo", "deck", "backload", "container", "lift"],
        ),
    ];
    table
        .iter()
        .map(|(project_type, keywords)| ProjectKeywordRule {
            project_type: *project_type,
            keywords: to_strings(keywords),
        })
        .collect()
}

pub fn fuel_keywords() -> Vec<String> {
    to_strings(&["diesel", "gas oil", "gasoil", "mgo", "marine gas oil", "fuel"])
}

pub fn completion_fluid_keywords() -> Vec<String> {
    to_strings(&[
        "brine",
        "cacl",
        "calcium chloride",
        "cabr",
        "calcium bromide",
        "znbr",
        "zinc bromide",
        "nabr",
        "sodium bromide",
        "completion",
        "packer fluid",
        "kcl",
    ])
}

pub fn drilling_fluid_keywords() -> Vec<String> {
    to_strings(&[
        "obm",
        "oil based mud",
        "sbm",
        "synthetic",
        "wbm",
        "water based mud",
        "mud",
        "barite",
        "bentonite",
        "cement",
        "drill water",
        "spacer",
    ])
}

pub fn production_fluid_keywords() -> Vec<String> {
    to_strings(&[
        "methanol",
        "meg",
        "glycol",
        "inhibitor",
        "chemical",
        "produced water",
        "xylene",
        "biocide",
        "demulsifier",
    ])
}

// ============================================================================
// Master Location Table
// ============================================================================

pub fn locations() -> Vec<LocationConfig> {
    vec![
        location(
            "Fourchon",
            FacilityType::Port,
            &["Port Fourchon", "Fourchon Base", "C-Port", "GOM Fourchon"],
            &["fourchon"],
        ),
        location("Galveston", FacilityType::Port, &["Galveston Base"], &["galveston"]),
        location(
            "Thunder Horse PDQ",
            FacilityType::Production,
            &["Thunder Horse", "Thunder Horse Production", "THPDQ", "TH PDQ"],
            &["thunder"],
        ),
        location(
            "Thunder Horse Drilling",
            FacilityType::Drilling,
            &["Thunder Horse Drill", "TH Drilling", "THD"],
            &["thunder", "drill"],
        ),
        location(
            "Mad Dog",
            FacilityType::Production,
            &["Mad Dog Spar", "Mad Dog Production"],
            &["mad dog"],
        ),
        location(
            "Mad Dog Drilling",
            FacilityType::Drilling,
            &["Mad Dog Drill"],
            &["mad dog", "drill"],
        ),
        location(
            "Argos",
            FacilityType::Integrated,
            &["Mad Dog 2", "Argos FPU"],
            &["argos"],
        ),
        location("Atlantis PQ", FacilityType::Production, &["Atlantis"], &["atlantis"]),
        location("Na Kika", FacilityType::Production, &["NaKika"], &["kika"]),
        location(
            "Ocean Blackhornet",
            FacilityType::Drilling,
            &["Blackhornet"],
            &["blackhornet"],
        ),
        location(
            "Deepwater Invictus",
            FacilityType::Drilling,
            &["Invictus"],
            &["invictus"],
        ),
        location("Stena IceMAX", FacilityType::Drilling, &["IceMAX"], &["icemax"]),
    ]
}

fn location(
    name: &str,
    facility_type: FacilityType,
    aliases: &[&str],
    keywords: &[&str],
) -> LocationConfig {
    LocationConfig {
        name: name.to_string(),
        facility_type,
        aliases: to_strings(aliases),
        keywords: to_strings(keywords),
    }
}

// ============================================================================
// Reference Fleet
// ============================================================================

pub fn vessels() -> Vec<VesselConfig> {
    vec![
        vessel("Pelican Island", "Edison Chouest Offshore", VesselType::Osv, 280.0),
        vessel("Fast Cajun", "Edison Chouest Offshore", VesselType::Fsv, 190.0),
        vessel("HOS Bayou", "Hornbeck Offshore", VesselType::Psv, 300.0),
        vessel("Harvey Supporter", "Harvey Gulf", VesselType::Psv, 290.0),
        vessel("Gulf Titan", "Tidewater", VesselType::Ahts, 240.0),
        vessel("Bayou Helper", "Otto Candies", VesselType::Msv, 260.0),
    ]
}

fn vessel(name: &str, company: &str, vessel_type: VesselType, length_ft: f64) -> VesselConfig {
    VesselConfig {
        name: name.to_string(),
        company: company.to_string(),
        vessel_type,
        length_ft: Some(length_ft),
    }
}

pub fn vessel_token_rules() -> Vec<VesselTokenRule> {
    vec![
        token_rule("hos", Some("Hornbeck Offshore"), None),
        token_rule("harvey", Some("Harvey Gulf"), None),
        token_rule("candies", Some("Otto Candies"), None),
        token_rule("fast", None, Some(VesselType::Fsv)),
    ]
}

fn token_rule(
    token: &str,
    company: Option<&str>,
    vessel_type: Option<VesselType>,
) -> VesselTokenRule {
    VesselTokenRule {
        token: token.to_string(),
        company: company.map(str::to_string),
        vessel_type,
    }
}

// ============================================================================
// Contract Rate Table
// ============================================================================

/// Two contract periods with a rate change effective 2024-07-01.
pub fn rate_periods() -> Vec<RatePeriodConfig> {
    vec![
        rate_period(
            date(2020, 1, 1),
            date(2024, 6, 30),
            &[(0.0, 450.0), (200.0, 550.0), (250.0, 650.0), (300.0, 800.0)],
        ),
        rate_period(
            date(2024, 7, 1),
            date(2035, 12, 31),
            &[(0.0, 500.0), (200.0, 600.0), (250.0, 720.0), (300.0, 880.0)],
        ),
    ]
}

fn rate_period(from: NaiveDate, to: NaiveDate, tiers: &[(f64, f64)]) -> RatePeriodConfig {
    RatePeriodConfig {
        effective_from: from,
        effective_to: to,
        tiers: tiers
            .iter()
            .map(|&(min_length_ft, hourly_rate)| RateTierConfig {
                min_length_ft,
                hourly_rate,
            })
            .collect(),
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or(NaiveDate::MIN)
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}
