//! Vessel class and operating company inference
//!
//! 1. Exact (normalised) name in the reference fleet
//! 2. A reference vessel name contained in the text ("M/V Pelican Island II")
//! 3. Class token in the name ("PSV Example I")
//! 4. Token rules ("HOS ..." → Hornbeck Offshore)
//!
//! Anything unmatched is `Unknown` / "Unassigned"; it never blocks processing.

use std::collections::HashMap;

use crate::config::{VesselConfig, VesselTokenRule};
use crate::text;
use crate::types::VesselType;

pub const UNASSIGNED_COMPANY: &str = "Unassigned";

/// What is known about a vessel for classification and costing
#[derive(Debug, Clone, PartialEq)]
pub struct VesselProfile {
    pub vessel_type: VesselType,
    pub company: String,
    /// Length from the reference fleet, when listed
    pub length_ft: Option<f64>,
}

impl VesselProfile {
    pub fn unknown() -> Self {
        Self {
            vessel_type: VesselType::Unknown,
            company: UNASSIGNED_COMPANY.to_string(),
            length_ft: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct VesselClassifier {
    fleet: Vec<(String, VesselProfile)>,
    by_name: HashMap<String, usize>,
    token_rules: Vec<(String, VesselTokenRule)>,
}

impl VesselClassifier {
    pub fn new(fleet: &[VesselConfig], token_rules: &[VesselTokenRule]) -> Self {
        let mut entries = Vec::with_capacity(fleet.len());
        let mut by_name = HashMap::new();
        for v in fleet {
            let name = text::normalize(&v.name);
            if name.is_empty() {
                continue;
            }
            by_name.entry(name.clone()).or_insert(entries.len());
            entries.push((
                name,
                VesselProfile {
                    vessel_type: v.vessel_type,
                    company: v.company.clone(),
                    length_ft: v.length_ft,
                },
            ));
        }
        let token_rules = token_rules
            .iter()
            .map(|r| (text::normalize(&r.token), r.clone()))
            .filter(|(t, _)| !t.is_empty())
            .collect();
        Self {
            fleet: entries,
            by_name,
            token_rules,
        }
    }

    pub fn classify(&self, vessel: Option<&str>) -> VesselProfile {
        let Some(norm) = vessel.map(text::normalize).filter(|n| !n.is_empty()) else {
            return VesselProfile::unknown();
        };

        if let Some(&i) = self.by_name.get(&norm) {
            return self.fleet[i].1.clone();
        }

        // Longest contained reference name
        let contained = self
            .fleet
            .iter()
            .filter(|(name, _)| text::contains_keyword(&norm, name))
            .max_by_key(|(name, _)| name.len());
        if let Some((_, profile)) = contained {
            return profile.clone();
        }

        let mut profile = VesselProfile::unknown();
        let mut company: Option<String> = None;
        let mut class = norm.split(' ').find_map(VesselType::from_token);

        for (token, rule) in &self.token_rules {
            if !norm.split(' ').any(|w| w == token) {
                continue;
            }
            if company.is_none() {
                company = rule.company.clone();
            }
            if class.is_none() {
                class = rule.vessel_type;
            }
        }

        if let Some(c) = class {
            profile.vessel_type = c;
        }
        if let Some(c) = company {
            profile.company = c;
        }
        profile
    }
}
