//! Department inference
//!
//! Precedence is fixed: allocation code → LC-number pattern → description →
//! location → remarks → `Unassigned`. The order was tuned against real
//! exports and must not be re-derived.

use std::sync::Arc;

use super::chain::{Classified, FallbackChain, FnRule};
use crate::allocation::{extract_lc_numbers, AllocationReconciler};
use crate::locations::LocationResolver;
use crate::types::{ClassificationSource, Department, EventRecord, FacilityType};

/// Record object the department chain runs over
pub type Record = dyn EventRecord + 'static;

pub struct DepartmentClassifier {
    chain: FallbackChain<Record, Department>,
}

impl DepartmentClassifier {
    pub fn new(allocations: Arc<AllocationReconciler>, locations: Arc<LocationResolver>) -> Self {
        let by_code = Arc::clone(&allocations);
        let by_pattern = Arc::clone(&allocations);
        let by_description = Arc::clone(&allocations);
        let by_location = Arc::clone(&allocations);
        let by_remarks = allocations;

        let chain = FallbackChain::new()
            .with_rule(FnRule::new(
                "allocation-code",
                ClassificationSource::AllocationCode,
                move |r: &Record| {
                    r.cost_code()
                        .and_then(|c| by_code.lookup(c))
                        .and_then(|e| e.department)
                },
            ))
            .with_rule(FnRule::new(
                "lc-pattern",
                ClassificationSource::LcPattern,
                move |r: &Record| lc_pattern(&by_pattern, r),
            ))
            .with_rule(FnRule::new(
                "description",
                ClassificationSource::Description,
                move |r: &Record| {
                    r.department_label()
                        .and_then(Department::from_label)
                        .or_else(|| by_description.vocabulary().infer_opt(r.description()))
                },
            ))
            .with_rule(FnRule::new(
                "location",
                ClassificationSource::Location,
                move |r: &Record| {
                    let from_facility = match locations.resolve_opt(r.location_text()).facility_type {
                        FacilityType::Drilling => Some(Department::Drilling),
                        FacilityType::Production => Some(Department::Production),
                        FacilityType::Port => Some(Department::Logistics),
                        FacilityType::Integrated | FacilityType::Unclassified => None,
                    };
                    from_facility.or_else(|| by_location.vocabulary().infer_opt(r.location_text()))
                },
            ))
            .with_rule(FnRule::new(
                "remarks",
                ClassificationSource::Remarks,
                move |r: &Record| by_remarks.vocabulary().infer_opt(r.remarks()),
            ));

        Self { chain }
    }

    /// Department for a record; `Unassigned` from `Default` when every step
    /// declines.
    pub fn classify(&self, record: &Record) -> Classified<Department> {
        self.chain.evaluate(record).unwrap_or(Classified {
            value: Department::Unassigned,
            source: ClassificationSource::Default,
        })
    }

    pub fn rule_names(&self) -> Vec<&str> {
        self.chain.rule_names()
    }
}

/// LC numbers in the cost-code cell (bare or prefixed) or written with an
/// explicit "LC" in the description/remarks, looked up in the ledger; then
/// the prefix table on the cost-code numbers.
fn lc_pattern(allocations: &AllocationReconciler, r: &dyn EventRecord) -> Option<Department> {
    let from_code_cell = r.cost_code().map(extract_lc_numbers).unwrap_or_default();
    let from_text = [r.description(), r.remarks()]
        .into_iter()
        .flatten()
        .flat_map(extract_lc_numbers)
        .filter(|m| m.prefixed);

    let ledger_hit = from_code_cell
        .iter()
        .cloned()
        .chain(from_text)
        .find_map(|m| allocations.lookup(&m.code).and_then(|e| e.department));

    ledger_hit.or_else(|| {
        from_code_cell
            .iter()
            .find_map(|m| allocations.vocabulary().department_for_prefix(&m.code))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{defaults, ClassificationConfig, LcPrefixRule};
    use crate::types::{CostAllocationEntry, VoyageEvent};

    fn ledger() -> Vec<CostAllocationEntry> {
        vec![CostAllocationEntry {
            row: 0,
            code: Some("10137".into()),
            description: Some("Blackhornet drilling campaign".into()),
            department: Some("Drilling".into()),
            project_type: Some("Drilling".into()),
            rig_location: Some("Ocean Blackhornet".into()),
            location_reference: None,
            mission: None,
            period: None,
            allocated_days: 10.0,
            daily_rate: 0.0,
            total_cost: 100_000.0,
            parse_flags: Vec::new(),
        }]
    }

    fn classifier_with(config: &ClassificationConfig) -> DepartmentClassifier {
        DepartmentClassifier::new(
            Arc::new(AllocationReconciler::build(&ledger(), config)),
            Arc::new(LocationResolver::new(&defaults::locations())),
        )
    }

    fn classifier() -> DepartmentClassifier {
        classifier_with(&ClassificationConfig::default())
    }

    fn event() -> VoyageEvent {
        VoyageEvent {
            row: 0,
            vessel: Some("Example I".into()),
            voyage_number: Some("100".into()),
            mission: None,
            parent_event: None,
            event: None,
            location: None,
            quay: None,
            port_type: None,
            remarks: None,
            cost_code: None,
            department: None,
            from: None,
            to: None,
            hours: 0.0,
            parse_flags: Vec::new(),
        }
    }

    #[test]
    fn test_precedence_order() {
        assert_eq!(
            classifier().rule_names(),
            vec!["allocation-code", "lc-pattern", "description", "location", "remarks"]
        );
    }

    #[test]
    fn test_code_beats_everything() {
        let mut e = event();
        e.cost_code = Some("LC10137".into());
        e.mission = Some("Production support".into());
        e.location = Some("Fourchon".into());
        let hit = classifier().classify(&e);
        assert_eq!(hit.value, Department::Drilling);
        assert_eq!(hit.source, ClassificationSource::AllocationCode);
    }

    #[test]
    fn test_lc_pattern_in_multi_code_cell() {
        let mut e = event();
        e.cost_code = Some("99999, 10137 50%".into());
        let hit = classifier().classify(&e);
        assert_eq!(hit.value, Department::Drilling);
        assert_eq!(hit.source, ClassificationSource::LcPattern);
    }

    #[test]
    fn test_lc_in_remarks_needs_prefix() {
        let mut e = event();
        e.remarks = Some("charged to LC 10137".into());
        let hit = classifier().classify(&e);
        assert_eq!(hit.source, ClassificationSource::LcPattern);

        let mut bare = event();
        bare.remarks = Some("ticket 10137".into());
        let hit = classifier().classify(&bare);
        assert_eq!(hit.value, Department::Unassigned);
        assert_eq!(hit.source, ClassificationSource::Default);
    }

    #[test]
    fn test_lc_prefix_table() {
        let mut config = ClassificationConfig::default();
        config.lc_prefix_departments = vec![LcPrefixRule {
            prefix: "93".into(),
            department: Department::Production,
        }];
        let mut e = event();
        e.cost_code = Some("9360".into());
        let hit = classifier_with(&config).classify(&e);
        assert_eq!(hit.value, Department::Production);
        assert_eq!(hit.source, ClassificationSource::LcPattern);
    }

    #[test]
    fn test_description_then_location_then_remarks() {
        let c = classifier();

        let mut e = event();
        e.mission = Some("Production chemicals run".into());
        e.location = Some("Ocean Blackhornet".into());
        assert_eq!(c.classify(&e).source, ClassificationSource::Description);
        assert_eq!(c.classify(&e).value, Department::Production);

        e.mission = None;
        let hit = c.classify(&e);
        assert_eq!(hit.value, Department::Drilling);
        assert_eq!(hit.source, ClassificationSource::Location);

        let mut port = event();
        port.location = Some("Port Fourchon".into());
        assert_eq!(c.classify(&port).value, Department::Logistics);

        let mut remarks = event();
        remarks.remarks = Some("backload to dock".into());
        let hit = c.classify(&remarks);
        assert_eq!(hit.value, Department::Logistics);
        assert_eq!(hit.source, ClassificationSource::Remarks);
    }

    #[test]
    fn test_words_sharing_a_stem_fall_through_to_location() {
        let c = classifier();

        let mut spares = event();
        spares.mission = Some("Spare parts delivery".into());
        spares.location = Some("Ocean Blackhornet".into());
        let hit = c.classify(&spares);
        assert_eq!(hit.value, Department::Drilling);
        assert_eq!(hit.source, ClassificationSource::Location);

        let mut support = event();
        support.mission = Some("Support vessel standby".into());
        support.location = Some("Ocean Blackhornet".into());
        assert_eq!(c.classify(&support).source, ClassificationSource::Location);
    }

    #[test]
    fn test_department_label_column() {
        let mut e = event();
        e.department = Some("Drilling Ops".into());
        let hit = classifier().classify(&e);
        assert_eq!(hit.value, Department::Drilling);
        assert_eq!(hit.source, ClassificationSource::Description);
    }

    #[test]
    fn test_nothing_matches_is_unassigned() {
        let hit = classifier().classify(&event());
        assert_eq!(hit.value, Department::Unassigned);
        assert_eq!(hit.source, ClassificationSource::Default);
    }
}
