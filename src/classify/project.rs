//! Project type classification
//!
//! Allocation-code metadata first, then event-text keywords, then the
//! already-inferred department, then `Unclassified`.

use std::sync::Arc;

use super::chain::{Classified, FallbackChain, FnRule};
use crate::allocation::AllocationReconciler;
use crate::config::ClassificationConfig;
use crate::text;
use crate::types::{ClassificationSource, Department, EventRecord, ProjectType};

/// Everything the project chain looks at for one record
#[derive(Debug, Clone)]
pub struct ProjectInput {
    pub cost_code: Option<String>,
    /// Normalised parent event, event, description and remarks
    pub text: String,
    pub department: Department,
}

impl ProjectInput {
    pub fn from_record(record: &dyn EventRecord, department: Department) -> Self {
        Self {
            cost_code: record.cost_code().map(str::to_string),
            text: text::join_fields([
                record.parent_event(),
                record.event(),
                record.description(),
                record.remarks(),
            ]),
            department,
        }
    }
}

pub struct ProjectClassifier {
    chain: FallbackChain<ProjectInput, ProjectType>,
}

impl ProjectClassifier {
    pub fn new(allocations: Arc<AllocationReconciler>, config: &ClassificationConfig) -> Self {
        let keywords = config
            .project_keywords
            .iter()
            .map(|rule| (rule.project_type, rule.keywords.clone()))
            .collect();
        Self::with_keywords(allocations, keywords)
    }

    /// Keyword table checked in order; the first project type with a
    /// matching keyword wins.
    pub fn with_keywords(
        allocations: Arc<AllocationReconciler>,
        keywords: Vec<(ProjectType, Vec<String>)>,
    ) -> Self {
        let chain = FallbackChain::new()
            .with_rule(FnRule::new(
                "allocation-code",
                ClassificationSource::AllocationCode,
                move |p: &ProjectInput| {
                    p.cost_code
                        .as_deref()
                        .and_then(|c| allocations.lookup_cell(c))
                        .and_then(|e| e.project_type)
                },
            ))
            .with_rule(FnRule::new(
                "event-text",
                ClassificationSource::EventText,
                move |p: &ProjectInput| {
                    keywords
                        .iter()
                        .find(|(_, kws)| text::contains_any(&p.text, kws))
                        .map(|(project, _)| *project)
                },
            ))
            .with_rule(FnRule::new(
                "department",
                ClassificationSource::Department,
                |p: &ProjectInput| match p.department {
                    Department::Drilling => Some(ProjectType::Drilling),
                    Department::Production => Some(ProjectType::Production),
                    Department::Logistics => Some(ProjectType::Cargo),
                    Department::Unassigned => None,
                },
            ));
        Self { chain }
    }

    pub fn classify(&self, record: &dyn EventRecord, department: Department) -> Classified<ProjectType> {
        self.chain
            .evaluate(&ProjectInput::from_record(record, department))
            .unwrap_or(Classified {
                value: ProjectType::Unclassified,
                source: ClassificationSource::Default,
            })
    }
}
