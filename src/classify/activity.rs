//! Productive vs non-productive time

use crate::config::ClassificationConfig;
use crate::text;
use crate::types::ActivityCategory;

/// Non-Productive iff the parent event plus event text contains any
/// configured NPT keyword; Productive otherwise.
#[derive(Debug, Clone)]
pub struct ActivityClassifier {
    keywords: Vec<String>,
}

impl ActivityClassifier {
    pub fn new(config: &ClassificationConfig) -> Self {
        Self::with_keywords(config.non_productive_keywords.clone())
    }

    pub fn with_keywords(keywords: Vec<String>) -> Self {
        Self { keywords }
    }

    pub fn classify(&self, parent_event: Option<&str>, event: Option<&str>) -> ActivityCategory {
        let hay = text::join_fields([parent_event, event]);
        if text::contains_any(&hay, &self.keywords) {
            ActivityCategory::NonProductive
        } else {
            ActivityCategory::Productive
        }
    }
}
