//! Data-Quality Scorer
//!
//! Every record starts at 100 and loses a fixed weight per violated rule,
//! floored at 0. Rules are independent so adding a violation can only lower
//! a score. Scoring never rejects a record.

use crate::config::{CostConfig, QualityConfig};
use crate::types::{
    BulkTransfer, EventRecord, ParseFlag, QualityAssessment, QualityIssue, QualityRule, VesselCost,
};

#[derive(Debug, Clone)]
pub struct QualityScorer {
    config: QualityConfig,
    min_rate: f64,
    max_rate: f64,
}

impl QualityScorer {
    pub fn new(config: &QualityConfig, cost: &CostConfig) -> Self {
        Self {
            config: config.clone(),
            min_rate: cost.min_sane_hourly_rate,
            max_rate: cost.max_sane_hourly_rate,
        }
    }

    pub fn weight(&self, rule: QualityRule) -> u8 {
        match rule {
            QualityRule::MissingDate => self.config.missing_date_weight,
            QualityRule::MissingVessel => self.config.missing_vessel_weight,
            QualityRule::ImplausibleDuration => self.config.implausible_duration_weight,
            QualityRule::NegativeCost => self.config.negative_cost_weight,
            QualityRule::RateOutOfBand => self.config.rate_out_of_band_weight,
        }
    }

    /// Score a voyage event or manifest line with its computed cost.
    pub fn assess(&self, record: &dyn EventRecord, cost: Option<&VesselCost>) -> QualityAssessment {
        let mut issues = Vec::new();

        if record.start().is_none() {
            issues.push(self.issue(QualityRule::MissingDate, missing_date_message(record.parse_flags())));
        }
        if is_blank(record.vessel()) {
            issues.push(self.issue(QualityRule::MissingVessel, "vessel name is missing".to_string()));
        }

        let hours = record.hours();
        if hours > self.config.max_event_hours {
            issues.push(self.issue(
                QualityRule::ImplausibleDuration,
                format!(
                    "duration {:.1} h exceeds {:.0} h",
                    hours, self.config.max_event_hours
                ),
            ));
        } else if hours < 0.0 {
            issues.push(self.issue(
                QualityRule::ImplausibleDuration,
                format!("negative duration {:.1} h", hours),
            ));
        }

        if let Some(cost) = cost {
            if cost.total < 0.0 {
                issues.push(self.issue(
                    QualityRule::NegativeCost,
                    format!("negative vessel cost {:.2}", cost.total),
                ));
            }
            if !(self.min_rate..=self.max_rate).contains(&cost.hourly_rate) {
                issues.push(self.issue(
                    QualityRule::RateOutOfBand,
                    format!(
                        "hourly rate {:.2} outside {:.0}-{:.0}",
                        cost.hourly_rate, self.min_rate, self.max_rate
                    ),
                ));
            }
        }

        self.finish(issues)
    }

    /// Bulk transfers carry no duration or cost, so only the date and
    /// vessel rules apply.
    pub fn assess_transfer(&self, transfer: &BulkTransfer) -> QualityAssessment {
        let mut issues = Vec::new();
        if transfer.date.is_none() {
            issues.push(self.issue(QualityRule::MissingDate, missing_date_message(&transfer.parse_flags)));
        }
        if is_blank(transfer.vessel.as_deref()) {
            issues.push(self.issue(QualityRule::MissingVessel, "vessel name is missing".to_string()));
        }
        self.finish(issues)
    }

    fn issue(&self, rule: QualityRule, message: String) -> QualityIssue {
        QualityIssue {
            rule,
            deduction: self.weight(rule),
            message,
        }
    }

    fn finish(&self, issues: Vec<QualityIssue>) -> QualityAssessment {
        let score = issues
            .iter()
            .fold(100u8, |score, issue| score.saturating_sub(issue.deduction));
        QualityAssessment { score, issues }
    }
}

fn is_blank(s: Option<&str>) -> bool {
    s.map(|v| v.trim().is_empty()).unwrap_or(true)
}

fn missing_date_message(flags: &[ParseFlag]) -> String {
    let unparsed = flags.iter().find_map(|f| match f {
        ParseFlag::UnparseableDate { raw, .. } => Some(raw.as_str()),
        ParseFlag::NonNumeric { .. } => None,
    });
    match unparsed {
        Some(raw) => format!("date '{}' could not be parsed", raw),
        None => "date is missing".to_string(),
    }
}
