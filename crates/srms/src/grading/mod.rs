//! Turning per-subject marks into a result summary.

mod bands;
mod config;
mod rules;

pub use bands::{Grade, PerformanceRemark, ResultStatus};
pub use config::GradingConfig;

use bands::grade_for;
use serde::{Deserialize, Serialize};

use crate::records::SubjectMark;

/// Stateless aggregator applying one grading configuration.
#[derive(Debug, Clone, Default)]
pub struct ResultAggregator {
    config: GradingConfig,
}

impl ResultAggregator {
    pub fn new(config: GradingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GradingConfig {
        &self.config
    }

    /// Never fails: an empty or unusable mark list yields a zeroed `PENDING` summary.
    pub fn aggregate(&self, marks: &[SubjectMark]) -> ResultSummary {
        let subjects = rules::usable_lines(marks, &self.config);

        let total: u64 = subjects.iter().map(|line| u64::from(line.marks_obtained)).sum();
        let max_total: u64 = subjects.iter().map(|line| u64::from(line.max_marks)).sum();
        let whole = rules::whole_percentage(total, max_total);

        let status = if subjects.is_empty() {
            ResultStatus::Pending
        } else if subjects.iter().all(|line| line.passed) {
            ResultStatus::Pass
        } else {
            ResultStatus::Fail
        };

        ResultSummary {
            total,
            max_total,
            percentage: rules::rounded_percentage(total, max_total, self.config.precision),
            precision: self.config.precision,
            grade: grade_for(whole, self.config.d_grade_floor),
            status,
            subjects,
        }
    }
}

/// Aggregate with default bands and the given per-subject pass mark.
pub fn aggregate(marks: &[SubjectMark], pass_mark: u32) -> ResultSummary {
    ResultAggregator::new(GradingConfig::default().with_pass_mark(pass_mark)).aggregate(marks)
}

/// One usable subject entry of a result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectLine {
    pub subject: String,
    pub marks_obtained: u32,
    pub max_marks: u32,
    /// Whole-number percentage for this subject.
    pub percentage: u32,
    pub passed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultSummary {
    pub total: u64,
    pub max_total: u64,
    pub percentage: f64,
    pub precision: u8,
    pub grade: Grade,
    pub status: ResultStatus,
    pub subjects: Vec<SubjectLine>,
}

impl ResultSummary {
    /// Percentage formatted with the summary's precision, e.g. `"50"` or `"50.00"`.
    pub fn percentage_text(&self) -> String {
        format!("{:.*}", usize::from(self.precision), self.percentage)
    }

    /// Percentage recomputed from the totals at another precision.
    pub fn percentage_text_at(&self, precision: u8) -> String {
        let precision = precision.min(GradingConfig::MAX_PRECISION);
        let value = rules::rounded_percentage(self.total, self.max_total, precision);
        format!("{:.*}", usize::from(precision), value)
    }

    pub fn whole_percentage(&self) -> u32 {
        rules::whole_percentage(self.total, self.max_total)
    }

    pub fn remark(&self) -> Option<PerformanceRemark> {
        match self.status {
            ResultStatus::Pending => None,
            _ => Some(PerformanceRemark::for_percentage(self.whole_percentage())),
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == ResultStatus::Pending
    }
}
