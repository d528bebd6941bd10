use std::sync::Arc;

use super::card::ResultCard;
use super::flow::{LookupRejection, ResultLookupFlow};
use super::sources::{MarksSource, RosterSource, SourceError, SubjectSource};
use crate::config::LookupConfig;
use crate::grading::{GradingConfig, ResultAggregator, ResultSummary};
use crate::identity::{next_roll_number, DateNormalizer};
use crate::records::{StudentRecord, SubjectMark};

/// Service composing the record sources with grading and identity rules.
pub struct ResultService<R, M, S> {
    roster: Arc<R>,
    marks: Arc<M>,
    subjects: Arc<S>,
    normalizer: DateNormalizer,
    grading: GradingConfig,
}

impl<R, M, S> ResultService<R, M, S>
where
    R: RosterSource + 'static,
    M: MarksSource + 'static,
    S: SubjectSource + 'static,
{
    pub fn new(
        roster: Arc<R>,
        marks: Arc<M>,
        subjects: Arc<S>,
        grading: GradingConfig,
        lookup: &LookupConfig,
    ) -> Self {
        Self {
            roster,
            marks,
            subjects,
            normalizer: DateNormalizer::new(lookup.calendar_policy),
            grading,
        }
    }

    pub fn grading(&self) -> &GradingConfig {
        &self.grading
    }

    pub fn normalizer(&self) -> &DateNormalizer {
        &self.normalizer
    }

    /// A fresh conversational flow sharing this service's sources.
    pub fn flow(&self) -> ResultLookupFlow<R, M, S> {
        ResultLookupFlow::new(
            Arc::clone(&self.roster),
            Arc::clone(&self.marks),
            Arc::clone(&self.subjects),
            self.normalizer,
            ResultAggregator::new(self.grading.clone()),
        )
    }

    /// Verify roll number and DOB in one step and build the result card.
    pub fn lookup(&self, roll_no: &str, dob: &str) -> Result<ResultCard, ResultServiceError> {
        Ok(self.flow().lookup(roll_no, dob)?)
    }

    /// Suggest the next roll number, using the service roster when none is supplied.
    pub fn suggest_roll_number(
        &self,
        class_name: &str,
        roster: Option<&[StudentRecord]>,
    ) -> Result<String, ResultServiceError> {
        if class_name.trim().is_empty() {
            return Err(ResultServiceError::MissingClassName);
        }

        match roster {
            Some(roster) => Ok(next_roll_number(class_name, roster)),
            None => {
                let roster = self.roster.fetch_roster()?;
                Ok(next_roll_number(class_name, &roster))
            }
        }
    }

    /// Aggregate ad hoc marks with optional overrides of the configured thresholds.
    pub fn aggregate(
        &self,
        marks: &[SubjectMark],
        pass_mark: Option<u32>,
        precision: Option<u8>,
    ) -> ResultSummary {
        let mut config = self.grading.clone();
        if let Some(pass_mark) = pass_mark {
            config = config.with_pass_mark(pass_mark);
        }
        if let Some(precision) = precision {
            config = config.with_precision(precision);
        }
        ResultAggregator::new(config).aggregate(marks)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ResultServiceError {
    #[error(transparent)]
    Lookup(#[from] LookupRejection),
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error("Class name is required")]
    MissingClassName,
}
