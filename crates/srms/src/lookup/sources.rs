use std::sync::Arc;

use crate::records::{ClassSubject, EnvelopeError, RecordBook, StudentRecord, SubjectMark};

/// Supplies the student roster.
pub trait RosterSource: Send + Sync {
    fn fetch_roster(&self) -> Result<Vec<StudentRecord>, SourceError>;
}

/// Supplies the marks recorded for one student.
pub trait MarksSource: Send + Sync {
    fn fetch_marks(&self, student_id: u64) -> Result<Vec<SubjectMark>, SourceError>;
}

/// Supplies a class's subject list, which is also the result display order.
pub trait SubjectSource: Send + Sync {
    fn fetch_subjects(&self, class_number: u32) -> Result<Vec<ClassSubject>, SourceError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SourceError {
    #[error("record source unavailable: {0}")]
    Unavailable(String),
    #[error("record source timed out")]
    Timeout,
    #[error("record source rejected the request: {0}")]
    Rejected(String),
    #[error("record source returned malformed data: {0}")]
    Malformed(String),
}

impl SourceError {
    /// Transport failures are worth another attempt; bad answers are not.
    pub fn is_retryable(&self) -> bool {
        matches!(self, SourceError::Unavailable(_) | SourceError::Timeout)
    }
}

impl From<EnvelopeError> for SourceError {
    fn from(value: EnvelopeError) -> Self {
        match value {
            EnvelopeError::Rejected(message) => Self::Rejected(message),
            EnvelopeError::Malformed(err) => Self::Malformed(err.to_string()),
        }
    }
}

impl RosterSource for RecordBook {
    fn fetch_roster(&self) -> Result<Vec<StudentRecord>, SourceError> {
        Ok(self.students.clone())
    }
}

impl MarksSource for RecordBook {
    fn fetch_marks(&self, student_id: u64) -> Result<Vec<SubjectMark>, SourceError> {
        Ok(self.marks_for(student_id))
    }
}

impl SubjectSource for RecordBook {
    fn fetch_subjects(&self, class_number: u32) -> Result<Vec<ClassSubject>, SourceError> {
        Ok(self.subjects_for(class_number))
    }
}

impl<T: RosterSource + ?Sized> RosterSource for Arc<T> {
    fn fetch_roster(&self) -> Result<Vec<StudentRecord>, SourceError> {
        (**self).fetch_roster()
    }
}

impl<T: MarksSource + ?Sized> MarksSource for Arc<T> {
    fn fetch_marks(&self, student_id: u64) -> Result<Vec<SubjectMark>, SourceError> {
        (**self).fetch_marks(student_id)
    }
}

impl<T: SubjectSource + ?Sized> SubjectSource for Arc<T> {
    fn fetch_subjects(&self, class_number: u32) -> Result<Vec<ClassSubject>, SourceError> {
        (**self).fetch_subjects(class_number)
    }
}
