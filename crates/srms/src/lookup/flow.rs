//! Roll number + date of birth verification followed by result presentation.
//!
//! ```text
//! AwaitingRollNumber --roll found--> AwaitingDateOfBirth --dob equal--> Resolved --present--> ResultPresented
//!        ^                                   |
//!        +------- roll not found ------------+ (dob rejections stay in AwaitingDateOfBirth)
//! ```
//!
//! Rejections are ordinary values. Once a student is resolved the flow always reaches
//! `ResultPresented`, with an empty (PENDING) result if the collaborators fail.

use std::sync::Arc;

use super::arrange::arrange_for_class;
use super::card::ResultCard;
use super::sources::{MarksSource, RosterSource, SourceError, SubjectSource};
use crate::grading::ResultAggregator;
use crate::identity::roll_number::FALLBACK_CLASS_NUMBER;
use crate::identity::{DateNormalizer, DateRejection};
use crate::records::{ClassSubject, StudentRecord, SubjectMark};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupState {
    AwaitingRollNumber,
    AwaitingDateOfBirth { student: StudentRecord },
    Resolved { student: StudentRecord },
    ResultPresented { student: StudentRecord },
}

impl LookupState {
    pub fn student(&self) -> Option<&StudentRecord> {
        match self {
            LookupState::AwaitingRollNumber => None,
            LookupState::AwaitingDateOfBirth { student }
            | LookupState::Resolved { student }
            | LookupState::ResultPresented { student } => Some(student),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            LookupState::AwaitingRollNumber => "awaiting_roll_number",
            LookupState::AwaitingDateOfBirth { .. } => "awaiting_date_of_birth",
            LookupState::Resolved { .. } => "resolved",
            LookupState::ResultPresented { .. } => "result_presented",
        }
    }
}

/// A submission the flow could not accept, with the text shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LookupRejection {
    #[error("Please enter Roll Number")]
    MissingRollNumber,
    #[error("Roll Number \"{roll_no}\" not found in our system")]
    RollNumberNotFound { roll_no: String },
    #[error("Student records are unavailable right now. Please try again.")]
    RosterUnavailable,
    #[error("Please enter Date of Birth")]
    MissingDateOfBirth,
    #[error("Date of Birth format incorrect. Use DD/MM/YYYY, DD-MM-YYYY, YYYY-MM-DD or DDMMYYYY.")]
    DobFormatIncorrect,
    #[error("DOB incorrect: Date of Birth does not match our records")]
    DobIncorrect,
    #[error("Please enter your Roll Number before your Date of Birth")]
    RollNumberRequired,
    #[error("Roll Number and Date of Birth must be verified first")]
    NotVerified,
}

impl LookupRejection {
    pub fn message(&self) -> String {
        self.to_string()
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, LookupRejection::RosterUnavailable)
    }
}

/// One conversational lookup session. Not shared between users.
pub struct ResultLookupFlow<R, M, S> {
    roster: Arc<R>,
    marks: Arc<M>,
    subjects: Arc<S>,
    normalizer: DateNormalizer,
    aggregator: ResultAggregator,
    state: LookupState,
}

impl<R, M, S> ResultLookupFlow<R, M, S>
where
    R: RosterSource,
    M: MarksSource,
    S: SubjectSource,
{
    pub fn new(
        roster: Arc<R>,
        marks: Arc<M>,
        subjects: Arc<S>,
        normalizer: DateNormalizer,
        aggregator: ResultAggregator,
    ) -> Self {
        Self {
            roster,
            marks,
            subjects,
            normalizer,
            aggregator,
            state: LookupState::AwaitingRollNumber,
        }
    }

    pub fn state(&self) -> &LookupState {
        &self.state
    }

    pub fn reset(&mut self) {
        self.state = LookupState::AwaitingRollNumber;
    }

    /// Always starts over; a new roll number replaces any earlier progress.
    pub fn submit_roll_number(&mut self, text: &str) -> Result<StudentRecord, LookupRejection> {
        self.state = LookupState::AwaitingRollNumber;

        let roll_no = text.trim();
        if roll_no.is_empty() {
            return Err(LookupRejection::MissingRollNumber);
        }

        let roster = self.roster.fetch_roster().map_err(|err| {
            tracing::warn!(error = %err, "roster unavailable for lookup");
            LookupRejection::RosterUnavailable
        })?;

        let student = roster
            .into_iter()
            .find(|student| student.roll_matches(roll_no))
            .ok_or_else(|| LookupRejection::RollNumberNotFound {
                roll_no: roll_no.to_string(),
            })?;

        tracing::debug!(roll_no = %student.roll_no, "roll number matched");
        self.state = LookupState::AwaitingDateOfBirth {
            student: student.clone(),
        };
        Ok(student)
    }

    pub fn submit_date_of_birth(&mut self, text: &str) -> Result<StudentRecord, LookupRejection> {
        let student = match &self.state {
            LookupState::AwaitingRollNumber => return Err(LookupRejection::RollNumberRequired),
            LookupState::AwaitingDateOfBirth { student }
            | LookupState::Resolved { student }
            | LookupState::ResultPresented { student } => student.clone(),
        };

        let claimed = match self.normalizer.normalize(text) {
            Ok(date) => date,
            Err(rejection) => {
                self.state = LookupState::AwaitingDateOfBirth { student };
                return Err(match rejection {
                    DateRejection::Blank => LookupRejection::MissingDateOfBirth,
                    _ => LookupRejection::DobFormatIncorrect,
                });
            }
        };

        let matches = self
            .normalizer
            .normalize(&student.dob)
            .map(|recorded| recorded == claimed)
            .unwrap_or(false);
        if !matches {
            tracing::debug!(roll_no = %student.roll_no, "date of birth mismatch");
            self.state = LookupState::AwaitingDateOfBirth { student };
            return Err(LookupRejection::DobIncorrect);
        }

        tracing::debug!(roll_no = %student.roll_no, "identity verified");
        self.state = LookupState::Resolved {
            student: student.clone(),
        };
        Ok(student)
    }

    /// Fetch marks and subjects concurrently, then aggregate.
    pub fn present(&mut self) -> Result<ResultCard, LookupRejection> {
        let student = match &self.state {
            LookupState::Resolved { student } | LookupState::ResultPresented { student } => {
                student.clone()
            }
            _ => return Err(LookupRejection::NotVerified),
        };

        let class_number = student.class_number().unwrap_or(FALLBACK_CLASS_NUMBER);
        let (marks, subjects) = std::thread::scope(|scope| {
            let marks = scope.spawn(|| fetch_marks(self.marks.as_ref(), student.student_id));
            let subjects = scope.spawn(|| fetch_subjects(self.subjects.as_ref(), class_number));
            (
                marks.join().unwrap_or_default(),
                subjects.join().unwrap_or_default(),
            )
        });

        let arranged = arrange_for_class(marks, &subjects);
        let summary = self.aggregator.aggregate(&arranged);
        tracing::debug!(
            roll_no = %student.roll_no,
            status = %summary.status,
            subjects = summary.subjects.len(),
            "result presented"
        );

        let card = ResultCard::new(&student, summary, &self.normalizer);
        self.state = LookupState::ResultPresented { student };
        Ok(card)
    }

    /// Run the whole flow from the start.
    pub fn lookup(&mut self, roll_no: &str, dob: &str) -> Result<ResultCard, LookupRejection> {
        self.reset();
        self.submit_roll_number(roll_no)?;
        self.submit_date_of_birth(dob)?;
        self.present()
    }
}

fn fetch_marks<M: MarksSource + ?Sized>(source: &M, student_id: Option<u64>) -> Vec<SubjectMark> {
    let Some(student_id) = student_id else {
        return Vec::new();
    };
    source.fetch_marks(student_id).unwrap_or_else(|err| {
        degrade("marks", &err);
        Vec::new()
    })
}

fn fetch_subjects<S: SubjectSource + ?Sized>(source: &S, class_number: u32) -> Vec<ClassSubject> {
    source.fetch_subjects(class_number).unwrap_or_else(|err| {
        degrade("subjects", &err);
        Vec::new()
    })
}

fn degrade(source: &'static str, err: &SourceError) {
    tracing::warn!(source, error = %err, "presenting result without fetched data");
}
