use super::domain::{StudentRecord, SubjectMark, DEFAULT_MAX_MARKS};
use crate::identity::{DateNormalizer, DateRejection};

/// Problems with a student record submitted from the admin form.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StudentValidationError {
    #[error("Student name is required")]
    MissingName,
    #[error("Email address is required")]
    MissingEmail,
    #[error("Invalid email format")]
    InvalidEmail,
    #[error("Class name is required")]
    MissingClassName,
    #[error("Roll number is required")]
    MissingRollNumber,
    #[error("Date of birth is required")]
    MissingDob,
    #[error("Date of birth is invalid: {0}")]
    InvalidDob(DateRejection),
    #[error("Email already exists")]
    DuplicateEmail,
    #[error("Roll number {roll_no} is already used in {class_name}")]
    DuplicateRollNumber { roll_no: String, class_name: String },
}

/// Problems with a mark entered by a teacher.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MarkValidationError {
    #[error("Subject is required")]
    MissingSubject,
    #[error("Marks obtained are required")]
    MissingMarks,
    #[error("Maximum marks must be greater than zero")]
    InvalidMaximum,
    #[error("Marks must be between 0 and {max_marks} (found {found})")]
    OutOfRange { found: i64, max_marks: u32 },
    #[error("Marks already added for {0}. Cannot add duplicate marks.")]
    DuplicateSubject(String),
}

/// Produces sanitized records for the backend, or the first problem found.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordGuard {
    normalizer: DateNormalizer,
}

impl RecordGuard {
    pub fn new(normalizer: DateNormalizer) -> Self {
        Self { normalizer }
    }

    /// Trim fields and rewrite the DOB to `DD/MM/YYYY`.
    ///
    /// A record without `student_id` is new: its email must not already be on the roster.
    pub fn admit_student(
        &self,
        record: StudentRecord,
        roster: &[StudentRecord],
    ) -> Result<StudentRecord, StudentValidationError> {
        let name = record.name.trim().to_string();
        if name.is_empty() {
            return Err(StudentValidationError::MissingName);
        }

        let email = record.email.trim().to_string();
        if email.is_empty() {
            return Err(StudentValidationError::MissingEmail);
        }
        if !is_valid_email(&email) {
            return Err(StudentValidationError::InvalidEmail);
        }

        let class_name = record.class_name.trim().to_string();
        if class_name.is_empty() {
            return Err(StudentValidationError::MissingClassName);
        }

        let roll_no = record.roll_no.trim().to_string();
        if roll_no.is_empty() {
            return Err(StudentValidationError::MissingRollNumber);
        }

        if record.dob.trim().is_empty() {
            return Err(StudentValidationError::MissingDob);
        }
        let dob = self
            .normalizer
            .normalize(&record.dob)
            .map_err(StudentValidationError::InvalidDob)?;

        let others = roster
            .iter()
            .filter(|existing| record.student_id.is_none() || existing.student_id != record.student_id);

        for existing in others {
            if record.student_id.is_none() && existing.email.trim().eq_ignore_ascii_case(&email) {
                return Err(StudentValidationError::DuplicateEmail);
            }
            if existing.class_name.trim() == class_name && existing.roll_matches(&roll_no) {
                return Err(StudentValidationError::DuplicateRollNumber {
                    roll_no,
                    class_name,
                });
            }
        }

        Ok(StudentRecord {
            student_id: record.student_id,
            name,
            email,
            class_name,
            roll_no,
            dob: dob.display(),
            phone: record
                .phone
                .map(|phone| phone.trim().to_string())
                .filter(|phone| !phone.is_empty()),
        })
    }

    /// Range-check a mark and reject a second mark for the same subject.
    ///
    /// `existing` holds the marks already recorded for the same student.
    pub fn admit_mark(
        &self,
        mark: SubjectMark,
        existing: &[SubjectMark],
    ) -> Result<SubjectMark, MarkValidationError> {
        let subject = mark
            .subject_name()
            .ok_or(MarkValidationError::MissingSubject)?
            .to_string();
        let obtained = mark.marks_obtained.ok_or(MarkValidationError::MissingMarks)?;
        let max_marks = mark.max_marks_or(DEFAULT_MAX_MARKS);
        if max_marks == 0 {
            return Err(MarkValidationError::InvalidMaximum);
        }
        if obtained < 0 || obtained > i64::from(max_marks) {
            return Err(MarkValidationError::OutOfRange {
                found: obtained,
                max_marks,
            });
        }

        let duplicate = existing
            .iter()
            .filter(|other| mark.marks_id.is_none() || other.marks_id != mark.marks_id)
            .any(|other| other.is_subject(&subject));
        if duplicate {
            return Err(MarkValidationError::DuplicateSubject(subject));
        }

        Ok(SubjectMark {
            subject: Some(subject),
            max_marks: Some(max_marks),
            ..mark
        })
    }
}

/// Mirrors the form rule `local@domain.tld` with no whitespace and one `@`.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}
