//! Student, mark and class-subject records as read from the backend or CSV exports.

pub mod domain;
pub mod envelope;
pub mod import;
pub mod validation;

pub use domain::{
    class_number, ClassSubject, RecordBook, StudentRecord, SubjectMark, DEFAULT_MAX_MARKS,
};
pub use envelope::{decode_list, list_from_value, EnvelopeError};
pub use import::{json_from_reader, ImportError, RecordImporter};
pub use validation::{is_valid_email, MarkValidationError, RecordGuard, StudentValidationError};
