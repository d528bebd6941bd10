use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::envelope::lenient;

/// Maximum marks assumed for a subject when the backend omits it.
pub const DEFAULT_MAX_MARKS: u32 = 100;

/// A student as held in the roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentRecord {
    #[serde(
        default,
        deserialize_with = "lenient::optional_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub student_id: Option<u64>,
    pub name: String,
    pub email: String,
    pub class_name: String,
    pub roll_no: String,
    #[serde(default)]
    pub dob: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl StudentRecord {
    /// Class number parsed from `class_name`, if it follows the `Class {N}` pattern.
    pub fn class_number(&self) -> Option<u32> {
        class_number(&self.class_name)
    }

    pub fn roll_matches(&self, roll_no: &str) -> bool {
        let candidate = roll_no.trim();
        !candidate.is_empty() && self.roll_no.trim().eq_ignore_ascii_case(candidate)
    }
}

/// One subject's marks for one student.
///
/// Every field is optional on the wire; `grading` decides which entries are usable.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectMark {
    #[serde(
        default,
        deserialize_with = "lenient::optional_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub marks_id: Option<u64>,
    #[serde(
        default,
        deserialize_with = "lenient::optional_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub student_id: Option<u64>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default, deserialize_with = "lenient::optional_number")]
    pub marks_obtained: Option<i64>,
    #[serde(
        default,
        deserialize_with = "lenient::optional_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub max_marks: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub term: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::optional_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub year: Option<i32>,
}

impl SubjectMark {
    pub fn new(subject: impl Into<String>, marks_obtained: i64) -> Self {
        Self {
            subject: Some(subject.into()),
            marks_obtained: Some(marks_obtained),
            ..Self::default()
        }
    }

    pub fn out_of(mut self, max_marks: u32) -> Self {
        self.max_marks = Some(max_marks);
        self
    }

    pub fn with_id(mut self, marks_id: u64) -> Self {
        self.marks_id = Some(marks_id);
        self
    }

    pub fn for_student(mut self, student_id: u64) -> Self {
        self.student_id = Some(student_id);
        self
    }

    /// Trimmed subject name, `None` when blank.
    pub fn subject_name(&self) -> Option<&str> {
        self.subject
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }

    pub fn max_marks_or(&self, default: u32) -> u32 {
        self.max_marks.unwrap_or(default)
    }

    pub fn is_subject(&self, name: &str) -> bool {
        self.subject_name()
            .is_some_and(|subject| subject.eq_ignore_ascii_case(name.trim()))
    }
}

/// An entry of a class's subject list. List order is the display order of a result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassSubject {
    pub subject_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl ClassSubject {
    pub fn named(subject_name: impl Into<String>) -> Self {
        Self {
            subject_name: subject_name.into(),
            code: None,
        }
    }
}

/// A snapshot of everything the core reads from the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordBook {
    pub students: Vec<StudentRecord>,
    pub marks: Vec<SubjectMark>,
    pub class_subjects: BTreeMap<u32, Vec<ClassSubject>>,
}

impl RecordBook {
    pub fn marks_for(&self, student_id: u64) -> Vec<SubjectMark> {
        self.marks
            .iter()
            .filter(|mark| mark.student_id == Some(student_id))
            .cloned()
            .collect()
    }

    pub fn subjects_for(&self, class_number: u32) -> Vec<ClassSubject> {
        self.class_subjects
            .get(&class_number)
            .cloned()
            .unwrap_or_default()
    }
}

/// `"Class 5"` and `"Class 5 - A"` both yield `5`.
pub fn class_number(class_name: &str) -> Option<u32> {
    let trimmed = class_name.trim();
    let keyword = trimmed.get(..5)?;
    if !keyword.eq_ignore_ascii_case("class") {
        return None;
    }

    let rest = trimmed[5..].trim_start();
    let digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
    digits.parse().ok()
}
