use super::domain::{class_number, ClassSubject, RecordBook, StudentRecord, SubjectMark};
use super::envelope::{decode_list, EnvelopeError};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use std::io::Read;
use std::path::Path;

#[derive(Debug)]
pub enum ImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    Json(EnvelopeError),
    UnknownClass { row: usize, value: String },
}

impl std::fmt::Display for ImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImportError::Io(err) => write!(f, "failed to read record export: {}", err),
            ImportError::Csv(err) => write!(f, "invalid record CSV data: {}", err),
            ImportError::Json(err) => write!(f, "invalid record JSON data: {}", err),
            ImportError::UnknownClass { row, value } => write!(
                f,
                "row {}: '{}' does not name a class (expected 'Class N')",
                row, value
            ),
        }
    }
}

impl std::error::Error for ImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ImportError::Io(err) => Some(err),
            ImportError::Csv(err) => Some(err),
            ImportError::Json(err) => Some(err),
            ImportError::UnknownClass { .. } => None,
        }
    }
}

impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<EnvelopeError> for ImportError {
    fn from(err: EnvelopeError) -> Self {
        Self::Json(err)
    }
}

impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// Loads roster, marks and class subject exports into a [`RecordBook`].
pub struct RecordImporter;

impl RecordImporter {
    /// `.json` files are read as saved backend responses; anything else as CSV.
    pub fn students_from_path<P: AsRef<Path>>(path: P) -> Result<Vec<StudentRecord>, ImportError> {
        let path = path.as_ref();
        if is_json(path) {
            return json_from_path(path);
        }
        let file = std::fs::File::open(path)?;
        Self::students_from_reader(file)
    }

    pub fn students_from_reader<R: Read>(reader: R) -> Result<Vec<StudentRecord>, ImportError> {
        let mut students = Vec::new();
        for row in csv_reader(reader).deserialize::<StudentRow>() {
            let row = row?;
            students.push(StudentRecord {
                student_id: row.student_id,
                name: row.name,
                email: row.email,
                class_name: row.class_name,
                roll_no: row.roll_no,
                dob: row.dob.unwrap_or_default(),
                phone: row.phone,
            });
        }
        Ok(students)
    }

    pub fn marks_from_path<P: AsRef<Path>>(path: P) -> Result<Vec<SubjectMark>, ImportError> {
        let path = path.as_ref();
        if is_json(path) {
            return json_from_path(path);
        }
        let file = std::fs::File::open(path)?;
        Self::marks_from_reader(file)
    }

    /// Blank cells stay `None`; grading decides whether the row is usable.
    pub fn marks_from_reader<R: Read>(reader: R) -> Result<Vec<SubjectMark>, ImportError> {
        let mut marks = Vec::new();
        for row in csv_reader(reader).deserialize::<MarkRow>() {
            let row = row?;
            marks.push(SubjectMark {
                marks_id: row.marks_id,
                student_id: row.student_id,
                subject: row.subject,
                marks_obtained: row.marks_obtained,
                max_marks: row.max_marks,
                term: row.term,
                year: row.year,
            });
        }
        Ok(marks)
    }

    pub fn subjects_from_path<P: AsRef<Path>>(
        path: P,
    ) -> Result<std::collections::BTreeMap<u32, Vec<ClassSubject>>, ImportError> {
        let file = std::fs::File::open(path)?;
        Self::subjects_from_reader(file)
    }

    /// Row order within a class becomes the subject display order.
    pub fn subjects_from_reader<R: Read>(
        reader: R,
    ) -> Result<std::collections::BTreeMap<u32, Vec<ClassSubject>>, ImportError> {
        let mut by_class: std::collections::BTreeMap<u32, Vec<ClassSubject>> = Default::default();
        for (index, row) in csv_reader(reader).deserialize::<SubjectRow>().enumerate() {
            let row = row?;
            let class = parse_class_cell(&row.class).ok_or_else(|| ImportError::UnknownClass {
                row: index + 2,
                value: row.class.clone(),
            })?;
            by_class.entry(class).or_default().push(ClassSubject {
                subject_name: row.subject,
                code: row.code,
            });
        }
        Ok(by_class)
    }

    /// Any of the three paths may be omitted; the matching part of the book stays empty.
    pub fn book_from_paths(
        students: Option<&Path>,
        marks: Option<&Path>,
        subjects: Option<&Path>,
    ) -> Result<RecordBook, ImportError> {
        let mut book = RecordBook::default();
        if let Some(path) = students {
            book.students = Self::students_from_path(path)?;
        }
        if let Some(path) = marks {
            book.marks = Self::marks_from_path(path)?;
        }
        if let Some(path) = subjects {
            book.class_subjects = Self::subjects_from_path(path)?;
        }
        Ok(book)
    }
}

/// Backend list body, bare or wrapped in a `{success, data, message}` envelope.
pub fn json_from_reader<T: DeserializeOwned, R: Read>(
    mut reader: R,
) -> Result<Vec<T>, ImportError> {
    let mut body = Vec::new();
    reader.read_to_end(&mut body)?;
    Ok(decode_list(&body)?)
}

fn json_from_path<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, ImportError> {
    json_from_reader(std::fs::File::open(path)?)
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .is_some_and(|extension| extension.eq_ignore_ascii_case("json"))
}

fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader)
}

/// Accepts `5` or `Class 5`.
fn parse_class_cell(value: &str) -> Option<u32> {
    value.trim().parse().ok().or_else(|| class_number(value))
}

#[derive(Debug, Deserialize)]
struct StudentRow {
    #[serde(rename = "Student ID", default, deserialize_with = "optional_parsed")]
    student_id: Option<u64>,
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Email")]
    email: String,
    #[serde(rename = "Class")]
    class_name: String,
    #[serde(rename = "Roll No")]
    roll_no: String,
    #[serde(rename = "DOB", default, deserialize_with = "empty_string_as_none")]
    dob: Option<String>,
    #[serde(rename = "Phone", default, deserialize_with = "empty_string_as_none")]
    phone: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MarkRow {
    #[serde(rename = "Marks ID", default, deserialize_with = "optional_parsed")]
    marks_id: Option<u64>,
    #[serde(rename = "Student ID", default, deserialize_with = "optional_parsed")]
    student_id: Option<u64>,
    #[serde(rename = "Subject", default, deserialize_with = "empty_string_as_none")]
    subject: Option<String>,
    #[serde(
        rename = "Marks Obtained",
        default,
        deserialize_with = "optional_parsed"
    )]
    marks_obtained: Option<i64>,
    #[serde(rename = "Max Marks", default, deserialize_with = "optional_parsed")]
    max_marks: Option<u32>,
    #[serde(rename = "Term", default, deserialize_with = "empty_string_as_none")]
    term: Option<String>,
    #[serde(rename = "Year", default, deserialize_with = "optional_parsed")]
    year: Option<i32>,
}

#[derive(Debug, Deserialize)]
struct SubjectRow {
    #[serde(rename = "Class")]
    class: String,
    #[serde(rename = "Subject")]
    subject: String,
    #[serde(rename = "Code", default, deserialize_with = "empty_string_as_none")]
    code: Option<String>,
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

fn optional_parsed<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match empty_string_as_none(deserializer)? {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}
