use metrics_exporter_prometheus::PrometheusHandle;
use srms::lookup::{MarksSource, RosterSource, SourceError, SubjectSource};
use srms::records::{
    ClassSubject, MarkValidationError, RecordBook, RecordGuard, StudentRecord,
    StudentValidationError, SubjectMark,
};
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, RwLock};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) records: InMemoryRecordStore,
}

/// Record book shared between the HTTP handlers and the lookup service.
#[derive(Default, Clone)]
pub(crate) struct InMemoryRecordStore {
    book: Arc<RwLock<RecordBook>>,
    guard: RecordGuard,
}

impl InMemoryRecordStore {
    pub(crate) fn new(book: RecordBook, guard: RecordGuard) -> Self {
        Self {
            book: Arc::new(RwLock::new(book)),
            guard,
        }
    }

    pub(crate) fn student_count(&self) -> usize {
        self.book
            .read()
            .expect("record store lock poisoned")
            .students
            .len()
    }

    /// Validate and store a student. New students receive the next free id.
    pub(crate) fn register_student(
        &self,
        record: StudentRecord,
    ) -> Result<StudentRecord, StudentValidationError> {
        let mut book = self.book.write().expect("record store lock poisoned");
        let mut admitted = self.guard.admit_student(record, &book.students)?;

        match admitted.student_id {
            Some(id) => {
                if let Some(existing) = book
                    .students
                    .iter_mut()
                    .find(|student| student.student_id == Some(id))
                {
                    *existing = admitted.clone();
                    return Ok(admitted);
                }
            }
            None => {
                let next = book
                    .students
                    .iter()
                    .filter_map(|student| student.student_id)
                    .max()
                    .unwrap_or(0)
                    + 1;
                admitted.student_id = Some(next);
            }
        }

        book.students.push(admitted.clone());
        Ok(admitted)
    }

    /// `Ok(None)` when no student carries `student_id`. A supplied `marks_id` replaces
    /// only this student's mark; an id held by another student is reassigned.
    pub(crate) fn record_mark(
        &self,
        student_id: u64,
        mark: SubjectMark,
    ) -> Result<Option<SubjectMark>, MarkValidationError> {
        let mut book = self.book.write().expect("record store lock poisoned");
        if !book
            .students
            .iter()
            .any(|student| student.student_id == Some(student_id))
        {
            return Ok(None);
        }

        let existing = book.marks_for(student_id);
        let mut admitted = self.guard.admit_mark(mark.for_student(student_id), &existing)?;
        let owned_elsewhere = admitted.marks_id.is_some_and(|marks_id| {
            book.marks.iter().any(|other| {
                other.marks_id == Some(marks_id) && other.student_id != Some(student_id)
            })
        });
        if admitted.marks_id.is_none() || owned_elsewhere {
            let next = book
                .marks
                .iter()
                .filter_map(|mark| mark.marks_id)
                .max()
                .unwrap_or(0)
                + 1;
            admitted.marks_id = Some(next);
        }

        book.marks.retain(|mark| {
            mark.student_id != Some(student_id) || mark.marks_id != admitted.marks_id
        });
        book.marks.push(admitted.clone());
        Ok(Some(admitted))
    }
}

impl RosterSource for InMemoryRecordStore {
    fn fetch_roster(&self) -> Result<Vec<StudentRecord>, SourceError> {
        let book = self.book.read().expect("record store lock poisoned");
        book.fetch_roster()
    }
}

impl MarksSource for InMemoryRecordStore {
    fn fetch_marks(&self, student_id: u64) -> Result<Vec<SubjectMark>, SourceError> {
        let book = self.book.read().expect("record store lock poisoned");
        book.fetch_marks(student_id)
    }
}

impl SubjectSource for InMemoryRecordStore {
    fn fetch_subjects(&self, class_number: u32) -> Result<Vec<ClassSubject>, SourceError> {
        let book = self.book.read().expect("record store lock poisoned");
        book.fetch_subjects(class_number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo::seed_book;

    fn student(name: &str, email: &str, roll_no: &str) -> StudentRecord {
        StudentRecord {
            student_id: None,
            name: name.to_string(),
            email: email.to_string(),
            class_name: "Class 5".to_string(),
            roll_no: roll_no.to_string(),
            dob: "2011-04-09".to_string(),
            phone: Some("  ".to_string()),
        }
    }

    #[test]
    fn new_students_receive_the_next_id() {
        let store = InMemoryRecordStore::new(seed_book(), RecordGuard::default());
        let before = store.student_count();

        let admitted = store
            .register_student(student("Meera Iyer", "meera@school.test", "5A09"))
            .expect("valid student");

        assert_eq!(store.student_count(), before + 1);
        assert!(admitted.student_id.is_some());
        assert_eq!(admitted.dob, "09/04/2011");
        assert_eq!(admitted.phone, None);
        assert_eq!(store.fetch_roster().expect("roster").len(), before + 1);
    }

    #[test]
    fn duplicate_emails_are_rejected() {
        let store = InMemoryRecordStore::new(seed_book(), RecordGuard::default());
        let roster = store.fetch_roster().expect("roster");
        let taken = roster[0].email.to_uppercase();

        let error = store
            .register_student(student("Copy", &taken, "5A10"))
            .expect_err("duplicate email");
        assert_eq!(error, StudentValidationError::DuplicateEmail);
    }

    #[test]
    fn marks_attach_only_to_known_students() {
        let store = InMemoryRecordStore::new(seed_book(), RecordGuard::default());
        let admitted = store
            .register_student(student("Meera Iyer", "meera@school.test", "5A09"))
            .expect("valid student");
        let id = admitted.student_id.expect("assigned id");

        let mark = store
            .record_mark(id, SubjectMark::new("Maths", 64))
            .expect("valid mark")
            .expect("student exists");
        assert_eq!(mark.student_id, Some(id));
        assert_eq!(mark.max_marks, Some(100));
        assert!(mark.marks_id.is_some());

        assert!(matches!(
            store.record_mark(id, SubjectMark::new("maths", 70)),
            Err(MarkValidationError::DuplicateSubject(_))
        ));
        assert_eq!(
            store
                .record_mark(9_999, SubjectMark::new("Maths", 10))
                .expect("no validation reached"),
            None
        );
    }

    #[test]
    fn a_marks_id_owned_by_another_student_is_reassigned() {
        let store = InMemoryRecordStore::new(seed_book(), RecordGuard::default());
        let first = store
            .register_student(student("Meera Iyer", "meera@school.test", "5A09"))
            .expect("valid student")
            .student_id
            .expect("assigned id");
        let second = store
            .register_student(student("Nikhil Das", "nikhil@school.test", "5A10"))
            .expect("valid student")
            .student_id
            .expect("assigned id");

        let theirs = store
            .record_mark(second, SubjectMark::new("Maths", 90))
            .expect("valid mark")
            .expect("student exists");
        let taken_id = theirs.marks_id.expect("assigned marks id");

        let ours = store
            .record_mark(first, SubjectMark::new("Science", 40).with_id(taken_id))
            .expect("valid mark")
            .expect("student exists");

        assert_ne!(ours.marks_id, Some(taken_id));
        assert_eq!(store.fetch_marks(second).expect("marks"), vec![theirs]);
        assert_eq!(store.fetch_marks(first).expect("marks"), vec![ours]);
    }

    #[test]
    fn a_students_own_marks_id_updates_in_place() {
        let store = InMemoryRecordStore::new(seed_book(), RecordGuard::default());
        let id = store
            .register_student(student("Meera Iyer", "meera@school.test", "5A09"))
            .expect("valid student")
            .student_id
            .expect("assigned id");
        let first = store
            .record_mark(id, SubjectMark::new("Maths", 40))
            .expect("valid mark")
            .expect("student exists");
        let marks_id = first.marks_id.expect("assigned marks id");

        let updated = store
            .record_mark(id, SubjectMark::new("Maths", 75).with_id(marks_id))
            .expect("valid update")
            .expect("student exists");

        assert_eq!(updated.marks_id, Some(marks_id));
        let marks = store.fetch_marks(id).expect("marks");
        assert_eq!(marks.len(), 1);
        assert_eq!(marks[0].marks_obtained, Some(75));
    }
}
