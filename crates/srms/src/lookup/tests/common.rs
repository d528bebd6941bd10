use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::response::Response;
use serde_json::Value;

use crate::config::LookupConfig;
use crate::grading::{GradingConfig, ResultAggregator};
use crate::identity::DateNormalizer;
use crate::lookup::sources::{MarksSource, RosterSource, SourceError, SubjectSource};
use crate::lookup::{ResultLookupFlow, ResultService};
use crate::records::{ClassSubject, StudentRecord, SubjectMark};

pub(super) fn asha() -> StudentRecord {
    StudentRecord {
        student_id: Some(7),
        name: "Asha Verma".to_string(),
        email: "asha.verma@school.test".to_string(),
        class_name: "Class 5".to_string(),
        roll_no: "5A02".to_string(),
        dob: "12/08/2010".to_string(),
        phone: None,
    }
}

pub(super) fn roster() -> Vec<StudentRecord> {
    vec![
        StudentRecord {
            student_id: Some(6),
            name: "Kiran Das".to_string(),
            email: "kiran.das@school.test".to_string(),
            class_name: "Class 5".to_string(),
            roll_no: "5A01".to_string(),
            dob: "2010-03-14".to_string(),
            phone: None,
        },
        asha(),
        StudentRecord {
            student_id: None,
            name: "Unsynced Student".to_string(),
            email: "unsynced@school.test".to_string(),
            class_name: "Class 3".to_string(),
            roll_no: "3A01".to_string(),
            dob: "01/01/2013".to_string(),
            phone: None,
        },
    ]
}

#[derive(Default, Clone)]
pub(super) struct MemorySources {
    pub(super) students: Arc<Mutex<Vec<StudentRecord>>>,
    pub(super) marks: Arc<Mutex<HashMap<u64, Vec<SubjectMark>>>>,
    pub(super) subjects: Arc<Mutex<HashMap<u32, Vec<ClassSubject>>>>,
    pub(super) roster_calls: Arc<AtomicUsize>,
}

impl MemorySources {
    pub(super) fn seeded() -> Self {
        let sources = Self::default();
        *sources.students.lock().expect("roster mutex poisoned") = roster();
        sources.marks.lock().expect("marks mutex poisoned").insert(
            7,
            vec![
                SubjectMark::new("Science", 20).with_id(11).for_student(7),
                SubjectMark::new("Maths", 70).with_id(10).for_student(7),
            ],
        );
        sources.subjects.lock().expect("subjects mutex poisoned").insert(
            5,
            vec![ClassSubject::named("Maths"), ClassSubject::named("Science")],
        );
        sources
    }

    pub(super) fn roster_calls(&self) -> usize {
        self.roster_calls.load(Ordering::SeqCst)
    }
}

impl RosterSource for MemorySources {
    fn fetch_roster(&self) -> Result<Vec<StudentRecord>, SourceError> {
        self.roster_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.students.lock().expect("roster mutex poisoned").clone())
    }
}

impl MarksSource for MemorySources {
    fn fetch_marks(&self, student_id: u64) -> Result<Vec<SubjectMark>, SourceError> {
        Ok(self
            .marks
            .lock()
            .expect("marks mutex poisoned")
            .get(&student_id)
            .cloned()
            .unwrap_or_default())
    }
}

impl SubjectSource for MemorySources {
    fn fetch_subjects(&self, class_number: u32) -> Result<Vec<ClassSubject>, SourceError> {
        Ok(self
            .subjects
            .lock()
            .expect("subjects mutex poisoned")
            .get(&class_number)
            .cloned()
            .unwrap_or_default())
    }
}

pub(super) struct OfflineSources;

impl RosterSource for OfflineSources {
    fn fetch_roster(&self) -> Result<Vec<StudentRecord>, SourceError> {
        Err(SourceError::Unavailable("backend offline".to_string()))
    }
}

impl MarksSource for OfflineSources {
    fn fetch_marks(&self, _student_id: u64) -> Result<Vec<SubjectMark>, SourceError> {
        Err(SourceError::Timeout)
    }
}

impl SubjectSource for OfflineSources {
    fn fetch_subjects(&self, _class_number: u32) -> Result<Vec<ClassSubject>, SourceError> {
        Err(SourceError::Unavailable("backend offline".to_string()))
    }
}

pub(super) type MemoryFlow = ResultLookupFlow<MemorySources, MemorySources, MemorySources>;
pub(super) type MemoryService = ResultService<MemorySources, MemorySources, MemorySources>;

pub(super) fn flow_over(sources: &MemorySources) -> MemoryFlow {
    let shared = Arc::new(sources.clone());
    ResultLookupFlow::new(
        shared.clone(),
        shared.clone(),
        shared,
        DateNormalizer::default(),
        ResultAggregator::default(),
    )
}

pub(super) fn build_service() -> (MemoryService, MemorySources) {
    let sources = MemorySources::seeded();
    let shared = Arc::new(sources.clone());
    let service = ResultService::new(
        shared.clone(),
        shared.clone(),
        shared,
        GradingConfig::default(),
        &LookupConfig::default(),
    );
    (service, sources)
}

pub(super) fn offline_service() -> ResultService<OfflineSources, OfflineSources, OfflineSources> {
    let offline = Arc::new(OfflineSources);
    ResultService::new(
        offline.clone(),
        offline.clone(),
        offline,
        GradingConfig::default(),
        &LookupConfig::default(),
    )
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 4096)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
