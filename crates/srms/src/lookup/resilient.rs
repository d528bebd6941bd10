//! Retry-then-fallback wrapper around a record source.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Mutex;

use super::sources::{MarksSource, RosterSource, SourceError, SubjectSource};
use crate::records::{ClassSubject, StudentRecord, SubjectMark};

/// Retries retryable failures, then serves the last good snapshot for the same key.
///
/// The fallback favours availability: a stale snapshot may be served without notice
/// beyond a `warn` event.
pub struct CachedSource<S> {
    inner: S,
    attempts: u32,
    roster: Snapshots<(), Vec<StudentRecord>>,
    marks: Snapshots<u64, Vec<SubjectMark>>,
    subjects: Snapshots<u32, Vec<ClassSubject>>,
}

impl<S> CachedSource<S> {
    pub fn new(inner: S, attempts: u32) -> Self {
        Self {
            inner,
            attempts: attempts.max(1),
            roster: Snapshots::default(),
            marks: Snapshots::default(),
            subjects: Snapshots::default(),
        }
    }

    /// Seed the roster snapshot, e.g. from an earlier session's export.
    pub fn prime_roster(&self, roster: Vec<StudentRecord>) {
        self.roster.store((), roster);
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    fn attempt<T>(
        &self,
        source: &'static str,
        fetch: impl Fn() -> Result<T, SourceError>,
    ) -> Result<T, SourceError> {
        let mut attempt = 1;
        loop {
            match fetch() {
                Ok(value) => return Ok(value),
                Err(err) if err.is_retryable() && attempt < self.attempts => {
                    tracing::debug!(source, attempt, error = %err, "retrying record fetch");
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

impl<S: RosterSource> RosterSource for CachedSource<S> {
    fn fetch_roster(&self) -> Result<Vec<StudentRecord>, SourceError> {
        let fresh = self.attempt("roster", || self.inner.fetch_roster());
        self.roster.resolve("roster", (), fresh)
    }
}

impl<S: MarksSource> MarksSource for CachedSource<S> {
    fn fetch_marks(&self, student_id: u64) -> Result<Vec<SubjectMark>, SourceError> {
        let fresh = self.attempt("marks", || self.inner.fetch_marks(student_id));
        self.marks.resolve("marks", student_id, fresh)
    }
}

impl<S: SubjectSource> SubjectSource for CachedSource<S> {
    fn fetch_subjects(&self, class_number: u32) -> Result<Vec<ClassSubject>, SourceError> {
        let fresh = self.attempt("subjects", || self.inner.fetch_subjects(class_number));
        self.subjects.resolve("subjects", class_number, fresh)
    }
}

struct Snapshots<K, T> {
    entries: Mutex<HashMap<K, T>>,
}

impl<K, T> Default for Snapshots<K, T> {
    fn default() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }
}

impl<K: Eq + Hash, T: Clone> Snapshots<K, T> {
    fn store(&self, key: K, value: T) {
        self.entries
            .lock()
            .expect("lock poisoned")
            .insert(key, value);
    }

    fn resolve(
        &self,
        source: &'static str,
        key: K,
        fresh: Result<T, SourceError>,
    ) -> Result<T, SourceError> {
        match fresh {
            Ok(value) => {
                self.store(key, value.clone());
                Ok(value)
            }
            Err(err) => {
                let cached = self
                    .entries
                    .lock()
                    .expect("lock poisoned")
                    .get(&key)
                    .cloned();
                match cached {
                    Some(value) => {
                        tracing::warn!(source, error = %err, "serving cached snapshot");
                        Ok(value)
                    }
                    None => Err(err),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Fails `failures` times with the given error, then succeeds.
    struct Flaky {
        failures: AtomicU32,
        error: SourceError,
        calls: AtomicU32,
    }

    impl Flaky {
        fn new(failures: u32, error: SourceError) -> Self {
            Self {
                failures: AtomicU32::new(failures),
                error,
                calls: AtomicU32::new(0),
            }
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }

        fn fail_next(&self, count: u32) {
            self.failures.store(count, Ordering::SeqCst);
        }
    }

    impl RosterSource for Flaky {
        fn fetch_roster(&self) -> Result<Vec<StudentRecord>, SourceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let remaining = self.failures.load(Ordering::SeqCst);
            if remaining > 0 {
                self.failures.store(remaining - 1, Ordering::SeqCst);
                return Err(self.error.clone());
            }
            Ok(vec![StudentRecord {
                student_id: Some(1),
                name: "Riya".to_string(),
                email: "riya@school.test".to_string(),
                class_name: "Class 2".to_string(),
                roll_no: "2A01".to_string(),
                dob: "02/02/2016".to_string(),
                phone: None,
            }])
        }
    }

    impl MarksSource for Flaky {
        fn fetch_marks(&self, student_id: u64) -> Result<Vec<SubjectMark>, SourceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let remaining = self.failures.load(Ordering::SeqCst);
            if remaining > 0 {
                self.failures.store(remaining - 1, Ordering::SeqCst);
                return Err(self.error.clone());
            }
            Ok(vec![SubjectMark::new("Maths", 60).for_student(student_id)])
        }
    }

    #[test]
    fn transient_failures_are_retried_within_the_budget() {
        let source = CachedSource::new(Flaky::new(2, SourceError::Timeout), 3);
        let roster = source.fetch_roster().expect("third attempt succeeds");
        assert_eq!(roster.len(), 1);
        assert_eq!(source.inner().calls(), 3);
    }

    #[test]
    fn exhausted_retries_without_a_snapshot_surface_the_error() {
        let source = CachedSource::new(
            Flaky::new(5, SourceError::Unavailable("offline".to_string())),
            2,
        );
        assert_eq!(
            source.fetch_roster(),
            Err(SourceError::Unavailable("offline".to_string()))
        );
        assert_eq!(source.inner().calls(), 2);
    }

    #[test]
    fn non_retryable_failures_are_not_repeated() {
        let source = CachedSource::new(
            Flaky::new(1, SourceError::Malformed("bad body".to_string())),
            3,
        );
        assert!(source.fetch_roster().is_err());
        assert_eq!(source.inner().calls(), 1);
    }

    #[test]
    fn last_good_snapshot_is_served_after_failures() {
        let source = CachedSource::new(Flaky::new(0, SourceError::Timeout), 2);
        source.fetch_roster().expect("fresh roster");

        source.inner().fail_next(10);
        let roster = source.fetch_roster().expect("cached roster");
        assert_eq!(roster[0].roll_no, "2A01");
    }

    #[test]
    fn primed_rosters_cover_a_cold_start() {
        let source = CachedSource::new(Flaky::new(10, SourceError::Timeout), 1);
        source.prime_roster(Vec::new());
        assert_eq!(source.fetch_roster(), Ok(Vec::new()));
    }

    #[test]
    fn snapshots_are_kept_per_key() {
        let source = CachedSource::new(Flaky::new(0, SourceError::Timeout), 1);
        source.fetch_marks(4).expect("fresh marks");

        source.inner().fail_next(10);
        assert!(source.fetch_marks(4).is_ok());
        assert_eq!(source.fetch_marks(5), Err(SourceError::Timeout));
    }

    #[test]
    fn zero_attempts_still_tries_once() {
        let source = CachedSource::new(Flaky::new(0, SourceError::Timeout), 0);
        assert!(source.fetch_roster().is_ok());
        assert_eq!(source.inner().calls(), 1);
    }
}
