use super::common::*;

use crate::grading::ResultStatus;
use crate::lookup::{LookupRejection, ResultServiceError, SourceError};
use crate::records::SubjectMark;

#[test]
fn lookup_builds_a_result_card() {
    let (service, _) = build_service();
    let card = service.lookup("5a02", "12-08-2010").expect("card");
    assert_eq!(card.roll_no, "5A02");
    assert_eq!(card.dob, "12/08/2010");
    assert_eq!(card.summary.status, ResultStatus::Fail);
    assert_eq!(card.remark.as_deref(), Some("Poor"));
}

#[test]
fn lookup_rejections_are_wrapped() {
    let (service, _) = build_service();
    assert!(matches!(
        service.lookup("", "12/08/2010"),
        Err(ResultServiceError::Lookup(LookupRejection::MissingRollNumber))
    ));
}

#[test]
fn roll_number_suggestions_use_the_service_roster() {
    let (service, sources) = build_service();
    assert_eq!(
        service.suggest_roll_number("Class 5", None).expect("suggestion"),
        "5A03"
    );
    assert_eq!(sources.roster_calls(), 1);

    let supplied = vec![asha()];
    assert_eq!(
        service
            .suggest_roll_number("Class 5", Some(supplied.as_slice()))
            .expect("suggestion"),
        "5A03"
    );
    assert_eq!(
        service.suggest_roll_number("Class 9", Some(&[][..])).expect("suggestion"),
        "9A01"
    );
    assert_eq!(sources.roster_calls(), 1);
}

#[test]
fn blank_class_names_are_rejected() {
    let (service, _) = build_service();
    assert!(matches!(
        service.suggest_roll_number("  ", None),
        Err(ResultServiceError::MissingClassName)
    ));
}

#[test]
fn offline_roster_surfaces_for_suggestions() {
    let service = offline_service();
    assert!(matches!(
        service.suggest_roll_number("Class 5", None),
        Err(ResultServiceError::Source(SourceError::Unavailable(_)))
    ));
}

#[test]
fn ad_hoc_aggregation_honours_overrides() {
    let (service, _) = build_service();
    let marks = vec![SubjectMark::new("Maths", 30), SubjectMark::new("Science", 41)];

    assert_eq!(service.aggregate(&marks, None, None).status, ResultStatus::Fail);

    let relaxed = service.aggregate(&marks, Some(30), Some(2));
    assert_eq!(relaxed.status, ResultStatus::Pass);
    assert_eq!(relaxed.percentage_text(), "35.50");

    let clamped = service.aggregate(&marks, None, Some(9));
    assert_eq!(clamped.precision, 4);
}
