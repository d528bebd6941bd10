use super::common::*;
use axum::extract::State;
use axum::http::StatusCode;
use serde_json::json;
use std::sync::Arc;
use tower::ServiceExt;

use crate::lookup::router::{lookup_handler, roll_number_handler, LookupRequest, RollNumberRequest};
use crate::lookup::result_router;

fn lookup_request(roll_no: &str, dob: &str) -> LookupRequest {
    LookupRequest {
        roll_no: roll_no.to_string(),
        dob: dob.to_string(),
    }
}

#[tokio::test]
async fn lookup_route_returns_the_result_card() {
    let (service, _) = build_service();
    let router = result_router(Arc::new(service));

    let response = router
        .oneshot(
            axum::http::Request::post("/api/v1/results/lookup")
                .header(axum::http::header::CONTENT_TYPE, "application/json")
                .body(axum::body::Body::from(
                    serde_json::to_vec(&json!({"rollNo": "5a02", "dob": "12-08-2010"})).unwrap(),
                ))
                .unwrap(),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["rollNo"], "5A02");
    assert_eq!(payload["summary"]["status"], "FAIL");
    assert_eq!(payload["summary"]["total"], 90);
    assert_eq!(payload["percentageText"], "45.00");
}

#[tokio::test]
async fn lookup_handler_maps_rejections_to_statuses() {
    let (service, _) = build_service();
    let service = Arc::new(service);

    let cases = [
        (lookup_request("", "12/08/2010"), StatusCode::BAD_REQUEST),
        (lookup_request("7B01", "12/08/2010"), StatusCode::NOT_FOUND),
        (
            lookup_request("5A02", "12.08.2010"),
            StatusCode::UNPROCESSABLE_ENTITY,
        ),
        (
            lookup_request("5A02", "01/01/2010"),
            StatusCode::UNPROCESSABLE_ENTITY,
        ),
    ];

    for (request, expected) in cases {
        let response = lookup_handler::<MemorySources, MemorySources, MemorySources>(
            State(service.clone()),
            axum::Json(request),
        )
        .await;
        assert_eq!(response.status(), expected);
        let payload = read_json_body(response).await;
        assert!(payload["error"].is_string());
        assert_eq!(payload["retryable"], false);
    }
}

#[tokio::test]
async fn lookup_handler_reports_unavailable_roster_as_retryable() {
    let service = Arc::new(offline_service());
    let response = lookup_handler::<OfflineSources, OfflineSources, OfflineSources>(
        State(service),
        axum::Json(lookup_request("5A02", "12/08/2010")),
    )
    .await;

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let payload = read_json_body(response).await;
    assert_eq!(payload["retryable"], true);
}

#[tokio::test]
async fn roll_number_route_suggests_from_supplied_roster() {
    let (service, _) = build_service();
    let router = result_router(Arc::new(service));

    let response = router
        .oneshot(
            axum::http::Request::post("/api/v1/students/roll-number")
                .header(axum::http::header::CONTENT_TYPE, "application/json")
                .body(axum::body::Body::from(
                    serde_json::to_vec(&json!({
                        "className": "Class 3",
                        "roster": [
                            {"name": "A", "email": "a@school.test", "className": "Class 3", "rollNo": "3A07"},
                            {"name": "B", "email": "b@school.test", "className": "Class 3", "rollNo": "3A03"}
                        ]
                    }))
                    .unwrap(),
                ))
                .unwrap(),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["rollNo"], "3A08");
    assert_eq!(payload["className"], "Class 3");
}

#[tokio::test]
async fn roll_number_handler_validates_and_reports_outages() {
    let (service, _) = build_service();
    let response = roll_number_handler::<MemorySources, MemorySources, MemorySources>(
        State(Arc::new(service)),
        axum::Json(RollNumberRequest {
            class_name: " ".to_string(),
            roster: None,
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = roll_number_handler::<OfflineSources, OfflineSources, OfflineSources>(
        State(Arc::new(offline_service())),
        axum::Json(RollNumberRequest {
            class_name: "Class 5".to_string(),
            roster: None,
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}
