use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::flow::LookupRejection;
use super::service::{ResultService, ResultServiceError};
use super::sources::{MarksSource, RosterSource, SubjectSource};
use crate::records::StudentRecord;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LookupRequest {
    pub roll_no: String,
    pub dob: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RollNumberRequest {
    pub class_name: String,
    pub roster: Option<Vec<StudentRecord>>,
}

/// Router builder exposing result lookup and roll-number suggestion.
pub fn result_router<R, M, S>(service: Arc<ResultService<R, M, S>>) -> Router
where
    R: RosterSource + 'static,
    M: MarksSource + 'static,
    S: SubjectSource + 'static,
{
    Router::new()
        .route("/api/v1/results/lookup", post(lookup_handler::<R, M, S>))
        .route(
            "/api/v1/students/roll-number",
            post(roll_number_handler::<R, M, S>),
        )
        .with_state(service)
}

pub(crate) async fn lookup_handler<R, M, S>(
    State(service): State<Arc<ResultService<R, M, S>>>,
    axum::Json(request): axum::Json<LookupRequest>,
) -> Response
where
    R: RosterSource + 'static,
    M: MarksSource + 'static,
    S: SubjectSource + 'static,
{
    let outcome =
        tokio::task::spawn_blocking(move || service.lookup(&request.roll_no, &request.dob)).await;

    match outcome {
        Ok(Ok(card)) => (StatusCode::OK, axum::Json(card)).into_response(),
        Ok(Err(ResultServiceError::Lookup(rejection))) => {
            let payload = json!({
                "error": rejection.message(),
                "retryable": rejection.is_retryable(),
            });
            (rejection_status(&rejection), axum::Json(payload)).into_response()
        }
        Ok(Err(other)) => {
            let payload = json!({
                "error": other.to_string(),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
        Err(join_error) => {
            let payload = json!({
                "error": join_error.to_string(),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn roll_number_handler<R, M, S>(
    State(service): State<Arc<ResultService<R, M, S>>>,
    axum::Json(request): axum::Json<RollNumberRequest>,
) -> Response
where
    R: RosterSource + 'static,
    M: MarksSource + 'static,
    S: SubjectSource + 'static,
{
    match service.suggest_roll_number(&request.class_name, request.roster.as_deref()) {
        Ok(roll_no) => (
            StatusCode::OK,
            axum::Json(json!({
                "className": request.class_name.trim(),
                "rollNo": roll_no,
            })),
        )
            .into_response(),
        Err(ResultServiceError::MissingClassName) => {
            let payload = json!({
                "error": ResultServiceError::MissingClassName.to_string(),
            });
            (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response()
        }
        Err(ResultServiceError::Source(error)) => {
            let payload = json!({
                "error": error.to_string(),
                "retryable": error.is_retryable(),
            });
            (StatusCode::SERVICE_UNAVAILABLE, axum::Json(payload)).into_response()
        }
        Err(other) => {
            let payload = json!({
                "error": other.to_string(),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

fn rejection_status(rejection: &LookupRejection) -> StatusCode {
    match rejection {
        LookupRejection::MissingRollNumber
        | LookupRejection::MissingDateOfBirth
        | LookupRejection::RollNumberRequired
        | LookupRejection::NotVerified => StatusCode::BAD_REQUEST,
        LookupRejection::RollNumberNotFound { .. } => StatusCode::NOT_FOUND,
        LookupRejection::DobFormatIncorrect | LookupRejection::DobIncorrect => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        LookupRejection::RosterUnavailable => StatusCode::SERVICE_UNAVAILABLE,
    }
}
