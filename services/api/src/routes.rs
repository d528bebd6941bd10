use crate::infra::AppState;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use srms::error::AppError;
use srms::grading::ResultSummary;
use srms::lookup::{result_router, MarksSource, ResultService, RosterSource, SubjectSource};
use srms::password::{PasswordStrength, PasswordStrengthEvaluator};
use srms::records::{StudentRecord, SubjectMark};
use std::sync::Arc;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct AggregateRequest {
    pub(crate) marks: Vec<SubjectMark>,
    pub(crate) pass_mark: Option<u32>,
    pub(crate) precision: Option<u8>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct PasswordStrengthRequest {
    pub(crate) password: String,
    pub(crate) email: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct PasswordStrengthResponse {
    #[serde(flatten)]
    pub(crate) strength: PasswordStrength,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) headline: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct NormalizeDateRequest {
    pub(crate) input: String,
}

pub(crate) fn with_result_routes<R, M, S>(service: Arc<ResultService<R, M, S>>) -> Router
where
    R: RosterSource + 'static,
    M: MarksSource + 'static,
    S: SubjectSource + 'static,
{
    let calculations = Router::new()
        .route(
            "/api/v1/results/aggregate",
            post(aggregate_endpoint::<R, M, S>),
        )
        .route(
            "/api/v1/dates/normalize",
            post(normalize_date_endpoint::<R, M, S>),
        )
        .with_state(Arc::clone(&service));

    result_router(service)
        .merge(calculations)
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/v1/password/strength", post(password_strength_endpoint))
        .route("/api/v1/students", post(register_student_endpoint))
        .route(
            "/api/v1/students/:student_id/marks",
            post(record_mark_endpoint),
        )
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn aggregate_endpoint<R, M, S>(
    State(service): State<Arc<ResultService<R, M, S>>>,
    Json(request): Json<AggregateRequest>,
) -> Json<ResultSummary>
where
    R: RosterSource + 'static,
    M: MarksSource + 'static,
    S: SubjectSource + 'static,
{
    Json(service.aggregate(&request.marks, request.pass_mark, request.precision))
}

pub(crate) async fn normalize_date_endpoint<R, M, S>(
    State(service): State<Arc<ResultService<R, M, S>>>,
    Json(request): Json<NormalizeDateRequest>,
) -> Response
where
    R: RosterSource + 'static,
    M: MarksSource + 'static,
    S: SubjectSource + 'static,
{
    match service.normalizer().normalize(&request.input) {
        Ok(date) => (
            StatusCode::OK,
            Json(json!({
                "canonical": date.canonical(),
                "display": date.display(),
            })),
        )
            .into_response(),
        Err(rejection) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "error": rejection.to_string() })),
        )
            .into_response(),
    }
}

pub(crate) async fn password_strength_endpoint(
    Json(request): Json<PasswordStrengthRequest>,
) -> Json<PasswordStrengthResponse> {
    let strength = PasswordStrengthEvaluator.evaluate(&request.password, &request.email);
    let headline = strength.headline().map(str::to_string);
    Json(PasswordStrengthResponse { strength, headline })
}

pub(crate) async fn register_student_endpoint(
    Extension(state): Extension<AppState>,
    Json(record): Json<StudentRecord>,
) -> Result<(StatusCode, Json<StudentRecord>), AppError> {
    let admitted = state.records.register_student(record)?;
    tracing::info!(roll_no = %admitted.roll_no, "student registered");
    Ok((StatusCode::CREATED, Json(admitted)))
}

pub(crate) async fn record_mark_endpoint(
    Extension(state): Extension<AppState>,
    Path(student_id): Path<u64>,
    Json(mark): Json<SubjectMark>,
) -> Result<Response, AppError> {
    match state.records.record_mark(student_id, mark)? {
        Some(admitted) => Ok((StatusCode::CREATED, Json(admitted)).into_response()),
        None => Ok((
            StatusCode::NOT_FOUND,
            Json(json!({ "error": format!("student {student_id} not found") })),
        )
            .into_response()),
    }
}
