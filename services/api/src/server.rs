use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryRecordStore};
use crate::routes::with_result_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use srms::config::AppConfig;
use srms::error::AppError;
use srms::identity::DateNormalizer;
use srms::lookup::{CachedSource, ResultService};
use srms::records::RecordGuard;
use srms::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));

    let guard = RecordGuard::new(DateNormalizer::new(config.lookup.calendar_policy));
    let records = InMemoryRecordStore::new(args.records.load_book()?, guard);
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        records: records.clone(),
    };

    let students = records.student_count();
    let sources = Arc::new(CachedSource::new(records, config.lookup.fetch_attempts));
    let result_service = Arc::new(ResultService::new(
        sources.clone(),
        sources.clone(),
        sources,
        config.grading.clone(),
        &config.lookup,
    ));

    let app = with_result_routes(result_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, students, "student result service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
