use crate::cli::ServeArgs;
use crate::infra::{build_report_service, AppState};
use crate::routes::with_report_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use epi_sms::config::AppConfig;
use epi_sms::error::AppError;
use epi_sms::telemetry;
use epi_sms::workflows::report::ReportDirectory;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }
    if let Some(fixtures) = args.fixtures.take() {
        config.reporting.fixtures_path = Some(fixtures);
    }

    telemetry::init(&config.telemetry)?;

    let directory = match &config.reporting.fixtures_path {
        Some(path) => ReportDirectory::from_path(path)?,
        None => {
            warn!("no directory export configured; every sender will be asked to register");
            ReportDirectory::default()
        }
    };
    let surveys = directory.surveys.len();
    let reporters = directory.reporters.len();

    let messages = config.reporting.message_catalog()?;
    let intervals = config.reporting.interval_resolver();
    let report_service = Arc::new(build_report_service(directory, messages, intervals));

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let app = with_report_routes(report_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        surveys,
        reporters,
        utc_offset = %config.reporting.utc_offset,
        "sms report service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
