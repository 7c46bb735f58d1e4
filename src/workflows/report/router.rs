use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Router,
};

use super::repository::{DraftResponseRepository, ReporterRepository, SurveyRepository};
use super::service::{ReportCommand, ReportCommandService};

/// Router exposing the SMS `report` command to gateway webhooks.
pub fn report_router<S, R, D>(service: Arc<ReportCommandService<S, R, D>>) -> Router
where
    S: SurveyRepository + 'static,
    R: ReporterRepository + 'static,
    D: DraftResponseRepository + 'static,
{
    Router::new()
        .route("/api/v1/sms/report", post(report_handler::<S, R, D>))
        .with_state(service)
}

pub(crate) async fn report_handler<S, R, D>(
    State(service): State<Arc<ReportCommandService<S, R, D>>>,
    axum::Json(command): axum::Json<ReportCommand>,
) -> Response
where
    S: SurveyRepository + 'static,
    R: ReporterRepository + 'static,
    D: DraftResponseRepository + 'static,
{
    let reply = service.handle(&command);
    let status = if reply.outcome.is_failure() {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    };

    (status, axum::Json(reply.view())).into_response()
}
