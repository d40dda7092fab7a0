//! `POST /api/get-campaigns`
use std::sync::Arc;

use axum::{
    body::Bytes,
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use chrono::{Datelike, Utc};
use primitives::{Period, ReportKind};
use report_worker::{JobResult, ReportJobs};
use serde_json::json;
use slog::info;

use crate::{
    request::{RequestBody, CREDENTIALS},
    response::{success_response, ResponseError},
    Application,
};

/// The current calendar month, used when the request has no `year` & `month`.
fn current_month() -> Result<Period, ResponseError> {
    let today = Utc::now().naive_utc().date();

    Period::month(today.year(), today.month())
        .map_err(|err| ResponseError::BadRequest(err.to_string()))
}

/// Runs a report job (a `Campaign` master report by default) and responds with its download url.
///
/// Request body: `customerId`, `apiKey`, `secretKey` and the optional `reportKind`,
/// `profile`, `year` & `month`.
pub async fn get_campaigns(
    Extension(app): Extension<Arc<Application>>,
    body: Bytes,
) -> Result<Response, ResponseError> {
    let request = RequestBody::parse(&body)?;
    request.require(CREDENTIALS)?;

    let kind = match request.string("reportKind") {
        Some(kind) => kind
            .parse::<ReportKind>()
            .map_err(|_| ResponseError::BadRequest(format!("Unknown report kind '{kind}'")))?,
        None => ReportKind::Campaign,
    };
    let profile = app
        .config
        .report_profile(request.string("profile"))
        .map_err(|err| ResponseError::BadRequest(err.to_string()))?;
    let period = match request.month("year", "month")? {
        Some(period) => period,
        None => current_month()?,
    };

    let api = app.api(request.credentials()?)?;
    info!(&app.logger, "Running report job"; "customer" => api.customer_id(), "kind" => %kind, "period" => %period);

    let jobs = ReportJobs::new(api, profile.clone(), &app.config.report_job);
    let result = jobs.run(kind, period).await?;

    Ok(job_result_response(result))
}

fn job_result_response(result: JobResult) -> Response {
    match result {
        JobResult::Success {
            job_id,
            download_url,
            status,
        } => success_response(json!({
            "success": true,
            "reportJobId": job_id,
            "downloadUrl": download_url,
            "status": status.raw,
        })),
        JobResult::Empty { status, .. } => success_response(json!({
            "success": false,
            "message": "No data available",
            "status": status.raw,
        })),
        JobResult::Failed { detail, .. } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "success": false,
                "error": "Report generation failed",
                "details": detail,
            })),
        )
            .into_response(),
        JobResult::TimedOut {
            last_status,
            attempts,
            ..
        } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "success": false,
                "error": "Timeout waiting for report",
                "attempts": attempts,
                "lastStatus": last_status.map(|status| status.raw),
            })),
        )
            .into_response(),
    }
}
