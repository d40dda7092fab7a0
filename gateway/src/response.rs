use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};

use report_worker::{
    report_job::{self, SubmissionError},
    searchad_interface, Error,
};

#[derive(Debug, PartialEq)]
pub enum ResponseError {
    /// All the required parameter names of the endpoint.
    MissingParameters(&'static [&'static str]),
    BadRequest(String),
    NotFound,
    /// Any failure of the worker, the gateway never crashes on one.
    Internal { error: String, details: Value },
}

impl IntoResponse for ResponseError {
    fn into_response(self) -> Response {
        match self {
            ResponseError::MissingParameters(required) => (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": "Missing required parameters",
                    "required": required,
                })),
            )
                .into_response(),
            ResponseError::BadRequest(error) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": error }))).into_response()
            }
            ResponseError::NotFound => {
                (StatusCode::NOT_FOUND, Json(json!({ "error": "Not found" }))).into_response()
            }
            ResponseError::Internal { error, details } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "success": false,
                    "error": error,
                    "details": details,
                })),
            )
                .into_response(),
        }
    }
}

/// The payload of the remote, when it rejected a request.
fn remote_details(error: &Error) -> Option<&Value> {
    match error {
        Error::SearchAdApi(searchad_interface::Error::Status { body, .. })
        | Error::SearchAdApi(searchad_interface::Error::Decode { body, .. })
        | Error::ReportJob(report_job::Error::Submission(SubmissionError::Rejected {
            body, ..
        }))
        | Error::ReportJob(report_job::Error::Submission(SubmissionError::Unparsable {
            body,
        }))
        | Error::ReportJob(report_job::Error::Submission(SubmissionError::MissingJobId {
            body,
        }))
        | Error::ReportJob(report_job::Error::PollRejected { body, .. }) => Some(body),
        _ => None,
    }
}

impl From<Error> for ResponseError {
    fn from(error: Error) -> Self {
        let details = remote_details(&error)
            .cloned()
            .unwrap_or_else(|| Value::String("Unknown error occurred".to_string()));

        ResponseError::Internal {
            error: error.to_string(),
            details,
        }
    }
}

impl From<searchad_interface::Error> for ResponseError {
    fn from(error: searchad_interface::Error) -> Self {
        Error::from(error).into()
    }
}

impl From<report_job::Error> for ResponseError {
    fn from(error: report_job::Error) -> Self {
        Error::from(error).into()
    }
}

/// `200 OK` with the JSON body.
pub fn success_response(body: Value) -> Response {
    (StatusCode::OK, Json(body)).into_response()
}
