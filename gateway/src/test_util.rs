use std::sync::Arc;

use axum::{body::BoxBody, http::Request, response::Response, Router};
use primitives::test_util::{discard_logger, test_config};
use serde_json::Value;
use wiremock::MockServer;

use crate::{router, Application};

/// Extracts the body as a String from the Response.
pub async fn body_to_string(response: Response<BoxBody>) -> String {
    let bytes = hyper::body::to_bytes(response.into_body())
        .await
        .expect("Should read the body");

    String::from_utf8(bytes.to_vec()).expect("Body should be UTF-8")
}

pub async fn body_to_json(response: Response<BoxBody>) -> Value {
    serde_json::from_str(&body_to_string(response).await).expect("Body should be JSON")
}

/// The gateway routes talking to the mock Search Ad API.
pub fn setup_router(server: &MockServer) -> Router {
    let app = Application::new(test_config(&server.uri()), discard_logger());

    router(Arc::new(app))
}

pub fn json_request(uri: &str, body: &Value) -> Request<axum::body::Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(axum::body::Body::from(body.to_string()))
        .expect("Valid request")
}
