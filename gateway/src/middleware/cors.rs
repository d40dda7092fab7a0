use axum::{
    body::Body,
    http::{
        header::{
            HeaderValue, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
            ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_REQUEST_HEADERS, CONTENT_LENGTH, ORIGIN,
        },
        HeaderMap, Method, Request, StatusCode,
    },
    middleware::Next,
    response::{IntoResponse, Response},
};

const ALLOWED_METHODS: &str = "GET,HEAD,POST,OPTIONS";
const ALLOWED_ORIGINS: &str = "*";

fn allow_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static(ALLOWED_ORIGINS),
    );
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOWED_METHODS),
    );

    headers
}

/// Cross-Origin Resource Sharing middleware.
///
/// Allows all origins. A preflight `OPTIONS` request on any path is answered
/// right away with `200 OK` and an empty body, it never reaches the routes.
/// Otherwise the allow headers are added to the response when the request has an `Origin`.
pub async fn cors(request: Request<Body>, next: Next<Body>) -> Response {
    if request.method() == Method::OPTIONS {
        let mut headers = allow_headers();
        headers.insert(CONTENT_LENGTH, 0.into());
        // if the request has `ACCESS_CONTROL_REQUEST_HEADERS` it is required to set `ACCESS_CONTROL_ALLOW_HEADERS`
        if let Some(request_headers) = request.headers().get(ACCESS_CONTROL_REQUEST_HEADERS) {
            headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, request_headers.clone());
        }

        return (StatusCode::OK, headers).into_response();
    }

    let has_origin = request.headers().contains_key(ORIGIN);
    let mut response = next.run(request).await;

    if has_origin {
        response.headers_mut().extend(allow_headers());
    }

    response
}
