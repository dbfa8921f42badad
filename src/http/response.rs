//! HTTP response building module
//!
//! Builders for the responses the handlers emit, decoupled from handler logic.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use serde::Serialize;

/// Fallback body when a JSON body itself cannot be produced
const SERIALIZE_FAILURE_BODY: &str =
    r#"{"error":"Failed to convert to JSON","details":"internal serialization error"}"#;

/// Build 404 Not Found response
pub fn build_404_response() -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::NOT_FOUND)
        .header("Content-Type", "text/plain")
        .body(Full::new(Bytes::from("404 Not Found")))
        .unwrap_or_else(|e| {
            log_build_error("404", &e);
            Response::new(Full::new(Bytes::from("404 Not Found")))
        })
}

/// Build 200 `text/plain` response carrying the given bytes unchanged
pub fn build_text_response(body: Bytes) -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", "text/plain")
        .body(Full::new(body.clone()))
        .unwrap_or_else(|e| {
            log_build_error("200", &e);
            Response::new(Full::new(body))
        })
}

/// Serialize `body` and build an `application/json` response
///
/// Serialization failure degrades to a 500 carrying a fixed error envelope.
pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<Full<Bytes>> {
    match serde_json::to_vec(body) {
        Ok(json) => build_json_response(status, Bytes::from(json)),
        Err(e) => {
            crate::logger::log_error(&format!("Failed to serialize response: {e}"));
            build_json_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                Bytes::from_static(SERIALIZE_FAILURE_BODY.as_bytes()),
            )
        }
    }
}

/// Build an `application/json` response from already serialized bytes
pub fn build_json_response(status: StatusCode, json: Bytes) -> Response<Full<Bytes>> {
    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .body(Full::new(json))
        .unwrap_or_else(|e| {
            log_build_error(status.as_str(), &e);
            let mut response =
                Response::new(Full::new(Bytes::from_static(SERIALIZE_FAILURE_BODY.as_bytes())));
            *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
            response
        })
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    #[tokio::test]
    async fn test_text_response_keeps_bytes() {
        let payload = Bytes::from_static(&[0xff, 0x00, b'a']);
        let response = build_text_response(payload.clone());
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["content-type"], "text/plain");

        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(body, payload);
    }

    #[tokio::test]
    async fn test_json_response() {
        let response = json_response(StatusCode::CREATED, &serde_json::json!({"a": 1}));
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers()["content-type"], "application/json");

        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], br#"{"a":1}"#);
    }

    #[test]
    fn test_404_response() {
        let response = build_404_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.headers()["content-type"], "text/plain");
    }
}
