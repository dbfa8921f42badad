//! Request body capture
//!
//! Reads a whole request body into memory and, when the request declares
//! `application/json`, parses it as a JSON object. Malformed JSON never fails
//! the request; it is reported inside the parsed mapping instead.

use http_body_util::combinators::UnsyncBoxBody;
use http_body_util::{BodyExt, Limited};
use hyper::body::{Body, Bytes};
use hyper::header::CONTENT_TYPE;
use hyper::HeaderMap;
use serde_json::{Map, Value};

use super::error::{BoxError, HandlerError};
use crate::logger;

const JSON_CONTENT_TYPE: &[u8] = b"application/json";

/// A fully read request body
#[derive(Debug, Clone)]
pub struct CapturedBody {
    pub raw: Bytes,
    /// Parsed JSON object; empty when the body is not declared as JSON
    pub json: Map<String, Value>,
}

impl CapturedBody {
    /// Classify an already read body according to the request headers
    pub fn new(headers: &HeaderMap, raw: Bytes) -> Self {
        let json = if declares_json(headers) {
            parse_json_object(&raw)
        } else {
            Map::new()
        };
        Self { raw, json }
    }

    /// Body as text, invalid UTF-8 replaced with U+FFFD
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.raw).into_owned()
    }
}

/// Erase the body type and apply the optional size cap
pub fn bounded_body<B>(body: B, max_body_size: Option<u64>) -> UnsyncBoxBody<Bytes, BoxError>
where
    B: Body<Data = Bytes> + Send + 'static,
    B::Error: Into<BoxError>,
{
    match max_body_size {
        Some(limit) => Limited::new(body, usize::try_from(limit).unwrap_or(usize::MAX))
            .boxed_unsync(),
        None => body.map_err(Into::<BoxError>::into).boxed_unsync(),
    }
}

/// Read the entire body into memory
pub async fn read_body<B>(body: B, max_body_size: Option<u64>) -> Result<Bytes, HandlerError>
where
    B: Body<Data = Bytes> + Send + 'static,
    B::Error: Into<BoxError>,
{
    bounded_body(body, max_body_size)
        .collect()
        .await
        .map(http_body_util::Collected::to_bytes)
        .map_err(HandlerError::from_body_error)
}

/// True only when the first `Content-Type` value is exactly `application/json`
fn declares_json(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .is_some_and(|value| value.as_bytes() == JSON_CONTENT_TYPE)
}

fn parse_json_object(raw: &[u8]) -> Map<String, Value> {
    match serde_json::from_slice::<Map<String, Value>>(raw) {
        Ok(object) => object,
        Err(e) => {
            logger::log_warning(&format!("Failed to decode JSON body: {e}"));
            let mut object = Map::new();
            object.insert(
                "error".to_string(),
                Value::String("Failed to decode JSON body".to_string()),
            );
            object.insert("details".to_string(), Value::String(e.to_string()));
            object
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::Full;
    use hyper::header::HeaderValue;

    fn json_headers(content_type: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
        headers
    }

    #[test]
    fn test_json_object_is_parsed() {
        let captured = CapturedBody::new(
            &json_headers("application/json"),
            Bytes::from_static(br#"{"a":1}"#),
        );
        assert_eq!(captured.text(), r#"{"a":1}"#);
        assert_eq!(Value::Object(captured.json), serde_json::json!({"a": 1}));
    }

    #[test]
    fn test_malformed_json_is_embedded_not_rejected() {
        let captured = CapturedBody::new(
            &json_headers("application/json"),
            Bytes::from_static(b"not json"),
        );
        assert_eq!(captured.json["error"], "Failed to decode JSON body");
        assert!(!captured.json["details"].as_str().unwrap().is_empty());
    }

    #[test]
    fn test_json_array_is_a_decode_failure() {
        let captured =
            CapturedBody::new(&json_headers("application/json"), Bytes::from_static(b"[1,2]"));
        assert!(captured.json.contains_key("error"));
        assert!(captured.json.contains_key("details"));
    }

    #[test]
    fn test_json_requires_exact_content_type() {
        let body = Bytes::from_static(br#"{"a":1}"#);
        let with_charset =
            CapturedBody::new(&json_headers("application/json; charset=utf-8"), body.clone());
        assert!(with_charset.json.is_empty());

        let no_header = CapturedBody::new(&HeaderMap::new(), body);
        assert!(no_header.json.is_empty());
    }

    #[test]
    fn test_invalid_utf8_text_is_lossy() {
        let captured = CapturedBody::new(&HeaderMap::new(), Bytes::from_static(&[b'a', 0xff]));
        assert_eq!(captured.text(), "a\u{fffd}");
        assert_eq!(&captured.raw[..], &[b'a', 0xff]);
    }

    #[tokio::test]
    async fn test_read_body_respects_limit() {
        let body = Full::new(Bytes::from_static(b"0123456789"));
        assert!(matches!(
            read_body(body, Some(4)).await,
            Err(HandlerError::BodyTooLarge)
        ));

        let body = Full::new(Bytes::from_static(b"0123456789"));
        assert_eq!(&read_body(body, None).await.unwrap()[..], b"0123456789");
    }
}
