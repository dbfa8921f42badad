//! Request descriptor
//!
//! A serializable snapshot of an inbound request: transport metadata, every
//! header with its values in arrival order, and the captured body.

use hyper::header::{HOST, REFERER, USER_AGENT};
use hyper::http::request::Parts;
use hyper::HeaderMap;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::net::SocketAddr;

use super::capture::CapturedBody;

#[derive(Debug, Clone, Serialize)]
pub struct RequestDescriptor {
    pub method: String,
    pub url: String,
    pub proto: String,
    pub host: String,
    pub remote_addr: String,
    pub request_uri: String,
    pub user_agent: String,
    pub referer: String,
    pub header: BTreeMap<String, Vec<String>>,
    #[serde(rename = "bodyText")]
    pub body_text: String,
    #[serde(rename = "bodyJson")]
    pub body_json: Map<String, Value>,
}

impl RequestDescriptor {
    pub fn new(parts: &Parts, remote_addr: SocketAddr, body: CapturedBody) -> Self {
        let uri = &parts.uri;
        let host = uri.authority().map_or_else(
            || header_value(&parts.headers, HOST),
            ToString::to_string,
        );
        let request_uri = uri
            .path_and_query()
            .map_or_else(|| "/".to_string(), ToString::to_string);

        Self {
            method: parts.method.to_string(),
            url: uri.to_string(),
            proto: format!("{:?}", parts.version),
            host,
            remote_addr: remote_addr.to_string(),
            request_uri,
            user_agent: header_value(&parts.headers, USER_AGENT),
            referer: header_value(&parts.headers, REFERER),
            header: header_lists(&parts.headers),
            body_text: body.text(),
            body_json: body.json,
        }
    }
}

/// First value of a header, or empty
fn header_value(headers: &HeaderMap, name: hyper::header::HeaderName) -> String {
    headers
        .get(name)
        .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
        .unwrap_or_default()
}

/// Group header values by name, keeping arrival order within each name
fn header_lists(headers: &HeaderMap) -> BTreeMap<String, Vec<String>> {
    let mut lists: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (name, value) in headers {
        lists
            .entry(name.as_str().to_string())
            .or_default()
            .push(String::from_utf8_lossy(value.as_bytes()).into_owned());
    }
    lists
}
