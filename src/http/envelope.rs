//! Uniform `{error, details}` body used by every failure response.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use serde::{Deserialize, Serialize};

use super::response::json_response;

/// Response envelope for failures
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    /// Short message
    pub error: String,
    /// Underlying cause
    pub details: String,
}

impl ErrorEnvelope {
    pub fn new(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: details.into(),
        }
    }

    pub fn into_response(self, status: StatusCode) -> Response<Full<Bytes>> {
        json_response(status, &self)
    }
}
