//! Per-request failures and their mapping onto HTTP responses.

use http_body_util::{Full, LengthLimitError};
use hyper::body::Bytes;
use hyper::header::{HeaderValue, ALLOW};
use hyper::{Method, Response, StatusCode};
use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::http::ErrorEnvelope;

/// Boxed transport-level error
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Everything that can end a request early
///
/// The `Display` text is the envelope's `error` field; [`HandlerError::details`]
/// supplies its `details` field.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("Invalid request method")]
    MethodNotAllowed(Method),

    #[error("Missing 'path' query parameter")]
    MissingPath,

    #[error("Failed to read request body")]
    BodyRead(#[source] BoxError),

    #[error("Request body too large")]
    BodyTooLarge,

    #[error("Failed to parse multipart form")]
    Multipart(#[source] multer::Error),

    #[error("Multipart form values too large")]
    FormTooLarge { limit: usize },

    #[error("Invalid uploaded file name")]
    InvalidFileName(String),

    #[error("Destination path is a directory")]
    DestinationIsDirectory(PathBuf),

    #[error("Failed to create file")]
    CreateFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write to file")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to convert to JSON")]
    Serialize(#[source] serde_json::Error),
}

impl HandlerError {
    /// Classify a body error, separating an exceeded `max_body_size` from I/O failures
    pub fn from_body_error(err: BoxError) -> Self {
        if err.is::<LengthLimitError>() {
            Self::BodyTooLarge
        } else {
            Self::BodyRead(err)
        }
    }

    pub const fn status(&self) -> StatusCode {
        match self {
            Self::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            Self::MissingPath
            | Self::Multipart(_)
            | Self::InvalidFileName(_)
            | Self::DestinationIsDirectory(_) => StatusCode::BAD_REQUEST,
            Self::BodyTooLarge | Self::FormTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::BodyRead(_)
            | Self::CreateFile { .. }
            | Self::WriteFile { .. }
            | Self::Serialize(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Underlying cause, as free text
    pub fn details(&self) -> String {
        match self {
            Self::MethodNotAllowed(method) => format!("{method} is not allowed, use POST"),
            Self::MissingPath => "expected /write?path=<destination>".to_string(),
            Self::BodyRead(err) => err.to_string(),
            Self::BodyTooLarge => "request body exceeds the configured max_body_size".to_string(),
            Self::Multipart(err) => err.to_string(),
            Self::FormTooLarge { limit } => {
                format!("non-file form values exceed {limit} bytes")
            }
            Self::InvalidFileName(name) => {
                format!("'{name}' has no usable file name component")
            }
            Self::DestinationIsDirectory(path) => {
                format!("{} is an existing directory", path.display())
            }
            Self::CreateFile { path, source } | Self::WriteFile { path, source } => {
                format!("{}: {source}", path.display())
            }
            Self::Serialize(err) => err.to_string(),
        }
    }

    pub fn into_response(self) -> Response<Full<Bytes>> {
        let status = self.status();
        let method_not_allowed = matches!(self, Self::MethodNotAllowed(_));
        let mut response = ErrorEnvelope::new(self.to_string(), self.details()).into_response(status);
        if method_not_allowed {
            response
                .headers_mut()
                .insert(ALLOW, HeaderValue::from_static("POST"));
        }
        response
    }
}

impl From<multer::Error> for HandlerError {
    fn from(err: multer::Error) -> Self {
        match err {
            multer::Error::StreamReadFailed(source) => Self::from_body_error(source),
            other => Self::Multipart(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors_are_4xx() {
        assert_eq!(
            HandlerError::MethodNotAllowed(Method::GET).status(),
            StatusCode::METHOD_NOT_ALLOWED
        );
        assert_eq!(HandlerError::MissingPath.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            HandlerError::DestinationIsDirectory(PathBuf::from("/tmp")).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_persistence_errors_are_500() {
        let err = HandlerError::CreateFile {
            path: PathBuf::from("/missing/dir/f.txt"),
            source: io::Error::from(io::ErrorKind::NotFound),
        };
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "Failed to create file");
        assert!(err.details().starts_with("/missing/dir/f.txt: "));
    }

    #[tokio::test]
    async fn test_length_limit_is_payload_too_large() {
        use http_body_util::{BodyExt, Limited};

        let limited = Limited::new(Full::new(Bytes::from_static(b"hello")), 2);
        let err = limited.collect().await.unwrap_err();
        assert!(matches!(
            HandlerError::from_body_error(err),
            HandlerError::BodyTooLarge
        ));

        let err: BoxError = Box::new(io::Error::from(io::ErrorKind::ConnectionReset));
        assert!(matches!(
            HandlerError::from_body_error(err),
            HandlerError::BodyRead(_)
        ));
    }

    #[test]
    fn test_405_carries_allow_header() {
        let response = HandlerError::MethodNotAllowed(Method::GET).into_response();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()["allow"], "POST");
        assert_eq!(response.headers()["content-type"], "application/json");
    }
}
