//! `/write` handler
//!
//! `POST /write?path=<dest>` stores the raw body at `<dest>`, or, for
//! `multipart/form-data`, every uploaded file under the `<dest>` directory.

use futures::TryStreamExt;
use http_body_util::{BodyStream, Full};
use hyper::body::{Body, Bytes};
use hyper::header::CONTENT_TYPE;
use hyper::{HeaderMap, Method, Request, Response, StatusCode, Uri};
use multer::Multipart;
use serde::Serialize;
use std::path::PathBuf;

use super::capture::{bounded_body, read_body};
use super::error::{BoxError, HandlerError};
use super::persist;
use crate::config::AppState;
use crate::http::{build_json_response, json_response};
use crate::logger;

const MULTIPART_FORM_DATA: &str = "multipart/form-data";

/// Reply to a raw-body write, byte-for-byte
const FILE_SAVED_BODY: &[u8] = br#"{"message": "File saved"}"#;

/// Success body of a multipart `/write`
#[derive(Debug, Serialize)]
struct WriteReport {
    message: &'static str,
    files: Vec<String>,
}

pub async fn write<B>(req: Request<B>, state: &AppState) -> Result<Response<Full<Bytes>>, HandlerError>
where
    B: Body<Data = Bytes> + Send + 'static,
    B::Error: Into<BoxError>,
{
    if req.method() != Method::POST {
        return Err(HandlerError::MethodNotAllowed(req.method().clone()));
    }

    let dest = destination_path(req.uri()).ok_or(HandlerError::MissingPath)?;
    let http_config = &state.config.http;

    match multipart_boundary(req.headers())? {
        Some(boundary) => {
            let frames = BodyStream::new(bounded_body(req.into_body(), http_config.max_body_size));
            let data = frames.try_filter_map(|frame| async move { Ok(frame.into_data().ok()) });
            let multipart = Multipart::new(data, boundary);

            let saved =
                persist::write_multipart(&dest, multipart, http_config.form_memory_limit).await?;
            let report = WriteReport {
                message: "Files saved",
                files: saved
                    .iter()
                    .map(|path| path.to_string_lossy().into_owned())
                    .collect(),
            };
            Ok(json_response(StatusCode::OK, &report))
        }
        None => {
            let body = read_body(req.into_body(), http_config.max_body_size).await?;
            logger::log_info(&format!("Received request with length: {}", body.len()));

            persist::write_raw(&dest, &body).await?;
            Ok(build_json_response(
                StatusCode::OK,
                Bytes::from_static(FILE_SAVED_BODY),
            ))
        }
    }
}

/// Decoded `path` query parameter; absent and empty are both missing
fn destination_path(uri: &Uri) -> Option<PathBuf> {
    let query = uri.query()?;
    form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == "path")
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

/// Boundary of a multipart form body, `None` for any other content type
fn multipart_boundary(headers: &HeaderMap) -> Result<Option<String>, HandlerError> {
    let Some(content_type) = headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok()) else {
        return Ok(None);
    };
    if !content_type.starts_with(MULTIPART_FORM_DATA) {
        return Ok(None);
    }
    multer::parse_boundary(content_type)
        .map(Some)
        .map_err(HandlerError::Multipart)
}
