//! `/echo` and `/echo/details` handlers

use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::{Request, Response, StatusCode};
use std::net::SocketAddr;

use super::capture::{read_body, CapturedBody};
use super::descriptor::RequestDescriptor;
use super::error::{BoxError, HandlerError};
use crate::config::AppState;
use crate::http;

/// Return the request body unchanged as `text/plain`
pub async fn echo<B>(req: Request<B>, state: &AppState) -> Result<Response<Full<Bytes>>, HandlerError>
where
    B: Body<Data = Bytes> + Send + 'static,
    B::Error: Into<BoxError>,
{
    let body = read_body(req.into_body(), state.config.http.max_body_size).await?;
    Ok(http::build_text_response(body))
}

/// Return a JSON description of the whole request
pub async fn echo_details<B>(
    req: Request<B>,
    remote_addr: SocketAddr,
    state: &AppState,
) -> Result<Response<Full<Bytes>>, HandlerError>
where
    B: Body<Data = Bytes> + Send + 'static,
    B::Error: Into<BoxError>,
{
    let (parts, body) = req.into_parts();
    let raw = read_body(body, state.config.http.max_body_size).await?;
    let captured = CapturedBody::new(&parts.headers, raw);
    let descriptor = RequestDescriptor::new(&parts, remote_addr, captured);

    let json = serde_json::to_vec(&descriptor).map_err(HandlerError::Serialize)?;
    Ok(http::build_json_response(StatusCode::OK, Bytes::from(json)))
}
