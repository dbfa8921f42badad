//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: exact-path lookup in the route
//! table, dispatch to the endpoint handler, error conversion and access logging.

use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::header::{HeaderName, HeaderValue, REFERER, SERVER, USER_AGENT};
use hyper::{Request, Response};
use std::collections::HashMap;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use super::error::{BoxError, HandlerError};
use super::{echo, write};
use crate::config::AppState;
use crate::http;
use crate::logger::{self, AccessLogEntry};

/// Behaviours a path can be bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Echo,
    EchoDetails,
    Write,
}

/// Exact path to endpoint mapping, built once at startup
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: HashMap<String, Endpoint>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_route(mut self, path: &str, endpoint: Endpoint) -> Self {
        self.routes.insert(path.to_string(), endpoint);
        self
    }

    /// `/echo`, `/echo/details` and `/write`
    pub fn standard() -> Self {
        Self::new()
            .with_route("/echo", Endpoint::Echo)
            .with_route("/echo/details", Endpoint::EchoDetails)
            .with_route("/write", Endpoint::Write)
    }

    pub fn resolve(&self, path: &str) -> Option<Endpoint> {
        self.routes.get(path).copied()
    }

    /// Registered paths, sorted
    pub fn paths(&self) -> Vec<&str> {
        let mut paths: Vec<&str> = self.routes.keys().map(String::as_str).collect();
        paths.sort_unstable();
        paths
    }
}

/// Main entry point for HTTP request handling
///
/// Never fails: every handler error becomes an error response for this request only.
pub async fn handle_request<B>(
    req: Request<B>,
    remote_addr: SocketAddr,
    state: Arc<AppState>,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: Body<Data = Bytes> + Send + 'static,
    B::Error: Into<BoxError>,
{
    let started = Instant::now();
    let pending_entry = state
        .config
        .logging
        .access_log
        .then(|| access_entry(&req, remote_addr));

    let mut response = match state.routes.resolve(req.uri().path()) {
        Some(endpoint) => dispatch(endpoint, req, remote_addr, &state)
            .await
            .unwrap_or_else(|err| {
                log_handler_error(&err);
                err.into_response()
            }),
        None => http::build_404_response(),
    };

    match HeaderValue::from_str(&state.config.http.server_name) {
        Ok(server) => {
            response.headers_mut().insert(SERVER, server);
        }
        Err(e) => logger::log_warning(&format!("Invalid server_name header value: {e}")),
    }

    if let Some(mut entry) = pending_entry {
        entry.status = response.status().as_u16();
        entry.body_bytes = response.body().size_hint().exact().unwrap_or(0);
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

async fn dispatch<B>(
    endpoint: Endpoint,
    req: Request<B>,
    remote_addr: SocketAddr,
    state: &AppState,
) -> Result<Response<Full<Bytes>>, HandlerError>
where
    B: Body<Data = Bytes> + Send + 'static,
    B::Error: Into<BoxError>,
{
    match endpoint {
        Endpoint::Echo => echo::echo(req, state).await,
        Endpoint::EchoDetails => echo::echo_details(req, remote_addr, state).await,
        Endpoint::Write => write::write(req, state).await,
    }
}

fn access_entry<B>(req: &Request<B>, remote_addr: SocketAddr) -> AccessLogEntry {
    let header = |name: HeaderName| {
        req.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string)
    };

    let mut entry = AccessLogEntry::new(
        remote_addr.to_string(),
        req.method().to_string(),
        req.uri().to_string(),
        format!("{:?}", req.version()),
    );
    entry.referer = header(REFERER);
    entry.user_agent = header(USER_AGENT);
    entry
}

fn log_handler_error(err: &HandlerError) {
    let message = format!("{err}: {}", err.details());
    if err.status().is_server_error() {
        logger::log_error(&message);
    } else {
        logger::log_warning(&message);
    }
}
