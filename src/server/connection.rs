// Connection handling module
// Serves each accepted TCP connection on its own task

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use hyper_util::server::graceful::GracefulShutdown;
use std::net::SocketAddr;
use std::sync::Arc;

use crate::config::AppState;
use crate::handler;
use crate::logger;

/// Handle a single connection in a spawned task.
///
/// This function:
/// 1. Wraps the TCP stream in `TokioIo`
/// 2. Configures HTTP/1.1 keep-alive
/// 3. Serves every request on the connection with the request handler
/// 4. Registers the connection with `graceful`, so shutdown lets the
///    request in flight complete before the connection closes
///
/// # Arguments
///
/// * `stream` - The TCP stream to handle
/// * `peer_addr` - The peer's socket address, reported as `remote_addr`
/// * `state` - Shared application state
/// * `graceful` - Tracks open connections for shutdown
pub fn handle_connection(
    stream: tokio::net::TcpStream,
    peer_addr: SocketAddr,
    state: Arc<AppState>,
    graceful: &GracefulShutdown,
) {
    let io = TokioIo::new(stream);

    let mut builder = http1::Builder::new();
    builder.keep_alive(state.config.performance.keep_alive);

    let conn = builder.serve_connection(
        io,
        service_fn(move |req| handler::handle_request(req, peer_addr, Arc::clone(&state))),
    );
    let conn = graceful.watch(conn);

    tokio::spawn(async move {
        if let Err(err) = conn.await {
            logger::log_connection_error(&err);
        }
    });
}
