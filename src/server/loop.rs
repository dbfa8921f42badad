// Server loop module
// Accepts connections until the shutdown future resolves

use std::future::Future;
use hyper_util::server::graceful::GracefulShutdown;
use std::sync::Arc;
use tokio::net::TcpListener;

use super::connection::handle_connection;
use crate::config::AppState;
use crate::logger;

/// Accept connections and hand each one to its own task.
///
/// Once `shutdown` completes, no new connections are accepted and idle
/// keep-alive connections are closed. Requests already in flight are
/// answered first; the function returns when the last connection is gone.
pub async fn run_server_loop<F>(listener: TcpListener, state: Arc<AppState>, shutdown: F)
where
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);
    let graceful = GracefulShutdown::new();

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        handle_connection(stream, peer_addr, Arc::clone(&state), &graceful);
                    }
                    Err(e) => {
                        logger::log_error(&format!("Failed to accept connection: {e}"));
                    }
                }
            }

            () = &mut shutdown => {
                logger::log_info("[SHUTDOWN] No longer accepting connections");
                break;
            }
        }
    }

    // Stop accepting before draining
    drop(listener);
    graceful.shutdown().await;
    logger::log_info("[SHUTDOWN] All connections closed");
}
