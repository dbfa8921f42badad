//! Request handler module
//!
//! Route dispatch plus the echo, request-details and write endpoints.

mod capture;
mod descriptor;
mod echo;
mod error;
mod persist;
pub mod router;
mod write;

// Re-export main entry point
pub use router::{handle_request, RouteTable};
