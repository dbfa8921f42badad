//! HTTP protocol layer module
//!
//! Response builders and the error envelope shared by all handlers.

pub mod envelope;
pub mod response;

// Re-export commonly used types
pub use envelope::ErrorEnvelope;
pub use response::{build_404_response, build_json_response, build_text_response, json_response};
