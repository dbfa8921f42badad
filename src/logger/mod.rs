//! Logger module
//!
//! Provides logging utilities for the mock server:
//! - Server lifecycle logging
//! - Access logging with multiple formats
//! - Error and warning logging
//!
//! Every line goes to the console and to the log file opened by [`init`].

mod format;
pub mod writer;

pub use format::AccessLogEntry;

use crate::config::Config;
use std::net::SocketAddr;
use writer::Stream;

/// Initialize the logger with configuration
///
/// Should be called once at application startup.
pub fn init(config: &Config) -> std::io::Result<()> {
    writer::init(&config.logging.file)
}

fn write_info(message: &str) {
    writer::write(Stream::Stdout, message);
}

fn write_error(message: &str) {
    writer::write(Stream::Stderr, message);
}

pub fn log_startup() {
    write_info("--- Starting Mock HTTP Server ---");
}

pub fn log_settings_file(path: &str, found: bool) {
    if found {
        write_info(&format!("[CONFIG] Loaded settings file: {path}"));
    } else {
        write_info(&format!("[CONFIG] Could not load settings file {path}, using defaults"));
    }
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    write_info(&format!("Starting server on {addr}"));
    write_info(&format!("  - Log file: {}", config.logging.file));
    match config.server.workers {
        Some(workers) => write_info(&format!("  - Worker threads: {workers}")),
        None => write_info("  - Worker threads: default (CPU cores)"),
    }
    match config.http.max_body_size {
        Some(max) => write_info(&format!("  - Max body size: {max} bytes")),
        None => write_info("  - Max body size: unbounded"),
    }
    write_info(&format!(
        "  - Form memory limit: {} bytes",
        config.http.form_memory_limit
    ));
}

pub fn log_server_stopped() {
    write_info("--- Mock HTTP Server stopped ---");
}

pub fn log_info(message: &str) {
    write_info(message);
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    write_error(&format!("[ERROR] Failed to serve connection: {err:?}"));
}

pub fn log_error(message: &str) {
    write_error(&format!("[ERROR] {message}"));
}

pub fn log_warning(message: &str) {
    write_error(&format!("[WARN] {message}"));
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    write_info(&entry.format(format));
}
