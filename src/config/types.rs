// Configuration types module
// Defines all configuration-related data structures

use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub http: HttpConfig,
    pub performance: PerformanceConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// Logging configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    /// Log file, truncated at every start
    pub file: String,
    pub access_log: bool,
    /// Access log format (combined, common or json)
    #[serde(default = "default_access_log_format")]
    pub access_log_format: String,
}

#[allow(clippy::missing_const_for_fn)]
fn default_access_log_format() -> String {
    "combined".to_string()
}

/// HTTP configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct HttpConfig {
    pub server_name: String,
    /// Optional cap on request bodies; unbounded when unset
    #[serde(default)]
    pub max_body_size: Option<u64>,
    /// Bound on buffered non-file multipart values
    pub form_memory_limit: usize,
}

/// Performance configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
                workers: None,
            },
            logging: LoggingConfig {
                file: "mock-http-server.log".to_string(),
                access_log: true,
                access_log_format: default_access_log_format(),
            },
            http: HttpConfig {
                server_name: "mock-http-server".to_string(),
                max_body_size: None,
                form_memory_limit: super::DEFAULT_FORM_MEMORY_LIMIT,
            },
            performance: PerformanceConfig { keep_alive: true },
        }
    }
}
