// Configuration module entry point
// Loads settings once at startup and holds the per-process application state

mod state;
mod types;

use std::net::SocketAddr;
use std::path::Path;

// Re-export public types
pub use state::AppState;
pub use types::Config;

/// Settings file looked up when no path is given on the command line
pub const DEFAULT_SETTINGS_FILE: &str = "mock-server.toml";

/// Environment variable overriding `server.port`
pub const PORT_ENV_VAR: &str = "MOCK_SERVER_PORT";

/// Default bound for buffered non-file multipart values (32 KiB)
pub const DEFAULT_FORM_MEMORY_LIMIT: usize = 32 << 10;

/// Result of loading configuration
pub struct LoadedConfig {
    pub config: Config,
    /// Whether the settings file existed and was read
    pub settings_found: bool,
}

impl Config {
    /// Load configuration from the given TOML settings file, environment and defaults.
    /// A missing settings file is not an error.
    pub fn load_from(settings_path: &str) -> Result<LoadedConfig, config::ConfigError> {
        let settings_found = Path::new(settings_path).is_file();
        let port_override = std::env::var(PORT_ENV_VAR)
            .ok()
            .filter(|port| !port.is_empty());

        let defaults = Self::default();
        let settings = config::Config::builder()
            .set_default("server.host", defaults.server.host)?
            .set_default("server.port", i64::from(defaults.server.port))?
            .set_default("logging.file", defaults.logging.file)?
            .set_default("logging.access_log", defaults.logging.access_log)?
            .set_default("logging.access_log_format", defaults.logging.access_log_format)?
            .set_default("http.server_name", defaults.http.server_name)?
            .set_default("http.form_memory_limit", DEFAULT_FORM_MEMORY_LIMIT as u64)?
            .set_default("performance.keep_alive", defaults.performance.keep_alive)?
            .add_source(
                config::File::new(settings_path, config::FileFormat::Toml).required(false),
            )
            .add_source(
                config::Environment::with_prefix("MOCK_SERVER")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("server.port", port_override)?
            .build()?;

        Ok(LoadedConfig {
            config: settings.try_deserialize()?,
            settings_found,
        })
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_settings_file_uses_defaults() {
        let loaded = Config::load_from("/nonexistent/mock-server.toml").unwrap();
        assert!(!loaded.settings_found);
        assert_eq!(loaded.config.http.form_memory_limit, 32 * 1024);
        assert_eq!(loaded.config.logging.file, "mock-http-server.log");
        assert!(loaded.config.http.max_body_size.is_none());
        assert!(loaded.config.performance.keep_alive);
    }

    #[test]
    fn test_settings_file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[logging]\naccess_log = false\naccess_log_format = \"json\"\n\n[http]\nmax_body_size = 1024\nform_memory_limit = 64"
        )
        .unwrap();

        let path = file.path().to_str().unwrap().to_string();
        let loaded = Config::load_from(&path).unwrap();
        assert!(loaded.settings_found);
        assert!(!loaded.config.logging.access_log);
        assert_eq!(loaded.config.logging.access_log_format, "json");
        assert_eq!(loaded.config.http.max_body_size, Some(1024));
        assert_eq!(loaded.config.http.form_memory_limit, 64);
        assert_eq!(loaded.config.server.host, "0.0.0.0");
    }

    #[test]
    fn test_socket_addr() {
        let mut cfg = Config::default();
        cfg.server.host = "127.0.0.1".to_string();
        cfg.server.port = 9000;
        assert_eq!(cfg.socket_addr().unwrap().to_string(), "127.0.0.1:9000");

        cfg.server.host = "not a host".to_string();
        assert!(cfg.socket_addr().is_err());
    }
}
