/// Service configuration.
///
/// Operational settings come from a TOML file (`aquarisk.toml` by default);
/// secrets come from the environment, with `.env` loaded via dotenv. The
/// database URL is deliberately env-only so it never lands in a config file
/// checked into version control.

use serde::Deserialize;
use std::error::Error;

pub const DEFAULT_CONFIG_PATH: &str = "./aquarisk.toml";

/// Top-level service configuration, deserialized from TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub push: PushConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SchedulerConfig {
    /// Hours between recalculation cycles.
    #[serde(default = "default_interval_hours")]
    pub interval_hours: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PushConfig {
    /// Expo push gateway endpoint.
    #[serde(default = "default_push_url")]
    pub url: String,
    /// Per-call timeout for single sends, in seconds.
    #[serde(default = "default_send_timeout")]
    pub send_timeout_secs: u64,
    /// Per-call timeout for batch sends, in seconds.
    #[serde(default = "default_batch_timeout")]
    pub batch_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Minimum level: "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Optional log file path; console-only when absent.
    #[serde(default)]
    pub file: Option<String>,
}

fn default_interval_hours() -> u64 {
    24
}

fn default_push_url() -> String {
    "https://exp.host/--/api/v2/push/send".to_string()
}

fn default_send_timeout() -> u64 {
    10
}

fn default_batch_timeout() -> u64 {
    15
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        SchedulerConfig {
            interval_hours: default_interval_hours(),
        }
    }
}

impl Default for PushConfig {
    fn default() -> Self {
        PushConfig {
            url: default_push_url(),
            send_timeout_secs: default_send_timeout(),
            batch_timeout_secs: default_batch_timeout(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: default_log_level(),
            file: None,
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        ServiceConfig {
            scheduler: SchedulerConfig::default(),
            push: PushConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl ServiceConfig {
    /// Load configuration from a TOML file. A missing file yields defaults;
    /// a malformed file is an error (fail loudly rather than run with
    /// half-applied settings).
    pub fn load(path: &str) -> Result<ServiceConfig, Box<dyn Error>> {
        match std::fs::read_to_string(path) {
            Ok(contents) => Ok(toml::from_str(&contents)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ServiceConfig::default()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Read the database URL from the environment (after `dotenv::dotenv()`).
pub fn database_url() -> Result<String, Box<dyn Error>> {
    std::env::var("DATABASE_URL")
        .map_err(|_| "DATABASE_URL not set; add it to the environment or a .env file".into())
}
