use config::{Config, ConfigError, Environment};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServiceConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    // NATS configuration
    /// NATS server URL
    #[serde(default = "default_nats_url")]
    pub nats_url: String,

    /// NATS JetStream stream name for system events
    #[serde(default = "default_system_events_stream")]
    pub system_events_stream: String,

    /// Startup timeout for initialization operations in seconds
    #[serde(default = "default_startup_timeout_secs")]
    pub startup_timeout_secs: u64,

    // Writable profile settings
    /// Validate device resource units on add/update
    #[serde(default = "default_uom_validation")]
    pub uom_validation: bool,

    /// Reference units accepted when validation is enabled
    #[serde(default = "default_valid_units")]
    pub valid_units: Vec<String>,

    /// Maximum resources per profile (0 = unlimited)
    #[serde(default)]
    pub max_resources: u32,

    /// Refuse all profile deletions when enabled
    #[serde(default)]
    pub strict_device_profile_deletes: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_nats_url() -> String {
    "nats://localhost:4222".to_string()
}

fn default_system_events_stream() -> String {
    "system-events".to_string()
}

fn default_startup_timeout_secs() -> u64 {
    30
}

fn default_uom_validation() -> bool {
    true
}

fn default_valid_units() -> Vec<String> {
    [
        "Celsius",
        "Fahrenheit",
        "Kelvin",
        "percent",
        "ppm",
        "lux",
        "pascal",
        "volt",
        "ampere",
        "watt",
        "meter",
        "second",
        "hertz",
        "decibel",
    ]
    .iter()
    .map(|unit| unit.to_string())
    .collect()
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(
                Environment::with_prefix("CAIRN")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("valid_units"),
            )
            .build()?
            .try_deserialize()
    }
}
