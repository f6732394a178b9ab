use config::{Config, ConfigError, Environment, File, FileFormat};
use measure_adapter::{FilialDirectory, ProviderRoutes};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServiceConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    // NATS configuration
    /// NATS server URL
    #[serde(default = "default_nats_url")]
    pub nats_url: String,

    /// Connection timeout in seconds
    #[serde(default = "default_nats_connect_timeout_secs")]
    pub nats_connect_timeout_secs: u64,

    /// Subject task requests arrive on
    #[serde(default = "default_subscribe_subject")]
    pub subscribe_subject: String,

    /// Subject reply envelopes are published to
    #[serde(default = "default_publish_subject")]
    pub publish_subject: String,

    /// How long to wait for a live instance to answer the startup probe
    #[serde(default = "default_singleton_probe_timeout_ms")]
    pub singleton_probe_timeout_ms: u64,

    // Provider configuration
    /// Base URL of the measurement provider
    #[serde(default = "default_provider_url")]
    pub provider_url: String,

    /// HTTP timeout for a provider call in seconds
    #[serde(default = "default_provider_request_timeout_secs")]
    pub provider_request_timeout_secs: u64,

    #[serde(default = "default_provider_method")]
    pub provider_method_fttx: String,

    #[serde(default = "default_provider_method")]
    pub provider_method_xpon: String,

    #[serde(default = "default_provider_method")]
    pub provider_method_xdsl: String,

    /// JSON file with `{"mrf": ..., "filials": {region_id: filial_id}}`
    #[serde(default)]
    pub filials_path: Option<String>,

    // OpenTelemetry configuration
    /// OpenTelemetry OTLP endpoint (gRPC)
    #[serde(default = "default_otel_endpoint")]
    pub otel_endpoint: String,

    /// Enable OpenTelemetry export
    #[serde(default = "default_otel_enabled")]
    pub otel_enabled: bool,

    /// Service name for OpenTelemetry resource
    #[serde(default = "default_otel_service_name")]
    pub otel_service_name: String,

    /// Upper bound for cleanup on shutdown in seconds
    #[serde(default = "default_closer_timeout_secs")]
    pub closer_timeout_secs: u64,
}

fn default_log_level() -> String {
    "info".to_string()
}

// NATS defaults
fn default_nats_url() -> String {
    "nats://localhost:4222".to_string()
}

fn default_nats_connect_timeout_secs() -> u64 {
    10
}

fn default_subscribe_subject() -> String {
    "adapter-functional".to_string()
}

fn default_publish_subject() -> String {
    "transmitter".to_string()
}

fn default_singleton_probe_timeout_ms() -> u64 {
    500
}

// Provider defaults
fn default_provider_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_provider_request_timeout_secs() -> u64 {
    330
}

fn default_provider_method() -> String {
    measure_adapter::DEFAULT_PROVIDER_METHOD.to_string()
}

// OpenTelemetry defaults
fn default_otel_endpoint() -> String {
    "http://localhost:4317".to_string()
}

fn default_otel_enabled() -> bool {
    false
}

fn default_otel_service_name() -> String {
    "measure-adapter".to_string()
}

fn default_closer_timeout_secs() -> u64 {
    10
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(Environment::with_prefix("MEASURE_ADAPTER"))
            .build()?
            .try_deserialize()
    }

    /// Reads the filial directory, or an empty one when no file is configured.
    pub fn load_filials(&self) -> Result<FilialDirectory, ConfigError> {
        match &self.filials_path {
            Some(path) => Config::builder()
                .add_source(File::new(path, FileFormat::Json))
                .build()?
                .try_deserialize(),
            None => Ok(FilialDirectory::default()),
        }
    }

    pub fn provider_routes(&self) -> ProviderRoutes {
        ProviderRoutes {
            fttx: self.provider_method_fttx.clone(),
            xpon: self.provider_method_xpon.clone(),
            xdsl: self.provider_method_xdsl.clone(),
        }
    }

    pub fn nats_connect_timeout(&self) -> Duration {
        Duration::from_secs(self.nats_connect_timeout_secs)
    }

    pub fn singleton_probe_timeout(&self) -> Duration {
        Duration::from_millis(self.singleton_probe_timeout_ms)
    }

    pub fn provider_request_timeout(&self) -> Duration {
        Duration::from_secs(self.provider_request_timeout_secs)
    }

    pub fn closer_timeout(&self) -> Duration {
        Duration::from_secs(self.closer_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use std::sync::Mutex;

    // Mutex to ensure tests run serially and don't interfere with each other
    static TEST_LOCK: Mutex<()> = Mutex::new(());

    const VARS: &[&str] = &[
        "MEASURE_ADAPTER_LOG_LEVEL",
        "MEASURE_ADAPTER_PUBLISH_SUBJECT",
        "MEASURE_ADAPTER_PROVIDER_METHOD_XPON",
        "MEASURE_ADAPTER_SINGLETON_PROBE_TIMEOUT_MS",
    ];

    fn clear_env() {
        for var in VARS {
            std::env::remove_var(var);
        }
    }

    #[test]
    fn test_default_config() {
        let _lock = TEST_LOCK.lock().unwrap();
        clear_env();

        let config = ServiceConfig::from_env().unwrap();

        assert_eq!(config.log_level, "info");
        assert_eq!(config.subscribe_subject, "adapter-functional");
        assert_eq!(config.publish_subject, "transmitter");
        assert_eq!(config.singleton_probe_timeout(), Duration::from_millis(500));
        assert_eq!(config.provider_routes(), ProviderRoutes::default());
        assert!(!config.otel_enabled);
    }

    #[test]
    fn test_custom_config() {
        let _lock = TEST_LOCK.lock().unwrap();
        clear_env();
        std::env::set_var("MEASURE_ADAPTER_LOG_LEVEL", "debug");
        std::env::set_var("MEASURE_ADAPTER_PUBLISH_SUBJECT", "replies");
        std::env::set_var("MEASURE_ADAPTER_PROVIDER_METHOD_XPON", "gpon");
        std::env::set_var("MEASURE_ADAPTER_SINGLETON_PROBE_TIMEOUT_MS", "250");

        let config = ServiceConfig::from_env().unwrap();

        assert_eq!(config.log_level, "debug");
        assert_eq!(config.publish_subject, "replies");
        assert_eq!(config.provider_routes().xpon, "gpon");
        assert_eq!(config.provider_routes().fttx, "measure");
        assert_eq!(config.singleton_probe_timeout_ms, 250);

        clear_env();
    }

    #[test]
    fn test_load_filials_without_path() {
        let _lock = TEST_LOCK.lock().unwrap();
        clear_env();

        let config = ServiceConfig::from_env().unwrap();
        let filials = config.load_filials().unwrap();

        assert_eq!(filials.mrf(), "mrf");
    }

    #[test]
    fn test_load_filials_from_file() {
        let _lock = TEST_LOCK.lock().unwrap();
        clear_env();

        let path = std::env::temp_dir().join(format!("filials-{}.json", std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        write!(
            file,
            "{}",
            json!({"mrf": "volga", "filials": {"63": "samara"}})
        )
        .unwrap();

        let mut config = ServiceConfig::from_env().unwrap();
        config.filials_path = Some(path.to_string_lossy().into_owned());
        let filials = config.load_filials().unwrap();

        assert_eq!(filials.mrf(), "volga");
        assert_eq!(filials.lookup(&json!(63)), Some(&json!("samara")));

        std::fs::remove_file(path).unwrap();
    }
}
